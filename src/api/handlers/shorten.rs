//! Handler for the shorten endpoint.

use axum::{Json, extract::State, http::HeaderMap};
use std::net::SocketAddr;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::net::extract_client_ip;

/// Creates a short link for a URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/a/b?x=1",
///   "custom_alias": "launch-2026"   // optional
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "short_url": "https://crt.example.com/k3f9a",
///   "short_code": "k3f9a",
///   "original_url": "https://example.com/a/b?x=1",
///   "existing": false
/// }
/// ```
///
/// Submitting the same URL again without an alias returns the original
/// code with `"existing": true`.
///
/// # Errors
///
/// Returns 400 for invalid or spam-rejected URLs, 409 when the requested
/// alias is taken or reserved, 500 when code allocation is exhausted.
pub async fn shorten_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let client_ip = extract_client_ip(&headers, addr, state.behind_proxy);

    let outcome = state
        .link_service
        .shorten(
            &payload.url,
            payload.custom_alias.as_deref(),
            Some(client_ip),
        )
        .await?;

    let short_url = state
        .link_service
        .short_url(&state.base_url, &outcome.link.short_code);

    Ok(Json(ShortenResponse {
        short_url,
        short_code: outcome.link.short_code,
        original_url: outcome.link.original_url,
        existing: outcome.existing,
    }))
}
