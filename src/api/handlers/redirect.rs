//! Handler for short URL redirects.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use std::net::SocketAddr;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::net::extract_client_ip;

/// Generic page served for unknown and deactivated codes alike, so the
/// public path does not reveal whether a link ever existed.
const NOT_FOUND_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Link not found</title></head>
<body style="font-family: sans-serif; text-align: center; padding: 64px;">
  <h1>404 &mdash; Link not found</h1>
  <p>The requested short link does not exist or has been deactivated.</p>
</body>
</html>
"#;

/// Redirects a short code to its original URL and records the click.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve the case-folded code (inactive and unknown are both 404)
/// 2. Queue a click event for the background worker
/// 3. Respond with `302 Found` so clients keep revalidating and every
///    visit is counted
///
/// # Click Tracking
///
/// The click event goes onto a bounded channel. When the queue is full the
/// send is deferred to a spawned task instead of dropping the event, so
/// counters stay exact without delaying the redirect.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
) -> Response {
    let link = match state.link_service.resolve(&code).await {
        Ok(link) => link,
        Err(AppError::NotFound { .. }) => {
            return (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response();
        }
        Err(e) => return e.into_response(),
    };

    let client_ip = extract_client_ip(&headers, addr, state.behind_proxy);
    let event = ClickEvent::new(
        link.id,
        Some(client_ip),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
        headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
    );

    match state.click_tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => {
            warn!(link_id = link.id, "Click queue full, deferring event");
            let tx = state.click_tx.clone();
            tokio::spawn(async move {
                if tx.send(event).await.is_err() {
                    warn!("Click queue closed, event dropped");
                }
            });
        }
        Err(TrySendError::Closed(_)) => {
            warn!(link_id = link.id, "Click queue closed, event dropped");
        }
    }

    (
        StatusCode::FOUND,
        [(header::LOCATION, link.original_url)],
    )
        .into_response()
}
