//! Handler for per-link statistics.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::api::dto::stats::{LinkStatsResponse, PaginationQuery};
use crate::error::AppError;
use crate::state::AppState;

/// Returns counters and recent clicks for a short code.
///
/// # Endpoint
///
/// `GET /api/stats/{code}?page=1&page_size=20`
///
/// Unlike the public redirect path, this accessor also reports deactivated
/// links, since it exists for admin reporting.
///
/// # Errors
///
/// Returns 404 for unknown codes.
pub async fn stats_handler(
    Path(code): Path<String>,
    Query(pagination): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> Result<Json<LinkStatsResponse>, AppError> {
    let pagination = pagination.clamped();

    let stats = state
        .stats_service
        .link_stats(&code, pagination.page_size, pagination.offset())
        .await?;

    Ok(Json(stats.into()))
}
