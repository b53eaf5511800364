//! Handler for the aggregated statistics listing.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::api::dto::stats::{PaginationQuery, StatsListResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Lists links with their counters, newest first.
///
/// # Endpoint
///
/// `GET /api/stats?page=1&page_size=20`
pub async fn stats_list_handler(
    Query(pagination): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> Result<Json<StatsListResponse>, AppError> {
    let pagination = pagination.clamped();

    let listing = state
        .stats_service
        .list_links(pagination.page, pagination.page_size)
        .await?;

    Ok(Json(StatsListResponse::new(listing, pagination)))
}
