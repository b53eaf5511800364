//! API route configuration.

use crate::api::handlers::{shorten_handler, stats_handler, stats_list_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// API routes mounted under `/api`.
///
/// # Endpoints
///
/// - `POST /shorten`      - Create a short link
/// - `GET  /stats`        - Aggregated per-link counters (paginated)
/// - `GET  /stats/{code}` - Detailed statistics for a specific link
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/stats", get(stats_list_handler))
        .route("/stats/{code}", get(stats_handler))
}
