//! Repository trait for click events, counters, and visitor markers.

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the click recording path.
///
/// Counter updates must be atomic at the storage layer (single
/// `UPDATE ... SET n = n + 1` statements or equivalent) so that concurrent
/// redirects of the same code never lose increments.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Inserts the unique-visitor marker for (link, fingerprint) if absent.
    ///
    /// Insertion doubles as the existence check: returns `Ok(true)` when the
    /// marker was created (first visit), `Ok(false)` when it already existed.
    /// Markers are never updated or read back individually.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert_visitor_marker(&self, link_id: i64, fingerprint: &str)
    -> Result<bool, AppError>;

    /// Persists a click event row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors, including a
    /// dangling `link_id` after a concurrent link deletion.
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Atomically increments the link's click counters.
    ///
    /// `clicks_count` always increases by one; `unique_clicks_count`
    /// additionally increases when `unique` is set.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn increment_counters(&self, link_id: i64, unique: bool) -> Result<(), AppError>;

    /// Returns the most recent clicks for a link, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn recent_clicks(
        &self,
        link_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Click>, AppError>;

    /// Counts all clicks recorded for a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count_clicks(&self, link_id: i64) -> Result<i64, AppError>;
}
