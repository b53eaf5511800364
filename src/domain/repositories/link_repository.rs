//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing short links.
///
/// All codes passed to this trait are expected to be case-folded already;
/// the registry folds at its boundary so storage compares exact strings.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new link in a single atomic insert-or-check step.
    ///
    /// Two concurrent creates with the same code race on the unique
    /// constraint; the first committer wins.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code is already taken.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its case-folded short code, active or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Finds an active link by its normalized original URL.
    ///
    /// Used for idempotent shortening: resubmitting a URL without an alias
    /// returns the code it was assigned the first time.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_active_by_url(&self, original_url: &str) -> Result<Option<Link>, AppError>;

    /// Sets the active flag; inactive links resolve as not found.
    ///
    /// Returns `Ok(true)` if a link was updated, `Ok(false)` if the code is
    /// unknown.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn set_active(&self, code: &str, active: bool) -> Result<bool, AppError>;

    /// Deletes a link and, via cascade, its clicks and visitor markers.
    ///
    /// Returns `Ok(true)` if a link was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, code: &str) -> Result<bool, AppError>;

    /// Lists links with pagination, newest first.
    ///
    /// `page` is 1-indexed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, page: i64, page_size: i64) -> Result<Vec<Link>, AppError>;

    /// Counts all links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self) -> Result<i64, AppError>;
}
