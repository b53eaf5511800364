//! Read-only reporting over links and their clicks.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{Click, Link};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;

/// Counters and recent clicks for a single link.
#[derive(Debug, Clone)]
pub struct LinkStats {
    pub link: Link,
    /// Total persisted click rows, for paginating `recent_clicks`.
    pub total_clicks: i64,
    pub recent_clicks: Vec<Click>,
}

/// Paginated listing of links with their counters.
#[derive(Debug, Clone)]
pub struct LinkListing {
    pub total: i64,
    pub links: Vec<Link>,
}

/// Service backing the admin reporting endpoints and CLI.
///
/// Purely read-only; unlike the public resolve path it also reports
/// deactivated links.
pub struct StatsService {
    links: Arc<dyn LinkRepository>,
    clicks: Arc<dyn ClickRepository>,
}

impl StatsService {
    pub fn new(links: Arc<dyn LinkRepository>, clicks: Arc<dyn ClickRepository>) -> Self {
        Self { links, clicks }
    }

    /// Returns counters and the most recent clicks for a code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown codes,
    /// [`AppError::Internal`] on database errors.
    pub async fn link_stats(
        &self,
        code: &str,
        limit: i64,
        offset: i64,
    ) -> Result<LinkStats, AppError> {
        let folded = code.to_ascii_lowercase();

        let link = self
            .links
            .find_by_code(&folded)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": folded })))?;

        let total_clicks = self.clicks.count_clicks(link.id).await?;
        let recent_clicks = self.clicks.recent_clicks(link.id, limit, offset).await?;

        Ok(LinkStats {
            link,
            total_clicks,
            recent_clicks,
        })
    }

    /// Lists links with pagination, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list_links(&self, page: i64, page_size: i64) -> Result<LinkListing, AppError> {
        let total = self.links.count().await?;
        let links = self.links.list(page, page_size).await?;

        Ok(LinkListing { total, links })
    }

    /// Total number of links; doubles as the database health probe.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn total_links(&self) -> Result<i64, AppError> {
        self.links.count().await
    }
}
