//! DTOs for the read-only statistics endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::{LinkListing, LinkStats};
use crate::domain::entities::{Click, Link};

/// Pagination parameters shared by the stats endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

impl PaginationQuery {
    /// Clamps the parameters to sane bounds.
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, 100),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// A link with its counters, as exposed to admin reporting.
#[derive(Debug, Serialize)]
pub struct LinkSummary {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub clicks_count: i64,
    pub unique_clicks_count: i64,
}

impl From<Link> for LinkSummary {
    fn from(link: Link) -> Self {
        Self {
            short_code: link.short_code,
            original_url: link.original_url,
            created_at: link.created_at,
            is_active: link.is_active,
            clicks_count: link.clicks_count,
            unique_clicks_count: link.unique_clicks_count,
        }
    }
}

/// A single recorded click.
#[derive(Debug, Serialize)]
pub struct ClickEntry {
    pub clicked_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub city: Option<String>,
    pub is_unique: bool,
}

impl From<Click> for ClickEntry {
    fn from(click: Click) -> Self {
        Self {
            clicked_at: click.clicked_at,
            ip: click.ip,
            user_agent: click.user_agent,
            referer: click.referer,
            country_code: click.country_code,
            country_name: click.country_name,
            city: click.city,
            is_unique: click.is_unique,
        }
    }
}

/// Detailed statistics for one link.
#[derive(Debug, Serialize)]
pub struct LinkStatsResponse {
    #[serde(flatten)]
    pub link: LinkSummary,
    pub total_clicks: i64,
    pub recent_clicks: Vec<ClickEntry>,
}

impl From<LinkStats> for LinkStatsResponse {
    fn from(stats: LinkStats) -> Self {
        Self {
            link: stats.link.into(),
            total_clicks: stats.total_clicks,
            recent_clicks: stats.recent_clicks.into_iter().map(Into::into).collect(),
        }
    }
}

/// Paginated listing of links.
#[derive(Debug, Serialize)]
pub struct StatsListResponse {
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub items: Vec<LinkSummary>,
}

impl StatsListResponse {
    pub fn new(listing: LinkListing, pagination: PaginationQuery) -> Self {
        Self {
            total: listing.total,
            page: pagination.page,
            page_size: pagination.page_size,
            items: listing.links.into_iter().map(Into::into).collect(),
        }
    }
}
