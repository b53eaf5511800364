//! Shared application state injected into HTTP handlers.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::services::{LinkService, StatsService};
use crate::domain::click_event::ClickEvent;

/// State shared across all request handlers.
///
/// Services are behind `Arc` so the state clones cheaply per request.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub stats_service: Arc<StatsService>,
    /// Producer side of the click queue drained by the background worker.
    pub click_tx: mpsc::Sender<ClickEvent>,
    /// Public base used when rendering short URLs.
    pub base_url: String,
    /// When true, client IPs come from forwarded headers.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        link_service: Arc<LinkService>,
        stats_service: Arc<StatsService>,
        click_tx: mpsc::Sender<ClickEvent>,
        base_url: String,
        behind_proxy: bool,
    ) -> Self {
        Self {
            link_service,
            stats_service,
            click_tx,
            base_url,
            behind_proxy,
        }
    }
}
