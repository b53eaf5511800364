#![allow(dead_code)]

//! Shared fixtures: in-memory repositories, geo providers, and state
//! builders. The in-memory repositories mirror the atomicity guarantees of
//! the PostgreSQL implementations (unique insert, atomic counter updates)
//! so concurrency invariants can be exercised without a database.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use chrono::Utc;
use serde_json::json;
use tokio::sync::mpsc;
use tower::Layer;

use curtail::application::services::{ClickService, LinkService, StatsService};
use curtail::domain::click_event::ClickEvent;
use curtail::domain::entities::{Click, Link, NewClick, NewLink};
use curtail::domain::repositories::{ClickRepository, LinkRepository};
use curtail::error::AppError;
use curtail::infrastructure::geo::{GeoCache, GeoError, GeoInfo, GeoProvider};
use curtail::state::AppState;
use curtail::utils::url_validator::Blacklist;

// ── In-memory link repository ───────────────────────────────────────────────

#[derive(Default)]
struct LinksInner {
    next_id: i64,
    by_code: HashMap<String, Link>,
}

/// Link storage backed by a mutex-guarded map; the map insert is the atomic
/// insert-or-check step, like the unique index in Postgres.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    inner: Mutex<LinksInner>,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter update applied under the same lock as the rest of the row.
    fn increment(&self, link_id: i64, unique: bool) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(link) = inner.by_code.values_mut().find(|l| l.id == link_id) {
            link.clicks_count += 1;
            if unique {
                link.unique_clicks_count += 1;
            }
        }
    }

    pub fn get(&self, code: &str) -> Option<Link> {
        self.inner.lock().unwrap().by_code.get(code).cloned()
    }

    pub fn deactivate(&self, code: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(link) = inner.by_code.get_mut(code) {
            link.is_active = false;
        }
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut inner = self.inner.lock().unwrap();

        if inner.by_code.contains_key(&new_link.short_code) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "links_short_code_key" }),
            ));
        }

        inner.next_id += 1;
        let link = Link {
            id: inner.next_id,
            short_code: new_link.short_code.clone(),
            original_url: new_link.original_url,
            created_at: Utc::now(),
            created_by: new_link.created_by,
            is_active: true,
            clicks_count: 0,
            unique_clicks_count: 0,
        };

        inner.by_code.insert(new_link.short_code, link.clone());
        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.inner.lock().unwrap().by_code.get(code).cloned())
    }

    async fn find_active_by_url(&self, original_url: &str) -> Result<Option<Link>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .by_code
            .values()
            .filter(|l| l.original_url == original_url && l.is_active)
            .min_by_key(|l| l.id)
            .cloned())
    }

    async fn set_active(&self, code: &str, active: bool) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.by_code.get_mut(code) {
            Some(link) => {
                link.is_active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.inner.lock().unwrap().by_code.remove(code).is_some())
    }

    async fn list(&self, page: i64, page_size: i64) -> Result<Vec<Link>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut links: Vec<Link> = inner.by_code.values().cloned().collect();
        links.sort_by(|a, b| b.id.cmp(&a.id));

        let offset = ((page.max(1) - 1) * page_size) as usize;
        Ok(links
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.inner.lock().unwrap().by_code.len() as i64)
    }
}

// ── In-memory click repository ──────────────────────────────────────────────

#[derive(Default)]
struct ClicksInner {
    next_id: i64,
    clicks: Vec<Click>,
    markers: HashSet<(i64, String)>,
}

/// Click storage; visitor markers use set insertion as the atomic
/// first-visit check, counters go through the shared link repository.
pub struct InMemoryClickRepository {
    links: Arc<InMemoryLinkRepository>,
    inner: Mutex<ClicksInner>,
}

impl InMemoryClickRepository {
    pub fn new(links: Arc<InMemoryLinkRepository>) -> Self {
        Self {
            links,
            inner: Mutex::new(ClicksInner::default()),
        }
    }

    pub fn recorded(&self) -> Vec<Click> {
        self.inner.lock().unwrap().clicks.clone()
    }
}

#[async_trait]
impl ClickRepository for InMemoryClickRepository {
    async fn insert_visitor_marker(
        &self,
        link_id: i64,
        fingerprint: &str,
    ) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.markers.insert((link_id, fingerprint.to_string())))
    }

    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;

        let click = Click {
            id: inner.next_id,
            link_id: new_click.link_id,
            clicked_at: Utc::now(),
            ip: new_click.ip,
            user_agent: new_click.user_agent,
            referer: new_click.referer,
            country_code: new_click.country_code,
            country_name: new_click.country_name,
            city: new_click.city,
            is_unique: new_click.is_unique,
        };

        inner.clicks.push(click.clone());
        Ok(click)
    }

    async fn increment_counters(&self, link_id: i64, unique: bool) -> Result<(), AppError> {
        self.links.increment(link_id, unique);
        Ok(())
    }

    async fn recent_clicks(
        &self,
        link_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Click>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut clicks: Vec<Click> = inner
            .clicks
            .iter()
            .filter(|c| c.link_id == link_id)
            .cloned()
            .collect();
        clicks.sort_by(|a, b| b.id.cmp(&a.id));

        Ok(clicks
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_clicks(&self, link_id: i64) -> Result<i64, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.clicks.iter().filter(|c| c.link_id == link_id).count() as i64)
    }
}

// ── Geo providers ───────────────────────────────────────────────────────────

/// Provider answering every lookup with the same record.
pub struct StaticGeoProvider(pub GeoInfo);

impl StaticGeoProvider {
    pub fn berlin() -> Self {
        Self(GeoInfo {
            country_code: Some("DE".to_string()),
            country_name: Some("Germany".to_string()),
            city: Some("Berlin".to_string()),
        })
    }
}

#[async_trait]
impl GeoProvider for StaticGeoProvider {
    async fn lookup(&self, _ip: &str) -> Result<GeoInfo, GeoError> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Provider that sleeps far past any reasonable timeout.
pub struct StalledGeoProvider;

#[async_trait]
impl GeoProvider for StalledGeoProvider {
    async fn lookup(&self, _ip: &str) -> Result<GeoInfo, GeoError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(GeoInfo::default())
    }

    fn name(&self) -> &'static str {
        "stalled"
    }
}

// ── State builders ──────────────────────────────────────────────────────────

pub struct TestContext {
    pub state: AppState,
    pub click_rx: mpsc::Receiver<ClickEvent>,
    pub links: Arc<InMemoryLinkRepository>,
    pub clicks: Arc<InMemoryClickRepository>,
    pub click_service: Arc<ClickService>,
}

/// Builds an AppState wired to in-memory repositories and a static geo
/// provider. The click worker is not spawned; tests either drain
/// `click_rx` or drive `click_service` directly.
pub fn create_test_context() -> TestContext {
    let links = Arc::new(InMemoryLinkRepository::new());
    let clicks = Arc::new(InMemoryClickRepository::new(links.clone()));

    let geo = Arc::new(GeoCache::new(
        Arc::new(StaticGeoProvider::berlin()),
        100,
        Duration::from_millis(200),
    ));

    let link_service = Arc::new(LinkService::new(
        links.clone() as Arc<dyn LinkRepository>,
        Arc::new(Blacklist::default()),
        5,
    ));
    let stats_service = Arc::new(StatsService::new(
        links.clone() as Arc<dyn LinkRepository>,
        clicks.clone() as Arc<dyn ClickRepository>,
    ));
    let click_service = Arc::new(ClickService::new(
        clicks.clone() as Arc<dyn ClickRepository>,
        geo,
    ));

    let (click_tx, click_rx) = mpsc::channel(100);

    let state = AppState::new(
        link_service,
        stats_service,
        click_tx,
        "https://crt.example.com".to_string(),
        false,
    );

    TestContext {
        state,
        click_rx,
        links,
        clicks,
        click_service,
    }
}

// ── ConnectInfo stub ────────────────────────────────────────────────────────

/// Injects a fixed peer address so handlers using `ConnectInfo` work under
/// `axum_test::TestServer`.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "203.0.113.9:51442".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
