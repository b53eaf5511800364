//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, blacklist loading, worker spawning, and the
//! Axum server lifecycle.

use crate::application::services::{ClickService, LinkService, StatsService};
use crate::config::Config;
use crate::domain::click_worker::run_click_worker;
use crate::infrastructure::geo::{GeoCache, HttpGeoProvider};
use crate::infrastructure::persistence::{PgClickRepository, PgLinkRepository};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::url_validator::Blacklist;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations
/// - Host blacklist (config + `host_blacklist` table)
/// - Geolocation provider and LRU cache
/// - Background click worker
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if the database connection, migration, or server bind
/// fails.
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;

    let blacklist = Arc::new(load_blacklist(&pool, &config).await?);
    tracing::info!("Blacklist loaded with {} hosts", blacklist.len());

    let geo_provider = HttpGeoProvider::new(
        &config.geo_api_url,
        Duration::from_millis(config.geo_timeout_ms),
    )
    .context("Failed to build geo provider")?;
    let geo_cache = Arc::new(GeoCache::new(
        Arc::new(geo_provider),
        config.geo_cache_capacity,
        Duration::from_millis(config.geo_timeout_ms),
    ));

    let pool_arc = Arc::new(pool);
    let link_repository = Arc::new(PgLinkRepository::new(pool_arc.clone()));
    let click_repository = Arc::new(PgClickRepository::new(pool_arc.clone()));

    let link_service = Arc::new(LinkService::new(
        link_repository.clone(),
        blacklist,
        config.code_length,
    ));
    let stats_service = Arc::new(StatsService::new(
        link_repository.clone(),
        click_repository.clone(),
    ));
    let click_service = Arc::new(ClickService::new(click_repository, geo_cache));

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    tokio::spawn(run_click_worker(click_rx, click_service));
    tracing::info!("Click worker started");

    let state = AppState::new(
        link_service,
        stats_service,
        click_tx,
        config.base_url.clone(),
        config.behind_proxy,
    );

    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .await?;

    Ok(())
}

/// Merges blacklist hosts from configuration and the `host_blacklist` table.
///
/// The merged set is immutable for the process lifetime; blacklist changes
/// take effect on restart.
async fn load_blacklist(pool: &PgPool, config: &Config) -> Result<Blacklist> {
    let db_hosts: Vec<String> = sqlx::query_scalar("SELECT host FROM host_blacklist")
        .fetch_all(pool)
        .await
        .context("Failed to load host blacklist")?;

    Ok(Blacklist::new(
        config.blacklist_hosts.iter().cloned().chain(db_hosts),
    ))
}
