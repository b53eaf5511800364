//! PostgreSQL implementation of the click repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Row mapping for the `link_clicks` table.
#[derive(sqlx::FromRow)]
struct ClickRow {
    id: i64,
    link_id: i64,
    clicked_at: DateTime<Utc>,
    ip: Option<String>,
    user_agent: Option<String>,
    referer: Option<String>,
    country_code: Option<String>,
    country_name: Option<String>,
    city: Option<String>,
    is_unique: bool,
}

impl From<ClickRow> for Click {
    fn from(row: ClickRow) -> Self {
        Click {
            id: row.id,
            link_id: row.link_id,
            clicked_at: row.clicked_at,
            ip: row.ip,
            user_agent: row.user_agent,
            referer: row.referer,
            country_code: row.country_code,
            country_name: row.country_name,
            city: row.city,
            is_unique: row.is_unique,
        }
    }
}

const CLICK_COLUMNS: &str = "id, link_id, clicked_at, ip, user_agent, referer, country_code, \
                             country_name, city, is_unique";

/// PostgreSQL repository for click events, counters, and visitor markers.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn insert_visitor_marker(
        &self,
        link_id: i64,
        fingerprint: &str,
    ) -> Result<bool, AppError> {
        // ON CONFLICT DO NOTHING makes the existence check and the insert a
        // single atomic statement; rows_affected tells us who was first.
        let result = sqlx::query(
            "INSERT INTO link_visitors (link_id, fingerprint) \
             VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(link_id)
        .bind(fingerprint)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        let row = sqlx::query_as::<_, ClickRow>(&format!(
            "INSERT INTO link_clicks \
             (link_id, ip, user_agent, referer, country_code, country_name, city, is_unique) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {CLICK_COLUMNS}"
        ))
        .bind(new_click.link_id)
        .bind(&new_click.ip)
        .bind(&new_click.user_agent)
        .bind(&new_click.referer)
        .bind(&new_click.country_code)
        .bind(&new_click.country_name)
        .bind(&new_click.city)
        .bind(new_click.is_unique)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn increment_counters(&self, link_id: i64, unique: bool) -> Result<(), AppError> {
        // One atomic UPDATE; concurrent redirects serialize on the row and
        // no increment is ever lost.
        sqlx::query(
            "UPDATE links \
             SET clicks_count = clicks_count + 1, \
                 unique_clicks_count = unique_clicks_count + $2 \
             WHERE id = $1",
        )
        .bind(link_id)
        .bind(if unique { 1i64 } else { 0i64 })
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn recent_clicks(
        &self,
        link_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Click>, AppError> {
        let rows = sqlx::query_as::<_, ClickRow>(&format!(
            "SELECT {CLICK_COLUMNS} FROM link_clicks \
             WHERE link_id = $1 \
             ORDER BY clicked_at DESC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(link_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_clicks(&self, link_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks WHERE link_id = $1")
            .bind(link_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
