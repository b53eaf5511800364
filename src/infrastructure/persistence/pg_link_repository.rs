//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Row mapping for the `links` table.
#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    short_code: String,
    original_url: String,
    created_at: DateTime<Utc>,
    created_by: Option<String>,
    is_active: bool,
    clicks_count: i64,
    unique_clicks_count: i64,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link {
            id: row.id,
            short_code: row.short_code,
            original_url: row.original_url,
            created_at: row.created_at,
            created_by: row.created_by,
            is_active: row.is_active,
            clicks_count: row.clicks_count,
            unique_clicks_count: row.unique_clicks_count,
        }
    }
}

const LINK_COLUMNS: &str = "id, short_code, original_url, created_at, created_by, is_active, \
                            clicks_count, unique_clicks_count";

/// PostgreSQL repository for link storage and retrieval.
///
/// Codes are stored case-folded; the unique constraint on `short_code` is
/// the atomic insert-or-check step the registry's retry loop relies on.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "INSERT INTO links (short_code, original_url, created_by) \
             VALUES ($1, $2, $3) \
             RETURNING {LINK_COLUMNS}"
        ))
        .bind(&new_link.short_code)
        .bind(&new_link.original_url)
        .bind(&new_link.created_by)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE short_code = $1"
        ))
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_active_by_url(&self, original_url: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE original_url = $1 AND is_active \
             ORDER BY created_at \
             LIMIT 1"
        ))
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn set_active(&self, code: &str, active: bool) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE links SET is_active = $2 WHERE short_code = $1")
            .bind(code)
            .bind(active)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE short_code = $1")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, page: i64, page_size: i64) -> Result<Vec<Link>, AppError> {
        let offset = (page.max(1) - 1) * page_size;

        let rows = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM links \
             ORDER BY created_at DESC \
             LIMIT $1 OFFSET $2"
        ))
        .bind(page_size)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
