//! Bookkeeping for browser crawls: `queued -> running -> succeeded | failed`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CrawlRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub site: String,
    pub status: String,
    pub prompts_total: i32,
    pub prompts_processed: i32,
    pub prompts_failed: i32,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

const CRAWL_RUN_COLUMNS: &str = "id, public_id, site, status, prompts_total, prompts_processed, \
                                 prompts_failed, started_at, completed_at, error_message, \
                                 created_at";

/// Create a run in `queued` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_crawl_run(
    pool: &PgPool,
    site: &str,
    prompts_total: i32,
) -> Result<CrawlRunRow, DbError> {
    let row = sqlx::query_as::<_, CrawlRunRow>(&format!(
        "INSERT INTO crawl_runs (public_id, site, status, prompts_total) \
         VALUES ($1, $2, 'queued', $3) \
         RETURNING {CRAWL_RUN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(site)
    .bind(prompts_total)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// `queued -> running`, stamping `started_at`.
///
/// # Errors
///
/// Returns [`DbError::InvalidCrawlRunTransition`] if the run is not queued, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn start_crawl_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE crawl_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidCrawlRunTransition {
            id,
            expected_status: "queued",
        });
    }
    Ok(())
}

/// `running -> succeeded` with the final prompt counts.
///
/// # Errors
///
/// Returns [`DbError::InvalidCrawlRunTransition`] if the run is not running,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn complete_crawl_run(
    pool: &PgPool,
    id: i64,
    prompts_processed: i32,
    prompts_failed: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE crawl_runs \
         SET status = 'succeeded', completed_at = NOW(), \
             prompts_processed = $1, prompts_failed = $2 \
         WHERE id = $3 AND status = 'running'",
    )
    .bind(prompts_processed)
    .bind(prompts_failed)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidCrawlRunTransition {
            id,
            expected_status: "running",
        });
    }
    Ok(())
}

/// `running -> failed`. Partial counts are kept alongside the error.
///
/// # Errors
///
/// Returns [`DbError::InvalidCrawlRunTransition`] if the run is not running,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn fail_crawl_run(
    pool: &PgPool,
    id: i64,
    prompts_processed: i32,
    error_message: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE crawl_runs \
         SET status = 'failed', completed_at = NOW(), \
             prompts_processed = $1, error_message = $2 \
         WHERE id = $3 AND status = 'running'",
    )
    .bind(prompts_processed)
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidCrawlRunTransition {
            id,
            expected_status: "running",
        });
    }
    Ok(())
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no run has this `id`, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_crawl_run(pool: &PgPool, id: i64) -> Result<CrawlRunRow, DbError> {
    sqlx::query_as::<_, CrawlRunRow>(&format!(
        "SELECT {CRAWL_RUN_COLUMNS} FROM crawl_runs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Most recent runs first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_crawl_runs(pool: &PgPool, limit: i64) -> Result<Vec<CrawlRunRow>, DbError> {
    let rows = sqlx::query_as::<_, CrawlRunRow>(&format!(
        "SELECT {CRAWL_RUN_COLUMNS} FROM crawl_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
