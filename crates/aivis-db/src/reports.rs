//! Append-only report history.

use aivis_core::{BrandSet, PromptResult, Report};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `reports` table. `brands` and `results` hold the JSON shape
/// of [`Report`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportRow {
    pub id: i64,
    pub public_id: Uuid,
    pub category: String,
    pub brands: serde_json::Value,
    pub results: serde_json::Value,
    pub visibility_score: f64,
    pub created_at: DateTime<Utc>,
    pub crawl_run_id: Option<i64>,
}

impl ReportRow {
    /// Decode the stored JSON columns back into a [`Report`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::MalformedReport`] if either JSON column does not
    /// match the report shape.
    pub fn into_report(self) -> Result<Report, DbError> {
        let public_id = self.public_id;
        let malformed = |column: &str, e: serde_json::Error| DbError::MalformedReport {
            public_id,
            reason: format!("{column}: {e}"),
        };

        let brands: BrandSet =
            serde_json::from_value(self.brands).map_err(|e| malformed("brands", e))?;
        let results: Vec<PromptResult> =
            serde_json::from_value(self.results).map_err(|e| malformed("results", e))?;

        Ok(Report {
            id: self.public_id,
            category: self.category,
            brands,
            results,
            visibility_score: self.visibility_score,
            created_at: self.created_at,
        })
    }
}

const REPORT_COLUMNS: &str = "id, public_id, category, brands, results, visibility_score, \
                              created_at, crawl_run_id";

/// Append a report. The report's `id` becomes the row's `public_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including a duplicate
/// `public_id`.
pub async fn insert_report(
    pool: &PgPool,
    report: &Report,
    crawl_run_id: Option<i64>,
) -> Result<ReportRow, DbError> {
    let row = sqlx::query_as::<_, ReportRow>(&format!(
        "INSERT INTO reports \
             (public_id, category, brands, results, visibility_score, created_at, crawl_run_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {REPORT_COLUMNS}"
    ))
    .bind(report.id)
    .bind(&report.category)
    .bind(Json(&report.brands))
    .bind(Json(&report.results))
    .bind(report.visibility_score)
    .bind(report.created_at)
    .bind(crawl_run_id)
    .fetch_one(pool)
    .await?;

    tracing::debug!(
        report_id = %row.public_id,
        category = %row.category,
        "report stored"
    );

    Ok(row)
}

/// Newest reports first, at most `limit`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_reports(pool: &PgPool, limit: i64) -> Result<Vec<ReportRow>, DbError> {
    let rows = sqlx::query_as::<_, ReportRow>(&format!(
        "SELECT {REPORT_COLUMNS} FROM reports \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_report(pool: &PgPool, public_id: Uuid) -> Result<Option<ReportRow>, DbError> {
    let row = sqlx::query_as::<_, ReportRow>(&format!(
        "SELECT {REPORT_COLUMNS} FROM reports WHERE public_id = $1"
    ))
    .bind(public_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
