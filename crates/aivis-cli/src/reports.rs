//! Read-only queries over the report history.

use std::path::PathBuf;

use aivis_analysis::{render_csv, render_markdown};
use aivis_core::Report;
use clap::Subcommand;
use uuid::Uuid;

use crate::output::{format_summary, resolve_csv_path, write_file};

/// Sub-commands available under `reports`.
#[derive(Debug, Subcommand)]
pub enum ReportsCommands {
    /// List stored reports, newest first
    List {
        /// Maximum number of reports to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Show one report
    Show {
        /// Report id
        id: Uuid,
        /// Print the Markdown report instead of the summary
        #[arg(long)]
        markdown: bool,
    },
    /// Export one report as CSV
    Csv {
        /// Report id
        id: Uuid,
        /// Output file or directory (prints to stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// # Errors
///
/// Returns an error if a query fails, the report does not exist or is
/// malformed, or the CSV cannot be written.
pub(crate) async fn run_reports(
    pool: &sqlx::PgPool,
    command: ReportsCommands,
) -> anyhow::Result<()> {
    match command {
        ReportsCommands::List { limit } => run_reports_list(pool, limit).await,
        ReportsCommands::Show { id, markdown } => {
            let report = load_report(pool, id).await?;
            if markdown {
                print!("{}", render_markdown(&report));
            } else {
                print!("{}", format_summary(&report));
            }
            Ok(())
        }
        ReportsCommands::Csv { id, out } => {
            let report = load_report(pool, id).await?;
            let csv = render_csv(&report);
            match out {
                Some(path) => {
                    let path = resolve_csv_path(&path, &report);
                    write_file(&path, &csv)?;
                    println!("csv written to {}", path.display());
                }
                None => print!("{csv}"),
            }
            Ok(())
        }
    }
}

async fn run_reports_list(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let rows = aivis_db::list_reports(pool, limit.clamp(1, 200)).await?;

    if rows.is_empty() {
        println!("no reports stored; run `analyze --save` or `crawl --save` first");
        return Ok(());
    }

    println!(
        "{:<18}{:<38}{:>8}  {:<6}CATEGORY",
        "CREATED", "ID", "SCORE", "CRAWL"
    );
    for row in &rows {
        let crawl = row
            .crawl_run_id
            .map_or_else(|| "\u{2014}".to_string(), |id| id.to_string());
        println!(
            "{:<18}{:<38}{:>7.1}%  {:<6}{}",
            row.created_at.format("%Y-%m-%d %H:%M"),
            row.public_id,
            row.visibility_score,
            crawl,
            row.category
        );
    }

    Ok(())
}

async fn load_report(pool: &sqlx::PgPool, id: Uuid) -> anyhow::Result<Report> {
    let row = aivis_db::get_report(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("report '{id}' not found"))?;
    Ok(row.into_report()?)
}
