//! Offline analysis of already-collected prompt/response pairs.

use std::path::{Path, PathBuf};

use aivis_analysis::{analyze_pairs, render_csv, render_markdown, MatchOptions};
use aivis_core::{AppConfig, BrandSet, ResponsePair};
use anyhow::Context;
use chrono::Utc;

use crate::output::{format_summary, resolve_csv_path, write_file};

#[derive(Debug)]
pub(crate) struct AnalyzeArgs {
    pub input: PathBuf,
    pub category: Option<String>,
    pub brands: Vec<String>,
    pub csv: Option<PathBuf>,
    pub markdown: Option<PathBuf>,
    pub save: bool,
}

/// Analyze the pairs in `args.input` and print the summary.
///
/// # Errors
///
/// Returns an error if the input or tracking file cannot be read, the category
/// or brand set is invalid, an export cannot be written, or saving fails.
pub(crate) async fn run_analyze(config: &AppConfig, args: AnalyzeArgs) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let pairs = parse_pairs(&raw)
        .with_context(|| format!("invalid pairs file {}", args.input.display()))?;

    let (category, brands) =
        resolve_target(args.category.as_deref(), &args.brands, &config.tracking_path)?;
    let options = MatchOptions {
        context_chars: config.mention_context_chars,
    };
    let report = analyze_pairs(&category, brands, &pairs, Utc::now(), options)?;

    print!("{}", format_summary(&report));

    if let Some(path) = args.csv.as_deref() {
        let path = resolve_csv_path(path, &report);
        write_file(&path, &render_csv(&report))?;
        println!("csv written to {}", path.display());
    }
    if let Some(path) = args.markdown.as_deref() {
        write_file(path, &render_markdown(&report))?;
        println!("markdown written to {}", path.display());
    }

    if args.save {
        let pool = aivis_db::connect_from_app_config(config).await?;
        aivis_db::insert_report(&pool, &report, None).await?;
        println!("saved report {}", report.id);
    }

    Ok(())
}

fn parse_pairs(raw: &str) -> anyhow::Result<Vec<ResponsePair>> {
    let pairs: Vec<ResponsePair> = serde_json::from_str(raw)?;
    Ok(pairs)
}

/// Explicit flags win; anything missing comes from the tracking file, which is
/// only read when needed.
fn resolve_target(
    category: Option<&str>,
    brands: &[String],
    tracking_path: &Path,
) -> anyhow::Result<(String, BrandSet)> {
    if let (Some(category), false) = (category, brands.is_empty()) {
        return Ok((category.to_string(), BrandSet::from_names(brands.iter().cloned())?));
    }

    let tracking = aivis_core::load_tracking(tracking_path)?;
    let category = category.map_or_else(|| tracking.category.clone(), str::to_string);
    let brands = if brands.is_empty() {
        tracking.brand_set()?
    } else {
        BrandSet::from_names(brands.iter().cloned())?
    };
    Ok((category, brands))
}
