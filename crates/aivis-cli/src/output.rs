//! Terminal rendering shared by `analyze`, `crawl` and `reports show`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use aivis_analysis::{aggregate, csv_file_name};
use aivis_core::Report;
use anyhow::Context;

/// Score cards followed by the leaderboard table.
pub(crate) fn format_summary(report: &Report) -> String {
    let agg = aggregate(&report.results, &report.brands);
    let mut out = String::new();

    let _ = writeln!(out, "Report {}", report.id);
    let _ = writeln!(out, "Category:         {}", report.category);
    let _ = writeln!(
        out,
        "Created:          {}",
        report.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(
        out,
        "Visibility score: {:.1}% ({} of {} prompts mention a tracked brand)",
        report.visibility_score,
        agg.prompts_with_mentions(),
        agg.prompt_count()
    );
    let _ = writeln!(out, "Total mentions:   {}", agg.total_mentions());
    let top = agg.top_brand().map_or_else(
        || "none".to_string(),
        |row| format!("{} ({} mentions)", row.brand, row.mentions),
    );
    let _ = writeln!(out, "Top brand:        {top}");
    out.push('\n');

    let _ = writeln!(out, "{:<24}{:>10}{:>12}", "BRAND", "MENTIONS", "VISIBILITY");
    for row in agg.leaderboard() {
        let _ = writeln!(
            out,
            "{:<24}{:>10}{:>11}%",
            row.brand, row.mentions, row.visibility_percent
        );
    }
    out
}

/// Existing directories receive the report's default CSV file name.
pub(crate) fn resolve_csv_path(path: &Path, report: &Report) -> PathBuf {
    if path.is_dir() {
        path.join(csv_file_name(report))
    } else {
        path.to_path_buf()
    }
}

pub(crate) fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
