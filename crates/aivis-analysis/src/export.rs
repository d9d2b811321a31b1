//! Text renderings of a [`Report`]: the CSV download, a Markdown report, and
//! the flattened per-mention detail list.

use std::fmt::Write as _;

use aivis_core::{BrandName, Report};
use chrono::Datelike;
use serde::Serialize;

use crate::aggregate::{aggregate, Aggregate};

/// One `(prompt, brand, context)` row of the detailed response view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionDetail {
    pub prompt: String,
    pub brand: BrandName,
    pub context: String,
}

/// Flatten every mention of `report`, in result order then position order.
#[must_use]
pub fn mention_details(report: &Report) -> Vec<MentionDetail> {
    report
        .results
        .iter()
        .flat_map(|result| {
            result.mentions.iter().map(|mention| MentionDetail {
                prompt: result.prompt.clone(),
                brand: mention.brand.clone(),
                context: mention.context.clone(),
            })
        })
        .collect()
}

/// Render the CSV download.
///
/// Fields are written as-is with no quoting; a comma inside a category or brand
/// name lands in the output unchanged.
#[must_use]
pub fn render_csv(report: &Report) -> String {
    let agg = aggregate(&report.results, &report.brands);

    let mut csv = String::from("AI Visibility Tracker Report\n");
    let _ = writeln!(csv, "Category,{}", report.category);
    let _ = writeln!(csv, "Date,{}", short_date(report));
    let _ = writeln!(csv, "Visibility Score,{:.1}%", report.visibility_score);
    csv.push('\n');

    csv.push_str("Brand,Mentions,Visibility %\n");
    for row in agg.leaderboard() {
        let _ = writeln!(
            csv,
            "{},{},{}%",
            row.brand, row.mentions, row.visibility_percent
        );
    }
    csv
}

/// `report-<category>.csv` with whitespace runs collapsed to `-`.
#[must_use]
pub fn csv_file_name(report: &Report) -> String {
    let slug = report.category.split_whitespace().collect::<Vec<_>>().join("-");
    format!("report-{slug}.csv")
}

/// Render a Markdown report: score cards, citation share and per-prompt
/// mentions.
#[must_use]
pub fn render_markdown(report: &Report) -> String {
    let agg = aggregate(&report.results, &report.brands);
    let mut md = String::new();

    let _ = writeln!(md, "# AI Visibility Report: {}", report.category);
    md.push('\n');
    let _ = writeln!(
        md,
        "**Generated:** {}  ",
        report.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(md, "**Visibility Score:** {:.1}%  ", report.visibility_score);
    let _ = writeln!(md, "**Prompts Tracked:** {}  ", agg.prompt_count());
    let _ = writeln!(md, "**Brands Competing:** {}  ", report.brands.len());
    let _ = writeln!(md, "**Total Mentions:** {}", agg.total_mentions());
    md.push_str("\n---\n\n");

    write_citation_share(&mut md, &agg);
    md.push('\n');

    md.push_str("## Responses\n\n");
    for (idx, result) in report.results.iter().enumerate() {
        let _ = writeln!(md, "### {}. \"{}\"", idx + 1, md_inline(&result.prompt));
        md.push('\n');
        if result.mentions.is_empty() {
            md.push_str("_No brands mentioned in this response._\n");
        } else {
            for mention in &result.mentions {
                let _ = writeln!(
                    md,
                    "- **{}**: {}",
                    md_inline(mention.brand.as_str()),
                    md_inline(&mention.context)
                );
            }
        }
        md.push('\n');
    }

    md
}

fn write_citation_share(md: &mut String, agg: &Aggregate) {
    md.push_str("## Citation Share\n\n");
    md.push_str("| Rank | Brand | Mentions | Visibility % |\n");
    md.push_str("|------|-------|----------|--------------|\n");
    for (rank, row) in agg.leaderboard().iter().enumerate() {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {}% |",
            rank + 1,
            md_inline(row.brand.as_str()),
            row.mentions,
            row.visibility_percent
        );
    }
}

/// Keep user text on one Markdown line and out of table column splits.
fn md_inline(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// US-English short date (`M/D/YYYY`) of `createdAt` in UTC.
fn short_date(report: &Report) -> String {
    let date = report.created_at.date_naive();
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}
