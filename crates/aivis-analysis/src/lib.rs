//! Mention extraction and visibility scoring.
//!
//! Scans AI responses for tracked brands, folds the mentions into per-brand
//! counts and a prompt-coverage score, and assembles the immutable [`Report`]
//! consumed by the dashboard, the CSV export and the history store.
//!
//! [`Report`]: aivis_core::Report

pub mod aggregate;
pub mod assemble;
pub mod error;
pub mod export;
pub mod matcher;
pub mod pipeline;

pub use aggregate::{aggregate, Aggregate};
pub use assemble::assemble;
pub use error::AnalysisError;
pub use export::{csv_file_name, mention_details, render_csv, render_markdown, MentionDetail};
pub use matcher::{find_mentions, find_mentions_with, MatchOptions, DEFAULT_CONTEXT_CHARS};
pub use pipeline::{analyze_pairs, analyze_response};
