//! Per-brand counts and the report-level visibility score.
//!
//! Two distinct "visibility" metrics live here and must not be merged:
//!
//! - `visibility_percent` on a leaderboard row is brand dominance:
//!   `round(100 * mentions / prompts)`, where every occurrence counts.
//! - [`Aggregate::visibility_score`] is prompt coverage: the share of prompts
//!   whose response mentions at least one tracked brand, with one decimal.

use aivis_core::{BrandCount, BrandName, BrandSet, PromptResult};

/// Folded view over a set of prompt results.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Occurrence counts in brand insertion order, zero-count brands included.
    counts: Vec<(BrandName, usize)>,
    prompt_count: usize,
    prompts_with_mentions: usize,
    visibility_score: f64,
}

/// Fold `results` into per-brand counts for the tracked `brands`.
///
/// Mentions of names outside `brands` are ignored for both counts and
/// coverage. An empty `results` slice yields zero everywhere.
#[must_use]
pub fn aggregate(results: &[PromptResult], brands: &BrandSet) -> Aggregate {
    let mut counts: Vec<(BrandName, usize)> = brands.iter().map(|b| (b.clone(), 0)).collect();
    let mut prompts_with_mentions = 0usize;

    for result in results {
        let mut covered = false;
        for mention in &result.mentions {
            if let Some(slot) = counts
                .iter_mut()
                .find(|(brand, _)| brand.eq_ignore_case(mention.brand.as_str()))
            {
                slot.1 += 1;
                covered = true;
            }
        }
        if covered {
            prompts_with_mentions += 1;
        }
    }

    let prompt_count = results.len();
    Aggregate {
        counts,
        prompt_count,
        prompts_with_mentions,
        visibility_score: coverage_score(prompts_with_mentions, prompt_count),
    }
}

impl Aggregate {
    /// Per-brand occurrence counts in brand insertion order.
    #[must_use]
    pub fn counts(&self) -> &[(BrandName, usize)] {
        &self.counts
    }

    /// Count for one brand, matched case-insensitively.
    #[must_use]
    pub fn count(&self, brand: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(b, _)| b.eq_ignore_case(brand))
            .map(|(_, n)| *n)
    }

    #[must_use]
    pub fn prompt_count(&self) -> usize {
        self.prompt_count
    }

    #[must_use]
    pub fn prompts_with_mentions(&self) -> usize {
        self.prompts_with_mentions
    }

    #[must_use]
    pub fn total_mentions(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    /// Prompt coverage, 0-100 with one decimal.
    #[must_use]
    pub fn visibility_score(&self) -> f64 {
        self.visibility_score
    }

    /// Brands ordered by mentions descending, ties alphabetical
    /// (case-insensitive, then exact spelling).
    #[must_use]
    pub fn leaderboard(&self) -> Vec<BrandCount> {
        let mut rows: Vec<BrandCount> = self
            .counts
            .iter()
            .map(|(brand, mentions)| BrandCount {
                brand: brand.clone(),
                mentions: *mentions,
                visibility_percent: brand_percent(*mentions, self.prompt_count),
            })
            .collect();

        rows.sort_by(|a, b| {
            b.mentions
                .cmp(&a.mentions)
                .then_with(|| a.brand.key().cmp(&b.brand.key()))
                .then_with(|| a.brand.as_str().cmp(b.brand.as_str()))
        });
        rows
    }

    /// Leader of the board, or `None` when nothing was mentioned.
    #[must_use]
    pub fn top_brand(&self) -> Option<BrandCount> {
        self.leaderboard().into_iter().next().filter(|row| row.mentions > 0)
    }
}

/// `round(100 * mentions / max(1, prompts))`, half-up, clamped to 100.
///
/// A brand mentioned several times per response can exceed one mention per
/// prompt, so the raw ratio is unbounded above.
fn brand_percent(mentions: usize, prompts: usize) -> u32 {
    let n = prompts.max(1);
    let rounded = (mentions.saturating_mul(200).saturating_add(n)) / (2 * n);
    u32::try_from(rounded.min(100)).unwrap_or(100)
}

/// `round(100 * covered / max(1, prompts), 1)` computed in integer tenths.
fn coverage_score(covered: usize, prompts: usize) -> f64 {
    let n = prompts.max(1);
    let tenths = (covered.min(n) * 2000 + n) / (2 * n);
    f64::from(u32::try_from(tenths).unwrap_or(1000)) / 10.0
}
