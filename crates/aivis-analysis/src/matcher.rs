//! Brand mention scanning over free-form response text.
//!
//! Matching is case-insensitive and token-bounded: a brand only matches when
//! the characters on either side of it are not alphanumeric, so `"Zoho"` never
//! matches inside `"Zohosoft"`. Offsets and the context window are measured in
//! characters, not bytes.

use aivis_core::{BrandName, BrandSet, Mention};

/// Characters of surrounding text kept on each side of a match.
pub const DEFAULT_CONTEXT_CHARS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    pub context_chars: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            context_chars: DEFAULT_CONTEXT_CHARS,
        }
    }
}

/// Find every mention of `brands` in `text` using the default context window.
#[must_use]
pub fn find_mentions(text: &str, brands: &BrandSet) -> Vec<Mention> {
    find_mentions_with(text, brands, MatchOptions::default())
}

/// Find every mention of `brands` in `text`.
///
/// Each brand contributes its non-overlapping occurrences; occurrences of
/// different brands may overlap. The result is ordered by position, with ties
/// kept in brand order.
#[must_use]
pub fn find_mentions_with(text: &str, brands: &BrandSet, options: MatchOptions) -> Vec<Mention> {
    if text.trim().is_empty() || brands.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let folded: Vec<char> = chars.iter().copied().map(fold_char).collect();

    let mut mentions = Vec::new();
    for brand in brands {
        scan_brand(&chars, &folded, brand, options, &mut mentions);
    }

    // Stable: equal positions keep brand scan order.
    mentions.sort_by_key(|m| m.position);
    mentions
}

fn scan_brand(
    chars: &[char],
    folded: &[char],
    brand: &BrandName,
    options: MatchOptions,
    out: &mut Vec<Mention>,
) {
    let needle: Vec<char> = brand.as_str().chars().map(fold_char).collect();
    let len = needle.len();
    if len == 0 || len > folded.len() {
        return;
    }

    let check_before = needle.first().is_some_and(|c| c.is_alphanumeric());
    let check_after = needle.last().is_some_and(|c| c.is_alphanumeric());

    let mut start = 0usize;
    while start + len <= folded.len() {
        if folded[start..start + len] != needle[..] {
            start += 1;
            continue;
        }

        let end = start + len;
        let before_ok = !check_before || start == 0 || !chars[start - 1].is_alphanumeric();
        let after_ok = !check_after || end == chars.len() || !chars[end].is_alphanumeric();

        if before_ok && after_ok {
            out.push(Mention {
                brand: brand.clone(),
                position: start,
                context: context_window(chars, start, end, options.context_chars),
            });
            start = end;
        } else {
            start += 1;
        }
    }
}

fn context_window(chars: &[char], start: usize, end: usize, width: usize) -> String {
    let from = start.saturating_sub(width);
    let to = end.saturating_add(width).min(chars.len());
    let raw: String = chars[from..to].iter().collect();
    raw.replace("\r\n", " ").replace(['\n', '\r'], " ").trim().to_string()
}

/// Simple lowercase folding that keeps a one-to-one character mapping so
/// offsets in the folded text line up with the original.
fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}
