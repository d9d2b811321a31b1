//! Matcher + assembler composition for ready-made `{prompt, responseText}`
//! pairs.

use aivis_core::{BrandSet, PromptResult, Report, ResponsePair};
use chrono::{DateTime, Utc};

use crate::assemble::assemble;
use crate::error::AnalysisError;
use crate::matcher::{find_mentions_with, MatchOptions};

/// Scan one response and wrap it as a [`PromptResult`].
///
/// NUL characters are dropped from the prompt and response before matching;
/// Postgres `jsonb` cannot store `\u0000`, and positions refer to the stored
/// text.
#[must_use]
pub fn analyze_response(
    prompt: &str,
    response_text: &str,
    brands: &BrandSet,
    options: MatchOptions,
) -> PromptResult {
    let response_text = strip_nul(response_text);
    let mentions = find_mentions_with(&response_text, brands, options);
    PromptResult {
        prompt: strip_nul(prompt),
        response_text,
        mentions,
    }
}

fn strip_nul(text: &str) -> String {
    text.replace('\0', "")
}

/// Run every pair through the matcher and assemble a report.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidInput`] if the category is blank or the
/// brand set is empty. Pairs with empty responses are kept as zero-mention
/// results.
pub fn analyze_pairs(
    category: &str,
    brands: BrandSet,
    pairs: &[ResponsePair],
    now: DateTime<Utc>,
    options: MatchOptions,
) -> Result<Report, AnalysisError> {
    let results: Vec<PromptResult> = pairs
        .iter()
        .enumerate()
        .map(|(idx, pair)| {
            let result = analyze_response(&pair.prompt, &pair.response_text, &brands, options);
            tracing::debug!(
                prompt_index = idx,
                mentions = result.mentions.len(),
                "analyzed response"
            );
            result
        })
        .collect();

    let report = assemble(category, brands, results, now)?;

    tracing::info!(
        category = %report.category,
        prompts = report.results.len(),
        visibility_score = report.visibility_score,
        "analysis complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nul_characters_are_dropped_before_matching() {
        let brands = BrandSet::from_names(["HubSpot"]).unwrap();
        let result = analyze_response(
            "best\u{0}crm?",
            "\u{0}\u{0}Try HubSpot\u{0}",
            &brands,
            MatchOptions::default(),
        );
        assert_eq!(result.prompt, "bestcrm?");
        assert_eq!(result.response_text, "Try HubSpot");
        assert_eq!(result.mentions[0].position, 4);

        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("\\u0000"));
    }

    #[test]
    fn analyze_response_keeps_prompt_and_text() {
        let brands = BrandSet::from_names(["HubSpot"]).unwrap();
        let result = analyze_response(
            "best crm?",
            "HubSpot is free",
            &brands,
            MatchOptions::default(),
        );
        assert_eq!(result.prompt, "best crm?");
        assert_eq!(result.response_text, "HubSpot is free");
        assert_eq!(result.mentions.len(), 1);
    }

    #[test]
    fn empty_response_is_zero_mentions_not_error() {
        let brands = BrandSet::from_names(["HubSpot"]).unwrap();
        let pairs = vec![ResponsePair {
            prompt: "best crm?".to_string(),
            response_text: String::new(),
        }];
        let report =
            analyze_pairs("CRM", brands, &pairs, Utc::now(), MatchOptions::default()).unwrap();
        assert_eq!(report.results.len(), 1);
        assert!(!report.results[0].has_mentions());
    }

    #[test]
    fn invalid_category_is_an_error() {
        let brands = BrandSet::from_names(["HubSpot"]).unwrap();
        let result = analyze_pairs("", brands, &[], Utc::now(), MatchOptions::default());
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }
}
