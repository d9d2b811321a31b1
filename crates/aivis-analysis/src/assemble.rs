use aivis_core::{BrandSet, PromptResult, Report};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::aggregate::aggregate;
use crate::error::AnalysisError;

/// Build the immutable report for one analysis run.
///
/// The category is trimmed. `results` keep their given order.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidInput`] if the category is blank or the
/// brand set is empty.
pub fn assemble(
    category: &str,
    brands: BrandSet,
    results: Vec<PromptResult>,
    now: DateTime<Utc>,
) -> Result<Report, AnalysisError> {
    let category = category.trim();
    if category.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "category must be non-empty".to_string(),
        ));
    }
    if brands.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "at least one brand is required".to_string(),
        ));
    }

    let visibility_score = aggregate(&results, &brands).visibility_score();

    Ok(Report {
        id: Uuid::new_v4(),
        category: category.to_string(),
        brands,
        results,
        visibility_score,
        created_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
    }

    #[test]
    fn rejects_blank_category() {
        let brands = BrandSet::from_names(["HubSpot"]).unwrap();
        let err = assemble("  ", brands, Vec::new(), now()).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InvalidInput("category must be non-empty".to_string())
        );
    }

    #[test]
    fn rejects_empty_brand_set() {
        let err = assemble("CRM software", BrandSet::default(), Vec::new(), now()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn empty_results_produce_zero_score() {
        let brands = BrandSet::from_names(["HubSpot"]).unwrap();
        let report = assemble(" CRM software ", brands, Vec::new(), now()).unwrap();
        assert_eq!(report.category, "CRM software");
        assert!(report.results.is_empty());
        assert!((report.visibility_score - 0.0).abs() < f64::EPSILON);
        assert_eq!(report.created_at, now());
    }

    #[test]
    fn each_report_gets_a_fresh_id() {
        let brands = BrandSet::from_names(["HubSpot"]).unwrap();
        let a = assemble("CRM", brands.clone(), Vec::new(), now()).unwrap();
        let b = assemble("CRM", brands, Vec::new(), now()).unwrap();
        assert_ne!(a.id, b.id);
    }
}
