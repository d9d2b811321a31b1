use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::model::BrandSet;
use crate::ConfigError;

/// Category, tracked brands and the prompts a crawl sends to the chat UI.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingFile {
    pub category: String,
    pub brands: Vec<String>,
    #[serde(default)]
    pub prompts: Vec<String>,
}

impl TrackingFile {
    /// Brands as a deduplicated set. Validation has already rejected blanks.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if a brand name is blank.
    pub fn brand_set(&self) -> Result<BrandSet, ConfigError> {
        BrandSet::from_names(self.brands.iter().cloned())
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }
}

/// Load and validate a tracking file from YAML.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_tracking(path: &Path) -> Result<TrackingFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TrackingFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let tracking: TrackingFile = serde_yaml::from_str(&content)?;
    validate_tracking(&tracking)?;

    Ok(tracking)
}

fn validate_tracking(tracking: &TrackingFile) -> Result<(), ConfigError> {
    if tracking.category.trim().is_empty() {
        return Err(ConfigError::Validation(
            "category must be non-empty".to_string(),
        ));
    }

    if tracking.brands.is_empty() {
        return Err(ConfigError::Validation(
            "at least one brand is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for brand in &tracking.brands {
        if brand.trim().is_empty() {
            return Err(ConfigError::Validation(
                "brand name must be non-empty".to_string(),
            ));
        }
        if !seen.insert(brand.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand name: '{brand}'"
            )));
        }
    }

    if tracking.prompts.is_empty() {
        return Err(ConfigError::Validation(
            "at least one prompt is required".to_string(),
        ));
    }

    if let Some(idx) = tracking.prompts.iter().position(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "prompt #{} is blank",
            idx + 1
        )));
    }

    Ok(())
}
