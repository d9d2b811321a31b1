//! Records exchanged between the matcher, the aggregator, the crawler and the
//! history store.
//!
//! Serialized field names are camelCase so stored reports keep the shape the
//! dashboard already reads (`visibilityScore`, `createdAt`, `responseText`).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// A tracked brand. Display keeps the caller's spelling; identity is
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BrandName(String);

impl BrandName {
    /// Build a brand name from user input, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if the trimmed name is empty.
    pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidInput(
                "brand name must be non-empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased identity used for duplicate detection and count lookups.
    #[must_use]
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    #[must_use]
    pub fn eq_ignore_case(&self, other: &str) -> bool {
        self.key() == other.trim().to_lowercase()
    }
}

impl TryFrom<String> for BrandName {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BrandName> for String {
    fn from(value: BrandName) -> Self {
        value.0
    }
}

impl std::fmt::Display for BrandName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered set of brands for one analysis request.
///
/// Case-insensitive duplicates collapse onto the first spelling seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct BrandSet(Vec<BrandName>);

impl BrandSet {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if any name is blank.
    pub fn from_names<I, S>(names: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut brands = Vec::new();
        for name in names {
            let brand = BrandName::new(name)?;
            if seen.insert(brand.key()) {
                brands.push(brand);
            }
        }
        Ok(Self(brands))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BrandName> {
        self.0.iter()
    }

    /// Find the tracked brand matching `name` regardless of case.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&BrandName> {
        self.0.iter().find(|b| b.eq_ignore_case(name))
    }
}

impl<'a> IntoIterator for &'a BrandSet {
    type Item = &'a BrandName;
    type IntoIter = std::slice::Iter<'a, BrandName>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl TryFrom<Vec<String>> for BrandSet {
    type Error = CoreError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_names(value)
    }
}

impl From<BrandSet> for Vec<String> {
    fn from(value: BrandSet) -> Self {
        value.0.into_iter().map(String::from).collect()
    }
}

/// One located occurrence of a brand inside a response.
///
/// `position` is a character offset into the response text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub brand: BrandName,
    pub position: usize,
    pub context: String,
}

/// A prompt, the AI response it produced, and the mentions found in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptResult {
    pub prompt: String,
    pub response_text: String,
    pub mentions: Vec<Mention>,
}

impl PromptResult {
    /// Placeholder for a prompt whose response never arrived.
    #[must_use]
    pub fn failed(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response_text: String::new(),
            mentions: Vec::new(),
        }
    }

    #[must_use]
    pub fn has_mentions(&self) -> bool {
        !self.mentions.is_empty()
    }
}

/// Raw `{prompt, responseText}` pair handed over by the prompt/response source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePair {
    pub prompt: String,
    pub response_text: String,
}

/// Output of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub category: String,
    pub brands: BrandSet,
    pub results: Vec<PromptResult>,
    /// Share of prompts whose response mentions any tracked brand, 0-100 with
    /// one decimal.
    pub visibility_score: f64,
    pub created_at: DateTime<Utc>,
}

/// Derived leaderboard row; never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandCount {
    pub brand: BrandName,
    pub mentions: usize,
    pub visibility_percent: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_name_trims_and_rejects_blank() {
        assert_eq!(BrandName::new("  HubSpot ").unwrap().as_str(), "HubSpot");
        assert!(matches!(
            BrandName::new("   "),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn brand_name_identity_ignores_case() {
        let brand = BrandName::new("HubSpot").unwrap();
        assert_eq!(brand.key(), "hubspot");
        assert!(brand.eq_ignore_case("HUBSPOT"));
        assert!(!brand.eq_ignore_case("HubSpots"));
    }

    #[test]
    fn brand_set_collapses_case_insensitive_duplicates() {
        let set = BrandSet::from_names(["Zoho", "HubSpot", "zoho", "ZOHO", "Pipedrive"]).unwrap();
        let names: Vec<&str> = set.iter().map(BrandName::as_str).collect();
        assert_eq!(names, vec!["Zoho", "HubSpot", "Pipedrive"]);
    }

    #[test]
    fn brand_set_rejects_blank_member() {
        assert!(BrandSet::from_names(["Zoho", " "]).is_err());
    }

    #[test]
    fn brand_set_find_is_case_insensitive() {
        let set = BrandSet::from_names(["Salesforce"]).unwrap();
        assert_eq!(set.find("salesforce").map(BrandName::as_str), Some("Salesforce"));
        assert!(set.find("HubSpot").is_none());
    }

    #[test]
    fn brand_set_deserializes_from_plain_strings() {
        let set: BrandSet = serde_json::from_str(r#"["Salesforce","salesforce","HubSpot"]"#).unwrap();
        assert_eq!(set.len(), 2);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["Salesforce","HubSpot"]"#);
    }

    #[test]
    fn brand_name_deserialization_rejects_blank() {
        let result: Result<BrandName, _> = serde_json::from_str(r#""  ""#);
        assert!(result.is_err());
    }

    #[test]
    fn prompt_result_uses_camel_case_fields() {
        let result = PromptResult {
            prompt: "best crm?".to_string(),
            response_text: "HubSpot".to_string(),
            mentions: vec![Mention {
                brand: BrandName::new("HubSpot").unwrap(),
                position: 0,
                context: "HubSpot".to_string(),
            }],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["responseText"], "HubSpot");
        assert_eq!(json["mentions"][0]["brand"], "HubSpot");
        assert_eq!(json["mentions"][0]["position"], 0);
    }

    #[test]
    fn failed_prompt_result_is_empty() {
        let result = PromptResult::failed("slow prompt");
        assert_eq!(result.prompt, "slow prompt");
        assert!(result.response_text.is_empty());
        assert!(!result.has_mentions());
    }
}
