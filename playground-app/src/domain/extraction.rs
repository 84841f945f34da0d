use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub url: String,
    pub title: String,
    pub meta_description: String,
    pub headings: Headings,
    pub main_content: String,
    pub navigation: Vec<String>,
    pub calls_to_action: Vec<String>,
    pub pricing_signals: PricingSignals,
    pub features_mentioned: Vec<String>,
    pub technology_stack: TechnologyStack,
    pub page_structure: PageStructure,
    pub social_proof: SocialProof,
    pub contact_info: ContactInfo,
}

impl ExtractionResult {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
}

impl Headings {
    pub const LEVELS: [&'static str; 3] = ["h1", "h2", "h3"];

    pub fn level_mut(&mut self, level: &str) -> Option<&mut Vec<String>> {
        match level {
            "h1" => Some(&mut self.h1),
            "h2" => Some(&mut self.h2),
            "h3" => Some(&mut self.h3),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.h1.is_empty() && self.h2.is_empty() && self.h3.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSignals {
    pub has_pricing_page: bool,
    /// Tier names from a fixed vocabulary, lowercase.
    pub pricing_tiers: Vec<String>,
    /// Raw price-like substrings such as `$49/month`.
    pub pricing_signals: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologyStack {
    pub frameworks: Vec<String>,
    pub analytics: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStructure {
    pub has_hero: bool,
    pub has_footer: bool,
    pub has_navigation: bool,
    pub sections_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialProof {
    pub testimonials: Vec<String>,
    pub customer_logos: bool,
    pub stats: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub email: Option<String>,
    pub social_links: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_fully_defaulted() {
        let result = ExtractionResult::new("https://example.com");
        assert_eq!(result.url, "https://example.com");
        assert!(result.title.is_empty());
        assert!(result.headings.is_empty());
        assert!(!result.pricing_signals.has_pricing_page);
        assert_eq!(result.page_structure.sections_count, 0);
        assert!(result.contact_info.email.is_none());
    }

    #[test]
    fn test_serializes_camel_case_keys() {
        let value = serde_json::to_value(ExtractionResult::new("https://example.com")).unwrap();
        assert!(value.get("metaDescription").is_some());
        assert!(value.get("callsToAction").is_some());
        assert!(value["pricingSignals"].get("hasPricingPage").is_some());
        assert!(value["pageStructure"].get("sectionsCount").is_some());
        assert!(value["headings"].get("h1").is_some());
    }
}
