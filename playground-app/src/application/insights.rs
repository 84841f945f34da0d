use crate::domain::SectionPresence;

const THEME_KEYWORDS: &[(&str, &str)] = &[
    ("engagement", "User Engagement"),
    ("growth", "Growth"),
    ("retention", "Retention"),
    ("monetization", "Monetization"),
    ("technical", "Technical Debt"),
    ("legal", "Legal/Compliance"),
    ("ai", "AI/ML"),
    ("feature", "Feature Development"),
];

const FALLBACK_THEME: &str = "General Product Strategy";

/// Headings a challenge analysis is expected to contain, in order.
pub const REQUIRED_SECTIONS: &[&str] = &[
    "Problem Reframing",
    "Root Cause Analysis",
    "Decision Options",
    "Risk Management",
    "Suggested Direction",
    "Next Steps",
    "Success Signals",
];

/// Coarse topic labels for a piece of user input.
///
/// Plain substring match, so short keywords such as `ai` also fire inside
/// longer words.
pub fn extract_key_themes(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let themes: Vec<String> = THEME_KEYWORDS
        .iter()
        .filter(|(keyword, _)| lower.contains(keyword))
        .map(|(_, theme)| theme.to_string())
        .collect();

    if themes.is_empty() {
        vec![FALLBACK_THEME.to_string()]
    } else {
        themes
    }
}

pub fn validate_output_structure(text: &str) -> Vec<SectionPresence> {
    let lower = text.to_lowercase();
    REQUIRED_SECTIONS
        .iter()
        .map(|name| SectionPresence {
            name: name.to_string(),
            present: lower.contains(&name.to_lowercase()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_themes_in_table_order() {
        let themes = extract_key_themes("Retention is down and Growth stalled after the new feature");
        assert_eq!(themes, vec!["Growth", "Retention", "Feature Development"]);
    }

    #[test]
    fn test_fallback_theme() {
        assert_eq!(extract_key_themes("Pricing page redesign"), vec!["General Product Strategy"]);
    }

    #[test]
    fn test_output_structure_is_case_insensitive() {
        let text = "## 🎯 problem reframing\n...\n## NEXT STEPS\n...";
        let sections = validate_output_structure(text);
        assert_eq!(sections.len(), REQUIRED_SECTIONS.len());
        let present: Vec<&str> = sections
            .iter()
            .filter(|s| s.present)
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(present, vec!["Problem Reframing", "Next Steps"]);
    }
}
