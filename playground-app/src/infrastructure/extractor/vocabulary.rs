//! Keyword tables for the substring-matching probes.
//!
//! Each entry is `(needle, label)`. Several needles may share a label;
//! a label is reported once, in table order.

pub const FRAMEWORKS: &[(&str, &str)] = &[
    ("react", "React"),
    ("vue", "Vue.js"),
    ("angular", "Angular"),
    ("ng-version", "Angular"),
    ("__next", "Next.js"),
    ("_next/", "Next.js"),
];

pub const ANALYTICS: &[(&str, &str)] = &[
    ("google-analytics", "Google Analytics"),
    ("googletagmanager", "Google Analytics"),
    ("gtag", "Google Analytics"),
    ("mixpanel", "Mixpanel"),
    ("segment.com", "Segment"),
    ("segment.io", "Segment"),
];

pub const PRICING_TIERS: &[(&str, &str)] = &[
    ("free", "free"),
    ("pro", "pro"),
    ("premium", "premium"),
    ("enterprise", "enterprise"),
    ("basic", "basic"),
    ("starter", "starter"),
    ("business", "business"),
];

pub const PRICING_PAGE_HINTS: &[&str] = &["pricing", "plans"];

pub const SOCIAL_PLATFORMS: &[(&str, &str)] = &[
    ("twitter.com", "twitter"),
    ("linkedin.com", "linkedin"),
    ("facebook.com", "facebook"),
    ("instagram.com", "instagram"),
    ("github.com", "github"),
];

/// Labels whose needle occurs in `haystack`, case-insensitively.
pub fn match_keywords(haystack: &str, table: &[(&str, &str)]) -> Vec<String> {
    let haystack = haystack.to_lowercase();
    let mut labels: Vec<String> = Vec::new();
    for (needle, label) in table {
        if haystack.contains(&needle.to_lowercase()) && !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }
    labels
}

pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let haystack = haystack.to_lowercase();
    needles.iter().any(|n| haystack.contains(&n.to_lowercase()))
}
