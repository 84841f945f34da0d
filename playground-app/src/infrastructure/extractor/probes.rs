use super::page::{PageView, ProbeError};
use super::renderer::CancelFlag;
use super::vocabulary::{self, ANALYTICS, FRAMEWORKS, PRICING_PAGE_HINTS, PRICING_TIERS, SOCIAL_PLATFORMS};
use crate::config::ExtractionLimits;
use crate::domain::{
    ContactInfo, ExtractionResult, Headings, PageStructure, PricingSignals, SocialProof,
    TechnologyStack,
};
use regex_lite::Regex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::OnceLock;

const MAIN_CONTENT_SELECTORS: &[&str] = &["main", "article", "[role=\"main\"]", "#content", ".content"];
const MIN_MAIN_CONTENT_CHARS: usize = 100;
const NAVIGATION_SELECTOR: &str = "nav a, header a";
const CTA_SELECTOR: &str = "button, a.btn, a.button, [role=\"button\"]";
const FEATURE_SELECTOR: &str = ".feature, .features li, [class*=\"feature\"]";
const HERO_SELECTORS: &[&str] = &[".hero", "[class*=\"hero\"]", ".banner", "#hero"];
const TESTIMONIAL_SELECTOR: &str = ".testimonial, [class*=\"testimonial\"], .review";
const LOGO_SELECTOR: &str = ".customers, .clients, [class*=\"logo\"]";

const ASSET_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp"];

const PRICE_PATTERN: &str = r"[$€£]\s?\d+(?:[.,]\d{3})*(?:[.,]\d{1,2})?(?:\s?/\s?[A-Za-z]+)?";
const STAT_PATTERN: &str = r"(?i)\d+(?:[.,]\d{3})*[KM]?\+?\s*(?:users|customers|companies)";
const EMAIL_PATTERN: &str = r"[\w.-]+@[\w.-]+\.\w+";

static PRICE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static STAT_RE: OnceLock<Option<Regex>> = OnceLock::new();
static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Result<&'static Regex, ProbeError> {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .ok_or_else(|| ProbeError::Decode(format!("bad pattern `{}`", pattern)))
}

/// Runs probes one at a time, folding any failure into the field default.
pub(crate) struct ProbeRunner<'a> {
    cancel: &'a CancelFlag,
}

impl<'a> ProbeRunner<'a> {
    pub(crate) fn new(cancel: &'a CancelFlag) -> Self {
        Self { cancel }
    }

    pub(crate) fn run<T, F>(&self, name: &'static str, probe: F) -> T
    where
        T: Default,
        F: FnOnce() -> Result<T, ProbeError>,
    {
        if self.cancel.is_cancelled() {
            tracing::debug!(probe = name, "Extraction cancelled, skipping probe");
            return T::default();
        }

        let outcome = catch_unwind(AssertUnwindSafe(probe)).unwrap_or(Err(ProbeError::Panicked));
        match outcome {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(probe = name, error = %e, "Probe failed, using default");
                T::default()
            }
        }
    }
}

/// Runs every probe against `page` and assembles the record.
pub fn harvest(
    page: &dyn PageView,
    url: &str,
    limits: &ExtractionLimits,
    cancel: &CancelFlag,
) -> ExtractionResult {
    let runner = ProbeRunner::new(cancel);

    ExtractionResult {
        url: url.to_string(),
        title: runner.run("title", || probe_title(page)),
        meta_description: runner.run("meta_description", || probe_meta_description(page)),
        headings: runner.run("headings", || probe_headings(page)),
        main_content: runner.run("main_content", || probe_main_content(page, limits)),
        navigation: runner.run("navigation", || probe_navigation(page, limits)),
        calls_to_action: runner.run("calls_to_action", || probe_calls_to_action(page, limits)),
        pricing_signals: runner.run("pricing_signals", || probe_pricing(page, limits)),
        features_mentioned: runner.run("features_mentioned", || probe_features(page, limits)),
        technology_stack: runner.run("technology_stack", || probe_technology(page)),
        page_structure: runner.run("page_structure", || probe_structure(page)),
        social_proof: runner.run("social_proof", || probe_social_proof(page, limits)),
        contact_info: runner.run("contact_info", || probe_contact_info(page)),
    }
}

fn probe_title(page: &dyn PageView) -> Result<String, ProbeError> {
    Ok(page.title()?.trim().to_string())
}

fn probe_meta_description(page: &dyn PageView) -> Result<String, ProbeError> {
    Ok(page
        .attribute("meta[name=\"description\"]", "content")?
        .map(|s| s.trim().to_string())
        .unwrap_or_default())
}

fn probe_headings(page: &dyn PageView) -> Result<Headings, ProbeError> {
    let mut headings = Headings::default();
    for level in Headings::LEVELS {
        // A broken tier leaves the others intact.
        let texts = match page.inner_texts(level, usize::MAX) {
            Ok(texts) => non_empty(texts),
            Err(e) => {
                tracing::debug!(level, error = %e, "Heading query failed");
                continue;
            }
        };
        if let Some(slot) = headings.level_mut(level) {
            *slot = texts;
        }
    }
    Ok(headings)
}

fn probe_main_content(page: &dyn PageView, limits: &ExtractionLimits) -> Result<String, ProbeError> {
    for selector in MAIN_CONTENT_SELECTORS {
        match page.first_inner_text(selector) {
            Ok(Some(text)) if text.chars().count() > MIN_MAIN_CONTENT_CHARS => {
                return Ok(truncate_chars(&text, limits.main_content_chars));
            }
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(selector, error = %e, "Content selector failed");
                continue;
            }
        }
    }
    Ok(truncate_chars(&page.body_text()?, limits.main_content_chars))
}

fn probe_navigation(page: &dyn PageView, limits: &ExtractionLimits) -> Result<Vec<String>, ProbeError> {
    Ok(non_empty(page.inner_texts(NAVIGATION_SELECTOR, limits.navigation)?))
}

fn probe_calls_to_action(page: &dyn PageView, limits: &ExtractionLimits) -> Result<Vec<String>, ProbeError> {
    Ok(non_empty(page.inner_texts(CTA_SELECTOR, limits.calls_to_action)?))
}

fn probe_pricing(page: &dyn PageView, limits: &ExtractionLimits) -> Result<PricingSignals, ProbeError> {
    let markup = page.markup()?;
    let text = page.body_text()?;

    Ok(PricingSignals {
        has_pricing_page: vocabulary::contains_any(&markup, PRICING_PAGE_HINTS),
        pricing_tiers: vocabulary::match_keywords(&markup, PRICING_TIERS),
        pricing_signals: compiled(&PRICE_RE, PRICE_PATTERN)?
            .find_iter(&text)
            .map(|m| m.as_str().trim().to_string())
            .take(limits.price_matches)
            .collect(),
    })
}

fn probe_features(page: &dyn PageView, limits: &ExtractionLimits) -> Result<Vec<String>, ProbeError> {
    Ok(non_empty(page.inner_texts(FEATURE_SELECTOR, limits.features)?)
        .into_iter()
        .filter(|text| text.chars().count() < limits.snippet_chars)
        .collect())
}

fn probe_technology(page: &dyn PageView) -> Result<TechnologyStack, ProbeError> {
    let markup = page.markup()?;
    Ok(TechnologyStack {
        frameworks: vocabulary::match_keywords(&markup, FRAMEWORKS),
        analytics: vocabulary::match_keywords(&markup, ANALYTICS),
    })
}

fn probe_structure(page: &dyn PageView) -> Result<PageStructure, ProbeError> {
    let mut has_hero = false;
    for selector in HERO_SELECTORS {
        if page.count(selector)? > 0 {
            has_hero = true;
            break;
        }
    }

    Ok(PageStructure {
        has_hero,
        has_footer: page.count("footer")? > 0,
        has_navigation: page.count("nav")? > 0,
        sections_count: u32::try_from(page.count("section")?).unwrap_or(u32::MAX),
    })
}

fn probe_social_proof(page: &dyn PageView, limits: &ExtractionLimits) -> Result<SocialProof, ProbeError> {
    let testimonials = non_empty(page.inner_texts(TESTIMONIAL_SELECTOR, limits.testimonials)?)
        .into_iter()
        .map(|text| truncate_chars(&text, limits.snippet_chars))
        .collect();

    let customer_logos = page.count(LOGO_SELECTOR)? > 0;

    let text = page.body_text()?;
    let stats = compiled(&STAT_RE, STAT_PATTERN)?
        .find_iter(&text)
        .map(|m| m.as_str().trim().to_string())
        .take(limits.stats)
        .collect();

    Ok(SocialProof {
        testimonials,
        customer_logos,
        stats,
    })
}

fn probe_contact_info(page: &dyn PageView) -> Result<ContactInfo, ProbeError> {
    let markup = page.markup()?;

    let email = compiled(&EMAIL_RE, EMAIL_PATTERN)?
        .find_iter(&markup)
        .map(|m| m.as_str())
        .find(|candidate| {
            let lower = candidate.to_lowercase();
            !ASSET_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
        })
        .map(str::to_string);

    Ok(ContactInfo {
        email,
        social_links: vocabulary::match_keywords(&markup, SOCIAL_PLATFORMS),
    })
}

fn non_empty(texts: Vec<String>) -> Vec<String> {
    texts
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::extractor::StaticPage;

    fn extract(html: &str) -> ExtractionResult {
        let page = StaticPage::parse(html);
        harvest(&page, "https://example.com", &ExtractionLimits::default(), &CancelFlag::new())
    }

    /// Fails every query for one selector and delegates the rest.
    struct BrokenSelector<'a> {
        inner: StaticPage,
        broken: &'a str,
    }

    impl PageView for BrokenSelector<'_> {
        fn title(&self) -> Result<String, ProbeError> {
            self.inner.title()
        }
        fn markup(&self) -> Result<String, ProbeError> {
            self.inner.markup()
        }
        fn body_text(&self) -> Result<String, ProbeError> {
            self.inner.body_text()
        }
        fn inner_texts(&self, selector: &str, limit: usize) -> Result<Vec<String>, ProbeError> {
            if selector == self.broken {
                return Err(ProbeError::Query("timed out".to_string()));
            }
            self.inner.inner_texts(selector, limit)
        }
        fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, ProbeError> {
            self.inner.attribute(selector, name)
        }
        fn count(&self, selector: &str) -> Result<usize, ProbeError> {
            if selector == self.broken {
                panic!("driver crashed");
            }
            self.inner.count(selector)
        }
    }

    #[test]
    fn test_scenario_static_page() {
        let result = extract(
            r#"<html><head><meta name="description" content="A test"></head>
            <body><h1>Hello</h1><nav><a>Home</a></nav></body></html>"#,
        );

        assert_eq!(result.headings.h1, vec!["Hello"]);
        assert!(result.headings.h2.is_empty());
        assert_eq!(result.meta_description, "A test");
        assert_eq!(result.navigation, vec!["Home"]);
        assert!(result.title.is_empty());
        assert!(result.calls_to_action.is_empty());
        assert_eq!(result.pricing_signals, PricingSignals::default());
        assert!(result.features_mentioned.is_empty());
        assert_eq!(result.technology_stack, TechnologyStack::default());
        assert_eq!(result.social_proof, SocialProof::default());
        assert_eq!(result.contact_info, ContactInfo::default());
        assert!(result.page_structure.has_navigation);
        assert!(!result.page_structure.has_footer);
    }

    #[test]
    fn test_scenario_pricing() {
        let result = extract(
            r#"<html><body><p>Plans for every team. Talk to us about Enterprise.</p>
            <span>$49/month</span></body></html>"#,
        );

        assert!(result.pricing_signals.has_pricing_page);
        assert!(result.pricing_signals.pricing_tiers.contains(&"enterprise".to_string()));
        assert!(result
            .pricing_signals
            .pricing_signals
            .iter()
            .any(|s| s.contains("$49")));
    }

    #[test]
    fn test_grouped_numbers_stay_whole() {
        let result = extract(
            r#"<html><body><div>$1,000/month</div><div>€2.500</div><div>$19.99</div>
            <p>Over 1,000,000 users</p></body></html>"#,
        );

        assert_eq!(
            result.pricing_signals.pricing_signals,
            vec!["$1,000/month", "€2.500", "$19.99"]
        );
        assert_eq!(result.social_proof.stats, vec!["1,000,000 users"]);
    }

    #[test]
    fn test_caps_are_applied() {
        let links: String = (0..60).map(|i| format!("<a href='/{i}'>Link {i}</a>")).collect();
        let buttons: String = (0..60).map(|i| format!("<button>Go {i}</button>")).collect();
        let quotes: String = (0..25)
            .map(|i| format!("<div class='testimonial'>Loved it {i}</div>"))
            .collect();
        let html = format!("<html><body><nav>{links}</nav>{buttons}{quotes}</body></html>");

        let result = extract(&html);
        assert_eq!(result.navigation.len(), 20);
        assert_eq!(result.navigation[0], "Link 0");
        assert_eq!(result.calls_to_action.len(), 15);
        assert_eq!(result.social_proof.testimonials.len(), 5);
    }

    #[test]
    fn test_failing_probe_does_not_affect_others() {
        let html = r#"<html><head><title>Acme</title></head><body>
            <nav><a>Home</a></nav><h1>Welcome</h1><footer>Made with care</footer>
            <div class="customers">Logos</div></body></html>"#;
        let page = BrokenSelector {
            inner: StaticPage::parse(html),
            broken: NAVIGATION_SELECTOR,
        };
        let result = harvest(&page, "https://acme.test", &ExtractionLimits::default(), &CancelFlag::new());

        assert!(result.navigation.is_empty());
        assert_eq!(result.title, "Acme");
        assert_eq!(result.headings.h1, vec!["Welcome"]);
        assert!(result.page_structure.has_footer);
        assert!(result.social_proof.customer_logos);
    }

    #[test]
    fn test_panicking_probe_is_contained() {
        let html = r#"<html><body><h1>Still here</h1><nav><a>Docs</a></nav></body></html>"#;
        let page = BrokenSelector {
            inner: StaticPage::parse(html),
            broken: "footer",
        };
        let result = harvest(&page, "https://acme.test", &ExtractionLimits::default(), &CancelFlag::new());

        assert_eq!(result.page_structure, PageStructure::default());
        assert_eq!(result.headings.h1, vec!["Still here"]);
        assert_eq!(result.navigation, vec!["Docs"]);
    }

    #[test]
    fn test_cancelled_run_returns_defaults() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let page = StaticPage::parse("<html><head><title>Acme</title></head></html>");
        let result = harvest(&page, "https://acme.test", &ExtractionLimits::default(), &cancel);

        assert_eq!(result.url, "https://acme.test");
        assert!(result.title.is_empty());
    }

    #[test]
    fn test_main_content_prefers_long_main_element() {
        let filler = "word ".repeat(40);
        let html = format!(
            "<html><body><header>Top bar</header><main><p>{filler}</p></main></body></html>"
        );
        let result = extract(&html);
        assert!(result.main_content.starts_with("word word"));
        assert!(!result.main_content.contains("Top bar"));
    }

    #[test]
    fn test_main_content_is_truncated() {
        let filler = "x".repeat(8000);
        let result = extract(&format!("<html><body><p>{filler}</p></body></html>"));
        assert_eq!(result.main_content.chars().count(), 5000);
    }

    #[test]
    fn test_technology_contact_and_stats() {
        let html = r#"<html><head><script src="/_next/static/app.js"></script>
            <script>gtag('config', 'G-1');</script></head>
            <body><div id="__next"><p>Trusted by 10K+ users and 500 companies</p>
            <img src="logo@2x.png"><a href="mailto:hello@acme.io">Mail</a>
            <a href="https://github.com/acme">GitHub</a>
            <a href="https://www.linkedin.com/company/acme">LinkedIn</a></div></body></html>"#;
        let result = extract(html);

        assert_eq!(result.technology_stack.frameworks, vec!["Next.js"]);
        assert_eq!(result.technology_stack.analytics, vec!["Google Analytics"]);
        assert_eq!(result.contact_info.email.as_deref(), Some("hello@acme.io"));
        assert_eq!(result.contact_info.social_links, vec!["linkedin", "github"]);
        assert_eq!(result.social_proof.stats, vec!["10K+ users", "500 companies"]);
    }

    #[test]
    fn test_features_skip_long_snippets() {
        let long = "y".repeat(250);
        let html = format!(
            "<html><body><ul class='features'><li>Fast sync</li><li>{long}</li></ul></body></html>"
        );
        let result = extract(&html);
        assert!(result.features_mentioned.contains(&"Fast sync".to_string()));
        assert!(result.features_mentioned.iter().all(|f| f.len() < 200));
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
