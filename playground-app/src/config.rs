use playground_errors::AppError;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai: OpenAiConfig,
    pub extractor: ExtractorConfig,
    pub enable_web_scraping: bool,
    pub bind_addr: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorBackend {
    Chrome,
    Http,
}

impl FromStr for ExtractorBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chrome" | "headless" => Ok(Self::Chrome),
            "http" | "static" => Ok(Self::Http),
            other => Err(AppError::Config(format!(
                "EXTRACTOR_BACKEND must be `chrome` or `http`, got `{}`",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub backend: ExtractorBackend,
    /// Budget for navigation plus network-idle. Exceeding it is fatal.
    pub load_timeout: Duration,
    /// How long the page must stay quiet to count as idle.
    pub quiet_window: Duration,
    /// Pending requests still tolerated while idle.
    pub max_inflight: u32,
    pub poll_interval: Duration,
    pub user_agent: String,
    pub viewport: (u32, u32),
    pub headless: bool,
    pub limits: ExtractionLimits,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            backend: ExtractorBackend::Chrome,
            load_timeout: Duration::from_secs(30),
            quiet_window: Duration::from_millis(500),
            max_inflight: 0,
            poll_interval: Duration::from_millis(100),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            viewport: (1920, 1080),
            headless: true,
            limits: ExtractionLimits::default(),
        }
    }
}

/// Caps that keep the extracted payload small enough for a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionLimits {
    pub navigation: usize,
    pub calls_to_action: usize,
    pub price_matches: usize,
    pub features: usize,
    pub testimonials: usize,
    pub stats: usize,
    pub main_content_chars: usize,
    /// Features must be shorter than this; testimonials are cut to it.
    pub snippet_chars: usize,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            navigation: 20,
            calls_to_action: 15,
            price_matches: 10,
            features: 20,
            testimonials: 5,
            stats: 5,
            main_content_chars: 5000,
            snippet_chars: 200,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAI_API_KEY")
            .ok_or_else(|| AppError::Config("OPENAI_API_KEY must be set".to_string()))?;

        let openai = OpenAiConfig {
            api_key,
            base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parse_or("TEMPERATURE", get("TEMPERATURE"), 0.7)?,
            max_tokens: parse_or("MAX_TOKENS", get("MAX_TOKENS"), 4000)?,
            timeout: Duration::from_secs(parse_or("OPENAI_TIMEOUT", get("OPENAI_TIMEOUT"), 120)?),
        };

        let defaults = ExtractorConfig::default();
        let extractor = ExtractorConfig {
            backend: match get("EXTRACTOR_BACKEND") {
                Some(raw) => raw.parse()?,
                None => defaults.backend,
            },
            load_timeout: Duration::from_secs(parse_or(
                "EXTRACTOR_TIMEOUT",
                get("EXTRACTOR_TIMEOUT"),
                defaults.load_timeout.as_secs(),
            )?),
            user_agent: get("EXTRACTOR_USER_AGENT").unwrap_or(defaults.user_agent.clone()),
            headless: get("VISIBLE_BROWSER").is_none(),
            ..defaults
        };

        Ok(Self {
            openai,
            extractor,
            enable_web_scraping: parse_flag(get("ENABLE_WEB_SCRAPING"), true),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, AppError> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}

fn parse_flag(raw: Option<String>, default: bool) -> bool {
    raw.map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_only_api_key() {
        let config = AppConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.openai.max_tokens, 4000);
        assert_eq!(config.openai.timeout, Duration::from_secs(120));
        assert_eq!(config.extractor.load_timeout, Duration::from_secs(30));
        assert_eq!(config.extractor.backend, ExtractorBackend::Chrome);
        assert!(config.extractor.headless);
        assert!(config.enable_web_scraping);
        assert_eq!(config.extractor.limits.navigation, 20);
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let err = AppConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("MAX_TOKENS", "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("MAX_TOKENS")));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:9000/v1/"),
            ("EXTRACTOR_BACKEND", "http"),
            ("EXTRACTOR_TIMEOUT", "5"),
            ("ENABLE_WEB_SCRAPING", "false"),
            ("VISIBLE_BROWSER", "1"),
        ]))
        .unwrap();
        assert_eq!(config.openai.base_url, "http://localhost:9000/v1");
        assert_eq!(config.extractor.backend, ExtractorBackend::Http);
        assert_eq!(config.extractor.load_timeout, Duration::from_secs(5));
        assert!(!config.enable_web_scraping);
        assert!(!config.extractor.headless);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!("firefox".parse::<ExtractorBackend>().is_err());
    }
}
