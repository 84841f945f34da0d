use playground_errors::AppError;

const MAX_URL_LENGTH: usize = 2048;
const MIN_CONTEXT_CHARS: usize = 20;
const MAX_CONTEXT_CHARS: usize = 10_000;

const BLOCKED_KEYWORDS: &[&str] = &[
    "ignore previous",
    "ignore all",
    "disregard",
    "forget your",
    "new instructions",
    "system prompt",
    "you are now",
    "pretend to be",
    "jailbreak",
    "dan mode",
    "developer mode",
];

const ALLOWED_SCHEMES: &[&str] = &["http", "https"];
const PRIVATE_HOST_PREFIXES: &[&str] = &["127.", "192.168.", "10."];
const PRIVATE_HOSTS: &[&str] = &["localhost", "0.0.0.0"];

pub struct InputSanitizer;

impl InputSanitizer {
    /// A bare domain gets `https://` prepended.
    pub fn normalize_url(raw: &str) -> Result<String, AppError> {
        let raw = raw.trim();

        if raw.is_empty() {
            return Err(AppError::InvalidUrl("Please enter a website URL.".to_string()));
        }

        if raw.len() > MAX_URL_LENGTH {
            return Err(AppError::InvalidUrl("The URL is too long.".to_string()));
        }

        if Self::contains_injection_attempt(raw) {
            tracing::warn!("Potential prompt injection detected in URL: {}", raw);
            return Err(AppError::InvalidUrl(
                "The URL contains invalid characters.".to_string(),
            ));
        }

        let candidate = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("https://{}", raw)
        };

        let parsed = url::Url::parse(&candidate)
            .map_err(|_| AppError::InvalidUrl("The URL format is not valid.".to_string()))?;

        let scheme = parsed.scheme().to_lowercase();
        if !ALLOWED_SCHEMES.contains(&scheme.as_str()) {
            return Err(AppError::InvalidUrl(
                "Only HTTP and HTTPS URLs are allowed.".to_string(),
            ));
        }

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| AppError::InvalidUrl("The URL must include a host.".to_string()))?
            .to_lowercase();

        if PRIVATE_HOSTS.contains(&host.as_str())
            || PRIVATE_HOST_PREFIXES.iter().any(|p| host.starts_with(p))
        {
            return Err(AppError::InvalidUrl(
                "Local network addresses are not allowed.".to_string(),
            ));
        }

        Ok(parsed.to_string())
    }

    pub fn validate_context(text: &str) -> Result<(), AppError> {
        let trimmed = text.trim();

        if trimmed.is_empty() {
            return Err(AppError::InvalidInput(
                "Please provide a product situation to analyze.".to_string(),
            ));
        }

        let chars = trimmed.chars().count();
        if chars < MIN_CONTEXT_CHARS {
            return Err(AppError::InvalidInput(format!(
                "Please provide more details about your product situation (at least {} characters).",
                MIN_CONTEXT_CHARS
            )));
        }

        if chars > MAX_CONTEXT_CHARS {
            return Err(AppError::InvalidInput(format!(
                "Please keep the description under {} characters.",
                MAX_CONTEXT_CHARS
            )));
        }

        Ok(())
    }

    pub fn sanitize_for_prompt(content: &str, max_chars: usize) -> String {
        let mut sanitized = content.replace("```", "");

        for keyword in BLOCKED_KEYWORDS {
            let Ok(re) = regex_lite::Regex::new(&format!("(?i){}", regex_lite::escape(keyword)))
            else {
                continue;
            };
            sanitized = re.replace_all(&sanitized, "[FILTERED]").into_owned();
        }

        sanitized
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .take(max_chars)
            .collect::<String>()
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }

    fn contains_injection_attempt(input: &str) -> bool {
        let lower = input.to_lowercase();
        // URLs carry spaces percent-encoded.
        let decoded = lower.replace("%20", " ").replace('+', " ");
        BLOCKED_KEYWORDS.iter().any(|kw| decoded.contains(kw))
    }
}
