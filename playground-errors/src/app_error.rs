use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AppError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Language model request failed: {0}")]
    LlmError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Text that is safe to show to an end user.
    pub fn user_message(&self) -> &str {
        match self {
            Self::InvalidUrl(msg) | Self::InvalidInput(msg) => msg,
            Self::ExtractionFailed(_) => "We could not read that website. Please check the URL.",
            Self::LlmError(_) => "The AI service is busy right now. Please try again later.",
            Self::RateLimited(msg) => msg,
            Self::Timeout => "The request took too long. Please try again.",
            Self::Config(_) => "The service is not configured correctly.",
            Self::Internal(_) => "Something went wrong on our side. Please try again later.",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "invalid_url",
            Self::InvalidInput(_) => "invalid_input",
            Self::ExtractionFailed(_) => "extraction_failed",
            Self::LlmError(_) => "llm_error",
            Self::RateLimited(_) => "rate_limited",
            Self::Timeout => "timeout",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}

#[cfg(feature = "server")]
mod server_impl {
    use super::AppError;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;

    impl AppError {
        pub fn status_code(&self) -> StatusCode {
            match self {
                AppError::InvalidUrl(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                AppError::ExtractionFailed(_) | AppError::LlmError(_) => StatusCode::BAD_GATEWAY,
                AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let body = serde_json::json!({
                "error": self.kind(),
                "message": self.user_message(),
            });
            (self.status_code(), Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_passes_through_input_errors() {
        let err = AppError::InvalidInput("Please provide more details".to_string());
        assert_eq!(err.user_message(), "Please provide more details");
    }

    #[test]
    fn test_user_message_hides_internal_detail() {
        let err = AppError::LlmError("401 unauthorized: sk-abc".to_string());
        assert!(!err.user_message().contains("sk-abc"));
    }

    #[test]
    fn test_display_includes_cause() {
        let err = AppError::ExtractionFailed("navigation timed out".to_string());
        assert_eq!(err.to_string(), "Extraction failed: navigation timed out");
    }
}
