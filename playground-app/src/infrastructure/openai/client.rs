use super::types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::config::OpenAiConfig;
use playground_errors::AppError;

#[derive(Clone)]
pub struct OpenAiClient {
    http_client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, AppError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub async fn complete(&self, system: &str, prompt: String) -> Result<String, AppError> {
        let request = ChatCompletionRequest::new(&self.config, system, prompt);
        let endpoint = format!("{}/chat/completions", self.config.base_url);

        let response = self
            .http_client
            .post(&endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("OpenAI error: {} - {}", status, body);
            return Err(AppError::LlmError(format!("API error: {}", status)));
        }

        let completion: ChatCompletionResponse =
            response.json().await.map_err(transport_error)?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AppError::LlmError("No response from AI".to_string()))
    }
}

fn transport_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::Timeout
    } else {
        AppError::LlmError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: String, timeout: Duration) -> OpenAiConfig {
        OpenAiConfig {
            api_key: "sk-test".to_string(),
            base_url,
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            max_tokens: 4000,
            timeout,
        }
    }

    #[tokio::test]
    async fn test_complete_sends_expected_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o",
                "max_tokens": 4000,
                "messages": [
                    {"role": "system", "content": "persona"},
                    {"role": "user", "content": "question"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "## Answer"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiClient::new(config(server.uri(), Duration::from_secs(5))).unwrap();
        let text = client.complete("persona", "question".to_string()).await.unwrap();
        assert_eq!(text, "## Answer");
    }

    #[tokio::test]
    async fn test_error_status_is_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(config(server.uri(), Duration::from_secs(5))).unwrap();
        let err = client.complete("s", "p".to_string()).await.unwrap_err();
        assert_eq!(err, AppError::LlmError("API error: 401 Unauthorized".to_string()));
    }

    #[tokio::test]
    async fn test_empty_choices_is_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(config(server.uri(), Duration::from_secs(5))).unwrap();
        let err = client.complete("s", "p".to_string()).await.unwrap_err();
        assert_eq!(err, AppError::LlmError("No response from AI".to_string()));
    }

    #[tokio::test]
    async fn test_slow_upstream_is_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client = OpenAiClient::new(config(server.uri(), Duration::from_millis(50))).unwrap();
        let err = client.complete("s", "p".to_string()).await.unwrap_err();
        assert_eq!(err, AppError::Timeout);
    }
}
