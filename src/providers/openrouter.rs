use crate::{
    config::OpenRouterConfig,
    error::AttemptError,
    models::openrouter::{ChatCompletionRequest, ChatCompletionResponse, ErrorResponse},
};
use reqwest::Client;
use std::time::Duration;

/// Call the OpenRouter Chat Completions API
///
/// The whole exchange, body included, is bounded by `timeout`.
pub async fn chat_completions(
    client: &Client,
    config: &OpenRouterConfig,
    request: &ChatCompletionRequest<'_>,
    timeout: Duration,
) -> Result<ChatCompletionResponse, AttemptError> {
    match tokio::time::timeout(timeout, send(client, config, request)).await {
        Ok(result) => result,
        Err(_) => Err(AttemptError::Timeout),
    }
}

async fn send(
    client: &Client,
    config: &OpenRouterConfig,
    request: &ChatCompletionRequest<'_>,
) -> Result<ChatCompletionResponse, AttemptError> {
    let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

    let response = client
        .post(&url)
        .header("Authorization", format!("Bearer {}", config.api_key))
        .header("Content-Type", "application/json")
        .header("HTTP-Referer", &config.referer)
        .header("X-Title", &config.app_name)
        .json(request)
        .send()
        .await?;

    // Check for HTTP errors
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|e| e.error.message)
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(AttemptError::Http { status, message });
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::openrouter::Message;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config(base_url: &str) -> OpenRouterConfig {
        OpenRouterConfig {
            api_key: "sk-or-test-key".to_string(),
            base_url: base_url.to_string(),
            referer: "https://example.test".to_string(),
            app_name: "Test App".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sends_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-or-test-key"))
            .and(header("HTTP-Referer", "https://example.test"))
            .and(header("X-Title", "Test App"))
            .and(body_partial_json(serde_json::json!({
                "model": "openai/gpt-4o-mini",
                "stream": false,
                "max_tokens": 64
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "ok"}}],
                "usage": {"prompt_tokens": 5, "completion_tokens": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let messages = vec![Message::user("ping")];
        let request = ChatCompletionRequest {
            model: "openai/gpt-4o-mini",
            messages: &messages,
            max_tokens: 64,
            temperature: 0.7,
            top_p: 0.9,
            stream: false,
        };

        let response = chat_completions(
            &Client::new(),
            &create_test_config(&server.uri()),
            &request,
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert_eq!(response.choices[0].message.content.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_error_message_extracted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"message": "Rate limit exceeded upstream"}
            })))
            .mount(&server)
            .await;

        let messages = vec![Message::user("ping")];
        let request = ChatCompletionRequest {
            model: "m",
            messages: &messages,
            max_tokens: 1,
            temperature: 0.0,
            top_p: 1.0,
            stream: false,
        };

        let err = chat_completions(
            &Client::new(),
            &create_test_config(&server.uri()),
            &request,
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "API Error: Rate limit exceeded upstream");
        assert_eq!(err.kind(), "http_error");
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let messages = vec![Message::user("ping")];
        let request = ChatCompletionRequest {
            model: "m",
            messages: &messages,
            max_tokens: 1,
            temperature: 0.0,
            top_p: 1.0,
            stream: false,
        };

        let err = chat_completions(
            &Client::new(),
            &create_test_config(&server.uri()),
            &request,
            Duration::from_millis(100),
        )
        .await
        .unwrap_err();

        assert_eq!(err, AttemptError::Timeout);
    }
}
