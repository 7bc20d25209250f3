use std::time::Duration;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Successful chat completion body
pub fn success_body(content: &str, prompt_tokens: u64, completion_tokens: u64) -> serde_json::Value {
    serde_json::json!({
        "id": "gen-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": prompt_tokens + completion_tokens
        }
    })
}

fn for_model(model: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({ "model": model })))
}

/// `model` answers 200 with the given usage, exactly `expected` times
pub async fn mount_success(
    server: &MockServer,
    model: &str,
    content: &str,
    prompt_tokens: u64,
    completion_tokens: u64,
    expected: u64,
) {
    for_model(model)
        .respond_with(
            ResponseTemplate::new(200).set_body_json(success_body(content, prompt_tokens, completion_tokens)),
        )
        .expect(expected)
        .mount(server)
        .await;
}

/// `model` answers with an OpenRouter-style error body
pub async fn mount_error(server: &MockServer, model: &str, status: u16, message: &str, expected: u64) {
    for_model(model)
        .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
            "error": {"message": message, "code": status}
        })))
        .expect(expected)
        .mount(server)
        .await;
}

/// `model` answers 200 only after `delay`
pub async fn mount_slow(server: &MockServer, model: &str, delay: Duration, expected: u64) {
    for_model(model)
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(delay)
                .set_body_json(success_body("too late", 1, 1)),
        )
        .expect(expected)
        .mount(server)
        .await;
}

/// `model` answers 200 with a body that is not a chat completion
pub async fn mount_malformed(server: &MockServer, model: &str, expected: u64) {
    for_model(model)
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .expect(expected)
        .mount(server)
        .await;
}
