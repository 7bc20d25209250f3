// Budget enforcement through the full completion path

#[path = "integration/helpers/mod.rs"]
mod helpers;
#[path = "integration/mocks/mod.rs"]
mod mocks;

use helpers::{create_test_config, test_model, FALLBACK_1, FALLBACK_2, PRIMARY};
use llm_orchestrator::{config::Config, CompletionOptions, Message, Orchestrator};
use wiremock::MockServer;

/// One cent per token everywhere, $1.00 per day
fn expensive_config(base_url: &str) -> Config {
    let mut config = create_test_config(base_url);
    config.budget.daily_budget_usd = 1.0;
    config.models = vec![
        test_model(PRIMARY, 0.01, 0.01, &[FALLBACK_1, FALLBACK_2]),
        test_model(FALLBACK_1, 0.01, 0.01, &[]),
        test_model(FALLBACK_2, 0.01, 0.01, &[]),
    ];
    config
}

fn small_request() -> CompletionOptions {
    // "hi" estimates to 1 input token: 1 + 9 tokens = $0.10
    CompletionOptions {
        max_tokens: Some(9),
        temperature: None,
    }
}

#[tokio::test]
async fn test_rejects_when_estimate_would_cross_daily_budget() {
    let server = MockServer::start().await;
    // 50 + 45 tokens at $0.01 = $0.95
    mocks::mount_success(&server, PRIMARY, "first", 50, 45, 1).await;
    mocks::mount_success(&server, FALLBACK_1, "unused", 1, 1, 0).await;
    mocks::mount_success(&server, FALLBACK_2, "unused", 1, 1, 0).await;

    let orchestrator = Orchestrator::new(&expensive_config(&server.uri())).unwrap();
    let messages = vec![Message::user("hi")];

    let first = orchestrator
        .complete(PRIMARY, &messages, small_request(), true)
        .await;
    assert!(first.success);
    assert!((first.cost - 0.95).abs() < 1e-9);

    let second = orchestrator
        .complete(PRIMARY, &messages, small_request(), true)
        .await;
    assert!(!second.success);
    assert_eq!(second.error.as_deref(), Some("Budget limit exceeded"));
    assert_eq!(second.attempts, 3);
    assert_eq!(second.cost, 0.0);
    assert_eq!(second.input_tokens, 1);

    let usage = orchestrator.usage_stats().await;
    assert!((usage.daily_usage - 0.95).abs() < 1e-9);
    assert!((usage.daily_remaining - 0.05).abs() < 1e-9);
}

#[tokio::test]
async fn test_usage_crossing_threshold_raises_alert() {
    let server = MockServer::start().await;
    mocks::mount_success(&server, PRIMARY, "first", 50, 45, 1).await;

    let orchestrator = Orchestrator::new(&expensive_config(&server.uri())).unwrap();
    assert!(orchestrator.cost_alerts().await.is_empty());

    orchestrator
        .complete(PRIMARY, &[Message::user("hi")], small_request(), false)
        .await;

    let alerts = orchestrator.cost_alerts().await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].message, "Daily budget at 95.0%");
}

#[tokio::test]
async fn test_actual_usage_may_exceed_estimate() {
    let server = MockServer::start().await;
    // Provider reports far more tokens than max_tokens allowed for
    mocks::mount_success(&server, PRIMARY, "verbose", 80, 40, 1).await;

    let orchestrator = Orchestrator::new(&expensive_config(&server.uri())).unwrap();
    let result = orchestrator
        .complete(PRIMARY, &[Message::user("hi")], small_request(), false)
        .await;

    assert!(result.success);
    let usage = orchestrator.usage_stats().await;
    assert!((usage.daily_usage - 1.2).abs() < 1e-9);
    assert_eq!(usage.daily_remaining, 0.0);
}
