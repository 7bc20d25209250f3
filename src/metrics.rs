use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder
///
/// Errors if a recorder is already installed.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "llm_attempts_total",
        "Network attempts against a model, by outcome"
    );
    describe_counter!(
        "llm_tokens_total",
        "Total number of tokens processed"
    );
    describe_counter!(
        "llm_cost_microdollars_total",
        "Committed spend in millionths of a USD"
    );
    describe_histogram!(
        "llm_attempt_duration_seconds",
        "Attempt duration in seconds"
    );
    describe_counter!(
        "llm_fallbacks_total",
        "Completions answered by a model other than the requested one"
    );
    describe_counter!(
        "llm_budget_rejections_total",
        "Attempts refused by the budget check"
    );
    describe_gauge!(
        "llm_orchestrator_info",
        "Orchestrator version information"
    );

    gauge!("llm_orchestrator_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record the outcome of one attempt (`success` or an error kind)
pub fn record_attempt(model: &str, outcome: &str, duration: Duration) {
    counter!(
        "llm_attempts_total",
        "model" => model.to_string(),
        "outcome" => outcome.to_string(),
    )
    .increment(1);

    histogram!(
        "llm_attempt_duration_seconds",
        "model" => model.to_string(),
    )
    .record(duration.as_secs_f64());
}

/// Record tokens
pub fn record_tokens(model: &str, token_type: &str, count: u64) {
    counter!(
        "llm_tokens_total",
        "model" => model.to_string(),
        "type" => token_type.to_string(),
    )
    .increment(count);
}

/// Record committed cost
pub fn record_cost(model: &str, cost_usd: f64) {
    counter!(
        "llm_cost_microdollars_total",
        "model" => model.to_string(),
    )
    .increment((cost_usd * 1_000_000.0).round() as u64);
}

pub fn record_fallback(requested: &str, used: &str) {
    counter!(
        "llm_fallbacks_total",
        "requested" => requested.to_string(),
        "used" => used.to_string(),
    )
    .increment(1);
}

pub fn record_budget_rejection(period: &str) {
    counter!(
        "llm_budget_rejections_total",
        "period" => period.to_string(),
    )
    .increment(1);
}
