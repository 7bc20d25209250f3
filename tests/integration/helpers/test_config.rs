use llm_orchestrator::{catalog::ModelConfig, config::Config};

pub const PRIMARY: &str = "test/primary";
pub const FALLBACK_1: &str = "test/fallback-1";
pub const FALLBACK_2: &str = "test/fallback-2";

pub fn test_model(id: &str, input_price: f64, output_price: f64, fallbacks: &[&str]) -> ModelConfig {
    ModelConfig {
        id: id.to_string(),
        max_tokens: 100,
        temperature: 0.7,
        top_p: 0.9,
        input_price,
        output_price,
        fallback_ids: fallbacks.iter().map(|f| f.to_string()).collect(),
    }
}

/// Three-model catalog pointed at a mock server, with millisecond backoff
///
/// PRIMARY falls back to FALLBACK_1 then FALLBACK_2.
pub fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::with_api_key("sk-or-test-key");
    config.openrouter.base_url = base_url.to_string();

    config.limits.requests_per_minute = 1000;
    config.limits.max_response_time_seconds = 5.0;
    config.limits.max_retry_attempts = 3;
    config.limits.backoff_base_ms = 1;
    config.limits.max_backoff_ms = 5;

    config.budget.daily_budget_usd = 100.0;
    config.budget.monthly_budget_usd = 1000.0;

    config.models = vec![
        test_model(PRIMARY, 0.000003, 0.000015, &[FALLBACK_1, FALLBACK_2]),
        test_model(FALLBACK_1, 0.000001, 0.000002, &[]),
        test_model(FALLBACK_2, 0.0000005, 0.000001, &[]),
    ];

    config.selection.rules.clear();
    config.selection.default_model = PRIMARY.to_string();
    config.selection.free_tier_model = FALLBACK_2.to_string();

    config
}
