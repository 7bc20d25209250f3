use crate::budget::{BudgetTracker, Clock, SystemClock};
use crate::catalog::ModelCatalog;
use crate::config::{Config, LimitsConfig};
use crate::error::OrchestratorError;
use crate::executor::{AttemptFailure, AttemptOutcome, CompletionOptions, RequestAttempt, RequestExecutor};
use crate::models::openrouter::Message;
use crate::rate_limiter::RateLimiter;
use crate::usage::{CostAlert, UsageReporter, UsageStats};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

const ALL_MODELS_FAILED: &str = "All models failed";

/// Outcome of one `complete` call, however many attempts it took
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionResult {
    /// Empty on failure
    pub content: String,
    pub model_used: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: f64,
    /// Seconds spent in the attempt that produced this result
    pub response_time: f64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    /// Attempts made, including the one reported here
    pub attempts: u32,
    pub fallback_used: bool,
}

impl CompletionResult {
    fn from_success(attempt: RequestAttempt, requested: &str) -> Self {
        Self {
            fallback_used: attempt.model != requested,
            content: attempt.content,
            model_used: attempt.model,
            input_tokens: attempt.input_tokens,
            output_tokens: attempt.output_tokens,
            cost: attempt.cost,
            response_time: attempt.response_time.as_secs_f64(),
            success: true,
            error: None,
            finish_reason: attempt.finish_reason,
            attempts: attempt.attempt,
        }
    }

    fn from_failure(failure: AttemptFailure, requested: &str) -> Self {
        use crate::error::AttemptError;

        // Timeouts and unexpected failures report no token count
        let input_tokens = match failure.error {
            AttemptError::BudgetExceeded | AttemptError::Http { .. } => failure.estimated_input_tokens,
            _ => 0,
        };

        Self {
            content: String::new(),
            fallback_used: failure.model != requested,
            model_used: failure.model,
            input_tokens,
            output_tokens: 0,
            cost: 0.0,
            response_time: failure.response_time.as_secs_f64(),
            success: false,
            error: Some(failure.error.to_string()),
            finish_reason: None,
            attempts: failure.attempt,
        }
    }

    fn all_failed(requested: &str) -> Self {
        Self {
            content: String::new(),
            model_used: requested.to_string(),
            input_tokens: 0,
            output_tokens: 0,
            cost: 0.0,
            response_time: 0.0,
            success: false,
            error: Some(ALL_MODELS_FAILED.to_string()),
            finish_reason: None,
            attempts: 0,
            fallback_used: false,
        }
    }
}

/// Capped exponential backoff between fallback attempts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub base: Duration,
    pub max: Duration,
}

impl Backoff {
    pub fn from_limits(limits: &LimitsConfig) -> Self {
        Self {
            base: Duration::from_millis(limits.backoff_base_ms),
            max: Duration::from_millis(limits.max_backoff_ms),
        }
    }

    /// Delay after failed attempt `attempt` (1-based): `min(base * 2^attempt, max)`
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::from_limits(&LimitsConfig::default())
    }
}

/// Shared completion client: budget, rate limit and fallback in one place
///
/// Construct once and share behind an `Arc`; every clone of that `Arc` sees
/// the same rate-limit window and spend ledger.
pub struct Orchestrator {
    executor: RequestExecutor,
    catalog: Arc<ModelCatalog>,
    budget: Arc<BudgetTracker>,
    max_retry_attempts: u32,
    backoff: Backoff,
}

impl Orchestrator {
    pub fn new(config: &Config) -> Result<Self, OrchestratorError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, OrchestratorError> {
        crate::config::validate_config(config).map_err(|e| OrchestratorError::Config(e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(config.limits.request_timeout())
            .build()?;

        let catalog = Arc::new(ModelCatalog::new(config.models.clone()));
        let budget = Arc::new(BudgetTracker::with_clock(config.budget.clone(), clock));
        let rate_limiter = Arc::new(RateLimiter::new(config.limits.requests_per_minute));

        tracing::debug!(
            api_key = %crate::logging::SensitiveApiKey::new(&config.openrouter.api_key),
            base_url = %config.openrouter.base_url,
            models = catalog.len(),
            "Orchestrator initialized"
        );

        let executor = RequestExecutor::new(
            http,
            config.openrouter.clone(),
            catalog.clone(),
            budget.clone(),
            rate_limiter,
            config.limits.request_timeout(),
        );

        Ok(Self {
            executor,
            catalog,
            budget,
            max_retry_attempts: config.limits.max_retry_attempts,
            backoff: Backoff::from_limits(&config.limits),
        })
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Requested model first, then its fallback chain when enabled
    ///
    /// Duplicates are dropped so each attempt uses a distinct model.
    pub fn candidates(&self, model: &str, use_fallback: bool) -> Vec<String> {
        let mut candidates = vec![model.to_string()];
        if use_fallback {
            for fallback in self.catalog.fallbacks(model) {
                if !candidates.contains(fallback) {
                    candidates.push(fallback.clone());
                }
            }
        }
        candidates
    }

    /// Complete `messages`, walking the fallback chain on failure
    ///
    /// Never errors: the caller always gets one `CompletionResult`, failed
    /// ones carrying the last underlying error.
    pub async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        options: CompletionOptions,
        use_fallback: bool,
    ) -> CompletionResult {
        let span = tracing::info_span!(
            "complete",
            request_id = %uuid::Uuid::new_v4(),
            model = %model,
        );

        self.run_candidates(model, messages, options, use_fallback)
            .instrument(span)
            .await
    }

    async fn run_candidates(
        &self,
        model: &str,
        messages: &[Message],
        options: CompletionOptions,
        use_fallback: bool,
    ) -> CompletionResult {
        let candidates = self.candidates(model, use_fallback);
        let mut last_failure: Option<AttemptFailure> = None;

        for (index, current) in candidates.iter().enumerate() {
            let attempt = index as u32 + 1;
            if attempt > self.max_retry_attempts {
                break;
            }

            let outcome: AttemptOutcome = self.executor.execute(current, messages, &options, attempt).await;

            match outcome {
                Ok(success) => {
                    record_success_metrics(&success);
                    if success.model != model {
                        crate::metrics::record_fallback(model, &success.model);
                    }
                    return CompletionResult::from_success(success, model);
                }
                Err(failure) => {
                    crate::metrics::record_attempt(current, failure.error.kind(), failure.response_time);
                    tracing::warn!(
                        failed_model = %current,
                        error = %failure.error,
                        error_kind = failure.error.kind(),
                        attempt,
                        "Model failed, trying fallback"
                    );
                    last_failure = Some(failure);
                }
            }

            let more_candidates = index + 1 < candidates.len();
            let more_attempts = attempt < self.max_retry_attempts;
            if more_candidates && more_attempts {
                let delay = self.backoff.delay(attempt);
                tracing::debug!(delay_ms = delay.as_millis() as u64, "Backing off before next candidate");
                tokio::time::sleep(delay).await;
            }
        }

        tracing::error!(
            primary_model = %model,
            total_candidates = candidates.len(),
            "All models failed"
        );

        match last_failure {
            Some(failure) => CompletionResult::from_failure(failure, model),
            None => CompletionResult::all_failed(model),
        }
    }

    /// Current spend against the configured ceilings
    pub async fn usage_stats(&self) -> UsageStats {
        UsageReporter::new(self.budget.clone()).usage_stats().await
    }

    pub async fn cost_alerts(&self) -> Vec<CostAlert> {
        UsageReporter::new(self.budget.clone()).cost_alerts().await
    }

    pub fn usage_reporter(&self) -> UsageReporter {
        UsageReporter::new(self.budget.clone())
    }
}

fn record_success_metrics(success: &RequestAttempt) {
    crate::metrics::record_attempt(&success.model, "success", success.response_time);
    crate::metrics::record_tokens(&success.model, "input", success.input_tokens);
    crate::metrics::record_tokens(&success.model, "output", success.output_tokens);
    crate::metrics::record_cost(&success.model, success.cost);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModelConfig;

    fn model(id: &str, fallbacks: &[&str]) -> ModelConfig {
        ModelConfig {
            id: id.to_string(),
            max_tokens: 100,
            temperature: 0.7,
            top_p: 0.9,
            input_price: 0.00001,
            output_price: 0.00002,
            fallback_ids: fallbacks.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn create_test_config() -> Config {
        let mut config = Config::with_api_key("sk-or-test-key");
        config.openrouter.base_url = "http://127.0.0.1:9".to_string();
        config.models = vec![
            model("a/primary", &["b/first", "c/second", "b/first"]),
            model("b/first", &[]),
            model("c/second", &[]),
        ];
        config.selection.rules.clear();
        config.selection.default_model = "a/primary".to_string();
        config.selection.free_tier_model = "c/second".to_string();
        config
    }

    #[test]
    fn test_backoff_default_matches_capped_exponential() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(1), Duration::from_secs(2));
        assert_eq!(backoff.delay(2), Duration::from_secs(4));
        assert_eq!(backoff.delay(3), Duration::from_secs(8));
        assert_eq!(backoff.delay(4), Duration::from_secs(10));
        assert_eq!(backoff.delay(40), Duration::from_secs(10));
    }

    #[test]
    fn test_candidates_order_and_dedup() {
        let orchestrator = Orchestrator::new(&create_test_config()).unwrap();

        assert_eq!(
            orchestrator.candidates("a/primary", true),
            vec!["a/primary", "b/first", "c/second"]
        );
        assert_eq!(orchestrator.candidates("a/primary", false), vec!["a/primary"]);
        assert_eq!(orchestrator.candidates("unknown/model", true), vec!["unknown/model"]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = create_test_config();
        config.openrouter.api_key.clear();

        let result = Orchestrator::new(&config);
        assert!(matches!(result, Err(OrchestratorError::Config(_))));
    }

    #[test]
    fn test_oversized_timeout_is_config_error() {
        let mut config = create_test_config();
        config.limits.max_response_time_seconds = 1e20;

        let result = Orchestrator::new(&config);
        assert!(matches!(result, Err(OrchestratorError::Config(_))));
    }

    #[tokio::test]
    async fn test_zero_attempts_reports_all_models_failed() {
        let mut config = create_test_config();
        config.limits.max_retry_attempts = 0;
        let orchestrator = Orchestrator::new(&config).unwrap();

        let result = orchestrator
            .complete("a/primary", &[Message::user("hi")], CompletionOptions::default(), true)
            .await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("All models failed"));
        assert_eq!(result.model_used, "a/primary");
        assert_eq!(result.attempts, 0);
    }

    #[tokio::test]
    async fn test_unknown_model_fails_without_network() {
        let orchestrator = Orchestrator::new(&create_test_config()).unwrap();

        let result = orchestrator
            .complete("ghost/model", &[Message::user("hi")], CompletionOptions::default(), true)
            .await;

        assert!(!result.success);
        assert_eq!(result.attempts, 1);
        assert!(result.error.unwrap().contains("unknown model 'ghost/model'"));
    }
}
