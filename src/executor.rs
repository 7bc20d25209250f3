use crate::budget::BudgetTracker;
use crate::catalog::ModelCatalog;
use crate::config::OpenRouterConfig;
use crate::error::AttemptError;
use crate::models::openrouter::{ChatCompletionRequest, Message};
use crate::providers::openrouter;
use crate::rate_limiter::RateLimiter;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-call overrides of the model defaults
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompletionOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// A successful network attempt
#[derive(Debug, Clone, PartialEq)]
pub struct RequestAttempt {
    pub model: String,
    pub attempt: u32,
    pub estimated_input_tokens: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: f64,
    pub response_time: Duration,
    pub content: String,
    pub finish_reason: Option<String>,
}

/// A failed attempt, with what was known when it failed
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptFailure {
    pub model: String,
    pub attempt: u32,
    pub estimated_input_tokens: u64,
    pub response_time: Duration,
    pub error: AttemptError,
}

pub type AttemptOutcome = Result<RequestAttempt, AttemptFailure>;

/// Rough token count: one token per four characters, never below one
///
/// Deliberately coarse; budget estimates are calibrated against it.
pub fn estimate_tokens(text: &str) -> u64 {
    ((text.chars().count() / 4) as u64).max(1)
}

/// Estimated prompt size of a message list
pub fn estimate_input_tokens(messages: &[Message]) -> u64 {
    let joined = messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    estimate_tokens(&joined)
}

/// Performs exactly one attempt against one model
pub struct RequestExecutor {
    http: Client,
    openrouter: OpenRouterConfig,
    catalog: Arc<ModelCatalog>,
    budget: Arc<BudgetTracker>,
    rate_limiter: Arc<RateLimiter>,
    timeout: Duration,
}

impl RequestExecutor {
    pub fn new(
        http: Client,
        openrouter: OpenRouterConfig,
        catalog: Arc<ModelCatalog>,
        budget: Arc<BudgetTracker>,
        rate_limiter: Arc<RateLimiter>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            openrouter,
            catalog,
            budget,
            rate_limiter,
            timeout,
        }
    }

    /// Budget check, rate limit, POST, then commit the actual cost
    ///
    /// Usage is recorded only on success. A budget rejection returns before
    /// the rate limiter or the network is touched.
    pub async fn execute(
        &self,
        model: &str,
        messages: &[Message],
        options: &CompletionOptions,
        attempt: u32,
    ) -> AttemptOutcome {
        let start = Instant::now();
        let estimated_input_tokens = estimate_input_tokens(messages);
        let fail = |error: AttemptError| AttemptFailure {
            model: model.to_string(),
            attempt,
            estimated_input_tokens,
            response_time: start.elapsed(),
            error,
        };

        let Some(model_config) = self.catalog.get(model) else {
            tracing::error!(model, attempt, "Model not found in catalog");
            return Err(fail(AttemptError::UnknownModel(model.to_string())));
        };

        let max_tokens = options.max_tokens.unwrap_or(model_config.max_tokens);
        let temperature = options.temperature.unwrap_or(model_config.temperature);

        let estimated_cost = model_config.cost(estimated_input_tokens, max_tokens as u64);
        if !self.budget.check_budget(estimated_cost).await {
            return Err(fail(AttemptError::BudgetExceeded));
        }

        self.rate_limiter.acquire().await;

        let request = ChatCompletionRequest {
            model,
            messages,
            max_tokens,
            temperature,
            top_p: model_config.top_p,
            stream: false,
        };

        tracing::info!(
            model,
            messages_count = messages.len(),
            attempt,
            "Making OpenRouter request"
        );

        let response =
            match openrouter::chat_completions(&self.http, &self.openrouter, &request, self.timeout).await {
                Ok(response) => response,
                Err(error) => {
                    log_failure(model, attempt, &error);
                    return Err(fail(error));
                }
            };

        let Some(choice) = response.choices.into_iter().next() else {
            let error = AttemptError::Unexpected("response contained no choices".to_string());
            log_failure(model, attempt, &error);
            return Err(fail(error));
        };

        let usage = response.usage.unwrap_or_default();
        let input_tokens = usage.prompt_tokens.unwrap_or(estimated_input_tokens);
        let output_tokens = usage.completion_tokens.unwrap_or(0);
        let cost = model_config.cost(input_tokens, output_tokens);

        self.budget.record_usage(cost).await;

        let response_time = start.elapsed();
        tracing::info!(
            model,
            input_tokens,
            output_tokens,
            cost,
            response_time = response_time.as_secs_f64(),
            "OpenRouter request successful"
        );

        Ok(RequestAttempt {
            model: model.to_string(),
            attempt,
            estimated_input_tokens,
            input_tokens,
            output_tokens,
            cost,
            response_time,
            content: choice.message.content.unwrap_or_default(),
            finish_reason: choice.finish_reason,
        })
    }
}

fn log_failure(model: &str, attempt: u32, error: &AttemptError) {
    match error {
        AttemptError::Http { status, message } => {
            tracing::error!(
                model,
                attempt,
                status = status.as_u16(),
                error = %crate::logging::sanitize_log_value(message),
                "OpenRouter API error"
            );
        }
        AttemptError::Timeout => {
            tracing::error!(model, attempt, "Request timeout");
        }
        other => {
            tracing::error!(model, attempt, error = %other, "Unexpected error in OpenRouter request");
        }
    }
}
