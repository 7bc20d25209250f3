use crate::catalog::{default_models, ModelConfig};
use crate::selection::SelectionConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub openrouter: OpenRouterConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub budget: CostLimits,
    #[serde(default = "default_models")]
    pub models: Vec<ModelConfig>,
    #[serde(default)]
    pub selection: SelectionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenRouterConfig {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sent as `HTTP-Referer`
    #[serde(default = "default_referer")]
    pub referer: String,
    /// Sent as `X-Title`
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
    #[serde(default = "default_max_response_time")]
    pub max_response_time_seconds: f64,
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,
    /// Backoff before attempt n+1 is `min(backoff_base_ms * 2^n, max_backoff_ms)`
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

/// Spend ceilings in USD
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CostLimits {
    #[serde(default = "default_daily_budget")]
    pub daily_budget_usd: f64,
    #[serde(default = "default_monthly_budget")]
    pub monthly_budget_usd: f64,
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold_percent: f64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            max_response_time_seconds: default_max_response_time(),
            max_retry_attempts: default_max_retry_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl Default for CostLimits {
    fn default() -> Self {
        Self {
            daily_budget_usd: default_daily_budget(),
            monthly_budget_usd: default_monthly_budget(),
            alert_threshold_percent: default_alert_threshold(),
        }
    }
}

impl LimitsConfig {
    /// Per-attempt deadline
    ///
    /// Values `validate_config` rejects map to the 30s default.
    pub fn request_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.max_response_time_seconds)
            .ok()
            .filter(|timeout| !timeout.is_zero())
            .unwrap_or_else(|| Duration::from_secs_f64(default_max_response_time()))
    }
}

impl OpenRouterConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            referer: default_referer(),
            app_name: default_app_name(),
        }
    }
}

impl Config {
    /// Configuration with built-in defaults and the given API key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            openrouter: OpenRouterConfig::new(api_key),
            limits: LimitsConfig::default(),
            budget: CostLimits::default(),
            models: default_models(),
            selection: SelectionConfig::default(),
        }
    }
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_referer() -> String {
    "https://restaurant-ai.com".to_string()
}

fn default_app_name() -> String {
    "Restaurant AI Feedback Agent".to_string()
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_max_response_time() -> f64 {
    30.0
}

fn default_max_retry_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

fn default_daily_budget() -> f64 {
    50.0
}

fn default_monthly_budget() -> f64 {
    1000.0
}

fn default_alert_threshold() -> f64 {
    80.0
}

/// Load configuration from a TOML file, overridden by `LLM_ORCHESTRATOR__*` env vars
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("LLM_ORCHESTRATOR").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.openrouter.api_key.trim().is_empty() {
        anyhow::bail!("OpenRouter API key must be configured");
    }

    if cfg.limits.requests_per_minute == 0 {
        anyhow::bail!("requests_per_minute must be greater than zero");
    }

    // NaN, infinities and values past Duration::MAX all fail the conversion
    let timeout = cfg.limits.max_response_time_seconds;
    if !(timeout > 0.0) || Duration::try_from_secs_f64(timeout).is_err() {
        anyhow::bail!(
            "max_response_time_seconds must be a positive, finite number of seconds (got {})",
            timeout
        );
    }

    if !(cfg.budget.daily_budget_usd > 0.0) || !(cfg.budget.monthly_budget_usd > 0.0) {
        anyhow::bail!("Budgets must be positive");
    }

    if cfg.models.is_empty() {
        anyhow::bail!("At least one model must be configured");
    }

    let mut ids = HashSet::new();
    for model in &cfg.models {
        if model.id.is_empty() {
            anyhow::bail!("Model id cannot be empty");
        }
        if !ids.insert(model.id.as_str()) {
            anyhow::bail!("Duplicate model id '{}'", model.id);
        }
        if model.input_price < 0.0 || model.output_price < 0.0 {
            anyhow::bail!("Model '{}' has a negative price", model.id);
        }
    }

    for model in &cfg.models {
        for fallback in &model.fallback_ids {
            if fallback == &model.id {
                anyhow::bail!("Model '{}' lists itself as a fallback", model.id);
            }
            if !ids.contains(fallback.as_str()) {
                anyhow::bail!(
                    "Model '{}' has unknown fallback '{}'",
                    model.id,
                    fallback
                );
            }
        }
    }

    for rule in &cfg.selection.rules {
        if !ids.contains(rule.model.as_str()) {
            anyhow::bail!(
                "Selection rule ({}, {}) uses unknown model '{}'",
                rule.language,
                rule.use_case,
                rule.model
            );
        }
    }

    for (name, model) in [
        ("default_model", &cfg.selection.default_model),
        ("free_tier_model", &cfg.selection.free_tier_model),
    ] {
        if !ids.contains(model.as_str()) {
            anyhow::bail!("Selection {} '{}' is not in the catalog", name, model);
        }
    }

    Ok(())
}
