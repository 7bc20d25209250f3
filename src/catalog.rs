use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const CLAUDE_3_5_HAIKU: &str = "anthropic/claude-3.5-haiku";
pub const GPT_4O_MINI: &str = "openai/gpt-4o-mini";
pub const LLAMA_3_1_8B: &str = "meta-llama/llama-3.1-8b-instruct";
pub const CLAUDE_3_5_SONNET: &str = "anthropic/claude-3.5-sonnet";
pub const GPT_4O: &str = "openai/gpt-4o";

/// Static configuration for one model
///
/// Prices are USD per token.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelConfig {
    pub id: String,
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    pub input_price: f64,
    pub output_price: f64,
    /// Alternate models, tried in list order
    #[serde(default)]
    pub fallback_ids: Vec<String>,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

impl ModelConfig {
    /// Cost of a request at this model's rates
    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        input_tokens as f64 * self.input_price + output_tokens as f64 * self.output_price
    }
}

/// Read-only model catalog: pricing table plus fallback chains
///
/// Built once at startup and shared without locking.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: HashMap<String, ModelConfig>,
    /// Declaration order, for stable listing
    order: Vec<String>,
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelConfig>) -> Self {
        let order = models.iter().map(|m| m.id.clone()).collect();
        let models = models.into_iter().map(|m| (m.id.clone(), m)).collect();
        Self { models, order }
    }

    pub fn get(&self, model: &str) -> Option<&ModelConfig> {
        self.models.get(model)
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    /// Fallback chain for `model`, empty for unknown ids
    pub fn fallbacks(&self, model: &str) -> &[String] {
        self.models
            .get(model)
            .map(|m| m.fallback_ids.as_slice())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelConfig> {
        self.order.iter().filter_map(|id| self.models.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Built-in catalog used when the configuration lists no models
///
/// Rates are the published per-1K prices converted to per-token.
pub fn default_models() -> Vec<ModelConfig> {
    fn model(id: &str, per_1k: f64, max_tokens: u32, temperature: f32, fallbacks: &[&str]) -> ModelConfig {
        ModelConfig {
            id: id.to_string(),
            max_tokens,
            temperature,
            top_p: default_top_p(),
            input_price: per_1k / 1000.0,
            output_price: per_1k / 1000.0,
            fallback_ids: fallbacks.iter().map(|f| f.to_string()).collect(),
        }
    }

    vec![
        model(CLAUDE_3_5_HAIKU, 0.25, 4096, 0.7, &[GPT_4O_MINI, LLAMA_3_1_8B]),
        model(GPT_4O_MINI, 0.15, 4096, 0.7, &[CLAUDE_3_5_HAIKU, LLAMA_3_1_8B]),
        model(LLAMA_3_1_8B, 0.08, 2048, 0.8, &[GPT_4O_MINI, CLAUDE_3_5_HAIKU]),
        model(CLAUDE_3_5_SONNET, 3.0, 8192, 0.7, &[CLAUDE_3_5_HAIKU, GPT_4O_MINI]),
        model(GPT_4O, 5.0, 8192, 0.7, &[GPT_4O_MINI, CLAUDE_3_5_HAIKU]),
    ]
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(default_models())
    }
}
