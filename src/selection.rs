use crate::catalog::{CLAUDE_3_5_HAIKU, GPT_4O_MINI, LLAMA_3_1_8B};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language of the content being processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Language {
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "auto")]
    AutoDetect,
}

/// Kind of task the completion is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum UseCase {
    #[serde(rename = "sentiment")]
    SentimentAnalysis,
    #[serde(rename = "message_gen")]
    MessageGeneration,
    #[serde(rename = "cultural")]
    CulturalCheck,
    #[serde(rename = "chat")]
    ChatResponse,
    #[serde(rename = "persona")]
    PersonaManagement,
}

impl UseCase {
    pub const ALL: [UseCase; 5] = [
        UseCase::SentimentAnalysis,
        UseCase::MessageGeneration,
        UseCase::CulturalCheck,
        UseCase::ChatResponse,
        UseCase::PersonaManagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SentimentAnalysis => "sentiment",
            Self::MessageGeneration => "message_gen",
            Self::CulturalCheck => "cultural",
            Self::ChatResponse => "chat",
            Self::PersonaManagement => "persona",
        }
    }
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arabic => "ar",
            Self::English => "en",
            Self::AutoDetect => "auto",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ar" => Ok(Self::Arabic),
            "en" => Ok(Self::English),
            "auto" => Ok(Self::AutoDetect),
            other => Err(format!("unknown language '{}' (expected ar, en or auto)", other)),
        }
    }
}

impl FromStr for UseCase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|u| u.as_str() == s)
            .ok_or_else(|| format!("unknown use case '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SelectionRule {
    pub language: Language,
    pub use_case: UseCase,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SelectionConfig {
    #[serde(default = "default_rules")]
    pub rules: Vec<SelectionRule>,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_free_tier_model")]
    pub free_tier_model: String,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            default_model: default_model(),
            free_tier_model: default_free_tier_model(),
        }
    }
}

fn default_rules() -> Vec<SelectionRule> {
    let mut rules = Vec::with_capacity(UseCase::ALL.len() * 2);
    for (language, model) in [(Language::Arabic, CLAUDE_3_5_HAIKU), (Language::English, GPT_4O_MINI)] {
        for use_case in UseCase::ALL {
            rules.push(SelectionRule {
                language,
                use_case,
                model: model.to_string(),
            });
        }
    }
    rules
}

fn default_model() -> String {
    CLAUDE_3_5_HAIKU.to_string()
}

fn default_free_tier_model() -> String {
    LLAMA_3_1_8B.to_string()
}

/// Picks the primary model for a task
pub struct ModelSelector<'a> {
    config: &'a SelectionConfig,
}

impl<'a> ModelSelector<'a> {
    pub fn new(config: &'a SelectionConfig) -> Self {
        Self { config }
    }

    pub fn model_for_task(&self, language: Language, use_case: UseCase, is_free_tier: bool) -> &'a str {
        if is_free_tier {
            return &self.config.free_tier_model;
        }

        self.config
            .rules
            .iter()
            .find(|r| r.language == language && r.use_case == use_case)
            .map(|r| r.model.as_str())
            .unwrap_or(&self.config.default_model)
    }
}
