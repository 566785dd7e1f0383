// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::usage::Pricing;
use crate::infra::errors::ConvoError;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Explicit per-Mtok rates. When absent, rates come from the model price table.
    #[serde(default)]
    pub pricing: Option<PricingConfig>,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub base_url: String,
    /// Name of the environment variable holding the bearer credential.
    pub api_key_env: String,
    /// Per-request timeout. Unset means the transport default (none).
    pub timeout_secs: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gpt-4o-mini".into(),
            base_url: "https://api.openai.com/v1".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    pub initial_question: String,
    /// Turn budget. The run makes `max(turns - 1, 1)` responder calls.
    pub turns: u32,
    /// Number of words shown per message preview.
    pub preview_words: usize,
    pub responder_instructions: String,
    pub follow_up_prompt: String,
    pub responder_max_tokens: u32,
    pub follow_up_max_tokens: u32,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            initial_question: "How will AI shape the future of the world?".into(),
            turns: 10,
            preview_words: 10,
            responder_instructions:
                "Please respond briefly and concisely to the user's question.".into(),
            follow_up_prompt: "Based on the previous conversation, generate a curious \
                follow-up question that continues the discussion in an engaging way."
                .into(),
            responder_max_tokens: 500,
            follow_up_max_tokens: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    pub input_per_mtok: f64,
    pub cached_input_per_mtok: f64,
    pub output_per_mtok: f64,
}

impl From<&PricingConfig> for Pricing {
    fn from(p: &PricingConfig) -> Self {
        Pricing::per_mtok(p.input_per_mtok, p.cached_input_per_mtok, p.output_per_mtok)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub conversations_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            conversations_dir: PathBuf::from("conversations"),
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConvoError> {
        if self.conversation.turns == 0 {
            return Err(ConvoError::Config(
                "conversation.turns must be at least 1".into(),
            ));
        }
        if self.conversation.preview_words == 0 {
            return Err(ConvoError::Config(
                "conversation.preview_words must be at least 1".into(),
            ));
        }
        if let Some(p) = &self.pricing {
            if p.input_per_mtok < 0.0 || p.cached_input_per_mtok < 0.0 || p.output_per_mtok < 0.0
            {
                return Err(ConvoError::Config("pricing rates must not be negative".into()));
            }
        }
        Ok(())
    }

    /// Effective per-token pricing: the `[pricing]` section, or the model price table.
    pub fn pricing(&self) -> Pricing {
        match &self.pricing {
            Some(p) => p.into(),
            None => Pricing::for_model(&self.model.name),
        }
    }

    /// Read the bearer credential from the configured environment variable.
    pub fn api_key(&self) -> Result<String, ConvoError> {
        match std::env::var(&self.model.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConvoError::MissingApiKey {
                var: self.model.api_key_env.clone(),
            }),
        }
    }
}
