//! Layered configuration.
//!
//! Sources, highest priority first:
//! 1. Environment variables (`WEALTHSYNC_*`, `__` separates sections,
//!    e.g. `WEALTHSYNC_AI__API_KEY` -> `ai.api_key`)
//! 2. Project-level `.wealthsync/config.toml`
//! 3. User-level `~/.config/wealthsync/config.toml`
//! 4. Built-in defaults

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::notifications::DEFAULT_FEED_CAPACITY;

/// Upper bound on provider attempts, whatever the config says.
pub const MAX_PROVIDER_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error("Configuration section '{section}' is not configured (missing required fields)")]
    NotConfigured { section: String },

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

const fn default_max_tokens() -> u32 {
    8192
}

const fn default_timeout_secs() -> u64 {
    120
}

const fn default_max_attempts() -> u32 {
    1
}

fn default_provider() -> String {
    "anthropic".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

/// Completion provider settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AiConfig {
    /// "anthropic", "openai", "google", "ollama", "groq", "mistral" or "deepseek".
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Attempts per report, including the first. Clamped to [`MAX_PROVIDER_ATTEMPTS`].
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Override for the provider's API base URL.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            base_url: None,
        }
    }
}

impl AiConfig {
    /// Ollama runs locally and needs no key; every other provider does.
    pub fn is_configured(&self) -> bool {
        !self.provider.is_empty()
            && !self.model.is_empty()
            && (self.provider == "ollama" || !self.api_key.is_empty())
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.clamp(1, MAX_PROVIDER_ATTEMPTS)
    }

    pub fn require(&self) -> Result<&Self, ConfigError> {
        if self.is_configured() {
            Ok(self)
        } else {
            Err(ConfigError::NotConfigured {
                section: "ai".to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct StorageConfig {
    /// Root for client files. Defaults to `~/.wealthsync`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".wealthsync")
        })
    }
}

const fn default_feed_capacity() -> usize {
    DEFAULT_FEED_CAPACITY
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NotificationConfig {
    #[serde(default = "default_feed_capacity")]
    pub feed_capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            feed_capacity: default_feed_capacity(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct WealthConfig {
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl WealthConfig {
    /// Load from TOML files and environment variables. Does not read `.env`.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.env` from the current directory first, then [`load`](Self::load).
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".wealthsync/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("WEALTHSYNC_").split("__"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("wealthsync").join("config.toml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.ai.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ai.max_tokens".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.ai.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ai.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.notifications.feed_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "notifications.feed_capacity".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
