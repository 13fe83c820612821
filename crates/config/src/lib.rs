//! Configuration loading, validation, and management for DocBot.
//!
//! Loads configuration from `~/.docbot/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use docbot_core::chunk::DEFAULT_MAX_MESSAGE_BYTES;
use docbot_core::history::DEFAULT_HISTORY_CAPACITY;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.docbot/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default chat model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Model used to embed documentation passages and queries
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Providers tried in order when the default one fails
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_providers: Vec<String>,

    /// Per-attempt timeout for each provider in the chain
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Conversation handling
    #[serde(default)]
    pub bot: BotConfig,

    /// Documentation retrieval
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Assistant persona
    #[serde(default)]
    pub identity: IdentityConfig,
}

fn default_provider() -> String {
    "ollama".into()
}
fn default_model() -> String {
    "llama3.2:3b".into()
}
fn default_temperature() -> f32 {
    0.0
}
fn default_max_tokens() -> u32 {
    2048
}
fn default_embedding_model() -> String {
    "nomic-embed-text".into()
}
fn default_provider_timeout() -> u64 {
    120
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("embedding_model", &self.embedding_model)
            .field("fallback_providers", &self.fallback_providers)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("providers", &self.providers)
            .field("bot", &self.bot)
            .field("knowledge", &self.knowledge)
            .field("identity", &self.identity)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Leading character that marks a message as a command
    #[serde(default = "default_command_prefix")]
    pub command_prefix: char,

    /// Turns kept per conversation
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Prior messages pulled from the transport on first contact
    #[serde(default = "default_history_capacity")]
    pub history_fetch_limit: usize,

    /// Largest outbound message, in bytes
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,

    /// Echo internal errors back to the conversation
    #[serde(default)]
    pub debug: bool,
}

fn default_command_prefix() -> char {
    '#'
}
fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}
fn default_max_message_bytes() -> usize {
    DEFAULT_MAX_MESSAGE_BYTES
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            history_capacity: default_history_capacity(),
            history_fetch_limit: default_history_capacity(),
            max_message_bytes: default_max_message_bytes(),
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Directory of markdown documentation to index at startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_dir: Option<String>,

    /// Label of the index, shown in logs
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Documents retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Passage size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared by consecutive passages
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Minimum similarity for a passage to be returned
    #[serde(default)]
    pub min_score: f32,
}

fn default_index_name() -> String {
    "docs".into()
}
fn default_top_k() -> usize {
    5
}
fn default_chunk_size() -> usize {
    1000
}
fn default_chunk_overlap() -> usize {
    100
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            docs_dir: None,
            index_name: default_index_name(),
            top_k: default_top_k(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            min_score: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Name the assistant answers under
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// What the documentation covers; used in both prompts
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Replace the answer system prompt entirely (retrieved context is still appended)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,
}

fn default_assistant_name() -> String {
    "DocBot".into()
}
fn default_subject() -> String {
    "the product documentation".into()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            subject: default_subject(),
            system_prompt_override: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.docbot/config.toml).
    ///
    /// Also checks environment variables:
    /// - `DOCBOT_API_KEY` (highest priority), `OPENAI_API_KEY`, `MISTRAL_API_KEY`
    /// - `DOCBOT_PROVIDER`, `DOCBOT_MODEL`, `DOCBOT_DOCS_DIR`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("DOCBOT_API_KEY")
                .or_else(|| lookup("OPENAI_API_KEY"))
                .or_else(|| lookup("MISTRAL_API_KEY"));
        }

        if let Some(provider) = lookup("DOCBOT_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("DOCBOT_MODEL") {
            self.default_model = model;
        }

        if let Some(dir) = lookup("DOCBOT_DOCS_DIR") {
            self.knowledge.docs_dir = Some(dir);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".docbot")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.bot.max_message_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "bot.max_message_bytes must be > 0".into(),
            ));
        }

        if self.bot.history_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "bot.history_capacity must be > 0".into(),
            ));
        }

        if self.knowledge.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "knowledge.top_k must be > 0".into(),
            ));
        }

        if self.knowledge.chunk_overlap >= self.knowledge.chunk_size {
            return Err(ConfigError::ValidationError(
                "knowledge.chunk_overlap must be smaller than knowledge.chunk_size".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
            || self.providers.values().any(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            embedding_model: default_embedding_model(),
            fallback_providers: vec![],
            provider_timeout_secs: default_provider_timeout(),
            providers: HashMap::new(),
            bot: BotConfig::default(),
            knowledge: KnowledgeConfig::default(),
            identity: IdentityConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
