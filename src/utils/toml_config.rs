//! TOML-based configuration for the tutor server
//!
//! Every field has a default, so the configuration file is optional. Secrets
//! never live in the file: it only names the environment variable that holds
//! the provider API key.

use crate::engine::RetryPolicy;
use crate::llm::Provider;
use crate::llm::gemini::DEFAULT_GEMINI_BASE_URL;
use crate::prompt::{PromptBuilder, validate_template};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure loaded from tutor.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TutorConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub sessions: SessionConfig,

    #[serde(default)]
    pub prompt: PromptConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum accepted request body size
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    10000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    OpenAI,
    Ollama,
}

impl ProviderKind {
    /// Whether the provider needs an API key.
    pub fn is_hosted(self) -> bool {
        !matches!(self, ProviderKind::Ollama)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,

    /// Model name/identifier to use with the provider
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Environment variable containing the provider API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Override for the provider endpoint
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Extra attempts for transient upstream failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_provider() -> ProviderKind {
    ProviderKind::Gemini
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.0
}

fn default_api_key_env() -> String {
    "API_KEY".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            api_key_env: default_api_key_env(),
            base_url: None,
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

// ============= Session Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Evict sessions idle for this long. Unset keeps sessions for the process lifetime.
    #[serde(default)]
    pub idle_ttl_secs: Option<u64>,

    #[serde(default = "default_reap_interval_secs")]
    pub reap_interval_secs: u64,
}

fn default_reap_interval_secs() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl_secs: None,
            reap_interval_secs: default_reap_interval_secs(),
        }
    }
}

// ============= Prompt Configuration =============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Replacement for the built-in tutor template; must contain `{question}` once
    #[serde(default)]
    pub template: Option<String>,
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl TutorConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without validating it
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Parse `path` if it exists, otherwise fall back to the built-in defaults.
    ///
    /// Returns the configuration and whether the file was found. Nothing is
    /// validated; call [`TutorConfig::validate`] once overrides are applied.
    pub fn read_or_default<P: AsRef<Path>>(path: P) -> Result<(Self, bool), ConfigError> {
        match Self::read(path) {
            Ok(config) => Ok((config, true)),
            Err(ConfigError::FileNotFound(_)) => Ok((Self::default(), false)),
            Err(e) => Err(e),
        }
    }

    /// Validate values and check that the API key is available.
    ///
    /// A missing key is reported here, at startup, instead of on the first request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.model must not be empty".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "llm.request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.sessions.reap_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "sessions.reap_interval_secs must be greater than zero".to_string(),
            ));
        }

        if let Some(ref template) = self.prompt.template {
            validate_template(template)?;
        }

        if self.llm.provider.is_hosted() {
            self.api_key()?;
        }

        Ok(())
    }

    fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name)
            .ok()
            .filter(|value| !value.trim().is_empty())
    }

    /// Get the provider API key from the environment
    pub fn api_key(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.llm.api_key_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.llm.api_key_env.clone()))
    }

    /// Build the provider selected by `[llm]`
    pub fn provider(&self) -> Result<Provider, ConfigError> {
        let llm = &self.llm;
        let provider = match llm.provider {
            ProviderKind::Gemini => Provider::Gemini {
                api_key: self.api_key()?,
                base_url: llm
                    .base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
                model: llm.model.clone(),
                temperature: llm.temperature,
            },
            ProviderKind::OpenAI => Provider::OpenAI {
                api_key: self.api_key()?,
                api_base: llm
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
                model: llm.model.clone(),
                temperature: llm.temperature,
            },
            ProviderKind::Ollama => Provider::Ollama {
                base_url: llm
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "http://localhost:11434".to_string()),
                model: llm.model.clone(),
                temperature: llm.temperature,
            },
        };
        Ok(provider)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.llm.max_retries,
            initial_backoff: Duration::from_millis(self.llm.retry_backoff_ms),
            timeout: Duration::from_secs(self.llm.request_timeout_secs),
        }
    }

    pub fn prompt_builder(&self) -> Result<PromptBuilder, ConfigError> {
        match self.prompt.template {
            Some(ref template) => PromptBuilder::with_template(template.clone()),
            None => Ok(PromptBuilder::default()),
        }
    }

    /// Idle-session TTL, if eviction is enabled
    pub fn session_ttl(&self) -> Option<Duration> {
        self.sessions.idle_ttl_secs.map(Duration::from_secs)
    }

    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.sessions.reap_interval_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
