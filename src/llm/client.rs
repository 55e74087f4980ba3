//! LLM client abstractions and provider selection
//!
//! The rest of the crate only ever talks to [`LanguageModel`]. Concrete
//! providers live next to this module:
//! - **Gemini**: default, REST API over `reqwest`
//! - **OpenAI**: behind the `openai` feature
//! - **Ollama**: behind the `ollama` feature

use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Header placed in front of a non-empty conversation context.
pub const CONTEXT_HEADER: &str = "The following is a friendly conversation between a child and \
an AI tutor. The tutor uses what it already knows about the conversation to give consistent, \
connected answers. Summary of the conversation so far:";

/// Capability interface over a hosted or local language model.
///
/// `context` is the running conversation summary (may be empty) and `prompt`
/// is the fully rendered user turn.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for `prompt`, conditioned on `context`
    async fn complete(&self, context: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Builds the system-level instruction carrying the conversation context.
///
/// Returns `None` when there is nothing to carry over, so providers send a
/// bare user message on the first turn of a session.
pub fn context_instruction(context: &str) -> Option<String> {
    let context = context.trim();
    if context.is_empty() {
        None
    } else {
        Some(format!("{}\n{}", CONTEXT_HEADER, context))
    }
}

/// Provider enum for runtime selection
///
/// | Provider | Feature | Notes |
/// |----------|---------|-------|
/// | Gemini | always | Default, hosted |
/// | OpenAI | `openai` | Also OpenAI-compatible endpoints |
/// | Ollama | `ollama` | Local inference, no API key |
#[derive(Debug, Clone)]
pub enum Provider {
    /// Google Gemini `generateContent` REST API
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Gemini {
    ///     api_key: std::env::var("API_KEY")?,
    ///     base_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
    ///     model: "gemini-1.5-flash".to_string(),
    ///     temperature: 0.0,
    /// };
    /// ```
    Gemini {
        api_key: String,
        base_url: String,
        model: String,
        temperature: f32,
    },

    /// OpenAI API provider (including compatible APIs)
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
        temperature: f32,
    },

    /// Ollama local LLM provider
    Ollama {
        base_url: String,
        model: String,
        temperature: f32,
    },
}

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if the provider was not compiled in or its
    /// configuration is unusable.
    pub fn create_client(&self) -> Result<Arc<dyn LanguageModel>> {
        match self {
            Provider::Gemini {
                api_key,
                base_url,
                model,
                temperature,
            } => Ok(Arc::new(super::gemini::GeminiClient::new(
                api_key.clone(),
                base_url.clone(),
                model.clone(),
                *temperature,
            )?)),

            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
                temperature,
            } => Ok(Arc::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
                *temperature,
            ))),

            #[cfg(feature = "ollama")]
            Provider::Ollama {
                base_url,
                model,
                temperature,
            } => Ok(Arc::new(super::ollama::OllamaClient::new(
                base_url,
                model.clone(),
                *temperature,
            )?)),

            #[allow(unreachable_patterns)]
            other => Err(AppError::Config(format!(
                "{} provider is not compiled in; rebuild with the `{}` feature",
                other.name(),
                other.name().to_lowercase()
            ))),
        }
    }

    /// Check if this provider is available in the current build
    pub fn is_enabled(&self) -> bool {
        match self {
            Provider::Gemini { .. } => true,
            Provider::OpenAI { .. } => cfg!(feature = "openai"),
            Provider::Ollama { .. } => cfg!(feature = "ollama"),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini { .. } => "Gemini",
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    /// Model identifier the provider will be asked for
    pub fn model(&self) -> &str {
        match self {
            Provider::Gemini { model, .. }
            | Provider::OpenAI { model, .. }
            | Provider::Ollama { model, .. } => model,
        }
    }
}
