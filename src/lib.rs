//! # Kid Tutor Server
//!
//! A small HTTP backend that answers children's questions through a hosted
//! large language model. Every question is wrapped in a fixed kid-friendly
//! tutor prompt, and each session keeps a running summary of the conversation
//! so follow-up questions ("Tell me more") have context.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use kidtutor::{AppState, TutorConfig};
//!
//! let config = TutorConfig::load("tutor.toml")?;
//! let model = config.provider()?.create_client()?;
//! let state = AppState::new(config, model)?;
//!
//! let answer = state.engine.ask(Some("kid42"), "Why is the sky blue?").await?;
//! ```
//!
//! ## Modules
//!
//! - [`prompt`] - Tutor prompt template
//! - [`memory`] - Session store and LLM-backed conversation summaries
//! - [`engine`] - Runs a turn: answer, then summary update
//! - [`llm`] - Language model capability and providers
//! - [`api`] - HTTP handlers and routes
//! - [`types`] - Request/response types and errors
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `openai` | OpenAI API support |
//! | `ollama` | Ollama local inference |
//! | `swagger-ui` | Interactive API docs at `/swagger-ui` |

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// Conversation engine and upstream retry policy.
pub mod engine;
/// LLM provider clients and abstractions.
pub mod llm;
/// Session-scoped conversation memory.
pub mod memory;
/// Tutor prompt templating.
pub mod prompt;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

pub use engine::{ConversationEngine, RetryPolicy};
pub use llm::{LanguageModel, Provider};
pub use memory::{MemoryRecord, SessionMemory, SessionStore};
pub use prompt::PromptBuilder;
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigError, TutorConfig};

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Validated configuration
    pub config: Arc<TutorConfig>,
    /// Conversation engine owning the session store
    pub engine: Arc<ConversationEngine>,
}

impl AppState {
    /// Wire the engine from configuration and a language model.
    ///
    /// The same model answers questions and updates session summaries.
    pub fn new(config: TutorConfig, model: Arc<dyn LanguageModel>) -> Result<Self> {
        let prompt_builder = config
            .prompt_builder()
            .map_err(|e| AppError::Config(e.to_string()))?;
        let sessions = SessionStore::new(Arc::clone(&model));
        let engine = ConversationEngine::new(model, sessions, prompt_builder, config.retry_policy());

        Ok(Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
        })
    }

    /// Build the full HTTP router for this state.
    pub fn router(&self) -> axum::Router {
        api::routes::create_router(self.config.server.max_body_bytes).with_state(self.clone())
    }
}
