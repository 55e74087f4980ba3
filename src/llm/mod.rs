//! LLM Provider Clients and Abstractions
//!
//! Everything outside this module depends only on the [`LanguageModel`]
//! capability trait, so tests can substitute a stub without network access.
//!
//! # Supported Providers
//!
//! - Gemini (always available, default)
//! - `openai` - OpenAI API and compatible endpoints
//! - `ollama` - Local Ollama server
//!
//! # Example
//!
//! ```ignore
//! use kidtutor::llm::Provider;
//!
//! let model = provider.create_client()?;
//! let answer = model.complete("", "Why is the sky blue?").await?;
//! ```

/// Core capability trait and provider selection.
pub mod client;
/// Google Gemini REST client.
pub mod gemini;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LanguageModel, Provider};
