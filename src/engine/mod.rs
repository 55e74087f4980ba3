//! Conversation engine: one question in, one answer out, memory updated.
//!
//! A turn makes two sequential upstream calls while holding the session's
//! turn lock: the answer (conditioned on the current summary) and then the
//! summary update. The record is only written after both succeed, so a failed
//! or cancelled turn leaves memory exactly as it was. Readers see the last
//! committed record without waiting for a running turn.

mod retry;

pub use retry::RetryPolicy;

use crate::llm::LanguageModel;
use crate::memory::{SessionMemory, SessionStore};
use crate::prompt::PromptBuilder;
use crate::types::{AppError, DEFAULT_SESSION_ID, NO_QUESTION_MESSAGE, Result};
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct ConversationEngine {
    model: Arc<dyn LanguageModel>,
    sessions: SessionStore,
    prompt_builder: PromptBuilder,
    retry: RetryPolicy,
}

impl ConversationEngine {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        sessions: SessionStore,
        prompt_builder: PromptBuilder,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            model,
            sessions,
            prompt_builder,
            retry,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn prompt_builder(&self) -> &PromptBuilder {
        &self.prompt_builder
    }

    /// Answer a child's question within a session.
    ///
    /// A missing or empty `session_id` selects the shared `"default"` session.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for an empty question; the model is not called.
    /// - [`AppError::Upstream`] when either model call fails.
    pub async fn ask(&self, session_id: Option<&str>, question: &str) -> Result<String> {
        if question.trim().is_empty() {
            return Err(AppError::Validation(NO_QUESTION_MESSAGE.to_string()));
        }

        let session_id = session_id
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_SESSION_ID);

        let prompt = self.prompt_builder.build(question);
        let memory = self.sessions.get_or_create(session_id);

        self.run_turn(&memory, &prompt).await
    }

    /// Run one turn against `memory` and fold it into the summary.
    pub async fn run_turn(&self, memory: &SessionMemory, prompt: &str) -> Result<String> {
        let turn = memory.begin_turn().await;
        let summary = turn.record().summary;
        debug!(session_id = %memory.id(), "Starting turn");

        let answer = self
            .retry
            .run("answer generation", || self.model.complete(&summary, prompt))
            .await
            .map_err(|e| {
                error!(session_id = %memory.id(), error = %e, "Answer generation failed");
                e
            })?;

        let updated = self
            .retry
            .run("summary update", || {
                memory.summarizer().summarize(&summary, prompt, &answer)
            })
            .await
            .map_err(|e| {
                error!(session_id = %memory.id(), error = %e, "Summary update failed");
                e
            })?;

        let turns = turn.commit(updated);
        info!(
            session_id = %memory.id(),
            turns,
            answer_chars = answer.len(),
            "Turn completed"
        );

        Ok(answer)
    }
}
