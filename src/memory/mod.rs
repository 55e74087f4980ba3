//! Conversation memory for tutoring sessions.
//!
//! Each session keeps a single running summary instead of a transcript. After
//! every successful turn the [`Summarizer`] asks the language model to fold the
//! new question/answer pair into the previous summary, and the result becomes
//! the context for the next turn.

mod store;

pub use store::{SessionMemory, SessionStore};

use crate::llm::LanguageModel;
use crate::types::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Instructions used to fold a turn into the running summary.
pub const SUMMARY_PROMPT: &str = r#"Progressively summarize the conversation between a child and an AI tutor. Add the new lines to the current summary and return a single new summary.
Keep the topics the child asked about, what the tutor explained, and any follow-up ideas the tutor suggested. Write plain prose, a few sentences at most.

Example
Current summary:
The child asked why leaves are green. The tutor explained chlorophyll using a paint-box comparison.

New lines of conversation:
Child: Do leaves eat sunlight?
Tutor: Kind of! Leaves use sunlight like a tiny kitchen to make sugar food for the plant.

New summary:
The child asked why leaves are green and the tutor explained chlorophyll with a paint-box comparison. The child then asked whether leaves eat sunlight, and the tutor described photosynthesis as a kitchen that turns sunlight into sugar.
End of example

Current summary:
{summary}

New lines of conversation:
Child: {question}
Tutor: {answer}

New summary:"#;

/// Running summary of one session's conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    /// Natural-language digest of all turns folded in so far.
    pub summary: String,
    /// Number of successful turns folded into `summary`.
    pub turns: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for MemoryRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRecord {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            summary: String::new(),
            turns: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the summary after a completed turn.
    pub fn apply_turn(&mut self, summary: String) {
        self.summary = summary;
        self.turns += 1;
        self.updated_at = Utc::now();
    }

    pub fn is_empty(&self) -> bool {
        self.turns == 0
    }
}

/// LLM-backed summary updater.
pub struct Summarizer {
    model: Arc<dyn LanguageModel>,
}

impl Summarizer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Render the summarization request for one turn.
    pub fn render(summary: &str, question: &str, answer: &str) -> String {
        let current = if summary.trim().is_empty() {
            "(nothing yet)"
        } else {
            summary.trim()
        };

        // Fill slots back to front so braces in earlier values are never matched.
        SUMMARY_PROMPT
            .replacen("{answer}", answer.trim(), 1)
            .replacen("{question}", question.trim(), 1)
            .replacen("{summary}", current, 1)
    }

    /// Ask the model for a summary that includes the new turn.
    pub async fn summarize(&self, summary: &str, question: &str, answer: &str) -> Result<String> {
        let request = Self::render(summary, question, answer);
        let updated = self.model.complete("", &request).await?;
        Ok(updated.trim().to_string())
    }
}
