//! Stub language models for testing.
//!
//! These implement [`LanguageModel`] without any network access so the HTTP
//! layer and the engine can be exercised end to end.

#![allow(dead_code)]

use async_trait::async_trait;
use kidtutor::types::{AppError, Result};
use kidtutor::LanguageModel;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A recorded `complete` call: `(context, prompt)`.
pub type Call = (String, String);

/// Model that answers every prompt and records what it was sent.
///
/// Summary requests get a one-line summary quoting the child's question, so
/// tests can check that the next turn receives it as context.
#[derive(Clone, Default)]
pub struct EchoModel {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl EchoModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Calls that produced tutor answers (not summary updates).
    pub fn answer_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|(_, prompt)| !is_summary_request(prompt))
            .collect()
    }
}

fn is_summary_request(prompt: &str) -> bool {
    prompt.starts_with("Progressively summarize")
}

fn question_of(prompt: &str) -> &str {
    prompt
        .lines()
        .find_map(|line| line.trim().strip_prefix("Question:"))
        .map(str::trim)
        .unwrap_or("something")
}

#[async_trait]
impl LanguageModel for EchoModel {
    async fn complete(&self, context: &str, prompt: &str) -> Result<String> {
        self.calls
            .lock()
            .push((context.to_string(), prompt.to_string()));

        if is_summary_request(prompt) {
            Ok(format!("The child asked: {}", question_of(prompt)))
        } else {
            Ok(format!("Here is a fun answer about {}! 🌟", question_of(prompt)))
        }
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

/// Model that always fails, counting attempts.
#[derive(Clone)]
pub struct FailingModel {
    message: String,
    transient: bool,
    attempts: Arc<AtomicUsize>,
}

impl FailingModel {
    /// A failure that should not be retried (bad key, quota, malformed reply).
    pub fn permanent(message: &str) -> Self {
        Self {
            message: message.to_string(),
            transient: false,
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A failure that the retry policy treats as recoverable.
    pub fn transient(message: &str) -> Self {
        Self {
            transient: true,
            ..Self::permanent(message)
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for FailingModel {
    async fn complete(&self, _context: &str, _prompt: &str) -> Result<String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.transient {
            Err(AppError::transient(self.message.clone()))
        } else {
            Err(AppError::upstream(self.message.clone()))
        }
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

/// Model that takes a while to answer.
#[derive(Clone)]
pub struct SlowModel {
    delay: Duration,
}

impl SlowModel {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl LanguageModel for SlowModel {
    async fn complete(&self, _context: &str, prompt: &str) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        Ok(format!("Slow answer about {}", question_of(prompt)))
    }

    fn model_name(&self) -> &str {
        "slow"
    }
}
