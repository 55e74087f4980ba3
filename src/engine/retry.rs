use crate::types::{AppError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Timeout and bounded retry applied to every upstream call.
///
/// Only transient failures are retried; the backoff doubles after each attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
            timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn no_retry(timeout: Duration) -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            timeout,
        }
    }

    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt: u32 = 0;
        let mut backoff = self.initial_backoff;

        loop {
            attempt += 1;
            let result = match tokio::time::timeout(self.timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(AppError::transient(format!(
                    "{} timed out after {} ms",
                    operation,
                    self.timeout.as_millis()
                ))),
            };

            match result {
                Err(err) if err.is_transient() && attempt <= self.max_retries => {
                    warn!(
                        operation,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "Transient upstream failure, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                other => return other,
            }
        }
    }
}
