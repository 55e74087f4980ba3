//! API request handlers.

/// Question answering handler.
pub mod ask;
/// Liveness check.
pub mod health;
/// Read-only session memory inspection.
pub mod sessions;
