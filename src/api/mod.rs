//! HTTP API Handlers and Routes
//!
//! # API Endpoints
//!
//! - `GET /` - Liveness check
//! - `POST /ask` - Ask the tutor a question (`{"question", "session_id"?}`)
//! - `GET /sessions/{session_id}/memory` - Inspect a session's running summary
//!
//! Errors are always returned as `{"error": "<message>"}`.
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
