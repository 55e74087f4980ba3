use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Session id used when a request does not carry one.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Message returned for a missing or empty question.
pub const NO_QUESTION_MESSAGE: &str = "No question provided";

// ============= API Request/Response Types =============

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Read-only view of a session's conversation memory.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionMemoryView {
    pub session_id: String,
    pub summary: String,
    pub turns: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Upstream {
        message: String,
        /// Whether the failure is worth retrying (network hiccup, 429, 5xx).
        transient: bool,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    UnsupportedMediaType(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Upstream failure that should not be retried (auth, bad request, malformed reply).
    pub fn upstream(message: impl Into<String>) -> Self {
        AppError::Upstream {
            message: message.into(),
            transient: false,
        }
    }

    /// Upstream failure that may succeed on a later attempt.
    pub fn transient(message: impl Into<String>) -> Self {
        AppError::Upstream {
            message: message.into(),
            transient: true,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Upstream { transient: true, .. })
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::Validation(_) => axum::http::StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => axum::http::StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => axum::http::StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedMediaType(_) => axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Upstream { .. } | AppError::Config(_) | AppError::Internal(_) => {
                axum::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
