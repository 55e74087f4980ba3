use crate::{
    AppState,
    types::{AppError, AskRequest, AskResponse, ErrorResponse, Result},
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::warn;

/// Ask the tutor a question
#[utoipa::path(
    post,
    path = "/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Tutor answer", body = AskResponse),
        (status = 400, description = "No question provided or invalid body", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 415, description = "Body is not JSON", body = ErrorResponse),
        (status = 500, description = "Upstream model failure", body = ErrorResponse)
    ),
    tag = "tutor"
)]
pub async fn ask(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!(error = %rejection, status = %rejection.status(), "Rejected /ask body");
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(rejection.body_text()),
            StatusCode::UNSUPPORTED_MEDIA_TYPE => {
                AppError::UnsupportedMediaType(rejection.body_text())
            }
            _ => AppError::Validation(rejection.body_text()),
        }
    })?;

    let question = payload.question.unwrap_or_default();

    let answer = state
        .engine
        .ask(payload.session_id.as_deref(), &question)
        .await
        .inspect_err(|e| {
            if let AppError::Validation(msg) = e {
                warn!(reason = %msg, "Rejected question");
            }
        })?;

    Ok(Json(AskResponse { question, answer }))
}
