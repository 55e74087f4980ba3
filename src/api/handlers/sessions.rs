use crate::{
    AppState,
    types::{AppError, ErrorResponse, Result, SessionMemoryView},
};
use axum::{
    Json,
    extract::{Path, State},
};

/// Get the conversation summary kept for a session
#[utoipa::path(
    get,
    path = "/sessions/{session_id}/memory",
    params(("session_id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session memory", body = SessionMemoryView),
        (status = 404, description = "Unknown session", body = ErrorResponse)
    ),
    tag = "sessions"
)]
pub async fn get_session_memory(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionMemoryView>> {
    let memory = state
        .engine
        .sessions()
        .get(&session_id)
        .ok_or_else(|| AppError::NotFound(format!("session '{}'", session_id)))?;

    Ok(Json(memory.view()))
}
