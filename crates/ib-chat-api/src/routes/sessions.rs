//! Conversation lifecycle endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use ib_protocol::chat::SessionInfo;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /api/v1/sessions: start a conversation.
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionInfo>) {
    let (_, session) = state.sessions.create().await;
    let info = session.lock().await.info();
    (StatusCode::CREATED, Json(info))
}

/// GET /api/v1/sessions/:id: conversation summary.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<SessionInfo>> {
    let session = state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("session '{session_id}' not found")))?;
    let info = session.lock().await.info();
    Ok(Json(info))
}

/// DELETE /api/v1/sessions/:id: end a conversation and forget its memory.
pub async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.sessions.end(session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("session '{session_id}' not found")))
    }
}
