//! Conversation history endpoints.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use ib_protocol::transcript::TranscriptEntry;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/v1/history: persisted transcript, newest first.
pub async fn transcript_history(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<TranscriptEntry>>> {
    let entries = state.transcript.read_newest_first().await?;
    Ok(Json(entries))
}

/// GET /api/v1/sessions/:id/history: one conversation's turns, newest first.
pub async fn session_history(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TranscriptEntry>>> {
    let session = state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("session '{session_id}' not found")))?;

    let session = session.lock().await;
    Ok(Json(session.transcript().iter().rev().cloned().collect()))
}
