//! Chat turn endpoint.

use axum::Json;
use axum::extract::State;

use ib_protocol::chat::{ChatReply, ChatRequest};
use ib_protocol::transcript::TranscriptEntry;

use crate::engine::CLOSING_LINE;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /api/v1/chat: resolve one user turn.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatReply>> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".into()));
    }

    let (session_id, session) = match state.sessions.get_or_create(req.session_id).await {
        Some(found) => found,
        None => {
            let id = req.session_id.map(|id| id.to_string()).unwrap_or_default();
            return Err(ApiError::NotFound(format!("session '{id}' not found")));
        }
    };

    // Held until the turn is persisted so turns in one session stay ordered.
    let mut session = session.lock().await;
    let resolution = state.pipeline.resolve(message, &mut session);
    let entry = TranscriptEntry::now(req.message.as_str(), &resolution.response);
    session.record(entry.clone());

    if let Err(e) = state.transcript.append(&entry).await {
        tracing::warn!(session_id = %session_id, error = %e, "failed to persist transcript entry");
    }
    drop(session);

    tracing::info!(
        session_id = %session_id,
        source = ?resolution.source,
        rule = resolution.source.is_rule(),
        tag = resolution.tag.as_deref().unwrap_or("-"),
        "chat turn resolved"
    );

    let closing = resolution.is_farewell().then(|| CLOSING_LINE.to_string());
    Ok(Json(ChatReply {
        session_id,
        response: resolution.response,
        source: resolution.source,
        tag: resolution.tag,
        confidence: resolution.confidence,
        timestamp: entry.timestamp,
        closing,
    }))
}
