//! API route definitions and router builder.

pub mod about;
pub mod chat;
pub mod health;
pub mod history;
pub mod sessions;

use axum::Router;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Conversation turns
        .route("/chat", post(chat::chat))
        // Session lifecycle
        .route("/sessions", post(sessions::create_session))
        .route(
            "/sessions/{id}",
            get(sessions::get_session).delete(sessions::end_session),
        )
        .route("/sessions/{id}/history", get(history::session_history))
        // Persisted transcript
        .route("/history", get(history::transcript_history))
        .route("/about", get(about::about));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}
