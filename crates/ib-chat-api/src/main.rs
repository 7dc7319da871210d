//! IntentBot chat server.
//!
//! Loads the intent catalog, trains (or reloads) the classifier, and serves
//! the chat API over HTTP.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use ib_chat_api::config::ChatConfig;
use ib_chat_api::engine::Pipeline;
use ib_chat_api::routes::build_router;
use ib_chat_api::session::SessionStore;
use ib_chat_api::state::AppState;
use ib_chat_api::transcript::CsvTranscript;
use ib_classifier::{ArtifactCache, default_candidates, load_catalog, load_or_train};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ib-chat-api starting");

    // ── Load config ─────────────────────────────────────────────
    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!(path = %path, "loading config file");
            ChatConfig::from_file(&path)?
        }
        None => ChatConfig::from_env(),
    };

    // ── Catalog & classifier ────────────────────────────────────
    let catalog = load_catalog(&default_candidates(config.catalog_path.clone()))?;
    let cache = ArtifactCache::new(&config.model_dir);
    let model = load_or_train(&catalog, Some(&cache), &config.training, config.retrain)?;
    tracing::info!(
        intents = catalog.len(),
        patterns = catalog.pattern_count(),
        threshold = config.confidence_threshold,
        "classifier ready"
    );

    let pipeline = Pipeline::new(
        Arc::new(catalog),
        Arc::new(model),
        config.confidence_threshold,
    );

    // ── Serve ───────────────────────────────────────────────────
    let transcript = CsvTranscript::new(&config.transcript_path);
    tracing::info!(path = %transcript.path().display(), "transcript file");
    let sessions = SessionStore::with_idle_ttl(Duration::from_secs(config.session_idle_secs));
    let state = AppState::new(Arc::new(pipeline), Arc::new(transcript)).with_sessions(sessions);
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
