//! Shared test harness for E2E integration tests.
//!
//! Trains the real TF-IDF + logistic regression classifier on the bundled
//! catalog and serves it through the chat router, persisting the transcript
//! and model cache inside a scratch directory.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use ib_chat_api::engine::{DEFAULT_CONFIDENCE_THRESHOLD, Pipeline};
use ib_chat_api::routes::build_router;
use ib_chat_api::state::AppState;
use ib_chat_api::transcript::CsvTranscript;
use ib_classifier::{ArtifactCache, TrainingConfig, load_catalog, load_or_train};
use ib_protocol::intent::Catalog;

/// Path of the catalog shipped with the repository.
pub fn bundled_catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/intents.json")
}

/// End-to-end harness: trained pipeline + router + CSV transcript.
pub struct TestHarness {
    /// Scratch directory holding `chat_log.csv` and `models/`.
    pub dir: TempDir,
    pub state: AppState,
    pub router: Router,
}

impl TestHarness {
    /// Harness trained on the bundled catalog.
    pub fn bundled() -> Self {
        let catalog = load_catalog(&[bundled_catalog_path()]).unwrap();
        Self::with_catalog(catalog)
    }

    /// Harness trained on an arbitrary catalog.
    pub fn with_catalog(catalog: Catalog) -> Self {
        let dir = TempDir::new().unwrap();
        let cache = ArtifactCache::new(dir.path().join("models"));
        let model = load_or_train(&catalog, Some(&cache), &TrainingConfig::default(), false).unwrap();
        let pipeline = Pipeline::new(Arc::new(catalog), Arc::new(model), DEFAULT_CONFIDENCE_THRESHOLD);
        let transcript = CsvTranscript::new(dir.path().join("chat_log.csv"));
        Self::from_parts(dir, AppState::new(Arc::new(pipeline), Arc::new(transcript)))
    }

    /// Wrap a prepared state.
    pub fn from_parts(dir: TempDir, state: AppState) -> Self {
        let router = build_router(state.clone());
        Self { dir, state, router }
    }

    pub fn transcript_path(&self) -> PathBuf {
        self.dir.path().join("chat_log.csv")
    }

    /// Send one turn (POST /api/v1/chat).
    /// Returns (HTTP status code, response JSON body).
    pub async fn chat(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut body = serde_json::json!({ "message": message });
        if let Some(id) = session_id {
            body["session_id"] = serde_json::Value::String(id.to_string());
        }
        self.send(
            Request::post("/api/v1/chat")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
    }

    /// Start a session (POST /api/v1/sessions) and return its ID.
    pub async fn start_session(&self) -> String {
        let (status, json) = self
            .send(Request::post("/api/v1/sessions").body(Body::empty()).unwrap())
            .await;
        assert_eq!(status, StatusCode::CREATED);
        json["session_id"].as_str().unwrap().to_string()
    }

    /// End a session (DELETE /api/v1/sessions/{id}).
    pub async fn end_session(&self, session_id: &str) -> StatusCode {
        let url = format!("/api/v1/sessions/{session_id}");
        self.send(Request::delete(&url).body(Body::empty()).unwrap())
            .await
            .0
    }

    /// GET any path.
    pub async fn get(&self, url: &str) -> (StatusCode, serde_json::Value) {
        self.send(Request::get(url).body(Body::empty()).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
