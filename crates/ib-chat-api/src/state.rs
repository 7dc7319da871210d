//! Shared application state for the Axum server.

use std::sync::Arc;

use crate::engine::Pipeline;
use crate::session::SessionStore;
use crate::transcript::{MemoryTranscript, TranscriptSink};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Read-only resolver built at startup.
    pub pipeline: Arc<Pipeline>,
    /// Live conversations.
    pub sessions: SessionStore,
    /// Persistent turn log.
    pub transcript: Arc<dyn TranscriptSink>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>, transcript: Arc<dyn TranscriptSink>) -> Self {
        Self {
            pipeline,
            sessions: SessionStore::new(),
            transcript,
        }
    }

    /// Replace the session store (e.g. to set a different idle TTL).
    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    /// State that keeps the transcript in memory (tests and throwaway runs).
    pub fn in_memory(pipeline: Arc<Pipeline>) -> Self {
        Self::new(pipeline, Arc::new(MemoryTranscript::new()))
    }
}
