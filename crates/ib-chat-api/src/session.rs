//! Per-conversation memory and the store that owns live conversations.
//!
//! Each session sits behind its own mutex, so turns within one conversation
//! run strictly one after another while separate conversations never block
//! each other.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use ib_protocol::chat::SessionInfo;
use ib_protocol::transcript::TranscriptEntry;

/// State for a single conversation.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    remembered_name: Option<String>,
    transcript: Vec<TranscriptEntry>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            started_at: Utc::now(),
            remembered_name: None,
            transcript: Vec::new(),
        }
    }

    /// The remembered user name, if one was given.
    pub fn get_name(&self) -> Option<&str> {
        self.remembered_name.as_deref()
    }

    /// Remember `name`, replacing any earlier one.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.remembered_name = Some(name.into());
    }

    pub fn record(&mut self, entry: TranscriptEntry) {
        self.transcript.push(entry);
    }

    /// Turns in chronological order.
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.id,
            started_at: self.started_at,
            turns: self.transcript.len(),
            remembered_name: self.remembered_name.clone(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

/// Idle time after which a conversation is forgotten by default.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

struct Slot {
    session: SharedSession,
    last_active: Instant,
}

/// Live conversations keyed by session ID.
///
/// Sessions not touched for longer than the idle TTL are evicted whenever
/// the store is accessed.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Slot>>>,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_idle_ttl(DEFAULT_IDLE_TTL)
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    /// Start a new conversation.
    pub async fn create(&self) -> (Uuid, SharedSession) {
        let session = Session::new();
        let id = session.id;
        let shared = Arc::new(Mutex::new(session));

        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions);
        sessions.insert(
            id,
            Slot {
                session: shared.clone(),
                last_active: Instant::now(),
            },
        );
        tracing::debug!(session_id = %id, "session started");
        (id, shared)
    }

    /// Look up a live conversation and mark it active.
    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions);
        let slot = sessions.get_mut(&id)?;
        slot.last_active = Instant::now();
        Some(slot.session.clone())
    }

    /// Continue `id` if given (None when unknown), otherwise start a new one.
    pub async fn get_or_create(&self, id: Option<Uuid>) -> Option<(Uuid, SharedSession)> {
        match id {
            Some(id) => self.get(id).await.map(|s| (id, s)),
            None => Some(self.create().await),
        }
    }

    /// End a conversation, discarding its memory. Returns false if unknown.
    pub async fn end(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::debug!(session_id = %id, "session ended");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn evict_idle(&self, sessions: &mut HashMap<Uuid, Slot>) {
        let before = sessions.len();
        sessions.retain(|_, slot| slot.last_active.elapsed() <= self.idle_ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = sessions.len(), "idle sessions evicted");
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
