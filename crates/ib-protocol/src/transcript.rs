use chrono::Local;
use serde::{Deserialize, Serialize};

/// Timestamp layout used in the transcript log.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One conversational turn: what the user said, what the bot answered, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub user_input: String,
    pub response: String,
    pub timestamp: String,
}

impl TranscriptEntry {
    pub fn new(
        user_input: impl Into<String>,
        response: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            user_input: user_input.into(),
            response: response.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Stamp a turn with the current local time.
    pub fn now(user_input: impl Into<String>, response: impl Into<String>) -> Self {
        Self::new(
            user_input,
            response,
            Local::now().format(TIMESTAMP_FORMAT).to_string(),
        )
    }
}
