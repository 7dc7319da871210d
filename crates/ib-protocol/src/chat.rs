use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One user turn submitted to the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Free-text user input (one line).
    pub message: String,
    /// Conversation to continue. A new one is started when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
}

/// Which layer of the resolution pipeline produced the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Exact-phrase greeting rule.
    RuleGreeting,
    /// Exact-phrase goodbye rule.
    RuleGoodbye,
    /// Exact-phrase thanks rule.
    RuleThanks,
    /// Built-in arithmetic evaluator.
    Arithmetic,
    /// "my name is X" style introduction.
    NameCapture,
    /// Statistical classifier above the confidence threshold.
    Classifier,
    /// Nothing matched with enough confidence.
    Fallback,
}

impl ResolutionSource {
    /// True for every source produced by the rule layer.
    pub fn is_rule(self) -> bool {
        !matches!(self, Self::Classifier | Self::Fallback)
    }
}

/// The bot's answer to a single turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub session_id: Uuid,
    /// Response text shown to the user.
    pub response: String,
    pub source: ResolutionSource,
    /// Intent tag when one was resolved (rules or classifier).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Classifier confidence for the top tag, when the classifier ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Transcript timestamp of this turn.
    pub timestamp: String,
    /// Closing line appended after a farewell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing: Option<String>,
}

/// Summary of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Number of turns so far.
    #[serde(default)]
    pub turns: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remembered_name: Option<String>,
}
