use serde::{Deserialize, Serialize};

/// Tag of the reserved intent that answers "what is my name?".
pub const RECALL_NAME_TAG: &str = "recall_name";

/// A labeled category of user meaning with example phrases and replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// Unique identifier (e.g., "greeting", "budget").
    pub tag: String,
    /// Example user phrases used for training, in catalog order.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Candidate replies; the first one is the canonical answer.
    #[serde(default)]
    pub responses: Vec<String>,
}

impl Intent {
    pub fn new(
        tag: impl Into<String>,
        patterns: impl IntoIterator<Item = impl Into<String>>,
        responses: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            tag: tag.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
            responses: responses.into_iter().map(Into::into).collect(),
        }
    }

    /// The canonical (first registered) response.
    pub fn first_response(&self) -> Option<&str> {
        self.responses.first().map(String::as_str)
    }
}

/// Immutable, ordered collection of intents loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub intents: Vec<Intent>,
}

impl Catalog {
    pub fn new(intents: Vec<Intent>) -> Self {
        Self { intents }
    }

    /// Look up an intent by tag.
    pub fn get(&self, tag: &str) -> Option<&Intent> {
        self.intents.iter().find(|i| i.tag == tag)
    }

    /// First registered response for `tag`, if the tag exists and has one.
    pub fn first_response(&self, tag: &str) -> Option<&str> {
        self.get(tag).and_then(Intent::first_response)
    }

    /// Flattened `(pattern, tag)` pairs in catalog order.
    pub fn training_pairs(&self) -> Vec<(&str, &str)> {
        self.intents
            .iter()
            .flat_map(|i| i.patterns.iter().map(|p| (p.as_str(), i.tag.as_str())))
            .collect()
    }

    /// Total number of patterns across all intents.
    pub fn pattern_count(&self) -> usize {
        self.intents.iter().map(|i| i.patterns.len()).sum()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.intents.iter().map(|i| i.tag.as_str())
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}
