//! Resolution pipeline: rules first, then the thresholded classifier.
//!
//! Rule matches return immediately and the classifier is never consulted.
//! Otherwise the classifier's top tag is used only when its probability is
//! strictly above the confidence threshold; everything else gets the fixed
//! fallback response.

use std::sync::Arc;

use ib_classifier::IntentClassifier;
use ib_protocol::chat::ResolutionSource;
use ib_protocol::intent::{Catalog, RECALL_NAME_TAG};

use super::rules::RuleLayer;
use crate::session::Session;

/// Minimum (exclusive) classifier probability to trust a predicted tag.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Tag whose resolution ends the conversation politely.
pub const GOODBYE_TAG: &str = "goodbye";

/// Answer when nothing matched with enough confidence.
pub const FALLBACK_RESPONSE: &str = "I'm sorry, I didn't quite get that. \
I can greet you, do arithmetic like 12 * (3 + 4), remember your name if you tell me \
\"my name is ...\", and answer questions about the topics I was trained on.";

/// Closing line shown after a farewell.
pub const CLOSING_LINE: &str = "Thank you for chatting with me. Have a great day!";

/// Outcome of resolving one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub response: String,
    pub source: ResolutionSource,
    /// Tag of the intent that answered, if any.
    pub tag: Option<String>,
    /// Classifier confidence, when the classifier ran.
    pub confidence: Option<f64>,
}

impl Resolution {
    /// True when the user said goodbye (by rule or classifier).
    pub fn is_farewell(&self) -> bool {
        self.tag.as_deref() == Some(GOODBYE_TAG)
    }
}

/// Shared, read-only resolver. One instance serves every conversation.
pub struct Pipeline {
    rules: RuleLayer,
    classifier: Arc<dyn IntentClassifier>,
    catalog: Arc<Catalog>,
    threshold: f64,
}

impl Pipeline {
    pub fn new(catalog: Arc<Catalog>, classifier: Arc<dyn IntentClassifier>, threshold: f64) -> Self {
        Self {
            rules: RuleLayer::new(&catalog),
            classifier,
            catalog,
            threshold,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Resolve one user turn to a response.
    pub fn resolve(&self, raw_input: &str, session: &mut Session) -> Resolution {
        if let Some(m) = self.rules.try_resolve(raw_input, session) {
            let resolution = Resolution {
                response: m.response,
                source: m.kind.source(),
                tag: m.kind.tag().map(String::from),
                confidence: None,
            };
            tracing::debug!(source = ?resolution.source, "resolved by rule");
            return resolution;
        }

        let prediction = self.classifier.classify(raw_input);
        tracing::debug!(
            classifier = self.classifier.name(),
            tag = %prediction.tag,
            confidence = prediction.confidence,
            threshold = self.threshold,
            "classified"
        );

        if prediction.confidence > self.threshold
            && let Some(response) = self.respond_to(&prediction.tag, session)
        {
            return Resolution {
                response,
                source: ResolutionSource::Classifier,
                tag: Some(prediction.tag),
                confidence: Some(prediction.confidence),
            };
        }

        Resolution {
            response: FALLBACK_RESPONSE.to_string(),
            source: ResolutionSource::Fallback,
            tag: None,
            confidence: Some(prediction.confidence),
        }
    }

    fn respond_to(&self, tag: &str, session: &Session) -> Option<String> {
        if tag == RECALL_NAME_TAG
            && let Some(name) = session.get_name()
        {
            return Some(format!("Your name is {name}."));
        }
        let response = self.catalog.first_response(tag);
        if response.is_none() {
            tracing::warn!(tag, "classifier predicted a tag with no catalog response");
        }
        response.map(String::from)
    }
}
