//! Trained model and the classifier abstraction used by the resolution pipeline.

use serde::Serialize;

use crate::error::ClassifierResult;
use crate::logistic::LogisticRegression;
use crate::vectorizer::TfidfVectorizer;

/// Result of classifying one input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Most probable tag (first in class order on ties).
    pub tag: String,
    /// Probability of `tag`.
    pub confidence: f64,
    /// Full distribution over tags, in class order.
    pub distribution: Vec<(String, f64)>,
}

impl Prediction {
    /// Build from a distribution. Returns `None` when it is empty.
    pub fn from_distribution(distribution: Vec<(String, f64)>) -> Option<Self> {
        let (tag, confidence) = distribution
            .iter()
            .fold(None::<(&String, f64)>, |best, (tag, p)| match best {
                Some((_, bp)) if bp >= *p => best,
                _ => Some((tag, *p)),
            })
            .map(|(t, p)| (t.clone(), p))?;
        Some(Self {
            tag,
            confidence,
            distribution,
        })
    }

    /// Probability assigned to `tag`, zero if unknown.
    pub fn probability_of(&self, tag: &str) -> f64 {
        self.distribution
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, p)| *p)
            .unwrap_or(0.0)
    }
}

/// Maps free text to a probability distribution over intent tags.
///
/// Implementations are read-only after construction so a single instance can
/// be shared by every conversation.
pub trait IntentClassifier: Send + Sync {
    /// Classify `text`. Always yields a distribution over every known tag.
    fn classify(&self, text: &str) -> Prediction;

    /// Name of this classifier (for logging).
    fn name(&self) -> &str;
}

/// Fitted vector space model plus classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    vectorizer: TfidfVectorizer,
    classifier: LogisticRegression,
}

impl TrainedModel {
    /// Pair a vectorizer with a classifier, checking their shapes agree.
    pub fn new(vectorizer: TfidfVectorizer, classifier: LogisticRegression) -> ClassifierResult<Self> {
        vectorizer.check()?;
        classifier.check(vectorizer.dimensions())?;
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.classifier
    }

    pub fn tags(&self) -> &[String] {
        self.classifier.classes()
    }
}

impl IntentClassifier for TrainedModel {
    fn classify(&self, text: &str) -> Prediction {
        let vector = self.vectorizer.transform(text);
        let probs = self.classifier.predict_proba(&vector);
        let distribution = self
            .classifier
            .classes()
            .iter()
            .cloned()
            .zip(probs)
            .collect();
        // The classifier always has at least one class (checked in `new`).
        Prediction::from_distribution(distribution).unwrap_or_else(|| Prediction {
            tag: String::new(),
            confidence: 0.0,
            distribution: Vec::new(),
        })
    }

    fn name(&self) -> &str {
        "tfidf-logistic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_tag_is_highest_probability() {
        let p = Prediction::from_distribution(vec![
            ("a".into(), 0.2),
            ("b".into(), 0.5),
            ("c".into(), 0.3),
        ])
        .unwrap();
        assert_eq!(p.tag, "b");
        assert!((p.confidence - 0.5).abs() < 1e-12);
        assert!((p.probability_of("c") - 0.3).abs() < 1e-12);
        assert_eq!(p.probability_of("zzz"), 0.0);
    }

    #[test]
    fn ties_keep_first_class() {
        let p = Prediction::from_distribution(vec![("x".into(), 0.5), ("y".into(), 0.5)]).unwrap();
        assert_eq!(p.tag, "x");
    }

    #[test]
    fn empty_distribution_has_no_prediction() {
        assert!(Prediction::from_distribution(Vec::new()).is_none());
    }
}
