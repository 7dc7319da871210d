//! Mock classifier for testing that serves pre-loaded distributions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::model::{IntentClassifier, Prediction};

/// A classifier that returns a fixed distribution, optionally overridden per input.
pub struct MockClassifier {
    default: Vec<(String, f64)>,
    by_input: HashMap<String, Vec<(String, f64)>>,
    calls: AtomicUsize,
}

impl MockClassifier {
    /// Always answer with `distribution`.
    pub fn new(distribution: Vec<(String, f64)>) -> Self {
        Self {
            default: distribution,
            by_input: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Put `confidence` on `tag` and spread the remainder over `others`.
    pub fn confident(tag: &str, confidence: f64, others: &[&str]) -> Self {
        Self::new(spread(tag, confidence, others))
    }

    /// Answer `input` (exact text) with a different distribution.
    pub fn with_input(mut self, input: impl Into<String>, distribution: Vec<(String, f64)>) -> Self {
        self.by_input.insert(input.into(), distribution);
        self
    }

    /// How many times `classify` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Distribution with `confidence` on `tag` and the rest split evenly over `others`.
pub fn spread(tag: &str, confidence: f64, others: &[&str]) -> Vec<(String, f64)> {
    let rest = if others.is_empty() {
        0.0
    } else {
        (1.0 - confidence) / others.len() as f64
    };
    std::iter::once((tag.to_string(), confidence))
        .chain(others.iter().map(|o| ((*o).to_string(), rest)))
        .collect()
}

impl IntentClassifier for MockClassifier {
    fn classify(&self, text: &str) -> Prediction {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let distribution = self.by_input.get(text).unwrap_or(&self.default).clone();
        Prediction::from_distribution(distribution).unwrap_or_else(|| Prediction {
            tag: String::new(),
            confidence: 0.0,
            distribution: Vec::new(),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
