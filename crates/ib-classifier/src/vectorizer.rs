//! TF-IDF vector space model.
//!
//! Tokens are lowercase runs of two or more word characters. Weights use the
//! smoothed inverse document frequency `ln((1 + n) / (1 + df)) + 1`, and every
//! vector is L2-normalized. The vocabulary is sorted, so feature indices only
//! depend on the set of training terms.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, ClassifierResult};

static RE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Split text into lowercase terms.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    RE_TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Sparse feature vector: `(index, weight)` pairs sorted by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn from_entries(mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_by_key(|(i, _)| *i);
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dot product with a dense row. Indices past the row's end contribute nothing.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|(i, w)| dense.get(*i).map(|d| d * w))
            .sum()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Scaled to unit L2 norm. A zero vector is returned unchanged.
    pub fn normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > f64::EPSILON {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
        self
    }
}

/// Fitted text-to-vector transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn vocabulary and IDF weights from the training documents.
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> ClassifierResult<Self> {
        if documents.is_empty() {
            return Err(ClassifierError::EmptyTrainingSet);
        }

        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for doc in documents {
            let unique: HashSet<String> = tokenize(doc.as_ref()).into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_default() += 1;
            }
        }

        if document_frequency.is_empty() {
            return Err(ClassifierError::EmptyVocabulary);
        }

        let n = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Ok(Self { vocabulary, idf })
    }

    /// Map text into the fitted space. Unknown terms are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in tokenize(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_default() += 1.0;
            }
        }

        let vector = SparseVector::from_entries(
            counts
                .into_iter()
                .map(|(i, tf)| (i, tf * self.idf[i]))
                .collect(),
        );
        vector.normalized()
    }

    /// Number of features (vocabulary size).
    pub fn dimensions(&self) -> usize {
        self.idf.len()
    }

    /// Index of a term, if it is in the vocabulary.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Check the vocabulary and IDF table agree (used after deserializing).
    pub fn check(&self) -> ClassifierResult<()> {
        if self.vocabulary.len() != self.idf.len() {
            return Err(ClassifierError::Inconsistent(format!(
                "vocabulary has {} terms but idf has {} weights",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }
        if self.vocabulary.values().any(|&i| i >= self.idf.len()) {
            return Err(ClassifierError::Inconsistent(
                "vocabulary index out of range".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_drops_single_characters_and_punctuation() {
        assert_eq!(
            tokenize("Hi! How are you, I'm fine?"),
            vec!["hi", "how", "are", "you", "fine"]
        );
    }

    #[test]
    fn vocabulary_is_sorted() {
        let v = TfidfVectorizer::fit(&["zebra apple", "mango"]).unwrap();
        assert_eq!(v.dimensions(), 3);
        assert_eq!(v.index_of("apple"), Some(0));
        assert_eq!(v.index_of("mango"), Some(1));
        assert_eq!(v.index_of("zebra"), Some(2));
    }

    #[test]
    fn rare_terms_weigh_more() {
        let v = TfidfVectorizer::fit(&["hello world", "hello there", "hello budget"]).unwrap();
        let vec = v.transform("hello budget");
        let hello = v.index_of("hello").unwrap();
        let budget = v.index_of("budget").unwrap();
        let weight = |i: usize| vec.entries().iter().find(|(j, _)| *j == i).unwrap().1;
        assert!(weight(budget) > weight(hello));
    }

    #[test]
    fn transform_is_unit_norm() {
        let v = TfidfVectorizer::fit(&["how do I create a budget", "what is your purpose"]).unwrap();
        let vec = v.transform("create a budget purpose");
        assert!((vec.norm() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_text_is_empty_vector() {
        let v = TfidfVectorizer::fit(&["hello there"]).unwrap();
        assert!(v.transform("qwerty zxcv").is_empty());
        assert!(v.transform("").is_empty());
    }

    #[test]
    fn term_counts_accumulate() {
        let v = TfidfVectorizer::fit(&["bye", "hello"]).unwrap();
        // Repetition does not change the direction of a single-term vector.
        assert_eq!(v.transform("bye bye bye"), v.transform("Bye"));
    }

    #[test]
    fn fit_without_tokens_fails() {
        assert!(matches!(
            TfidfVectorizer::fit(&["a", "?"]),
            Err(ClassifierError::EmptyVocabulary)
        ));
        let empty: [&str; 0] = [];
        assert!(matches!(
            TfidfVectorizer::fit(&empty),
            Err(ClassifierError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn sparse_dot_ignores_out_of_range() {
        let s = SparseVector::from_entries(vec![(2, 0.5), (0, 1.0), (9, 3.0)]);
        assert_eq!(s.entries()[0].0, 0);
        assert!((s.dot(&[2.0, 0.0, 4.0]) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn normalized_scales_to_unit_length() {
        let s = SparseVector::from_entries(vec![(0, 3.0), (1, 4.0)]).normalized();
        assert_eq!(s.entries(), &[(0, 0.6), (1, 0.8)]);
        assert!(SparseVector::default().normalized().is_empty());
    }
}
