//! Intent resolution for chat turns.
//!
//! Two tiers:
//! - **Rules** (exact phrases, arithmetic, name capture): precise, cheap,
//!   and never second-guessed by the classifier.
//! - **Classifier** (TF-IDF + logistic regression): trusted only above the
//!   confidence threshold, otherwise a fixed fallback answer is given.

pub mod arithmetic;
pub mod pipeline;
pub mod rules;

pub use pipeline::{
    CLOSING_LINE, DEFAULT_CONFIDENCE_THRESHOLD, FALLBACK_RESPONSE, Pipeline, Resolution,
};
pub use rules::{RuleKind, RuleLayer, RuleMatch};
