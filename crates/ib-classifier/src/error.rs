//! Classifier, catalog and cache error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while locating and validating the intent catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no intent catalog found (searched: {})", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("intent catalog contains no patterns")]
    Empty,

    #[error("duplicate intent tag: {0}")]
    DuplicateTag(String),

    #[error("intent '{0}' has no responses")]
    NoResponses(String),
}

/// Errors raised while training or evaluating the classifier.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("vocabulary is empty: no pattern contains a token of two or more characters")]
    EmptyVocabulary,

    #[error("model is inconsistent: {0}")]
    Inconsistent(String),
}

/// Errors raised while loading or saving trained artifacts.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("artifact missing: {0}")]
    Missing(PathBuf),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("corrupt artifact {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("artifact format version {found}, expected {expected}")]
    Version { found: u32, expected: u32 },

    #[error("artifact was trained on a different catalog")]
    StaleFingerprint,

    #[error(transparent)]
    Model(#[from] ClassifierError),
}

/// Convenience aliases.
pub type CatalogResult<T> = Result<T, CatalogError>;
pub type ClassifierResult<T> = Result<T, ClassifierError>;
pub type CacheResult<T> = Result<T, CacheError>;

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
