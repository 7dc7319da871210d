//! Intent classification for intentbot.
//!
//! Loads the intent catalog from an ordered list of candidate paths, builds a
//! TF-IDF vector space from the catalog's patterns, fits a multinomial
//! logistic regression over it, and caches the trained artifacts on disk so
//! process restarts skip retraining while the catalog is unchanged.

pub mod cache;
pub mod catalog;
pub mod error;
pub mod logistic;
pub mod mock;
pub mod model;
pub mod trainer;
pub mod vectorizer;

// Re-export key types for convenience
pub use cache::{ArtifactCache, catalog_fingerprint};
pub use catalog::{default_candidates, load_catalog};
pub use error::{CacheError, CatalogError, ClassifierError};
pub use logistic::{LogisticRegression, TrainingConfig};
pub use mock::MockClassifier;
pub use model::{IntentClassifier, Prediction, TrainedModel};
pub use trainer::{load_or_train, train};
pub use vectorizer::{SparseVector, TfidfVectorizer};
