//! On-disk cache of trained artifacts, keyed by catalog fingerprint.
//!
//! Two JSON blobs live in the model directory: the vectorizer and the
//! classifier. Each is wrapped with a format version and the fingerprint of
//! the catalog it was trained on; anything that does not match exactly is
//! reported as an error so the caller retrains instead of reading stale data.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use ib_protocol::intent::Catalog;

use crate::error::{CacheError, CacheResult};
use crate::logistic::LogisticRegression;
use crate::model::TrainedModel;
use crate::vectorizer::TfidfVectorizer;

/// Bumped whenever the serialized model layout changes.
pub const FORMAT_VERSION: u32 = 1;

const VECTORIZER_FILE: &str = "vectorizer.json";
const CLASSIFIER_FILE: &str = "classifier.json";

#[derive(Serialize, Deserialize)]
struct Artifact<T> {
    format_version: u32,
    catalog_fingerprint: String,
    payload: T,
}

/// SHA-256 of the catalog contents (tags, patterns and responses, in order).
pub fn catalog_fingerprint(catalog: &Catalog) -> String {
    let mut hasher = Sha256::new();
    for intent in &catalog.intents {
        hash_field(&mut hasher, &intent.tag);
        hasher.update((intent.patterns.len() as u64).to_le_bytes());
        for p in &intent.patterns {
            hash_field(&mut hasher, p);
        }
        hasher.update((intent.responses.len() as u64).to_le_bytes());
        for r in &intent.responses {
            hash_field(&mut hasher, r);
        }
    }
    format!("{:x}", hasher.finalize())
}

fn hash_field(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

/// Directory holding the cached vectorizer and classifier.
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    dir: PathBuf,
}

impl ArtifactCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn vectorizer_path(&self) -> PathBuf {
        self.dir.join(VECTORIZER_FILE)
    }

    pub fn classifier_path(&self) -> PathBuf {
        self.dir.join(CLASSIFIER_FILE)
    }

    /// Load both artifacts, requiring they were trained on `fingerprint`.
    pub fn load(&self, fingerprint: &str) -> CacheResult<TrainedModel> {
        let vectorizer: TfidfVectorizer = read_artifact(&self.vectorizer_path(), fingerprint)?;
        let classifier: LogisticRegression = read_artifact(&self.classifier_path(), fingerprint)?;
        Ok(TrainedModel::new(vectorizer, classifier)?)
    }

    /// Write both artifacts, replacing whatever is there.
    pub fn save(&self, model: &TrainedModel, fingerprint: &str) -> CacheResult<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| CacheError::Io(format!("{}: {e}", self.dir.display())))?;
        write_artifact(&self.vectorizer_path(), fingerprint, model.vectorizer())?;
        write_artifact(&self.classifier_path(), fingerprint, model.classifier())?;
        tracing::debug!(dir = %self.dir.display(), "trained artifacts saved");
        Ok(())
    }

    /// Remove both artifacts, ignoring files that are already gone.
    pub fn clear(&self) {
        for path in [self.vectorizer_path(), self.classifier_path()] {
            if let Err(e) = std::fs::remove_file(&path)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove stale artifact");
            }
        }
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path, fingerprint: &str) -> CacheResult<T> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CacheError::Missing(path.to_path_buf())
        } else {
            CacheError::Io(format!("{}: {e}", path.display()))
        }
    })?;

    let artifact: Artifact<T> = serde_json::from_slice(&bytes).map_err(|e| CacheError::Corrupt {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if artifact.format_version != FORMAT_VERSION {
        return Err(CacheError::Version {
            found: artifact.format_version,
            expected: FORMAT_VERSION,
        });
    }
    if artifact.catalog_fingerprint != fingerprint {
        return Err(CacheError::StaleFingerprint);
    }
    Ok(artifact.payload)
}

fn write_artifact<T: Serialize>(path: &Path, fingerprint: &str, payload: &T) -> CacheResult<()> {
    let artifact = Artifact {
        format_version: FORMAT_VERSION,
        catalog_fingerprint: fingerprint.to_string(),
        payload,
    };
    let bytes = serde_json::to_vec(&artifact).map_err(|e| CacheError::Io(e.to_string()))?;
    std::fs::write(path, bytes).map_err(|e| CacheError::Io(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logistic::TrainingConfig;
    use crate::trainer::train;
    use ib_protocol::intent::Intent;
    use tempfile::TempDir;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Intent::new("greeting", ["Hi", "Hello"], ["Hello!"]),
            Intent::new("goodbye", ["Bye", "See you later"], ["Goodbye!"]),
        ])
    }

    fn saved(dir: &TempDir) -> (ArtifactCache, TrainedModel, String) {
        let cache = ArtifactCache::new(dir.path().join("models"));
        let model = train(&catalog(), &TrainingConfig::default()).unwrap();
        let fp = catalog_fingerprint(&catalog());
        cache.save(&model, &fp).unwrap();
        (cache, model, fp)
    }

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        let a = catalog_fingerprint(&catalog());
        assert_eq!(a, catalog_fingerprint(&catalog()));
        assert_eq!(a.len(), 64);

        let mut changed = catalog();
        changed.intents[0].responses[0] = "Hey!".into();
        assert_ne!(a, catalog_fingerprint(&changed));
    }

    #[test]
    fn fingerprint_separates_field_boundaries() {
        let a = Catalog::new(vec![Intent::new("ab", ["c"], ["x"])]);
        let b = Catalog::new(vec![Intent::new("a", ["bc"], ["x"])]);
        assert_ne!(catalog_fingerprint(&a), catalog_fingerprint(&b));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let (cache, model, fp) = saved(&dir);
        assert_eq!(cache.load(&fp).unwrap(), model);
    }

    #[test]
    fn missing_artifacts() {
        let dir = TempDir::new().unwrap();
        let cache = ArtifactCache::new(dir.path());
        assert!(matches!(cache.load("abc"), Err(CacheError::Missing(_))));
    }

    #[test]
    fn corrupt_artifact() {
        let dir = TempDir::new().unwrap();
        let (cache, _, fp) = saved(&dir);
        std::fs::write(cache.vectorizer_path(), b"{\"format_version\": 1").unwrap();
        assert!(matches!(cache.load(&fp), Err(CacheError::Corrupt { .. })));
    }

    #[test]
    fn wrong_fingerprint_is_stale() {
        let dir = TempDir::new().unwrap();
        let (cache, _, _) = saved(&dir);
        assert!(matches!(cache.load("other"), Err(CacheError::StaleFingerprint)));
    }

    #[test]
    fn version_mismatch() {
        let dir = TempDir::new().unwrap();
        let (cache, _, fp) = saved(&dir);
        let raw = std::fs::read_to_string(cache.classifier_path()).unwrap();
        let mut json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        json["format_version"] = serde_json::json!(99);
        std::fs::write(cache.classifier_path(), json.to_string()).unwrap();

        assert!(matches!(
            cache.load(&fp),
            Err(CacheError::Version { found: 99, expected: FORMAT_VERSION })
        ));
    }

    #[test]
    fn mismatched_shapes_are_model_errors() {
        let dir = TempDir::new().unwrap();
        let (cache, _, fp) = saved(&dir);

        // Pair the saved classifier with a vectorizer of a different size.
        let other = TfidfVectorizer::fit(&["one two three four five six seven"]).unwrap();
        write_artifact(&cache.vectorizer_path(), &fp, &other).unwrap();
        assert!(matches!(cache.load(&fp), Err(CacheError::Model(_))));
    }

    #[test]
    fn clear_removes_both_files() {
        let dir = TempDir::new().unwrap();
        let (cache, _, _) = saved(&dir);
        cache.clear();
        assert!(!cache.vectorizer_path().exists());
        assert!(!cache.classifier_path().exists());
        // Clearing again is harmless.
        cache.clear();
    }
}
