//! Classifier training and the load-or-retrain startup path.

use std::time::Instant;

use ib_protocol::intent::Catalog;

use crate::cache::{ArtifactCache, catalog_fingerprint};
use crate::error::{CacheError, ClassifierError, ClassifierResult};
use crate::logistic::{LogisticRegression, TrainingConfig};
use crate::model::TrainedModel;
use crate::vectorizer::TfidfVectorizer;

/// Fit the vector space model and classifier on every `(pattern, tag)` pair.
pub fn train(catalog: &Catalog, config: &TrainingConfig) -> ClassifierResult<TrainedModel> {
    let pairs = catalog.training_pairs();
    if pairs.is_empty() {
        return Err(ClassifierError::EmptyTrainingSet);
    }

    let started = Instant::now();

    // Classes in order of first appearance.
    let mut classes: Vec<String> = Vec::new();
    let mut labels = Vec::with_capacity(pairs.len());
    for (_, tag) in &pairs {
        let index = match classes.iter().position(|c| c == tag) {
            Some(i) => i,
            None => {
                classes.push((*tag).to_string());
                classes.len() - 1
            }
        };
        labels.push(index);
    }

    let patterns: Vec<&str> = pairs.iter().map(|(p, _)| *p).collect();
    let vectorizer = TfidfVectorizer::fit(&patterns)?;
    let samples: Vec<_> = patterns.iter().map(|p| vectorizer.transform(p)).collect();
    let classifier =
        LogisticRegression::fit(&samples, &labels, classes, vectorizer.dimensions(), config)?;

    let model = TrainedModel::new(vectorizer, classifier)?;
    tracing::info!(
        patterns = pairs.len(),
        tags = model.tags().len(),
        features = model.vectorizer().dimensions(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "classifier trained"
    );
    Ok(model)
}

/// Load cached artifacts for this catalog, or retrain and overwrite them.
///
/// Any cache failure leads to a full retrain; a failure to save the new
/// artifacts is logged and otherwise ignored.
pub fn load_or_train(
    catalog: &Catalog,
    cache: Option<&ArtifactCache>,
    config: &TrainingConfig,
    force_retrain: bool,
) -> ClassifierResult<TrainedModel> {
    let Some(cache) = cache else {
        return train(catalog, config);
    };

    let fingerprint = catalog_fingerprint(catalog);

    if force_retrain {
        tracing::info!("retrain requested, ignoring cached artifacts");
    } else {
        match cache.load(&fingerprint) {
            Ok(model) => {
                tracing::info!(dir = %cache.dir().display(), "loaded cached classifier");
                return Ok(model);
            }
            Err(CacheError::Missing(path)) => {
                tracing::info!(path = %path.display(), "no cached classifier, training");
            }
            Err(e) => {
                tracing::warn!(error = %e, "cached classifier unusable, retraining");
                cache.clear();
            }
        }
    }

    let model = train(catalog, config)?;
    if let Err(e) = cache.save(&model, &fingerprint) {
        tracing::warn!(error = %e, "failed to save trained classifier");
    }
    Ok(model)
}
