//! Multinomial logistic regression over sparse TF-IDF vectors.

use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, ClassifierResult};
use crate::vectorizer::SparseVector;

/// Gradient-descent settings for fitting the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Step size for full-batch gradient descent.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Upper bound on gradient steps.
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    /// L2 penalty on the weights (intercepts are not penalized).
    #[serde(default = "default_l2")]
    pub l2: f64,
    /// Stop once every gradient component is below this magnitude.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_learning_rate() -> f64 {
    2.0
}
fn default_max_iter() -> usize {
    2000
}
fn default_l2() -> f64 {
    1e-4
}
fn default_tolerance() -> f64 {
    1e-6
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            max_iter: default_max_iter(),
            l2: default_l2(),
            tolerance: default_tolerance(),
        }
    }
}

/// Fitted softmax classifier: one weight row and intercept per class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    classes: Vec<String>,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl LogisticRegression {
    /// Fit on `samples` labelled by index into `classes`.
    ///
    /// Weights start at zero and every step uses the whole training set in
    /// order, so the same inputs always produce the same model.
    pub fn fit(
        samples: &[SparseVector],
        labels: &[usize],
        classes: Vec<String>,
        dimensions: usize,
        config: &TrainingConfig,
    ) -> ClassifierResult<Self> {
        if samples.is_empty() || classes.is_empty() {
            return Err(ClassifierError::EmptyTrainingSet);
        }
        if samples.len() != labels.len() {
            return Err(ClassifierError::Inconsistent(format!(
                "{} samples but {} labels",
                samples.len(),
                labels.len()
            )));
        }
        if let Some(bad) = labels.iter().find(|&&l| l >= classes.len()) {
            return Err(ClassifierError::Inconsistent(format!(
                "label {bad} out of range for {} classes",
                classes.len()
            )));
        }

        let k = classes.len();
        let n = samples.len() as f64;
        let mut model = Self {
            classes,
            weights: vec![vec![0.0; dimensions]; k],
            intercepts: vec![0.0; k],
        };

        let mut iterations = 0;
        let mut converged = false;
        while iterations < config.max_iter {
            iterations += 1;
            let mut grad_w = vec![vec![0.0; dimensions]; k];
            let mut grad_b = vec![0.0; k];

            for (x, &label) in samples.iter().zip(labels) {
                let probs = model.predict_proba(x);
                for (c, p) in probs.iter().enumerate() {
                    let g = p - if c == label { 1.0 } else { 0.0 };
                    grad_b[c] += g;
                    for &(j, v) in x.entries() {
                        if j < dimensions {
                            grad_w[c][j] += g * v;
                        }
                    }
                }
            }

            let mut largest: f64 = 0.0;
            for c in 0..k {
                grad_b[c] /= n;
                largest = largest.max(grad_b[c].abs());
                model.intercepts[c] -= config.learning_rate * grad_b[c];
                for j in 0..dimensions {
                    let g = grad_w[c][j] / n + config.l2 * model.weights[c][j];
                    largest = largest.max(g.abs());
                    model.weights[c][j] -= config.learning_rate * g;
                }
            }

            if largest < config.tolerance {
                converged = true;
                break;
            }
        }

        tracing::debug!(
            classes = k,
            dimensions,
            samples = samples.len(),
            iterations,
            converged,
            "logistic regression fitted"
        );
        Ok(model)
    }

    /// Probability for each class, in `classes()` order. Sums to 1.
    pub fn predict_proba(&self, x: &SparseVector) -> Vec<f64> {
        let logits: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.intercepts)
            .map(|(w, b)| b + x.dot(w))
            .collect();
        softmax(&logits)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Validate shapes against the vectorizer's dimensionality.
    pub fn check(&self, dimensions: usize) -> ClassifierResult<()> {
        if self.classes.is_empty() {
            return Err(ClassifierError::Inconsistent("no classes".into()));
        }
        if self.weights.len() != self.classes.len() || self.intercepts.len() != self.classes.len() {
            return Err(ClassifierError::Inconsistent(format!(
                "{} classes, {} weight rows, {} intercepts",
                self.classes.len(),
                self.weights.len(),
                self.intercepts.len()
            )));
        }
        if self.weights.iter().any(|row| row.len() != dimensions) {
            return Err(ClassifierError::Inconsistent(format!(
                "weight rows do not match {dimensions} features"
            )));
        }
        Ok(())
    }
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
