//! The detector service: the single owner of trained-model state.
//!
//! `SpamDetector` is constructed once at process start and passed by
//! reference to whatever calls into the core (CLI, HTTP handlers, tests).
//! The trained (vectorizer, model) pair lives in an immutable
//! `ModelSnapshot` behind an `Arc`; readers clone the `Arc` out of a short
//! lock and run inference without any lock held, and retraining publishes a
//! brand-new snapshot with one pointer swap. In-flight requests keep the
//! old snapshot alive; nobody ever observes a partially-trained model.

use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

use crate::calibrate::calibrate;
use crate::config::TrainConfig;
use crate::dataset::{read_labeled_csv, split_indices, Label, TrainingExample};
use crate::error::{Result, SpamError};
use crate::explain::{explain, Explanation};
use crate::math::SparseVector;
use crate::metrics::{evaluate, Metrics};
use crate::models::{train_linear, Model};
use crate::store;
use crate::vectorizer::TfidfVectorizer;

use serde::{Deserialize, Serialize};

/// An immutable trained pair. The vectorizer and model are created together
/// and only ever replaced together.
#[derive(Debug)]
pub struct ModelSnapshot {
    pub vectorizer: TfidfVectorizer,
    pub model: Model,
}

/// Classification result for one input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub text: String,
    pub label: Label,
    /// Logistic squash of the raw margin, strictly inside (0, 1). A
    /// confidence-like ordering score, not a calibrated probability.
    pub confidence: f64,
}

/// Prediction plus ranked per-term contributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainedPrediction {
    pub text: String,
    pub label: Label,
    pub confidence: f64,
    pub explanation: Explanation,
    /// Plain-language note about the leading spam terms, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Spam/ham detector owning the trained-model lifecycle.
pub struct SpamDetector {
    current: RwLock<Option<Arc<ModelSnapshot>>>,
    last_metrics: Mutex<Option<Metrics>>,
}

impl SpamDetector {
    /// An empty detector; every inference call fails with `NotTrained`
    /// until `train` or `load_artifacts` succeeds.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            last_metrics: Mutex::new(None),
        }
    }

    /// Build a detector and try to restore a previously saved pair.
    ///
    /// Any load failure degrades to the untrained state with a warning;
    /// it must never take the host process down.
    pub fn with_artifacts<P: AsRef<Path>, Q: AsRef<Path>>(
        vectorizer_path: P,
        model_path: Q,
    ) -> Self {
        let detector = Self::new();
        match detector.load_artifacts(vectorizer_path, model_path) {
            Ok(true) => {}
            Ok(false) => log::info!("no saved model found; detector starts untrained"),
            Err(e) => log::warn!("could not load saved model ({}); starting untrained", e),
        }
        detector
    }

    /// Whether a trained snapshot is currently published.
    pub fn is_ready(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Train a new model and publish it, replacing any previous snapshot.
    ///
    /// Fits the vectorizer on the full corpus, splits deterministically by
    /// `config.seed`, fits the linear separator on the training portion,
    /// and evaluates on the held-out portion. Returns the metrics of this
    /// run (also retrievable via [`SpamDetector::metrics`] until the next
    /// run overwrites them).
    pub fn train(&self, examples: &[TrainingExample], config: &TrainConfig) -> Result<Metrics> {
        if examples.is_empty() {
            return Err(SpamError::InvalidInput(
                "training requires at least one example".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&config.test_fraction) {
            return Err(SpamError::InvalidInput(format!(
                "test_fraction must be in [0, 1), got {}",
                config.test_fraction
            )));
        }

        let texts: Vec<&str> = examples.iter().map(|e| e.text.as_str()).collect();

        let mut vectorizer = TfidfVectorizer::new().with_max_features(config.max_features);
        vectorizer.fit(&texts)?;
        let dim = vectorizer.vocabulary()?.len();

        let vectors: Vec<SparseVector> = texts
            .iter()
            .map(|t| vectorizer.transform(t))
            .collect::<Result<_>>()?;

        let (train_idx, test_idx) = split_indices(examples.len(), config.test_fraction, config.seed);
        if train_idx.is_empty() {
            return Err(SpamError::InvalidInput(
                "the split left no training examples; lower test_fraction".to_string(),
            ));
        }

        let x_train: Vec<SparseVector> = train_idx.iter().map(|&i| vectors[i].clone()).collect();
        let y_train: Vec<f64> = train_idx.iter().map(|&i| examples[i].label.signed()).collect();

        log::info!(
            "training on {} examples ({} held out), vocabulary of {} terms, C={}",
            x_train.len(),
            test_idx.len(),
            dim,
            config.c
        );

        let model = Model::Linear(train_linear(
            &x_train,
            &y_train,
            dim,
            config.c,
            config.epochs,
            config.seed,
        ));

        let y_true: Vec<Label> = test_idx.iter().map(|&i| examples[i].label).collect();
        let y_pred: Vec<Label> = test_idx
            .iter()
            .map(|&i| model.predict(&vectors[i]).0)
            .collect();
        let metrics = evaluate(&y_true, &y_pred);

        log::info!(
            "held-out accuracy {:.4}, precision {:.4}, recall {:.4}, f1 {:.4}",
            metrics.accuracy,
            metrics.precision,
            metrics.recall,
            metrics.f1
        );

        self.publish(ModelSnapshot { vectorizer, model });
        *lock(&self.last_metrics) = Some(metrics.clone());
        Ok(metrics)
    }

    /// Load a training CSV (columns `text`, `label`) and train on it.
    pub fn train_from_csv<P: AsRef<Path>>(
        &self,
        csv_path: P,
        config: &TrainConfig,
    ) -> Result<Metrics> {
        let examples = read_labeled_csv(csv_path)?;
        self.train(&examples, config)
    }

    /// Classify one text. The input is trimmed first; empty input is
    /// rejected rather than classified.
    pub fn predict(&self, text: &str) -> Result<Prediction> {
        let (snapshot, trimmed) = self.inference_input(text)?;
        let vector = snapshot.vectorizer.transform(trimmed)?;
        let (label, margin) = snapshot.model.predict(&vector);
        Ok(Prediction {
            text: trimmed.to_string(),
            label,
            confidence: calibrate(margin),
        })
    }

    /// Classify one text and attribute the decision to its terms.
    pub fn predict_with_explanation(
        &self,
        text: &str,
        top_terms: usize,
    ) -> Result<ExplainedPrediction> {
        let (snapshot, trimmed) = self.inference_input(text)?;
        let vector = snapshot.vectorizer.transform(trimmed)?;
        let (label, margin) = snapshot.model.predict(&vector);
        let explanation = explain(trimmed, &snapshot.vectorizer, &snapshot.model, top_terms)?;
        let summary = explanation.spam_summary(label);
        Ok(ExplainedPrediction {
            text: trimmed.to_string(),
            label,
            confidence: calibrate(margin),
            explanation,
            summary,
        })
    }

    /// Metrics of the most recent training run, if any. Not persisted.
    pub fn metrics(&self) -> Option<Metrics> {
        lock(&self.last_metrics).clone()
    }

    /// Persist the current snapshot as an artifact pair.
    pub fn save<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        vectorizer_path: P,
        model_path: Q,
    ) -> Result<()> {
        let snapshot = self.snapshot().ok_or(SpamError::NotTrained)?;
        store::save(
            &snapshot.vectorizer,
            &snapshot.model,
            vectorizer_path,
            model_path,
        )
    }

    /// Restore a saved pair and publish it. Returns false when neither
    /// artifact exists (the ordinary first-run case).
    pub fn load_artifacts<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        vectorizer_path: P,
        model_path: Q,
    ) -> Result<bool> {
        match store::load(vectorizer_path, model_path)? {
            Some((vectorizer, model)) => {
                self.publish(ModelSnapshot { vectorizer, model });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// The current snapshot, cloned out of the lock so callers never hold
    /// it during inference.
    pub fn snapshot(&self) -> Option<Arc<ModelSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn publish(&self, snapshot: ModelSnapshot) {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = Some(Arc::new(snapshot));
    }

    fn inference_input<'a>(&self, text: &'a str) -> Result<(Arc<ModelSnapshot>, &'a str)> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SpamError::InvalidInput(
                "text must be non-empty".to_string(),
            ));
        }
        let snapshot = self.snapshot().ok_or(SpamError::NotTrained)?;
        Ok((snapshot, trimmed))
    }
}

impl Default for SpamDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
