use serde::{Deserialize, Serialize};

/// Central training configuration.
///
/// All fields have documented defaults; changing `seed` changes which
/// examples land in the held-out split and therefore the reported metrics,
/// reproducibly.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct TrainConfig {
    /// Fraction of examples held out for evaluation.
    pub test_fraction: f32,
    /// RNG seed for the split and the solver's per-epoch shuffles.
    pub seed: u64,
    /// Soft-margin regularization constant.
    pub c: f64,
    /// Number of passes the subgradient solver makes over the training set.
    pub epochs: usize,
    /// How many terms an explanation keeps.
    pub top_terms: usize,
    /// Optional cap on vocabulary size (highest document frequency wins).
    pub max_features: Option<usize>,
}

impl TrainConfig {
    pub fn new(test_fraction: f32, seed: u64, c: f64) -> Self {
        Self {
            test_fraction,
            seed,
            c,
            ..Self::default()
        }
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.3,
            seed: 42,
            c: 1.0,
            epochs: 200,
            top_terms: 10,
            max_features: None,
        }
    }
}
