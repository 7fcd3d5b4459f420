//! Soft-margin linear separator trained by Pegasos-style subgradient
//! descent on the hinge loss.
//!
//! The solver keeps the weight vector dense and per-term interpretable; no
//! kernel trick, no feature crosses. Targets use the crate convention
//! (spam = +1, ham = -1), so a positive decision value means spam.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::math::SparseVector;

/// Weight vector and bias of a fitted linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LinearModel {
    /// `w·x + b` for a sparse document vector.
    pub fn decision(&self, x: &SparseVector) -> f64 {
        x.dot_dense(&self.weights) + self.bias
    }

    pub fn dim(&self) -> usize {
        self.weights.len()
    }
}

/// Fit a linear max-margin separator.
///
/// Minimizes `(lambda/2)·||w||² + (1/n)·Σ max(0, 1 - y(w·x + b))` with
/// `lambda = 1 / (C·n)`, the standard mapping from the C-parameterized
/// soft-margin objective. The learning rate decays as `1/(lambda·t)` and
/// example order is reshuffled every epoch from a seeded RNG, so the same
/// data, C, epoch count, and seed always produce bit-identical weights.
/// The bias is updated with the hinge subgradient but not regularized.
///
/// # Arguments
///
/// * `x` - training vectors (already tf-idf weighted and normalized)
/// * `y` - signed targets, +1 (spam) or -1 (ham), aligned with `x`
/// * `dim` - vocabulary size; weight vector length
/// * `c` - soft-margin constant (larger C, harder margin)
/// * `epochs` - passes over the training set
/// * `seed` - RNG seed for the per-epoch shuffles
pub fn train_linear(
    x: &[SparseVector],
    y: &[f64],
    dim: usize,
    c: f64,
    epochs: usize,
    seed: u64,
) -> LinearModel {
    assert_eq!(x.len(), y.len(), "features and targets must align");
    assert!(!x.is_empty(), "cannot train on an empty set");

    let n = x.len();
    let lambda = 1.0 / (c * n as f64);

    let mut weights = vec![0.0f64; dim];
    let mut bias = 0.0f64;
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut t: u64 = 0;

    for _ in 0..epochs {
        order.shuffle(&mut rng);
        for &i in &order {
            t += 1;
            let eta = 1.0 / (lambda * t as f64);

            // Regularization shrink applies to every step.
            let shrink = 1.0 - eta * lambda;
            for w in weights.iter_mut() {
                *w *= shrink;
            }

            let margin = y[i] * (x[i].dot_dense(&weights) + bias);
            if margin < 1.0 {
                let step = eta * y[i];
                for (idx, value) in x[i].iter() {
                    weights[idx] += step * value;
                }
                bias += step;
            }
        }
    }

    log::debug!(
        "trained linear model: dim={}, C={}, epochs={}, final bias={:.4}",
        dim,
        c,
        epochs,
        bias
    );

    LinearModel { weights, bias }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(entries: &[(usize, f64)]) -> SparseVector {
        let mut v = SparseVector::new();
        for &(idx, value) in entries {
            v.push(idx, value);
        }
        v.l2_normalize();
        v
    }

    fn toy_problem() -> (Vec<SparseVector>, Vec<f64>) {
        // Feature 0/1 fire for the positive class, 2/3 for the negative.
        let x = vec![
            vector(&[(0, 1.0), (1, 1.0)]),
            vector(&[(0, 1.0)]),
            vector(&[(1, 1.0)]),
            vector(&[(2, 1.0), (3, 1.0)]),
            vector(&[(2, 1.0)]),
            vector(&[(3, 1.0)]),
        ];
        let y = vec![1.0, 1.0, 1.0, -1.0, -1.0, -1.0];
        (x, y)
    }

    #[test]
    fn separates_a_linearly_separable_problem() {
        let (x, y) = toy_problem();
        let model = train_linear(&x, &y, 4, 1.0, 200, 42);
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert!(
                model.decision(xi) * yi > 0.0,
                "training example misclassified"
            );
        }
    }

    #[test]
    fn training_is_deterministic_for_fixed_seed() {
        let (x, y) = toy_problem();
        let a = train_linear(&x, &y, 4, 1.0, 200, 42);
        let b = train_linear(&x, &y, 4, 1.0, 200, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn positive_class_terms_get_positive_weights() {
        let (x, y) = toy_problem();
        let model = train_linear(&x, &y, 4, 1.0, 200, 42);
        assert!(model.weights[0] > 0.0);
        assert!(model.weights[1] > 0.0);
        assert!(model.weights[2] < 0.0);
        assert!(model.weights[3] < 0.0);
    }

    #[test]
    fn empty_vector_decision_is_the_bias() {
        let model = LinearModel {
            weights: vec![1.0, -2.0],
            bias: 0.75,
        };
        let empty = SparseVector::new();
        assert!((model.decision(&empty) - 0.75).abs() < 1e-12);
    }
}
