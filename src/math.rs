//! Sparse vector type used for document features.
//!
//! Document vectors are overwhelmingly zero (a message touches a handful of
//! vocabulary terms), so features are kept as parallel index/value arrays
//! and dotted against a dense weight slice.

use serde::{Deserialize, Serialize};

/// Sparse f64 vector with strictly increasing indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    pub fn new() -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            indices: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Append an entry. Callers must push indices in increasing order.
    pub fn push(&mut self, index: usize, value: f64) {
        debug_assert!(
            self.indices.last().map_or(true, |&last| index > last),
            "indices must be strictly increasing"
        );
        self.indices.push(index);
        self.values.push(value);
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Stored value at a vocabulary index, or 0.0 when absent.
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Dot product against a dense weight slice. Entries beyond the dense
    /// length contribute nothing.
    pub fn dot_dense(&self, dense: &[f64]) -> f64 {
        self.iter()
            .filter(|&(i, _)| i < dense.len())
            .map(|(i, v)| v * dense[i])
            .sum()
    }

    pub fn l2_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Scale to unit L2 norm. A zero vector is left untouched.
    pub fn l2_normalize(&mut self) {
        let norm = self.l2_norm();
        if norm > 0.0 {
            for v in self.values.iter_mut() {
                *v /= norm;
            }
        }
    }
}

impl Default for SparseVector {
    fn default() -> Self {
        Self::new()
    }
}
