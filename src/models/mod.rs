//! Classifier models.
//!
//! `Model` is a tagged enum so the rest of the crate can require a linear
//! model (for per-term explanations) through the type system instead of a
//! runtime kernel-name check. `Linear` is the only variant today; any
//! future non-linear kind gets its own variant and `linear()` returns
//! `None` for it.

use serde::{Deserialize, Serialize};

use crate::dataset::Label;
use crate::math::SparseVector;

pub mod linear;

pub use linear::{train_linear, LinearModel};

/// A trained classifier. The serialized form carries the variant name as
/// the kernel tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Model {
    Linear(LinearModel),
}

impl Model {
    /// Signed distance to the separating hyperplane. Unbounded.
    pub fn decision(&self, x: &SparseVector) -> f64 {
        match self {
            Model::Linear(model) => model.decision(x),
        }
    }

    /// Label plus raw margin. A margin of exactly zero maps to ham.
    pub fn predict(&self, x: &SparseVector) -> (Label, f64) {
        let margin = self.decision(x);
        let label = if margin > 0.0 { Label::Spam } else { Label::Ham };
        (label, margin)
    }

    /// The linear weights, when this model kind has them.
    pub fn linear(&self) -> Option<&LinearModel> {
        match self {
            Model::Linear(model) => Some(model),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Model::Linear(_) => "linear",
        }
    }
}
