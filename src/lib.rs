//! spamsift: linear-margin spam/ham classification for short text messages.
//!
//! This crate provides a tf-idf vectorizer, a soft-margin linear classifier
//! with a directly interpretable weight vector, logistic confidence
//! calibration, per-term explanations, evaluation metrics, and pairwise
//! persistence of the trained (vectorizer, model) artifacts.
//!
//! The design favors small, testable modules. `SpamDetector` in the
//! `detector` module ties everything together and is the only place that
//! owns trained-model state.
pub mod calibrate;
pub mod config;
pub mod dataset;
pub mod detector;
pub mod error;
pub mod explain;
pub mod math;
pub mod metrics;
pub mod models;
pub mod store;
pub mod vectorizer;

pub use config::TrainConfig;
pub use detector::{ExplainedPrediction, Prediction, SpamDetector};
pub use error::{Result, SpamError};
