use thiserror::Error;

/// Errors surfaced by the classification core.
///
/// Input-validation failures carry a human-readable message and are meant to
/// be recovered at the caller boundary; fit-state and storage failures must
/// prevent any prediction from being returned.
#[derive(Debug, Error)]
pub enum SpamError {
    /// The vectorizer was used before `fit`.
    #[error("vectorizer has not been fitted; call fit before transform")]
    NotFitted,

    /// The classifier was used before `train` or a successful `load`.
    #[error("no trained model is available; train or load a model first")]
    NotTrained,

    /// Empty text, malformed CSV, missing columns, unknown labels.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Only one of the model/vectorizer artifacts is present, or the pair
    /// is corrupt or from an incompatible format version.
    #[error("model artifacts are inconsistent: {0}")]
    ArtifactMismatch(String),

    /// I/O failure while saving or loading artifacts.
    #[error("storage failure: {0}")]
    Storage(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SpamError>;
