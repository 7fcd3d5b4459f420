//! Persistence of the trained (vectorizer, model) pair.
//!
//! The two artifacts are opaque CBOR blobs, each wrapped in a versioned
//! envelope, and are only meaningful together: a vocabulary indexes the
//! weight vector it was trained with. Loading therefore requires both files
//! and rejects a half-present or version-skewed pair with
//! `ArtifactMismatch` rather than constructing a partial model.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamError};
use crate::models::Model;
use crate::vectorizer::TfidfVectorizer;

/// Bumped whenever the serialized layout changes incompatibly.
pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    payload: T,
}

/// Write both artifacts. The vectorizer must be fitted; persisting an
/// unfitted vectorizer next to a model would create exactly the mismatched
/// pair that `load` rejects.
pub fn save<P: AsRef<Path>, Q: AsRef<Path>>(
    vectorizer: &TfidfVectorizer,
    model: &Model,
    vectorizer_path: P,
    model_path: Q,
) -> Result<()> {
    if !vectorizer.is_fitted() {
        return Err(SpamError::NotFitted);
    }

    write_artifact(&vectorizer_path, vectorizer)?;
    write_artifact(&model_path, model)?;

    log::info!(
        "saved model artifacts to {} and {}",
        vectorizer_path.as_ref().display(),
        model_path.as_ref().display()
    );
    Ok(())
}

/// Load the pair back.
///
/// Both files absent is the ordinary "nothing trained yet" case and returns
/// `Ok(None)`. Exactly one file, a corrupt blob, or a version mismatch is
/// `ArtifactMismatch`; plain I/O failure is `Storage`.
pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
    vectorizer_path: P,
    model_path: Q,
) -> Result<Option<(TfidfVectorizer, Model)>> {
    let have_vectorizer = vectorizer_path.as_ref().exists();
    let have_model = model_path.as_ref().exists();

    match (have_vectorizer, have_model) {
        (false, false) => return Ok(None),
        (true, false) => {
            return Err(SpamError::ArtifactMismatch(format!(
                "vectorizer artifact exists but model artifact {} is missing",
                model_path.as_ref().display()
            )))
        }
        (false, true) => {
            return Err(SpamError::ArtifactMismatch(format!(
                "model artifact exists but vectorizer artifact {} is missing",
                vectorizer_path.as_ref().display()
            )))
        }
        (true, true) => {}
    }

    let vectorizer: TfidfVectorizer = read_artifact(&vectorizer_path)?;
    let model: Model = read_artifact(&model_path)?;

    if !vectorizer.is_fitted() {
        return Err(SpamError::ArtifactMismatch(
            "loaded vectorizer has no vocabulary".to_string(),
        ));
    }

    Ok(Some((vectorizer, model)))
}

fn write_artifact<P: AsRef<Path>, T: Serialize>(path: P, payload: &T) -> Result<()> {
    let file = File::create(&path)?;
    let envelope = Envelope {
        version: ARTIFACT_VERSION,
        payload,
    };
    serde_cbor::to_writer(BufWriter::new(file), &envelope)
        .map_err(|e| SpamError::Storage(io::Error::new(io::ErrorKind::InvalidData, e)))
}

fn read_artifact<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T> {
    let file = File::open(&path)?;
    let envelope: Envelope<T> =
        serde_cbor::from_reader(BufReader::new(file)).map_err(|e| {
            SpamError::ArtifactMismatch(format!(
                "corrupt artifact {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
    if envelope.version != ARTIFACT_VERSION {
        return Err(SpamError::ArtifactMismatch(format!(
            "artifact {} has format version {}, expected {}",
            path.as_ref().display(),
            envelope.version,
            ARTIFACT_VERSION
        )));
    }
    Ok(envelope.payload)
}
