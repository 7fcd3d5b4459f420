//! Labeled training data: the label type, CSV loading, and the seeded
//! train/test split.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamError};

/// Binary message label. The closed set is {"spam", "ham"}; spam is the
/// positive class everywhere in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Spam,
    Ham,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Spam => "spam",
            Label::Ham => "ham",
        }
    }

    /// Signed target used by the hinge-loss solver: spam = +1, ham = -1.
    pub fn signed(&self) -> f64 {
        match self {
            Label::Spam => 1.0,
            Label::Ham => -1.0,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = SpamError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "spam" => Ok(Label::Spam),
            "ham" => Ok(Label::Ham),
            other => Err(SpamError::InvalidInput(format!(
                "unknown label '{}'; expected 'spam' or 'ham'",
                other
            ))),
        }
    }
}

/// One (text, label) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingExample {
    pub text: String,
    pub label: Label,
}

impl TrainingExample {
    pub fn new(text: impl Into<String>, label: Label) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// Read a training CSV with `text` and `label` columns (header names are
/// matched case-insensitively). A missing column or an unparseable row is
/// `InvalidInput`; I/O failures are `Storage`.
pub fn read_labeled_csv<P: AsRef<Path>>(path: P) -> Result<Vec<TrainingExample>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(&path)
        .map_err(csv_error)?;

    let headers = reader.headers().map_err(csv_error)?.clone();
    let text_idx = find_column(&headers, "text").ok_or_else(|| {
        SpamError::InvalidInput("training CSV is missing the 'text' column".to_string())
    })?;
    let label_idx = find_column(&headers, "label").ok_or_else(|| {
        SpamError::InvalidInput("training CSV is missing the 'label' column".to_string())
    })?;

    let mut examples = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let text = record.get(text_idx).ok_or_else(|| {
            SpamError::InvalidInput(format!("missing text value at row {}", row + 1))
        })?;
        let label = record.get(label_idx).ok_or_else(|| {
            SpamError::InvalidInput(format!("missing label value at row {}", row + 1))
        })?;
        let label = label.parse::<Label>().map_err(|_| {
            SpamError::InvalidInput(format!(
                "unknown label '{}' at row {}; expected 'spam' or 'ham'",
                label,
                row + 1
            ))
        })?;
        examples.push(TrainingExample::new(text, label));
    }

    if examples.is_empty() {
        return Err(SpamError::InvalidInput(
            "training CSV contains no data rows".to_string(),
        ));
    }

    log::info!(
        "loaded {} examples ({} spam / {} ham) from {}",
        examples.len(),
        examples.iter().filter(|e| e.label == Label::Spam).count(),
        examples.iter().filter(|e| e.label == Label::Ham).count(),
        path.as_ref().display()
    );

    Ok(examples)
}

/// Deterministically split `0..n` into (train, test) index sets.
///
/// Indices are shuffled with a seeded RNG and the first
/// `round(n * test_fraction)` shuffled indices form the held-out set, so the
/// same `n`, fraction, and seed always reproduce the same split.
pub fn split_indices(n: usize, test_fraction: f32, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f32) * test_fraction).round() as usize;
    let n_test = n_test.min(n);
    let test = indices[..n_test].to_vec();
    let train = indices[n_test..].to_vec();
    (train, test)
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}

fn csv_error(err: csv::Error) -> SpamError {
    if err.is_io_error() {
        match err.into_kind() {
            csv::ErrorKind::Io(io) => SpamError::Storage(io),
            other => SpamError::InvalidInput(format!("malformed CSV: {:?}", other)),
        }
    } else {
        SpamError::InvalidInput(format!("malformed CSV: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write csv");
        file
    }

    #[test]
    fn reads_text_and_label_columns() {
        let file = write_csv("text,label\nwin money,spam\nsee you soon,ham\n");
        let examples = read_labeled_csv(file.path()).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].label, Label::Spam);
        assert_eq!(examples[1].text, "see you soon");
    }

    #[test]
    fn missing_label_column_is_invalid_input() {
        let file = write_csv("text,category\nwin money,spam\n");
        assert!(matches!(
            read_labeled_csv(file.path()),
            Err(SpamError::InvalidInput(_))
        ));
    }

    #[test]
    fn unknown_label_value_is_invalid_input() {
        let file = write_csv("text,label\nwin money,junk\n");
        let err = read_labeled_csv(file.path()).unwrap_err();
        match err {
            SpamError::InvalidInput(msg) => assert!(msg.contains("junk")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn header_matching_is_case_insensitive() {
        let file = write_csv("Text,Label\nwin money,SPAM\n");
        let examples = read_labeled_csv(file.path()).unwrap();
        assert_eq!(examples[0].label, Label::Spam);
    }

    #[test]
    fn split_is_reproducible_for_fixed_seed() {
        let (train_a, test_a) = split_indices(40, 0.3, 42);
        let (train_b, test_b) = split_indices(40, 0.3, 42);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
        assert_eq!(test_a.len(), 12);
        assert_eq!(train_a.len(), 28);
    }

    #[test]
    fn different_seeds_give_different_splits() {
        let (_, test_a) = split_indices(40, 0.3, 42);
        let (_, test_b) = split_indices(40, 0.3, 43);
        assert_ne!(test_a, test_b);
    }

    #[test]
    fn split_partitions_all_indices() {
        let (train, test) = split_indices(10, 0.3, 7);
        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }
}
