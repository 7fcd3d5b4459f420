//! Tf-idf vectorization of raw message text.
//!
//! `TfidfVectorizer::fit` builds an immutable vocabulary (term → index plus
//! a smoothed idf table) from a training corpus; `transform` maps any text
//! into an L2-normalized sparse tf×idf vector. Terms unseen at fit time are
//! silently dropped at transform time; that is a required policy, not an
//! error.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamError};
use crate::math::SparseVector;

/// Lowercase a text and split it into alphanumeric tokens.
///
/// Tokens shorter than two characters are dropped, so punctuation and
/// stray single letters never become features.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// Fitted term → (index, idf) mapping. Immutable after fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Terms in index order.
    terms: Vec<String>,
    /// Reverse lookup into `terms`.
    index: HashMap<String, usize>,
    /// Smoothed inverse document frequency per index.
    idf: Vec<f64>,
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    pub fn idf(&self, index: usize) -> f64 {
        self.idf[index]
    }
}

/// Tf-idf vectorizer with optional stop words and vocabulary cap.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TfidfVectorizer {
    vocabulary: Option<Vocabulary>,
    stop_words: Option<HashSet<String>>,
    max_features: Option<usize>,
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude the given terms from the vocabulary.
    #[must_use]
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_words = Some(
            words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        );
        self
    }

    /// Keep only the `max_features` terms with the highest document
    /// frequency (ties broken by term).
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Build the vocabulary from a corpus of raw texts.
    ///
    /// Document frequency is counted per distinct term per document; the
    /// idf is smoothed as `ln((1 + N) / (1 + df)) + 1`. Indices are
    /// assigned in sorted term order so they are stable across runs.
    pub fn fit<S: AsRef<str>>(&mut self, corpus: &[S]) -> Result<()> {
        if corpus.is_empty() {
            return Err(SpamError::InvalidInput(
                "cannot fit a vectorizer on an empty corpus".to_string(),
            ));
        }

        let n_docs = corpus.len();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in corpus {
            let mut seen: HashSet<String> = HashSet::new();
            for token in tokenize(doc.as_ref()) {
                if self.is_stop_word(&token) {
                    continue;
                }
                seen.insert(token);
            }
            for term in seen {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut survivors: Vec<(String, usize)> = doc_freq.into_iter().collect();
        if let Some(cap) = self.max_features {
            survivors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            survivors.truncate(cap);
        }

        let mut terms: Vec<String> = survivors.iter().map(|(t, _)| t.clone()).collect();
        terms.sort_unstable();

        let df_by_term: HashMap<String, usize> = survivors.into_iter().collect();
        let mut index = HashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());
        for (i, term) in terms.iter().enumerate() {
            let df = df_by_term[term];
            idf.push(((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0);
            index.insert(term.clone(), i);
        }

        log::debug!(
            "fitted vocabulary: {} terms from {} documents",
            terms.len(),
            n_docs
        );

        self.vocabulary = Some(Vocabulary { terms, index, idf });
        Ok(())
    }

    /// Map a text to its L2-normalized tf×idf vector.
    pub fn transform(&self, text: &str) -> Result<SparseVector> {
        let vocab = self.vocabulary()?;

        let mut tf: HashMap<usize, usize> = HashMap::new();
        for token in tokenize(text) {
            if let Some(idx) = vocab.index_of(&token) {
                *tf.entry(idx).or_insert(0) += 1;
            }
        }

        let mut entries: Vec<(usize, usize)> = tf.into_iter().collect();
        entries.sort_unstable_by_key(|&(idx, _)| idx);

        let mut vector = SparseVector::with_capacity(entries.len());
        for (idx, count) in entries {
            vector.push(idx, count as f64 * vocab.idf(idx));
        }
        vector.l2_normalize();
        Ok(vector)
    }

    /// The fitted vocabulary, or `NotFitted`.
    pub fn vocabulary(&self) -> Result<&Vocabulary> {
        self.vocabulary.as_ref().ok_or(SpamError::NotFitted)
    }

    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words
            .as_ref()
            .map_or(false, |sw| sw.contains(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_splits_punctuation() {
        let tokens = tokenize("Click HERE to win $1000!");
        assert_eq!(tokens, vec!["click", "here", "to", "win", "1000"]);
    }

    #[test]
    fn tokenize_drops_single_characters() {
        let tokens = tokenize("a I x42");
        assert_eq!(tokens, vec!["x42"]);
    }

    #[test]
    fn tokenize_length_rule_counts_characters_not_bytes() {
        // One multi-byte character is still a single-character token.
        let tokens = tokenize("é 日 déjà");
        assert_eq!(tokens, vec!["déjà"]);
    }

    #[test]
    fn transform_before_fit_is_not_fitted() {
        let vectorizer = TfidfVectorizer::new();
        assert!(matches!(
            vectorizer.transform("hello"),
            Err(SpamError::NotFitted)
        ));
    }

    #[test]
    fn fit_on_empty_corpus_is_invalid_input() {
        let mut vectorizer = TfidfVectorizer::new();
        let corpus: Vec<&str> = Vec::new();
        assert!(matches!(
            vectorizer.fit(&corpus),
            Err(SpamError::InvalidInput(_))
        ));
    }

    #[test]
    fn indices_are_stable_and_sorted() {
        let mut vectorizer = TfidfVectorizer::new();
        vectorizer.fit(&["zebra apple", "apple mango"]).unwrap();
        let vocab = vectorizer.vocabulary().unwrap();
        assert_eq!(vocab.index_of("apple"), Some(0));
        assert_eq!(vocab.index_of("mango"), Some(1));
        assert_eq!(vocab.index_of("zebra"), Some(2));
    }

    #[test]
    fn rarer_terms_get_higher_idf() {
        let mut vectorizer = TfidfVectorizer::new();
        vectorizer
            .fit(&["common rare", "common other", "common thing"])
            .unwrap();
        let vocab = vectorizer.vocabulary().unwrap();
        let common = vocab.idf(vocab.index_of("common").unwrap());
        let rare = vocab.idf(vocab.index_of("rare").unwrap());
        assert!(rare > common);
    }

    #[test]
    fn transform_is_unit_length() {
        let mut vectorizer = TfidfVectorizer::new();
        vectorizer.fit(&["win money now", "meet for lunch"]).unwrap();
        let v = vectorizer.transform("win money").unwrap();
        assert!((v.l2_norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unseen_terms_yield_zero_vector() {
        let mut vectorizer = TfidfVectorizer::new();
        vectorizer.fit(&["win money now", "meet for lunch"]).unwrap();
        let v = vectorizer.transform("completely unrelated words").unwrap();
        assert!(v.is_empty());
    }

    #[test]
    fn stop_words_are_excluded() {
        let mut vectorizer = TfidfVectorizer::new().with_stop_words(["the", "to"]);
        vectorizer.fit(&["click the link to win"]).unwrap();
        let vocab = vectorizer.vocabulary().unwrap();
        assert_eq!(vocab.index_of("the"), None);
        assert_eq!(vocab.index_of("to"), None);
        assert!(vocab.index_of("click").is_some());
    }

    #[test]
    fn max_features_keeps_highest_document_frequency() {
        let mut vectorizer = TfidfVectorizer::new().with_max_features(Some(2));
        vectorizer
            .fit(&["alpha beta", "alpha beta", "alpha gamma"])
            .unwrap();
        let vocab = vectorizer.vocabulary().unwrap();
        assert_eq!(vocab.len(), 2);
        assert!(vocab.index_of("alpha").is_some());
        assert!(vocab.index_of("beta").is_some());
        assert_eq!(vocab.index_of("gamma"), None);
    }
}
