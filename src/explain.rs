//! Per-term attribution of a classification decision.
//!
//! Defined only for linear models: each input term present in the
//! vocabulary contributes `weight × tf-idf`, and the signed contributions
//! sum (with the bias) to the raw margin. Non-linear model kinds yield the
//! explicit `Unavailable` marker instead of an error.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::dataset::Label;
use crate::error::Result;
use crate::models::Model;
use crate::vectorizer::{tokenize, TfidfVectorizer};

/// One term's share of the decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermContribution {
    #[serde(rename = "word")]
    pub term: String,
    /// The model weight for this term.
    pub weight: f64,
    /// weight × tf-idf value of the term in this document.
    pub contribution: f64,
}

/// Marker emitted in place of the contribution list for model kinds
/// without per-term weights.
const UNAVAILABLE_MARKER: &str = "unavailable";

/// Explanation outcome for one input.
///
/// Serializes as the bare contribution array (most spam-indicative first);
/// the non-linear case becomes the `"unavailable"` marker string rather
/// than a tagged object.
#[derive(Debug, Clone, PartialEq)]
pub enum Explanation {
    /// Ranked contributions, most spam-indicative first.
    Terms(Vec<TermContribution>),
    /// The model kind does not expose per-term weights.
    Unavailable,
}

impl Serialize for Explanation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Explanation::Terms(terms) => terms.serialize(serializer),
            Explanation::Unavailable => serializer.serialize_str(UNAVAILABLE_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for Explanation {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Terms(Vec<TermContribution>),
            Marker(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Terms(terms) => Ok(Explanation::Terms(terms)),
            Repr::Marker(s) if s == UNAVAILABLE_MARKER => Ok(Explanation::Unavailable),
            Repr::Marker(s) => Err(serde::de::Error::custom(format!(
                "unknown explanation marker '{}'",
                s
            ))),
        }
    }
}

impl Explanation {
    /// Natural-language summary naming the top positively-contributing
    /// terms, produced only for spam predictions.
    pub fn spam_summary(&self, label: Label) -> Option<String> {
        if label != Label::Spam {
            return None;
        }
        let terms = match self {
            Explanation::Terms(terms) => terms,
            Explanation::Unavailable => return None,
        };
        let leading: Vec<&str> = terms
            .iter()
            .filter(|t| t.contribution > 0.0)
            .take(3)
            .map(|t| t.term.as_str())
            .collect();
        if leading.is_empty() {
            return None;
        }
        Some(format!(
            "classified as spam mainly because of: {}",
            leading
                .iter()
                .map(|t| format!("'{}'", t))
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }
}

/// Attribute a decision on `text` to individual terms.
///
/// Terms are collected in order of first appearance in the input, so the
/// stable descending sort breaks contribution ties by original term order.
/// The result is truncated to `top_k` entries.
pub fn explain(
    text: &str,
    vectorizer: &TfidfVectorizer,
    model: &Model,
    top_k: usize,
) -> Result<Explanation> {
    let linear = match model.linear() {
        Some(linear) => linear,
        None => return Ok(Explanation::Unavailable),
    };

    let vocab = vectorizer.vocabulary()?;
    let vector = vectorizer.transform(text)?;

    let mut seen: HashSet<usize> = HashSet::new();
    let mut contributions = Vec::new();
    for token in tokenize(text) {
        let Some(idx) = vocab.index_of(&token) else {
            continue;
        };
        if !seen.insert(idx) {
            continue;
        }
        let weight = linear.weights.get(idx).copied().unwrap_or(0.0);
        contributions.push(TermContribution {
            term: token,
            weight,
            contribution: weight * vector.get(idx),
        });
    }

    contributions.sort_by(|a, b| {
        b.contribution
            .partial_cmp(&a.contribution)
            .unwrap_or(Ordering::Equal)
    });
    contributions.truncate(top_k);

    Ok(Explanation::Terms(contributions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinearModel;

    fn fitted_parts() -> (TfidfVectorizer, Model) {
        let mut vectorizer = TfidfVectorizer::new();
        vectorizer
            .fit(&["click win money", "meeting lunch friday"])
            .unwrap();
        let dim = vectorizer.vocabulary().unwrap().len();
        let vocab = vectorizer.vocabulary().unwrap();
        let mut weights = vec![0.0; dim];
        for term in ["click", "win", "money"] {
            weights[vocab.index_of(term).unwrap()] = 1.0;
        }
        for term in ["meeting", "lunch", "friday"] {
            weights[vocab.index_of(term).unwrap()] = -1.0;
        }
        let model = Model::Linear(LinearModel { weights, bias: 0.0 });
        (vectorizer, model)
    }

    #[test]
    fn terms_are_a_subset_of_the_input() {
        let (vectorizer, model) = fitted_parts();
        let explanation = explain("click the win button", &vectorizer, &model, 10).unwrap();
        let Explanation::Terms(terms) = explanation else {
            panic!("expected terms");
        };
        let input_tokens = tokenize("click the win button");
        for t in &terms {
            assert!(input_tokens.contains(&t.term), "unexpected term {}", t.term);
        }
    }

    #[test]
    fn sorted_descending_by_contribution() {
        let (vectorizer, model) = fitted_parts();
        let explanation = explain("click win lunch meeting", &vectorizer, &model, 10).unwrap();
        let Explanation::Terms(terms) = explanation else {
            panic!("expected terms");
        };
        for pair in terms.windows(2) {
            assert!(pair[0].contribution >= pair[1].contribution);
        }
        assert!(terms.first().unwrap().contribution > 0.0);
        assert!(terms.last().unwrap().contribution < 0.0);
    }

    #[test]
    fn truncates_to_top_k() {
        let (vectorizer, model) = fitted_parts();
        let explanation =
            explain("click win money meeting lunch friday", &vectorizer, &model, 2).unwrap();
        let Explanation::Terms(terms) = explanation else {
            panic!("expected terms");
        };
        assert_eq!(terms.len(), 2);
    }

    #[test]
    fn repeated_terms_appear_once() {
        let (vectorizer, model) = fitted_parts();
        let explanation = explain("click click click", &vectorizer, &model, 10).unwrap();
        let Explanation::Terms(terms) = explanation else {
            panic!("expected terms");
        };
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].term, "click");
    }

    #[test]
    fn summary_names_top_spam_terms() {
        let (vectorizer, model) = fitted_parts();
        let explanation = explain("click win money", &vectorizer, &model, 10).unwrap();
        let summary = explanation.spam_summary(Label::Spam).unwrap();
        assert!(summary.contains("'click'") || summary.contains("'win'"));
        assert!(explanation.spam_summary(Label::Ham).is_none());
    }

    #[test]
    fn unavailable_has_no_summary() {
        assert!(Explanation::Unavailable.spam_summary(Label::Spam).is_none());
    }

    #[test]
    fn serializes_as_a_bare_contribution_array() {
        let (vectorizer, model) = fitted_parts();
        let explanation = explain("click win money", &vectorizer, &model, 10).unwrap();
        let json = serde_json::to_value(&explanation).unwrap();
        let entries = json.as_array().expect("explanation must be a flat array");
        assert!(!entries.is_empty());
        for entry in entries {
            assert!(entry.get("word").is_some());
            assert!(entry.get("weight").is_some());
            assert!(entry.get("contribution").is_some());
        }
        let back: Explanation = serde_json::from_value(json).unwrap();
        assert_eq!(back, explanation);
    }

    #[test]
    fn unavailable_serializes_as_a_marker_string() {
        let json = serde_json::to_value(&Explanation::Unavailable).unwrap();
        assert_eq!(json, "unavailable");
        let back: Explanation = serde_json::from_value(json).unwrap();
        assert_eq!(back, Explanation::Unavailable);
    }
}
