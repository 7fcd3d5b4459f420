//! Evaluation metrics for held-out predictions.
//!
//! Spam is the positive class for precision/recall/F1. Division by zero is
//! defined away: a metric with an empty denominator is 0.0, never NaN or an
//! error, so a held-out set without a single true or predicted spam still
//! evaluates cleanly.

use serde::{Deserialize, Serialize};

use crate::dataset::Label;

/// Metrics snapshot from one training run. Overwritten by the next run and
/// never persisted to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// 2×2 counts with fixed [spam, ham] ordering on both axes:
    /// rows are true labels, columns predicted labels, so
    /// `[[tp, fn], [fp, tn]]`.
    pub confusion_matrix: [[u64; 2]; 2],
    /// Per-class text report in the familiar sklearn layout.
    pub classification_report: String,
}

/// Compute metrics over aligned true/predicted label slices.
pub fn evaluate(y_true: &[Label], y_pred: &[Label]) -> Metrics {
    assert_eq!(
        y_true.len(),
        y_pred.len(),
        "evaluate requires equal-length label slices"
    );

    let mut tp = 0u64;
    let mut tn = 0u64;
    let mut fp = 0u64;
    let mut fn_ = 0u64;
    for (&truth, &pred) in y_true.iter().zip(y_pred.iter()) {
        match (truth, pred) {
            (Label::Spam, Label::Spam) => tp += 1,
            (Label::Spam, Label::Ham) => fn_ += 1,
            (Label::Ham, Label::Spam) => fp += 1,
            (Label::Ham, Label::Ham) => tn += 1,
        }
    }

    let total = y_true.len() as u64;
    let accuracy = safe_div(tp + tn, total);
    let precision = safe_div(tp, tp + fp);
    let recall = safe_div(tp, tp + fn_);
    let f1 = f1_score(precision, recall);

    let confusion_matrix = [[tp, fn_], [fp, tn]];
    let classification_report = render_report(&confusion_matrix, total);

    Metrics {
        accuracy,
        precision,
        recall,
        f1,
        confusion_matrix,
        classification_report,
    }
}

fn safe_div(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

fn render_report(cm: &[[u64; 2]; 2], total: u64) -> String {
    let [[tp, fn_], [fp, tn]] = *cm;

    // Per-class rows: for ham the roles of the cells flip.
    let spam_p = safe_div(tp, tp + fp);
    let spam_r = safe_div(tp, tp + fn_);
    let ham_p = safe_div(tn, tn + fn_);
    let ham_r = safe_div(tn, tn + fp);

    let mut out = String::new();
    out.push_str(&format!(
        "{:>14} {:>9} {:>9} {:>9} {:>9}\n\n",
        "", "precision", "recall", "f1-score", "support"
    ));
    for (name, p, r, support) in [
        ("spam", spam_p, spam_r, tp + fn_),
        ("ham", ham_p, ham_r, fp + tn),
    ] {
        out.push_str(&format!(
            "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
            name,
            p,
            r,
            f1_score(p, r),
            support
        ));
    }
    out.push_str(&format!(
        "\n{:>14} {:>9} {:>9} {:>9.2} {:>9}\n",
        "accuracy",
        "",
        "",
        safe_div(tp + tn, total),
        total
    ));
    out
}
