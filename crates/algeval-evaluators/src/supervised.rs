//! Ground-truth evaluation from by-true-label counts.
//!
//! Only usable when the true labels are known, i.e. in simulations and
//! tests. It supplies the reference values the unsupervised evaluators
//! are measured against.

use crate::evaluator::Evaluation;
use crate::exact::ExactValue;
use crate::moments::PAIRS;
use algeval_axioms::{Label, LabeledVoteCounts};
use num::{BigInt, BigRational};
use serde::Serialize;
use std::collections::BTreeMap;

/// Error correlation of one classifier pair on one true label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairCorrelation {
    /// True label the items carry
    pub label: Label,
    /// Classifier indices
    pub pair: (usize, usize),
    /// `(1/Q_l) sum (c_i - a_i)(c_j - a_j)` over items with label `l`
    pub value: ExactValue,
}

/// Evaluator with access to the answer key.
#[derive(Debug, Clone, Copy, Default)]
pub struct SupervisedEvaluator;

impl SupervisedEvaluator {
    /// Creates the evaluator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Exact prevalence and label accuracies.
    pub fn evaluate(&self, counts: &LabeledVoteCounts) -> Evaluation<ExactValue> {
        let q = counts.test_size();
        let totals = counts.test_sizes();
        let prevalence = totals
            .iter()
            .map(|(l, &n)| (l.clone(), ExactValue::ratio(n, q)))
            .collect();
        let accuracies = (0..counts.arity())
            .map(|i| {
                totals
                    .iter()
                    .map(|(l, &n)| (l.clone(), ExactValue::ratio(correct(counts, l, &[i]), n)))
                    .collect::<BTreeMap<_, _>>()
            })
            .collect();
        Evaluation {
            prevalence,
            accuracies,
        }
    }

    /// Correlations for every label and classifier pair, label-major.
    ///
    /// Zero for classifiers whose errors are independent given the label.
    pub fn error_correlations(&self, counts: &LabeledVoteCounts) -> Vec<PairCorrelation> {
        let n = counts.arity();
        let pairs: Vec<(usize, usize)> = if n == 3 {
            PAIRS.to_vec()
        } else {
            (0..n)
                .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
                .collect()
        };

        let mut out = Vec::new();
        for (label, total) in counts.test_sizes() {
            for &(i, j) in &pairs {
                let value = if total == 0 {
                    ExactValue::Indeterminate
                } else {
                    let q = BigInt::from(total);
                    let both = BigInt::from(correct(counts, &label, &[i, j]));
                    let ci = BigInt::from(correct(counts, &label, &[i]));
                    let cj = BigInt::from(correct(counts, &label, &[j]));
                    ExactValue::Rational(BigRational::new(both * &q - ci * cj, &q * &q))
                };
                out.push(PairCorrelation {
                    label: label.clone(),
                    pair: (i, j),
                    value,
                });
            }
        }
        out
    }
}

/// Items with true label `label` where every classifier in `members` was right.
fn correct(counts: &LabeledVoteCounts, label: &Label, members: &[usize]) -> u64 {
    counts
        .rows()
        .filter(|(l, pattern, _)| *l == label && members.iter().all(|&i| pattern[i] == *label))
        .map(|(_, _, n)| n)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use algeval_axioms::{samples, LabelSet};

    fn independent_labeled() -> LabeledVoteCounts {
        let a = [
            ("aaa", 72), ("aab", 48), ("aba", 18), ("abb", 12),
            ("baa", 48), ("bab", 32), ("bba", 12), ("bbb", 8),
        ];
        let b = [
            ("aaa", 12), ("aab", 18), ("aba", 18), ("abb", 27),
            ("baa", 48), ("bab", 72), ("bba", 72), ("bbb", 108),
        ];
        let rows = a
            .iter()
            .map(|(p, n)| ("a", *p, *n))
            .chain(b.iter().map(|(p, n)| ("b", *p, *n)))
            .map(|(l, p, n)| {
                let pattern: Vec<String> = p.chars().map(String::from).collect();
                (l.to_string(), pattern, n)
            });
        LabeledVoteCounts::new(LabelSet::binary(), rows).unwrap()
    }

    #[test]
    fn test_independent_labeled_matches_observed_sample() {
        assert_eq!(
            independent_labeled().project(),
            samples::independent_trio_observed()
        );
    }

    #[test]
    fn test_supervised_accuracies() {
        let eval = SupervisedEvaluator::new().evaluate(&independent_labeled());
        assert_eq!(eval.prevalence[&Label::from("a")], ExactValue::ratio(2, 5));
        assert_eq!(eval.accuracies[0][&Label::from("a")], ExactValue::ratio(3, 5));
        assert_eq!(eval.accuracies[0][&Label::from("b")], ExactValue::ratio(4, 5));
        assert_eq!(eval.accuracies[1][&Label::from("a")], ExactValue::ratio(4, 5));
    }

    #[test]
    fn test_independent_errors_have_zero_correlation() {
        let correlations = SupervisedEvaluator::new().error_correlations(&independent_labeled());
        assert_eq!(correlations.len(), 6);
        for c in &correlations {
            assert_eq!(c.value, ExactValue::ratio(0, 1), "{:?}", c.pair);
        }
    }

    #[test]
    fn test_uci_errors_are_correlated() {
        let labeled = samples::uci_adult_labeled();
        let eval = SupervisedEvaluator::new().evaluate(&labeled);
        assert_eq!(eval.prevalence[&Label::from("a")], ExactValue::ratio(5687, 36842));
        let correlations = SupervisedEvaluator::new().error_correlations(&labeled);
        assert!(correlations
            .iter()
            .any(|c| c.value != ExactValue::ratio(0, 1)));
    }

    #[test]
    fn test_missing_label_is_indeterminate() {
        let labeled =
            LabeledVoteCounts::new(LabelSet::binary(), [("a", ["a", "b"], 3), ("a", ["a", "a"], 2)])
                .unwrap();
        let evaluator = SupervisedEvaluator::new();
        let eval = evaluator.evaluate(&labeled);
        assert_eq!(eval.accuracies[1][&Label::from("b")], ExactValue::Indeterminate);
        let correlations = evaluator.error_correlations(&labeled);
        assert_eq!(correlations.len(), 2);
        assert_eq!(correlations[1].value, ExactValue::Indeterminate);
        // a_0 = 1, so its errors cannot correlate with anything
        assert_eq!(correlations[0].value, ExactValue::ratio(0, 1));
    }
}
