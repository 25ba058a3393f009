//! Majority voting evaluator.
//!
//! Imputes each item's true label as its majority response and counts.
//! Every output is a ratio of counts, so it is rational whatever the
//! classifiers did: this evaluator has no way to signal that its own
//! assumption failed.

use crate::error::{EvaluatorError, Result};
use crate::evaluator::{AssumptionStatus, Evaluation, Evaluator, ExactReport};
use crate::exact::ExactValue;
use algeval_axioms::{Label, LabelSet, VoteCountTable};
use std::collections::BTreeMap;
use tracing::debug;

const NAME: &str = "majority";

/// Per-label vote tally of one response pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTally {
    /// Votes per label, in label-set order
    pub votes: Vec<usize>,
}

impl PatternTally {
    /// Tallies `pattern` against `labels`.
    pub fn from_pattern(labels: &LabelSet, pattern: &[Label]) -> Self {
        let votes = labels
            .iter()
            .map(|l| pattern.iter().filter(|v| *v == l).count())
            .collect();
        Self { votes }
    }

    /// Index of the label with the most votes, the earliest on a tie.
    pub fn winner(&self) -> usize {
        let mut best = 0;
        for (i, &n) in self.votes.iter().enumerate() {
            if n > self.votes[best] {
                best = i;
            }
        }
        best
    }
}

/// Evaluator treating the majority response as the true label.
///
/// Works for any number of classifiers and labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct MajorityVotingEvaluator;

impl MajorityVotingEvaluator {
    /// Creates the evaluator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// The imputed label of one pattern.
    pub fn majority_label<'a>(&self, labels: &'a LabelSet, pattern: &[Label]) -> Option<&'a Label> {
        labels.get(PatternTally::from_pattern(labels, pattern).winner())
    }
}

impl Evaluator for MajorityVotingEvaluator {
    fn name(&self) -> &str {
        NAME
    }

    fn assumption(&self) -> &str {
        "the majority response is the true label"
    }

    fn self_checking(&self) -> bool {
        false
    }

    fn evaluation_exact(&self, table: &VoteCountTable) -> Result<ExactReport> {
        let labels = table.labels();
        let n = table.arity();

        // items and per-classifier agreements, by imputed label
        let mut items = vec![0u64; labels.len()];
        let mut agreements = vec![vec![0u64; labels.len()]; n];
        for (pattern, count) in table.observed() {
            let winner = PatternTally::from_pattern(labels, pattern).winner();
            let label = labels.get(winner).ok_or_else(|| EvaluatorError::UnsupportedTable {
                evaluator: NAME.to_string(),
                reason: "table has no labels".to_string(),
            })?;
            items[winner] += count;
            for (i, vote) in pattern.iter().enumerate() {
                if vote == label {
                    agreements[i][winner] += count;
                }
            }
        }
        debug!(items = ?items, "majority imputation");

        let q = table.test_size();
        let prevalence: BTreeMap<Label, ExactValue> = labels
            .iter()
            .zip(&items)
            .map(|(l, &k)| (l.clone(), ExactValue::ratio(k, q)))
            .collect();
        let accuracies = agreements
            .iter()
            .map(|by_label| {
                labels
                    .iter()
                    .zip(by_label.iter().zip(&items))
                    .map(|(l, (&right, &total))| (l.clone(), ExactValue::ratio(right, total)))
                    .collect()
            })
            .collect();

        Ok(ExactReport {
            evaluator: NAME.to_string(),
            branches: vec![Evaluation {
                prevalence,
                accuracies,
            }],
            status: AssumptionStatus::NotSelfChecking,
        })
    }
}
