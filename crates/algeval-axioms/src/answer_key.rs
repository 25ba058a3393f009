//! Answer-key distributions `{Q_l}` and sweeps over the Q-simplex.

use crate::error::{AxiomError, Result};
use crate::identity::{CountAssignment, Variable};
use crate::labels::{Label, LabelSet};
use crate::table::LabeledVoteCounts;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How many test items truly carry each label.
///
/// Never observed; evaluations either assume one or sweep all of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerKey {
    labels: LabelSet,
    totals: Vec<u64>,
}

impl AnswerKey {
    /// Creates a key with one total per label, in label-set order.
    ///
    /// # Errors
    ///
    /// `MalformedCountTable` when the number of totals differs from R or
    /// they sum to zero.
    pub fn new(labels: LabelSet, totals: impl IntoIterator<Item = u64>) -> Result<Self> {
        let totals: Vec<u64> = totals.into_iter().collect();
        if totals.len() != labels.len() {
            return Err(AxiomError::MalformedCountTable(format!(
                "answer key has {} totals for {} labels",
                totals.len(),
                labels.len()
            )));
        }
        if totals.iter().sum::<u64>() == 0 {
            return Err(AxiomError::MalformedCountTable(
                "answer key holds no items".to_string(),
            ));
        }
        Ok(Self { labels, totals })
    }

    /// The true key of a labeled table.
    pub fn from_labeled(counts: &LabeledVoteCounts) -> Self {
        let labels = counts.labels().clone();
        let totals = labels.iter().map(|l| counts.label_total(l)).collect();
        Self { labels, totals }
    }

    /// Label set of the key.
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Totals in label-set order.
    pub fn totals(&self) -> &[u64] {
        &self.totals
    }

    /// `Q_l` for one label.
    pub fn total(&self, label: &Label) -> Result<u64> {
        let index = self.labels.require(label)?;
        Ok(self.totals[index])
    }

    /// Total items Q.
    pub fn test_size(&self) -> u64 {
        self.totals.iter().sum()
    }

    /// Writes every `Q_l` into `point`.
    pub fn assign(&self, point: &mut CountAssignment) {
        for (label, total) in self.labels.iter().zip(&self.totals) {
            point.insert(Variable::LabelTotal(label.clone()), *total);
        }
    }

    /// Every answer key for a test of size `test_size`, lexicographic.
    pub fn sweep(labels: &LabelSet, test_size: u64) -> AnswerKeySweep {
        let mut first = vec![0; labels.len()];
        if let Some(last) = first.last_mut() {
            *last = test_size;
        }
        AnswerKeySweep {
            labels: labels.clone(),
            test_size,
            next: (test_size > 0).then_some(first),
        }
    }

    /// Number of keys [`sweep`](Self::sweep) yields, `None` on overflow.
    pub fn sweep_size(labels: usize, test_size: u64) -> Option<u128> {
        let r = u64::try_from(labels).ok()?;
        binomial(test_size + r - 1, r - 1)
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .labels
            .iter()
            .zip(&self.totals)
            .map(|(l, q)| format!("Q_{l}={q}"))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Iterator over the compositions of Q into R nonnegative parts.
#[derive(Debug, Clone)]
pub struct AnswerKeySweep {
    labels: LabelSet,
    test_size: u64,
    next: Option<Vec<u64>>,
}

impl Iterator for AnswerKeySweep {
    type Item = AnswerKey;

    fn next(&mut self) -> Option<AnswerKey> {
        let current = self.next.take()?;
        self.next = successor(&current, self.test_size);
        Some(AnswerKey {
            labels: self.labels.clone(),
            totals: current,
        })
    }
}

/// Next composition in lexicographic order, `None` after `(Q, 0, .., 0)`.
fn successor(parts: &[u64], test_size: u64) -> Option<Vec<u64>> {
    if parts.first() == Some(&test_size) {
        return None;
    }
    let r = parts.len();
    let mut tail = 0;
    for i in (0..r - 1).rev() {
        tail += parts[i + 1];
        if tail > 0 {
            let mut next = parts.to_vec();
            next[i] += 1;
            for part in next.iter_mut().skip(i + 1) {
                *part = 0;
            }
            next[r - 1] = tail - 1;
            return Some(next);
        }
    }
    None
}

/// `n choose k` in `u128`, `None` on overflow.
pub fn binomial(n: u64, k: u64) -> Option<u128> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 1..=u128::from(k) {
        acc = acc.checked_mul(u128::from(n - k) + i)? / i;
    }
    Some(acc)
}
