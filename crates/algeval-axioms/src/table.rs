//! Observed and by-true-label vote-count tables.
//!
//! A [`VoteCountTable`] is the only observable input: how many test items
//! produced each joint response pattern. A [`LabeledVoteCounts`] splits the
//! same counts by true label; it exists for simulations, fixtures and for
//! building witnesses that axioms must accept.

use crate::algebra::CountAlgebra;
use crate::error::{AxiomError, Result};
use crate::identity::{CountAssignment, Variable};
use crate::labels::{format_pattern, Label, LabelSet, Pattern};
use crate::subset::Subset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One `pattern -> count` row of the serialized table form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCount {
    /// Joint response, one label per classifier
    pub pattern: Vec<Label>,
    /// Number of items; signed so negative input can be reported
    pub count: i64,
}

/// Serialized form of a [`VoteCountTable`].
///
/// ```json
/// { "labels": ["a", "b"], "counts": [{ "pattern": ["a", "b"], "count": 3 }] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCountTableSpec {
    /// Label set in order
    pub labels: LabelSet,
    /// Rows; absent patterns count zero
    pub counts: Vec<PatternCount>,
}

/// Observed vote counts for M classifiers.
///
/// # Example
///
/// ```rust
/// use algeval_axioms::{LabelSet, VoteCountTable};
///
/// let table = VoteCountTable::new(
///     LabelSet::binary(),
///     [(["a", "a"], 6), (["a", "b"], 1), (["b", "b"], 3)],
/// )?;
/// assert_eq!(table.test_size(), 10);
/// assert_eq!(table.count(&["b".into(), "a".into()]), 0);
/// # Ok::<(), algeval_axioms::AxiomError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VoteCountTableSpec", into = "VoteCountTableSpec")]
pub struct VoteCountTable {
    labels: LabelSet,
    arity: usize,
    counts: BTreeMap<Pattern, u64>,
    test_size: u64,
}

impl VoteCountTable {
    /// Validates a table from `(pattern, count)` rows.
    ///
    /// # Errors
    ///
    /// `MalformedCountTable` for an empty table, patterns of differing
    /// length, unknown labels, repeated patterns, negative counts or a
    /// zero total.
    pub fn new<I, P, L>(labels: LabelSet, counts: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, i64)>,
        P: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        let mut arity = None;
        let mut table = BTreeMap::new();
        for (pattern, count) in counts {
            let pattern: Pattern = pattern.into_iter().map(Into::into).collect();
            check_pattern(&labels, &pattern, &mut arity)?;
            if count < 0 {
                return Err(malformed(format!(
                    "negative count {count} for {}",
                    format_pattern(&pattern)
                )));
            }
            let display = format_pattern(&pattern);
            if table.insert(pattern, count.unsigned_abs()).is_some() {
                return Err(malformed(format!("pattern {display} appears twice")));
            }
        }

        let arity = arity.ok_or_else(|| malformed("table has no patterns".to_string()))?;
        table.retain(|_, count| *count > 0);
        let test_size = table.values().sum();
        if test_size == 0 {
            return Err(malformed("table holds no items".to_string()));
        }
        Ok(Self {
            labels,
            arity,
            counts: table,
            test_size,
        })
    }

    /// Parses the JSON table form.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let spec: VoteCountTableSpec =
            serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;
        Self::try_from(spec)
    }

    /// Builds an already-valid table without re-checking it.
    pub(crate) fn from_parts(labels: LabelSet, arity: usize, counts: BTreeMap<Pattern, u64>) -> Self {
        let counts: BTreeMap<Pattern, u64> = counts.into_iter().filter(|(_, c)| *c > 0).collect();
        let test_size = counts.values().sum();
        Self {
            labels,
            arity,
            counts,
            test_size,
        }
    }

    /// Label set of the table.
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Number of classifiers M.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Total items Q.
    pub fn test_size(&self) -> u64 {
        self.test_size
    }

    /// Count for a pattern, zero when never observed.
    pub fn count(&self, pattern: &[Label]) -> u64 {
        self.counts.get(pattern).copied().unwrap_or(0)
    }

    /// All R^M patterns with their counts, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Pattern, u64)> + '_ {
        self.labels
            .patterns(self.arity)
            .into_iter()
            .map(move |p| {
                let n = self.count(&p);
                (p, n)
            })
    }

    /// Patterns observed at least once.
    pub fn observed(&self) -> impl Iterator<Item = (&Pattern, u64)> {
        self.counts.iter().map(|(p, n)| (p, *n))
    }

    /// Fails unless the counts sum to the session's test size.
    pub fn check_test_size(&self, expected: u64) -> Result<()> {
        if self.test_size != expected {
            return Err(malformed(format!(
                "counts sum to {}, expected {expected}",
                self.test_size
            )));
        }
        Ok(())
    }

    /// Number of items where the classifier at `position` voted `label`.
    pub fn label_votes(&self, position: usize, label: &Label) -> u64 {
        self.counts
            .iter()
            .filter(|(p, _)| p.get(position) == Some(label))
            .map(|(_, n)| n)
            .sum()
    }

    /// Sums the table onto the classifiers at `positions`.
    ///
    /// # Errors
    ///
    /// `InvalidSubset` when the positions are empty, repeat or exceed M.
    pub fn marginalize(&self, positions: &[usize]) -> Result<VoteCountTable> {
        let keep = Subset::new(positions.iter().copied(), self.arity)?;
        let mut counts = BTreeMap::new();
        for (pattern, n) in &self.counts {
            *counts.entry(project(pattern, &keep)).or_insert(0) += n;
        }
        Ok(Self::from_parts(self.labels.clone(), keep.size(), counts))
    }

    /// The label, when every item fell in one unanimous pattern.
    pub fn unanimous_label(&self) -> Option<&Label> {
        if self.counts.len() != 1 {
            return None;
        }
        let pattern = self.counts.keys().next()?;
        let first = pattern.first()?;
        pattern.iter().all(|l| l == first).then_some(first)
    }
}

impl TryFrom<VoteCountTableSpec> for VoteCountTable {
    type Error = AxiomError;

    fn try_from(spec: VoteCountTableSpec) -> Result<Self> {
        Self::new(
            spec.labels,
            spec.counts.into_iter().map(|row| (row.pattern, row.count)),
        )
    }
}

impl From<VoteCountTable> for VoteCountTableSpec {
    fn from(table: VoteCountTable) -> Self {
        let counts = table
            .iter()
            .map(|(pattern, count)| PatternCount {
                pattern,
                count: i64::try_from(count).unwrap_or(i64::MAX),
            })
            .collect();
        Self {
            labels: table.labels,
            counts,
        }
    }
}

/// Vote counts split by true label, for N classifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledVoteCounts {
    labels: LabelSet,
    arity: usize,
    counts: BTreeMap<Label, BTreeMap<Pattern, u64>>,
}

impl LabeledVoteCounts {
    /// Validates `(true_label, pattern, count)` rows.
    ///
    /// # Errors
    ///
    /// Same conditions as [`VoteCountTable::new`], plus unknown true labels.
    pub fn new<I, P, L>(labels: LabelSet, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (L, P, i64)>,
        P: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        let mut arity = None;
        let mut counts: BTreeMap<Label, BTreeMap<Pattern, u64>> = BTreeMap::new();
        for (true_label, pattern, count) in rows {
            let true_label: Label = true_label.into();
            if !labels.contains(&true_label) {
                return Err(malformed(format!("unknown true label '{true_label}'")));
            }
            let pattern: Pattern = pattern.into_iter().map(Into::into).collect();
            check_pattern(&labels, &pattern, &mut arity)?;
            if count < 0 {
                return Err(malformed(format!(
                    "negative count {count} for {} with true label {true_label}",
                    format_pattern(&pattern)
                )));
            }
            let display = format_pattern(&pattern);
            let by_pattern = counts.entry(true_label.clone()).or_default();
            if by_pattern.insert(pattern, count.unsigned_abs()).is_some() {
                return Err(malformed(format!(
                    "pattern {display} appears twice for true label {true_label}"
                )));
            }
        }

        let arity = arity.ok_or_else(|| malformed("table has no patterns".to_string()))?;
        for by_pattern in counts.values_mut() {
            by_pattern.retain(|_, n| *n > 0);
        }
        let labeled = Self {
            labels,
            arity,
            counts,
        };
        if labeled.test_size() == 0 {
            return Err(malformed("table holds no items".to_string()));
        }
        Ok(labeled)
    }

    pub(crate) fn from_parts(
        labels: LabelSet,
        arity: usize,
        counts: BTreeMap<Label, BTreeMap<Pattern, u64>>,
    ) -> Self {
        Self {
            labels,
            arity,
            counts,
        }
    }

    /// Label set.
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Number of classifiers.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Items carrying each true label, zero included.
    pub fn test_sizes(&self) -> BTreeMap<Label, u64> {
        self.labels
            .iter()
            .map(|l| (l.clone(), self.label_total(l)))
            .collect()
    }

    /// Items whose true label is `label`.
    pub fn label_total(&self, label: &Label) -> u64 {
        self.counts
            .get(label)
            .map(|by_pattern| by_pattern.values().sum())
            .unwrap_or(0)
    }

    /// Total items Q.
    pub fn test_size(&self) -> u64 {
        self.counts.values().flat_map(BTreeMap::values).sum()
    }

    /// Items with true label `true_label` that produced `pattern`.
    pub fn count(&self, true_label: &Label, pattern: &[Label]) -> u64 {
        self.counts
            .get(true_label)
            .and_then(|by_pattern| by_pattern.get(pattern))
            .copied()
            .unwrap_or(0)
    }

    /// Rows with a nonzero count.
    pub fn rows(&self) -> impl Iterator<Item = (&Label, &Pattern, u64)> {
        self.counts
            .iter()
            .flat_map(|(l, by_pattern)| by_pattern.iter().map(move |(p, n)| (l, p, *n)))
    }

    /// Sums out the true label.
    pub fn project(&self) -> VoteCountTable {
        let mut counts = BTreeMap::new();
        for (_, pattern, n) in self.rows() {
            *counts.entry(pattern.clone()).or_insert(0) += n;
        }
        VoteCountTable::from_parts(self.labels.clone(), self.arity, counts)
    }

    /// Sums onto the classifiers at `positions`, keeping true labels.
    pub fn marginalize(&self, positions: &[usize]) -> Result<LabeledVoteCounts> {
        let keep = Subset::new(positions.iter().copied(), self.arity)?;
        let mut counts: BTreeMap<Label, BTreeMap<Pattern, u64>> = BTreeMap::new();
        for (label, pattern, n) in self.rows() {
            *counts
                .entry(label.clone())
                .or_default()
                .entry(project(pattern, &keep))
                .or_insert(0) += n;
        }
        Ok(Self {
            labels: self.labels.clone(),
            arity: keep.size(),
            counts,
        })
    }

    /// Values for every variable of `algebra.axioms_for_subset(subset)`.
    ///
    /// Table positions are classifier indices, so the table must cover all
    /// N classifiers of the algebra.
    pub fn witness(&self, algebra: &CountAlgebra, subset: &Subset) -> Result<CountAssignment> {
        if self.arity != algebra.classifiers() {
            return Err(malformed(format!(
                "table covers {} classifiers, algebra expects {}",
                self.arity,
                algebra.classifiers()
            )));
        }
        if self.labels != *algebra.labels() {
            return Err(malformed("table and algebra use different label sets".into()));
        }

        let mut point = CountAssignment::new();
        for (label, total) in self.test_sizes() {
            point.insert(Variable::LabelTotal(label), total);
        }
        let mut subsets = vec![subset.clone()];
        subsets.extend(subset.proper_subsets());
        for s in &subsets {
            let marginal = self.marginalize(s.indices())?;
            for pattern in self.labels.patterns(s.size()) {
                let mut observed = 0;
                for true_label in self.labels.iter() {
                    let n = marginal.count(true_label, &pattern);
                    observed += n;
                    point.insert(Variable::label_response(s, &pattern, true_label), n);
                }
                point.insert(Variable::response(s, &pattern), observed);
            }
        }
        Ok(point)
    }
}

fn malformed(reason: String) -> AxiomError {
    AxiomError::MalformedCountTable(reason)
}

fn check_pattern(labels: &LabelSet, pattern: &[Label], arity: &mut Option<usize>) -> Result<()> {
    if pattern.is_empty() {
        return Err(malformed("empty response pattern".to_string()));
    }
    match *arity {
        None => *arity = Some(pattern.len()),
        Some(m) if m != pattern.len() => {
            return Err(malformed(format!(
                "pattern {} has {} labels, expected {m}",
                format_pattern(pattern),
                pattern.len()
            )));
        }
        Some(_) => {}
    }
    if let Some(unknown) = pattern.iter().find(|l| !labels.contains(l)) {
        return Err(malformed(format!(
            "pattern {} uses unknown label '{unknown}'",
            format_pattern(pattern)
        )));
    }
    Ok(())
}

fn project(pattern: &[Label], keep: &Subset) -> Pattern {
    keep.indices().iter().map(|&i| pattern[i].clone()).collect()
}
