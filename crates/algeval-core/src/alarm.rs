//! # Consistency Alarm
//!
//! Decides whether any logically consistent evaluation of an unlabeled
//! test meets a minimum-performance specification.
//!
//! ## Algorithm
//!
//! For a fixed answer key `{Q_l}`, the single-classifier axioms bound the
//! correct count of a classifier on label `l` by `min(Q_l, n_l)`, with
//! `n_l` its votes for `l`. All of these maxima are attainable at once
//! (the remaining items are placed off the diagonal by the northwest
//! corner rule), so a classifier can meet the requirement at that key
//! exactly when its best case does. The attaining point is built and
//! checked against the axioms.
//!
//! Pair axioms only shrink the feasible region. The optional pairwise
//! stage searches each pair's variety for a point where both members
//! meet the requirement:
//!
//! ```text
//!   key ──► singles: best case meets spec? ──no──► Misaligned
//!                    │ yes
//!                    ▼
//!           pairs:   find_point ──none──► Misaligned
//!                    │ found     └─bound─► Unknown
//!                    ▼
//!                 Aligned
//! ```
//!
//! ## State Machine
//!
//! ```text
//! Unevaluated ──► AxiomsBuilt ──► VarietyBounded ──► Safe | Alarmed | Inconclusive
//!      ▲                                                         │
//!      └──────────────────────── reset() ◄───────────────────────┘
//! ```
//!
//! Steps called out of order fail with `InvalidTransition`.

use crate::config::AlarmConfig;
use crate::error::{EngineError, Result};
use crate::verdict::{AlarmVerdict, InconclusiveReason};
use algeval_axioms::{
    AnswerKey, AxiomError, AxiomSet, CountAlgebra, CountAssignment, Label, LabelSet, Subset,
    Variable, VoteCountTable,
};
use algeval_variety::{EnumerationBound, SubsetSimplexSpace, VarietyError};
use num::{BigInt, BigRational, One, Signed};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

// ============================================================================
// Safety Specification
// ============================================================================

/// Minimum performance a deployment requires.
///
/// A requirement is met when the correct count *exceeds* the threshold
/// share of the items it applies to. A label requirement holds vacuously
/// when no item carries the label.
///
/// # Example
///
/// ```rust
/// use algeval_core::SafetySpecification;
///
/// let spec: SafetySpecification = serde_json::from_str(r#"{"labels": {"a": "0.75", "b": "1/2"}}"#)?;
/// assert_eq!(spec.to_string(), "a > 3/4, b > 1/2");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SafetySpecificationSpec", into = "SafetySpecificationSpec")]
pub enum SafetySpecification {
    /// Per-label accuracy thresholds; unlisted labels are unconstrained.
    Labels(BTreeMap<Label, BigRational>),
    /// Threshold on overall accuracy.
    Grade(BigRational),
}

/// Serde form of [`SafetySpecification`], thresholds as text.
///
/// Thresholds are written `"3/4"`, `"0.75"` or `"1"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetySpecificationSpec {
    /// Per-label thresholds
    Labels(BTreeMap<Label, String>),
    /// Overall threshold
    Grade(String),
}

impl SafetySpecification {
    /// Per-label thresholds.
    ///
    /// # Errors
    ///
    /// `InvalidSpecification` when no label is given or a threshold lies
    /// outside [0, 1].
    pub fn labels<I, L>(thresholds: I) -> Result<Self>
    where
        I: IntoIterator<Item = (L, BigRational)>,
        L: Into<Label>,
    {
        let thresholds = thresholds
            .into_iter()
            .map(|(l, t)| Ok((l.into(), check_range(t)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        if thresholds.is_empty() {
            return Err(EngineError::InvalidSpecification(
                "no label thresholds given".to_string(),
            ));
        }
        Ok(Self::Labels(thresholds))
    }

    /// Overall accuracy threshold.
    pub fn grade(threshold: BigRational) -> Result<Self> {
        Ok(Self::Grade(check_range(threshold)?))
    }

    /// Fails when a thresholded label is not in `labels`.
    pub fn validate(&self, labels: &LabelSet) -> Result<()> {
        if let Self::Labels(thresholds) = self {
            if let Some(unknown) = thresholds.keys().find(|l| !labels.contains(l)) {
                return Err(EngineError::InvalidSpecification(format!(
                    "label '{unknown}' is not in the label set"
                )));
            }
        }
        Ok(())
    }

    /// Whether correct counts per label, in label-set order, meet the
    /// specification at `key`.
    pub fn is_met(&self, correct: &[u64], key: &AnswerKey) -> bool {
        match self {
            Self::Labels(thresholds) => key
                .labels()
                .iter()
                .zip(correct)
                .zip(key.totals())
                .all(|((label, &c), &q)| match thresholds.get(label) {
                    None => true,
                    Some(_) if q == 0 => true,
                    Some(t) => exceeds(c, t, q),
                }),
            Self::Grade(t) => exceeds(correct.iter().sum(), t, key.test_size()),
        }
    }
}

impl TryFrom<SafetySpecificationSpec> for SafetySpecification {
    type Error = EngineError;

    fn try_from(spec: SafetySpecificationSpec) -> Result<Self> {
        match spec {
            SafetySpecificationSpec::Labels(thresholds) => Self::labels(
                thresholds
                    .into_iter()
                    .map(|(l, t)| Ok((l, parse_threshold(&t)?)))
                    .collect::<Result<Vec<(Label, BigRational)>>>()?,
            ),
            SafetySpecificationSpec::Grade(t) => Self::grade(parse_threshold(&t)?),
        }
    }
}

impl From<SafetySpecification> for SafetySpecificationSpec {
    fn from(spec: SafetySpecification) -> Self {
        match spec {
            SafetySpecification::Labels(thresholds) => Self::Labels(
                thresholds
                    .into_iter()
                    .map(|(l, t)| (l, t.to_string()))
                    .collect(),
            ),
            SafetySpecification::Grade(t) => Self::Grade(t.to_string()),
        }
    }
}

impl fmt::Display for SafetySpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Labels(thresholds) => {
                let parts: Vec<String> = thresholds
                    .iter()
                    .map(|(l, t)| format!("{l} > {t}"))
                    .collect();
                f.write_str(&parts.join(", "))
            }
            Self::Grade(t) => write!(f, "grade > {t}"),
        }
    }
}

/// Parses `"3/4"`, `"0.75"` or `"1"` into a threshold in [0, 1].
pub fn parse_threshold(text: &str) -> Result<BigRational> {
    let text = text.trim();
    let invalid =
        || EngineError::InvalidSpecification(format!("threshold '{text}' is not a number"));
    let value = match text.split_once('.') {
        Some((whole, frac)) => {
            if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            let digits: BigInt = format!("{whole}{frac}").parse().map_err(|_| invalid())?;
            BigRational::new(digits, num::pow(BigInt::from(10), frac.len()))
        }
        None => text.parse::<BigRational>().map_err(|_| invalid())?,
    };
    check_range(value)
}

fn check_range(threshold: BigRational) -> Result<BigRational> {
    if threshold.is_negative() || threshold > BigRational::one() {
        return Err(EngineError::InvalidSpecification(format!(
            "threshold {threshold} is outside [0, 1]"
        )));
    }
    Ok(threshold)
}

fn exceeds(correct: u64, threshold: &BigRational, total: u64) -> bool {
    BigRational::from_integer(BigInt::from(correct))
        > threshold * BigRational::from_integer(BigInt::from(total))
}

// ============================================================================
// State
// ============================================================================

/// Phase of one alarm evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlarmState {
    /// Nothing computed yet.
    Unevaluated,
    /// Axiom sets of every checked subset are in hand.
    AxiomsBuilt,
    /// Every answer key has an outcome.
    VarietyBounded,
    /// Terminal: an aligned evaluation exists.
    Safe,
    /// Terminal: no aligned evaluation exists.
    Alarmed,
    /// Terminal: the check did not finish.
    Inconclusive,
}

impl AlarmState {
    /// True for the three verdict states.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Safe | Self::Alarmed | Self::Inconclusive)
    }

    /// Whether `next` directly follows `self`.
    pub const fn can_enter(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Unevaluated, Self::AxiomsBuilt)
                | (Self::AxiomsBuilt, Self::VarietyBounded)
                | (
                    Self::VarietyBounded,
                    Self::Safe | Self::Alarmed | Self::Inconclusive
                )
        )
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unevaluated => "unevaluated",
            Self::AxiomsBuilt => "axioms-built",
            Self::VarietyBounded => "variety-bounded",
            Self::Safe => "safe",
            Self::Alarmed => "alarmed",
            Self::Inconclusive => "inconclusive",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Which answer keys the alarm checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySelection {
    /// Every composition of Q into R parts.
    Sweep,
    /// Only these keys.
    Keys(Vec<AnswerKey>),
}

/// Result of the check at one answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum KeyOutcome {
    /// A consistent evaluation meets the requirement.
    Aligned,
    /// No consistent evaluation does.
    Misaligned {
        /// Classifiers whose best case falls short
        classifiers: Vec<usize>,
        /// Pairs with no jointly aligned point
        pairs: Vec<(usize, usize)>,
    },
    /// Pairs whose search hit the enumeration bound.
    Unknown {
        /// Unfinished pairs
        pairs: Vec<(usize, usize)>,
    },
}

/// One entry of the misalignment trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyEvaluation {
    /// Answer key checked
    pub key: AnswerKey,
    /// What the check found
    pub outcome: KeyOutcome,
}

/// Verdict with every per-key outcome behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlarmReport {
    /// Final verdict
    pub verdict: AlarmVerdict,
    /// Specification checked
    pub specification: SafetySpecification,
    /// Whether pair axioms were used
    pub pairwise: bool,
    /// Outcomes in sweep order; empty when the sweep was refused
    pub trace: Vec<KeyEvaluation>,
}

impl AlarmReport {
    /// Keys with an aligned evaluation.
    pub fn aligned_keys(&self) -> usize {
        self.count(|o| matches!(o, KeyOutcome::Aligned))
    }

    /// Keys proven misaligned.
    pub fn misaligned_keys(&self) -> usize {
        self.count(|o| matches!(o, KeyOutcome::Misaligned { .. }))
    }

    /// Keys left unknown.
    pub fn unknown_keys(&self) -> usize {
        self.count(|o| matches!(o, KeyOutcome::Unknown { .. }))
    }

    fn count(&self, predicate: impl Fn(&KeyOutcome) -> bool) -> usize {
        self.trace.iter().filter(|k| predicate(&k.outcome)).count()
    }
}

impl fmt::Display for AlarmReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.verdict)?;
        writeln!(f, "specification: {}", self.specification)?;
        writeln!(
            f,
            "axioms: {}",
            if self.pairwise { "single and pair" } else { "single" }
        )?;
        write!(
            f,
            "answer keys: {} aligned, {} misaligned, {} unknown",
            self.aligned_keys(),
            self.misaligned_keys(),
            self.unknown_keys()
        )
    }
}

// ============================================================================
// Alarm
// ============================================================================

/// Consistency alarm over one test.
///
/// # Example
///
/// ```rust
/// use algeval_axioms::{CountAlgebra, LabelSet, VoteCountTable};
/// use algeval_core::{AlarmConfig, ConsistencyAlarm, KeySelection, SafetySpecification};
/// use algeval_variety::EnumerationBound;
/// use num::{BigInt, BigRational};
///
/// // classifier 0 mostly votes b, classifier 1 mostly votes a
/// let table = VoteCountTable::new(
///     LabelSet::binary(),
///     [(["a", "a"], 2), (["b", "a"], 6), (["b", "b"], 2)],
/// )?;
/// let algebra = CountAlgebra::new(LabelSet::binary(), 2, 10)?;
/// let nine_tenths = BigRational::new(BigInt::from(9), BigInt::from(10));
/// let spec = SafetySpecification::labels([("a", nine_tenths.clone()), ("b", nine_tenths)])?;
///
/// let mut alarm = ConsistencyAlarm::new(algebra, spec, AlarmConfig::new(), EnumerationBound::new())?;
/// let report = alarm.run(&table, KeySelection::Sweep)?;
/// assert!(report.verdict.is_alarmed());
/// # Ok::<(), algeval_core::EngineError>(())
/// ```
#[derive(Debug)]
pub struct ConsistencyAlarm {
    algebra: CountAlgebra,
    specification: SafetySpecification,
    config: AlarmConfig,
    bound: EnumerationBound,
    state: AlarmState,
    singles: Vec<(usize, Subset, Arc<AxiomSet>)>,
    pairs: Vec<(SubsetSimplexSpace, Arc<AxiomSet>)>,
    trace: Vec<KeyEvaluation>,
    refused: Option<InconclusiveReason>,
    verdict: Option<AlarmVerdict>,
}

impl ConsistencyAlarm {
    /// Creates an alarm for the test fixed by `algebra`.
    ///
    /// # Errors
    ///
    /// `InvalidSpecification` when the safety specification names a label
    /// outside the algebra's label set.
    pub fn new(
        algebra: CountAlgebra,
        specification: SafetySpecification,
        config: AlarmConfig,
        bound: EnumerationBound,
    ) -> Result<Self> {
        specification.validate(algebra.labels())?;
        Ok(Self {
            algebra,
            specification,
            config,
            bound,
            state: AlarmState::Unevaluated,
            singles: Vec::new(),
            pairs: Vec::new(),
            trace: Vec::new(),
            refused: None,
            verdict: None,
        })
    }

    /// Current phase.
    pub const fn state(&self) -> AlarmState {
        self.state
    }

    /// Per-key outcomes recorded so far.
    pub fn trace(&self) -> &[KeyEvaluation] {
        &self.trace
    }

    /// Runs every phase, building axioms from the algebra.
    pub fn run(&mut self, table: &VoteCountTable, keys: KeySelection) -> Result<AlarmReport> {
        let algebra = self.algebra.clone();
        self.run_with_axioms(table, keys, move |subset| {
            Ok(Arc::new(algebra.axioms_for_subset(subset)?))
        })
    }

    /// Runs every phase, taking axiom sets from `axioms_for`.
    pub fn run_with_axioms<F>(
        &mut self,
        table: &VoteCountTable,
        keys: KeySelection,
        axioms_for: F,
    ) -> Result<AlarmReport>
    where
        F: FnMut(&Subset) -> Result<Arc<AxiomSet>>,
    {
        self.build_axioms(axioms_for)?;
        self.bound_variety(table, keys)?;
        self.decide()?;
        self.report()
    }

    /// `Unevaluated -> AxiomsBuilt`: collects the single axioms of every
    /// classifier, and the pair axioms when the pairwise stage is on.
    pub fn build_axioms<F>(&mut self, mut axioms_for: F) -> Result<()>
    where
        F: FnMut(&Subset) -> Result<Arc<AxiomSet>>,
    {
        self.ensure(AlarmState::AxiomsBuilt)?;
        let n = self.algebra.classifiers();

        let mut singles = Vec::with_capacity(n);
        for i in 0..n {
            let subset = self.algebra.subset([i])?;
            let axioms = checked(&subset, axioms_for(&subset)?)?;
            singles.push((i, subset, axioms));
        }

        let mut pairs = Vec::new();
        if self.config.pairwise {
            for subset in Subset::all_of_size(n, 2) {
                let axioms = checked(&subset, axioms_for(&subset)?)?;
                pairs.push((SubsetSimplexSpace::new(self.algebra.clone(), subset)?, axioms));
            }
        }
        debug!(singles = singles.len(), pairs = pairs.len(), "alarm axioms built");

        self.singles = singles;
        self.pairs = pairs;
        self.enter(AlarmState::AxiomsBuilt);
        Ok(())
    }

    /// `AxiomsBuilt -> VarietyBounded`: checks every selected answer key.
    ///
    /// # Errors
    ///
    /// `MalformedCountTable` when `table` does not match the algebra,
    /// `InvalidAnswerKey` for a key of another test, `InvalidSpecification`
    /// for an empty key list. Enumeration bounds are not errors here: they
    /// make a key `Unknown`.
    pub fn bound_variety(&mut self, table: &VoteCountTable, keys: KeySelection) -> Result<()> {
        self.ensure(AlarmState::VarietyBounded)?;
        self.check_table(table)?;

        let labels = self.algebra.labels();
        let q = self.algebra.test_size();
        let limit = self.config.max_answer_keys;
        let keys = match keys {
            KeySelection::Sweep => {
                let size = AnswerKey::sweep_size(labels.len(), q);
                if size.map_or(true, |s| s > u128::from(limit)) {
                    self.refuse(InconclusiveReason::SweepTooLarge { keys: size, limit });
                    return Ok(());
                }
                AnswerKey::sweep(labels, q).collect()
            }
            KeySelection::Keys(keys) => {
                if keys.is_empty() {
                    return Err(EngineError::InvalidSpecification(
                        "no answer keys to check".to_string(),
                    ));
                }
                if let Some(bad) = keys.iter().find(|k| k.labels() != labels || k.test_size() != q) {
                    return Err(VarietyError::InvalidAnswerKey(format!(
                        "{bad} does not describe a test of {q} items over this label set"
                    ))
                    .into());
                }
                if (keys.len() as u64) > limit {
                    let size = Some(keys.len() as u128);
                    self.refuse(InconclusiveReason::SweepTooLarge { keys: size, limit });
                    return Ok(());
                }
                keys
            }
        };

        let votes: Vec<Vec<u64>> = self
            .singles
            .iter()
            .map(|(i, _, _)| labels.iter().map(|l| table.label_votes(*i, l)).collect())
            .collect();
        let mut trace = Vec::with_capacity(keys.len());
        for key in keys {
            let outcome = self.evaluate_key(table, &votes, &key)?;
            trace.push(KeyEvaluation { key, outcome });
        }
        debug!(keys = trace.len(), "answer keys evaluated");

        self.trace = trace;
        self.enter(AlarmState::VarietyBounded);
        Ok(())
    }

    /// `VarietyBounded -> Safe | Alarmed | Inconclusive`.
    pub fn decide(&mut self) -> Result<AlarmVerdict> {
        let verdict = if let Some(reason) = &self.refused {
            AlarmVerdict::inconclusive(reason.clone())
        } else if let Some(aligned) = self
            .trace
            .iter()
            .find(|k| k.outcome == KeyOutcome::Aligned)
        {
            AlarmVerdict::safe(aligned.key.clone())
        } else {
            let unknown = self
                .trace
                .iter()
                .filter(|k| matches!(k.outcome, KeyOutcome::Unknown { .. }))
                .count();
            if unknown == 0 {
                AlarmVerdict::alarmed(self.trace.len())
            } else {
                AlarmVerdict::inconclusive(InconclusiveReason::BoundReached {
                    unknown_keys: unknown,
                    misaligned_keys: self.trace.len() - unknown,
                })
            }
        };
        let next = match verdict {
            AlarmVerdict::Safe { .. } => AlarmState::Safe,
            AlarmVerdict::Alarmed { .. } => AlarmState::Alarmed,
            AlarmVerdict::Inconclusive { .. } => AlarmState::Inconclusive,
        };
        self.ensure(next)?;

        match &verdict {
            AlarmVerdict::Safe { .. } => info!(verdict = %verdict, "consistency check passed"),
            _ => warn!(verdict = %verdict, specification = %self.specification, "consistency alarm"),
        }
        self.verdict = Some(verdict.clone());
        self.enter(next);
        Ok(verdict)
    }

    /// The finished report.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` before a verdict has been reached.
    pub fn report(&self) -> Result<AlarmReport> {
        let verdict = self
            .verdict
            .clone()
            .filter(|_| self.state.is_terminal())
            .ok_or(EngineError::InvalidTransition {
                from: self.state,
                to: AlarmState::Inconclusive,
            })?;
        Ok(AlarmReport {
            verdict,
            specification: self.specification.clone(),
            pairwise: self.config.pairwise,
            trace: self.trace.clone(),
        })
    }

    /// Returns to `Unevaluated`, dropping every intermediate result.
    pub fn reset(&mut self) {
        debug!(from = %self.state, "alarm reset");
        self.state = AlarmState::Unevaluated;
        self.singles.clear();
        self.pairs.clear();
        self.trace.clear();
        self.refused = None;
        self.verdict = None;
    }

    fn ensure(&self, next: AlarmState) -> Result<()> {
        if self.state.can_enter(next) {
            Ok(())
        } else {
            Err(EngineError::InvalidTransition {
                from: self.state,
                to: next,
            })
        }
    }

    fn enter(&mut self, next: AlarmState) {
        info!(from = %self.state, to = %next, "alarm transition");
        self.state = next;
    }

    fn refuse(&mut self, reason: InconclusiveReason) {
        warn!(reason = %reason, "answer-key sweep refused");
        self.trace.clear();
        self.refused = Some(reason);
        self.enter(AlarmState::VarietyBounded);
    }

    fn check_table(&self, table: &VoteCountTable) -> Result<()> {
        if table.labels() != self.algebra.labels() {
            return Err(AxiomError::MalformedCountTable(
                "table and alarm use different label sets".to_string(),
            )
            .into());
        }
        if table.arity() != self.algebra.classifiers() {
            return Err(AxiomError::MalformedCountTable(format!(
                "table covers {} classifiers, alarm expects {}",
                table.arity(),
                self.algebra.classifiers()
            ))
            .into());
        }
        table.check_test_size(self.algebra.test_size())?;
        Ok(())
    }

    fn evaluate_key(
        &self,
        table: &VoteCountTable,
        votes: &[Vec<u64>],
        key: &AnswerKey,
    ) -> Result<KeyOutcome> {
        let mut classifiers = Vec::new();
        for ((i, subset, axioms), votes) in self.singles.iter().zip(votes) {
            let (correct, point) = best_case(subset, votes, key);
            if !axioms.is_satisfied_by(&point)? {
                return Err(EngineError::Internal(format!(
                    "best case of classifier {i} violates its axioms at {key}"
                )));
            }
            if !self.specification.is_met(&correct, key) {
                classifiers.push(*i);
            }
        }
        if !classifiers.is_empty() {
            return Ok(KeyOutcome::Misaligned {
                classifiers,
                pairs: Vec::new(),
            });
        }

        let mut misaligned = Vec::new();
        let mut unknown = Vec::new();
        for (space, axioms) in &self.pairs {
            let members = space.subset().indices();
            let pair = (members[0], members[1]);
            let found = space.find_point(axioms, table, key, &self.bound, |point| {
                members.iter().all(|&i| self.point_meets(point, i, key))
            });
            match found {
                Ok(Some(_)) => {}
                Ok(None) => misaligned.push(pair),
                Err(VarietyError::ResourceBound {
                    resource,
                    required,
                    limit,
                }) => {
                    debug!(?pair, key = %key, %resource, required, limit, "pair search hit bound");
                    unknown.push(pair);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(if !misaligned.is_empty() {
            KeyOutcome::Misaligned {
                classifiers: Vec::new(),
                pairs: misaligned,
            }
        } else if !unknown.is_empty() {
            KeyOutcome::Unknown { pairs: unknown }
        } else {
            KeyOutcome::Aligned
        })
    }

    fn point_meets(&self, point: &CountAssignment, classifier: usize, key: &AnswerKey) -> bool {
        let correct: Option<Vec<u64>> = key
            .labels()
            .iter()
            .map(|l| point.correct_count(classifier, l))
            .collect();
        correct.is_some_and(|c| self.specification.is_met(&c, key))
    }
}

fn checked(subset: &Subset, axioms: Arc<AxiomSet>) -> Result<Arc<AxiomSet>> {
    if axioms.subset() != subset {
        return Err(EngineError::Internal(format!(
            "axioms for {} supplied for {subset}",
            axioms.subset()
        )));
    }
    Ok(axioms)
}

/// Best-case correct counts of one classifier at `key`, with a single
/// assignment attaining all of them.
///
/// `votes` are the classifier's votes per label in label-set order.
fn best_case(subset: &Subset, votes: &[u64], key: &AnswerKey) -> (Vec<u64>, CountAssignment) {
    let labels = key.labels();
    let totals = key.totals();
    let r = labels.len();

    let correct: Vec<u64> = totals.iter().zip(votes).map(|(&q, &n)| q.min(n)).collect();
    let mut supply: Vec<u64> = totals.iter().zip(&correct).map(|(q, c)| q - c).collect();
    let mut demand: Vec<u64> = votes.iter().zip(&correct).map(|(n, c)| n - c).collect();

    // cells[true][vote]; a label never has both supply and demand left,
    // so the corner walk stays off the diagonal
    let mut cells = vec![vec![0u64; r]; r];
    for (l, &c) in correct.iter().enumerate() {
        cells[l][l] = c;
    }
    let (mut t, mut v) = (0, 0);
    while t < r && v < r {
        if supply[t] == 0 {
            t += 1;
        } else if demand[v] == 0 {
            v += 1;
        } else {
            let moved = supply[t].min(demand[v]);
            cells[t][v] += moved;
            supply[t] -= moved;
            demand[v] -= moved;
        }
    }

    let mut point = CountAssignment::new();
    key.assign(&mut point);
    for (v, vote) in labels.iter().enumerate() {
        let pattern = [vote.clone()];
        point.insert(Variable::response(subset, &pattern), votes[v]);
        for (t, truth) in labels.iter().enumerate() {
            point.insert(Variable::label_response(subset, &pattern, truth), cells[t][v]);
        }
    }
    (correct, point)
}
