//! Evaluator framework.
//!
//! Defines the [`Evaluator`] trait and the evaluation structures every
//! evaluator returns, exact and floating.

pub mod independent;
pub mod majority;

use crate::error::Result;
use crate::exact::ExactValue;
use algeval_axioms::{Label, VoteCountTable};
use num::{BigRational, One, Zero};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// How an assumption-bound solution falsified its assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Falsification {
    /// Prevalence came out irrational; real counts give rationals.
    IrrationalSolution,
    /// The quadratic has no real roots.
    ComplexSolution,
}

/// What one evaluation says about the evaluator's own assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssumptionStatus {
    /// Rational solutions: the assumption may still be wrong, but this
    /// test cannot prove it.
    NotFalsified,
    /// The assumption is provably false for this data.
    Falsified(Falsification),
    /// The evaluator has no way to detect its own failure.
    NotSelfChecking,
}

impl AssumptionStatus {
    /// True when the data proves the assumption false.
    #[must_use]
    pub const fn is_falsified(&self) -> bool {
        matches!(self, Self::Falsified(_))
    }

    /// True unless the evaluator cannot self-alarm.
    #[must_use]
    pub const fn is_self_checking(&self) -> bool {
        !matches!(self, Self::NotSelfChecking)
    }
}

impl fmt::Display for AssumptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFalsified => write!(f, "not falsified"),
            Self::Falsified(Falsification::IrrationalSolution) => {
                write!(f, "FALSIFIED (irrational solution)")
            }
            Self::Falsified(Falsification::ComplexSolution) => {
                write!(f, "FALSIFIED (complex solution)")
            }
            Self::NotSelfChecking => write!(f, "cannot self-alarm"),
        }
    }
}

/// Prevalence and per-classifier label accuracies of one solution branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation<V> {
    /// `P_l` per label
    pub prevalence: BTreeMap<Label, V>,
    /// `P_{i,l}` per classifier, then per label
    pub accuracies: Vec<BTreeMap<Label, V>>,
}

impl<V> Evaluation<V> {
    /// Applies `f` to every value.
    pub fn map<W>(&self, mut f: impl FnMut(&V) -> W) -> Evaluation<W> {
        Evaluation {
            prevalence: self.prevalence.iter().map(|(l, v)| (l.clone(), f(v))).collect(),
            accuracies: self
                .accuracies
                .iter()
                .map(|by_label| by_label.iter().map(|(l, v)| (l.clone(), f(v))).collect())
                .collect(),
        }
    }

    /// Every value, prevalence first.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.prevalence
            .values()
            .chain(self.accuracies.iter().flat_map(BTreeMap::values))
    }
}

impl Evaluation<ExactValue> {
    /// Floating approximation; complex and indeterminate values are `None`.
    pub fn to_float(&self) -> Evaluation<Option<f64>> {
        self.map(ExactValue::to_f64)
    }

    /// True when no value carries an irrational root.
    pub fn is_rational(&self) -> bool {
        self.values()
            .all(|v| !matches!(v, ExactValue::Radical(_)))
    }

    /// True when every determinate value is real and lies in [0, 1].
    ///
    /// Out-of-range branches are reported as they are, never clipped.
    pub fn is_feasible(&self) -> bool {
        let zero = BigRational::zero();
        let one = BigRational::one();
        self.values().all(|v| match v {
            ExactValue::Rational(r) => *r >= zero && *r <= one,
            ExactValue::Radical(_) => v
                .to_f64()
                .is_some_and(|x| (0.0..=1.0).contains(&x)),
            ExactValue::Indeterminate => true,
        })
    }
}

/// Exact output of one evaluator on one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExactReport {
    /// Evaluator name
    pub evaluator: String,
    /// Solution branches; majority voting has exactly one
    pub branches: Vec<Evaluation<ExactValue>>,
    /// What the result says about the assumption
    pub status: AssumptionStatus,
}

impl ExactReport {
    /// Floating version of the same report.
    pub fn to_float(&self) -> FloatReport {
        FloatReport {
            evaluator: self.evaluator.clone(),
            branches: self.branches.iter().map(Evaluation::to_float).collect(),
            status: self.status,
        }
    }
}

/// Floating output of one evaluator on one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatReport {
    /// Evaluator name
    pub evaluator: String,
    /// Solution branches
    pub branches: Vec<Evaluation<Option<f64>>>,
    /// What the exact result said about the assumption
    pub status: AssumptionStatus,
}

/// An evaluation method for observed vote-count tables.
///
/// # Implementors
///
/// - [`independent::ExactIndependentEvaluator`]: closed form under error
///   independence, self-alarming
/// - [`majority::MajorityVotingEvaluator`]: majority response as the true
///   label, never self-alarming
pub trait Evaluator: Send + Sync {
    /// Short name used in reports.
    fn name(&self) -> &str;

    /// The structural assumption the evaluation rests on.
    fn assumption(&self) -> &str;

    /// Whether a wrong assumption can show up in the output.
    fn self_checking(&self) -> bool;

    /// Exact evaluation of `table`.
    fn evaluation_exact(&self, table: &VoteCountTable) -> Result<ExactReport>;

    /// Floating evaluation, by default the exact result converted.
    fn evaluation_float(&self, table: &VoteCountTable) -> Result<FloatReport> {
        Ok(self.evaluation_exact(table)?.to_float())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(values: [ExactValue; 2]) -> Evaluation<ExactValue> {
        let [pa, acc] = values;
        let mut prevalence = BTreeMap::new();
        prevalence.insert(Label::from("a"), pa);
        let mut by_label = BTreeMap::new();
        by_label.insert(Label::from("a"), acc);
        Evaluation {
            prevalence,
            accuracies: vec![by_label],
        }
    }

    #[test]
    fn test_status_display() {
        assert_eq!(AssumptionStatus::NotFalsified.to_string(), "not falsified");
        assert_eq!(AssumptionStatus::NotSelfChecking.to_string(), "cannot self-alarm");
        assert!(AssumptionStatus::Falsified(Falsification::ComplexSolution)
            .to_string()
            .contains("complex"));
    }

    #[test]
    fn test_status_helpers() {
        assert!(AssumptionStatus::Falsified(Falsification::IrrationalSolution).is_falsified());
        assert!(!AssumptionStatus::NotSelfChecking.is_self_checking());
        assert!(AssumptionStatus::NotFalsified.is_self_checking());
    }

    #[test]
    fn test_feasibility_rejects_out_of_range_rationals() {
        let ok = single([ExactValue::ratio(1, 4), ExactValue::Indeterminate]);
        assert!(ok.is_feasible());
        assert!(ok.is_rational());

        let mut bad = ok.clone();
        bad.accuracies[0].insert(
            Label::from("a"),
            ExactValue::Rational(BigRational::new(5.into(), 4.into())),
        );
        assert!(!bad.is_feasible());
    }

    #[test]
    fn test_to_float_maps_every_value() {
        let eval = single([ExactValue::ratio(1, 4), ExactValue::Indeterminate]);
        let float = eval.to_float();
        assert_eq!(float.prevalence[&Label::from("a")], Some(0.25));
        assert_eq!(float.accuracies[0][&Label::from("a")], None);
    }
}
