//! # Error-Independent Trio Evaluator
//!
//! Closed-form solution of the single-classifier and trio axioms for
//! three classifiers on a two-label test, under the assumption that
//! their errors are independent given the true label.
//!
//! ## Solution
//!
//! With `(alpha, beta)` the two labels and the moments of
//! [`TrioMoments`], each branch `sigma = +1, -1` is
//!
//! ```text
//! P_alpha     = 1/2 + sigma * mu3 / (2K) * sqrt(K)
//! P_{i,alpha} = f_{alpha,i} - mu3 / (2 Delta) + sigma * sqrt(K) / (2 Delta)
//! P_{i,beta}  = f_{beta,i}  + mu3 / (2 Delta) + sigma * sqrt(K) / (2 Delta)
//! ```
//!
//! where `Delta` is the pair moment of the two other classifiers.
//!
//! ## Self-Alarm
//!
//! Every count-based prevalence is a ratio of integers. When `sqrt(K)` is
//! irrational no real test can have produced the table under this
//! assumption, so the evaluator reports the irrational branches and marks
//! the assumption falsified. A negative `K` falsifies it too. Neither case
//! is approximated away.
//!
//! ## Degenerate Tables
//!
//! A zero pair moment or `K = 0` leaves the system without isolated
//! solutions and fails with `DegenerateSystem`. The one degenerate shape
//! with a known answer, every item in a single unanimous pattern, returns
//! the two rational branches "everyone was always right" and "everyone
//! was always wrong".

use crate::error::{EvaluatorError, Result};
use crate::evaluator::{
    AssumptionStatus, Evaluation, Evaluator, ExactReport, Falsification,
};
use crate::exact::{rational_sqrt, ExactValue};
use crate::moments::{TrioMoments, PAIRS};
use algeval_axioms::{Label, VoteCountTable};
use num::{BigInt, BigRational, Signed, Zero};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

const NAME: &str = "independent";

/// Exact evaluator for error-independent classifier trios.
///
/// # Example
///
/// ```rust
/// use algeval_axioms::samples;
/// use algeval_evaluators::{Evaluator, ExactIndependentEvaluator};
///
/// let report = ExactIndependentEvaluator::new()
///     .evaluation_exact(&samples::uci_adult_observed())?;
/// assert!(report.status.is_falsified());
/// assert!(!report.branches[0].prevalence[&"a".into()].is_rational());
/// # Ok::<(), algeval_evaluators::EvaluatorError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactIndependentEvaluator;

impl ExactIndependentEvaluator {
    /// Creates the evaluator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Exact moments of `table`.
    pub fn moments(&self, table: &VoteCountTable) -> Result<TrioMoments<BigRational>> {
        let (_, beta) = check_table(table)?;
        Ok(TrioMoments::from_table(table, &beta, exact_share))
    }

    /// Coefficients `(a, b, c)` of `a P^2 + b P + c = 0` satisfied by the
    /// first label's prevalence on both branches.
    pub fn prevalence_quadratic(&self, table: &VoteCountTable) -> Result<[BigRational; 3]> {
        let m = self.moments(table)?;
        let k = m.radicand();
        Ok([k.clone(), -k, m.pair_product()])
    }

    /// The closed form evaluated in `f64` straight from the counts.
    ///
    /// Shares no arithmetic with the exact path beyond the formulas, so it
    /// doubles as a cross-check. Complex and indeterminate values are `None`.
    pub fn evaluation_float_direct(
        &self,
        table: &VoteCountTable,
    ) -> Result<Vec<Evaluation<Option<f64>>>> {
        let (alpha, beta) = check_table(table)?;
        if let Some(label) = table.unanimous_label() {
            let other = if *label == alpha { &beta } else { &alpha };
            return Ok(unanimous_branches(label, other)
                .iter()
                .map(Evaluation::to_float)
                .collect());
        }

        let m = TrioMoments::from_table(table, &beta, |n, q| n as f64 / q as f64);
        if m.has_uncorrelated_pair() || m.radicand() == 0.0 {
            return Err(degenerate(&m.pair_moments, m.radicand() == 0.0));
        }
        let k = m.radicand();
        let root = (k >= 0.0).then(|| k.sqrt());
        let mu3 = m.trio_moment;

        let branch = |sigma: f64| {
            let value = |rational: f64, coefficient: f64| root.map(|r| rational + coefficient * r);
            let p_alpha = value(0.5, sigma * mu3 / (2.0 * k));
            let prevalence = BTreeMap::from([
                (alpha.clone(), p_alpha),
                (beta.clone(), p_alpha.map(|p| 1.0 - p)),
            ]);
            let accuracies = (0..3)
                .map(|i| {
                    let d = *m.opposite_pair(i);
                    let f_beta = m.frequencies[i];
                    BTreeMap::from([
                        (alpha.clone(), value(1.0 - f_beta - mu3 / (2.0 * d), sigma / (2.0 * d))),
                        (beta.clone(), value(f_beta + mu3 / (2.0 * d), sigma / (2.0 * d))),
                    ])
                })
                .collect();
            Evaluation {
                prevalence,
                accuracies,
            }
        };
        Ok(vec![branch(1.0), branch(-1.0)])
    }
}

impl Evaluator for ExactIndependentEvaluator {
    fn name(&self) -> &str {
        NAME
    }

    fn assumption(&self) -> &str {
        "classifier errors are independent given the true label"
    }

    fn self_checking(&self) -> bool {
        true
    }

    fn evaluation_exact(&self, table: &VoteCountTable) -> Result<ExactReport> {
        let (alpha, beta) = check_table(table)?;

        if let Some(label) = table.unanimous_label() {
            let other = if *label == alpha { &beta } else { &alpha };
            debug!(label = %label, "unanimous table, returning boundary branches");
            return Ok(ExactReport {
                evaluator: NAME.to_string(),
                branches: unanimous_branches(label, other).to_vec(),
                status: AssumptionStatus::NotFalsified,
            });
        }

        let m = TrioMoments::from_table(table, &beta, exact_share);
        let k = m.radicand();
        if m.has_uncorrelated_pair() || k.is_zero() {
            let err = degenerate(&m.pair_moments, k.is_zero());
            warn!(error = %err, "independent trio system is degenerate");
            return Err(err);
        }

        let status = if k.is_negative() {
            AssumptionStatus::Falsified(Falsification::ComplexSolution)
        } else if rational_sqrt(&k).is_some() {
            AssumptionStatus::NotFalsified
        } else {
            AssumptionStatus::Falsified(Falsification::IrrationalSolution)
        };
        debug!(radicand = %k, trio_moment = %m.trio_moment, "solved independent trio");
        if status.is_falsified() {
            info!(status = %status, "error independence falsified by the observed counts");
        }

        let half = BigRational::new(BigInt::from(1), BigInt::from(2));
        let two = BigRational::from_integer(BigInt::from(2));
        let branch = |sigma: BigRational| {
            let p_alpha = ExactValue::radical(
                half.clone(),
                &sigma * &m.trio_moment / (&two * &k),
                k.clone(),
            );
            let p_beta = ExactValue::radical(
                half.clone(),
                -(&sigma * &m.trio_moment / (&two * &k)),
                k.clone(),
            );
            let prevalence = BTreeMap::from([(alpha.clone(), p_alpha), (beta.clone(), p_beta)]);

            let accuracies = (0..3)
                .map(|i| {
                    let twice_d = &two * m.opposite_pair(i);
                    let shift = &m.trio_moment / &twice_d;
                    let coefficient = &sigma / &twice_d;
                    let f_beta = m.frequencies[i].clone();
                    let f_alpha = BigRational::from_integer(BigInt::from(1)) - &f_beta;
                    BTreeMap::from([
                        (
                            alpha.clone(),
                            ExactValue::radical(f_alpha - &shift, coefficient.clone(), k.clone()),
                        ),
                        (
                            beta.clone(),
                            ExactValue::radical(f_beta + &shift, coefficient, k.clone()),
                        ),
                    ])
                })
                .collect();
            Evaluation {
                prevalence,
                accuracies,
            }
        };

        let one = BigRational::from_integer(BigInt::from(1));
        Ok(ExactReport {
            evaluator: NAME.to_string(),
            branches: vec![branch(one.clone()), branch(-one)],
            status,
        })
    }
}

/// Labels `(alpha, beta)` of a trio table.
fn check_table(table: &VoteCountTable) -> Result<(Label, Label)> {
    if table.arity() != 3 || table.labels().len() != 2 {
        return Err(EvaluatorError::UnsupportedTable {
            evaluator: NAME.to_string(),
            reason: format!(
                "needs 3 classifiers over 2 labels, got {} over {}",
                table.arity(),
                table.labels().len()
            ),
        });
    }
    match (table.labels().get(0), table.labels().get(1)) {
        (Some(alpha), Some(beta)) => Ok((alpha.clone(), beta.clone())),
        _ => Err(EvaluatorError::UnsupportedTable {
            evaluator: NAME.to_string(),
            reason: "label set is incomplete".to_string(),
        }),
    }
}

fn exact_share(n: u64, q: u64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(q))
}

fn degenerate<T: Zero>(pair_moments: &[T; 3], zero_radicand: bool) -> EvaluatorError {
    let uncorrelated: Vec<String> = PAIRS
        .iter()
        .zip(pair_moments)
        .filter(|(_, d)| d.is_zero())
        .map(|((i, j), _)| format!("({i},{j})"))
        .collect();
    if uncorrelated.is_empty() && zero_radicand {
        return EvaluatorError::DegenerateSystem("the radicand vanishes".to_string());
    }
    EvaluatorError::DegenerateSystem(format!(
        "pairs {} vote without correlation",
        uncorrelated.join(", ")
    ))
}

/// Branches for a table whose every item is `label` from all three.
fn unanimous_branches(label: &Label, other: &Label) -> [Evaluation<ExactValue>; 2] {
    let rational = |n: u64| ExactValue::ratio(n, 1);
    let build = |p_label: u64, on_label: ExactValue, on_other: ExactValue| Evaluation {
        prevalence: BTreeMap::from([
            (label.clone(), rational(p_label)),
            (other.clone(), rational(1 - p_label)),
        ]),
        accuracies: (0..3)
            .map(|_| {
                BTreeMap::from([
                    (label.clone(), on_label.clone()),
                    (other.clone(), on_other.clone()),
                ])
            })
            .collect(),
    };
    [
        build(1, rational(1), ExactValue::Indeterminate),
        build(0, ExactValue::Indeterminate, rational(0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use algeval_axioms::{samples, LabelSet};

    fn q(n: i64, d: i64) -> ExactValue {
        ExactValue::Rational(BigRational::new(BigInt::from(n), BigInt::from(d)))
    }

    #[test]
    fn test_independent_fixture_recovers_generator() {
        let report = ExactIndependentEvaluator::new()
            .evaluation_exact(&samples::independent_trio_observed())
            .unwrap();
        assert_eq!(report.status, AssumptionStatus::NotFalsified);

        let first = &report.branches[0];
        assert_eq!(first.prevalence[&Label::from("a")], q(2, 5));
        assert_eq!(first.prevalence[&Label::from("b")], q(3, 5));
        let expected = [((3, 5), (4, 5)), ((4, 5), (3, 5)), ((3, 5), (3, 5))];
        for (acc, ((an, ad), (bn, bd))) in first.accuracies.iter().zip(expected) {
            assert_eq!(acc[&Label::from("a")], q(an, ad));
            assert_eq!(acc[&Label::from("b")], q(bn, bd));
        }

        // mirror branch swaps the roles of the labels
        let second = &report.branches[1];
        assert_eq!(second.prevalence[&Label::from("a")], q(3, 5));
        assert_eq!(second.accuracies[0][&Label::from("a")], q(1, 5));
    }

    #[test]
    fn test_uci_is_falsified_by_irrational_prevalence() {
        let report = ExactIndependentEvaluator::new()
            .evaluation_exact(&samples::uci_adult_observed())
            .unwrap();
        assert_eq!(
            report.status,
            AssumptionStatus::Falsified(Falsification::IrrationalSolution)
        );
        for branch in &report.branches {
            assert!(!branch.is_rational());
            assert!(branch.prevalence[&Label::from("a")].radicand().is_some());
        }
        let p = report.branches[0].prevalence[&Label::from("a")]
            .to_f64()
            .unwrap();
        assert!((p - 0.167_114_439_653).abs() < 1e-9);
    }

    #[test]
    fn test_quadratic_roots_are_branch_prevalences() {
        let table = samples::independent_trio_observed();
        let evaluator = ExactIndependentEvaluator::new();
        let [a, b, c] = evaluator.prevalence_quadratic(&table).unwrap();
        for p in [
            BigRational::new(BigInt::from(2), BigInt::from(5)),
            BigRational::new(BigInt::from(3), BigInt::from(5)),
        ] {
            assert!((&a * &p * &p + &b * &p + &c).is_zero());
        }
    }

    #[test]
    fn test_unanimous_table_branches() {
        let table = VoteCountTable::new(LabelSet::binary(), [(["b", "b", "b"], 40)]).unwrap();
        let report = ExactIndependentEvaluator::new().evaluation_exact(&table).unwrap();
        assert_eq!(report.status, AssumptionStatus::NotFalsified);

        let right = &report.branches[0];
        assert_eq!(right.prevalence[&Label::from("b")], q(1, 1));
        assert_eq!(right.accuracies[1][&Label::from("b")], q(1, 1));
        assert_eq!(right.accuracies[1][&Label::from("a")], ExactValue::Indeterminate);

        let wrong = &report.branches[1];
        assert_eq!(wrong.prevalence[&Label::from("b")], q(0, 1));
        assert_eq!(wrong.accuracies[2][&Label::from("a")], q(0, 1));
    }

    #[test]
    fn test_uncorrelated_pair_is_degenerate() {
        // classifier 2 always votes a: every pair moment with it vanishes
        let table = VoteCountTable::new(
            LabelSet::binary(),
            [(["a", "a", "a"], 5), (["a", "b", "a"], 3), (["b", "a", "a"], 2), (["b", "b", "a"], 6)],
        )
        .unwrap();
        let err = ExactIndependentEvaluator::new()
            .evaluation_exact(&table)
            .unwrap_err();
        assert!(matches!(err, EvaluatorError::DegenerateSystem(_)));
        assert!(err.to_string().contains("(0,2)"));
    }

    #[test]
    fn test_pair_table_is_unsupported() {
        let table = VoteCountTable::new(LabelSet::binary(), [(["a", "b"], 5)]).unwrap();
        assert!(matches!(
            ExactIndependentEvaluator::new().evaluation_exact(&table),
            Err(EvaluatorError::UnsupportedTable { .. })
        ));
    }

    #[test]
    fn test_direct_float_matches_exact() {
        let evaluator = ExactIndependentEvaluator::new();
        let table = samples::uci_adult_observed();
        let exact = evaluator.evaluation_float(&table).unwrap();
        let direct = evaluator.evaluation_float_direct(&table).unwrap();
        for (e, d) in exact.branches.iter().zip(&direct) {
            for (x, y) in e.values().zip(d.values()) {
                assert!((x.unwrap() - y.unwrap()).abs() < 1e-9);
            }
        }
    }
}
