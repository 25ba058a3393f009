//! # Integration Tests
//!
//! Evaluators against the sample datasets and random tables: the
//! self-alarm on correlated classifiers, recovery of independent
//! generators, and agreement between the exact and floating paths.

use algeval_axioms::{samples, Label, LabelSet, VoteCountTable};
use algeval_evaluators::{
    AssumptionStatus, Evaluation, Evaluator, EvaluatorError, ExactIndependentEvaluator,
    ExactValue, Falsification, MajorityVotingEvaluator, SupervisedEvaluator,
};
use num::{BigInt, BigRational, ToPrimitive, Zero};
use proptest::prelude::*;

const NAMES: [&str; 3] = ["a", "b", "c"];

fn q(n: i64, d: i64) -> ExactValue {
    ExactValue::Rational(BigRational::new(BigInt::from(n), BigInt::from(d)))
}

fn trio(counts: [i64; 8]) -> VoteCountTable {
    let patterns = ["aaa", "aab", "aba", "abb", "baa", "bab", "bba", "bbb"];
    VoteCountTable::new(
        LabelSet::binary(),
        patterns
            .iter()
            .zip(counts)
            .map(|(p, n)| (p.chars().map(String::from).collect::<Vec<_>>(), n)),
    )
    .unwrap()
}

fn assert_accuracies(eval: &Evaluation<ExactValue>, expected: [((i64, i64), (i64, i64)); 3]) {
    for (i, ((an, ad), (bn, bd))) in expected.into_iter().enumerate() {
        assert_eq!(eval.accuracies[i][&Label::from("a")], q(an, ad), "classifier {i}");
        assert_eq!(eval.accuracies[i][&Label::from("b")], q(bn, bd), "classifier {i}");
    }
}

// ============================================================================
// Self-Alarm on UCI Adult
// ============================================================================

#[test]
fn test_uci_independence_falsified_while_majority_is_silent() {
    let table = samples::uci_adult_observed();

    let independent = ExactIndependentEvaluator::new()
        .evaluation_exact(&table)
        .unwrap();
    assert_eq!(
        independent.status,
        AssumptionStatus::Falsified(Falsification::IrrationalSolution)
    );
    let p_a = &independent.branches[0].prevalence[&Label::from("a")];
    assert!(!p_a.is_rational());
    assert!(p_a.is_real());

    let majority = MajorityVotingEvaluator::new().evaluation_exact(&table).unwrap();
    assert_eq!(majority.status, AssumptionStatus::NotSelfChecking);
    assert_eq!(
        majority.branches[0].prevalence[&Label::from("a")],
        q(7979, 36842)
    );
}

#[test]
fn test_uci_branches_straddle_true_prevalence() {
    let table = samples::uci_adult_observed();
    let report = ExactIndependentEvaluator::new()
        .evaluation_float(&table)
        .unwrap();
    let truth = 5687.0 / 36842.0;
    let low = report.branches[0].prevalence[&Label::from("a")].unwrap();
    let high = report.branches[1].prevalence[&Label::from("a")].unwrap();
    assert!((low - 0.167_114).abs() < 1e-5);
    assert!((high - 0.832_886).abs() < 1e-5);
    // the falsified estimate is still near the truth for this test
    assert!((low - truth).abs() < 0.02);
}

#[test]
fn test_report_serializes_exact_values_as_strings() {
    let report = MajorityVotingEvaluator::new()
        .evaluation_exact(&samples::uci_adult_observed())
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "not_self_checking");
    assert_eq!(json["branches"][0]["prevalence"]["a"], "7979/36842");
}

// ============================================================================
// Independent Generators
// ============================================================================

#[test]
fn test_independent_fixture_matches_ground_truth() {
    let table = samples::independent_trio_observed();
    let report = ExactIndependentEvaluator::new()
        .evaluation_exact(&table)
        .unwrap();
    assert_eq!(report.status, AssumptionStatus::NotFalsified);
    assert!(report.branches.iter().all(Evaluation::is_rational));
    assert!(report.branches.iter().all(Evaluation::is_feasible));
    assert_eq!(report.branches[0].prevalence[&Label::from("a")], q(2, 5));
}

#[test]
fn test_quarter_prevalence_trio() {
    let table = trio([24, 24, 36, 60, 12, 20, 24, 56]);
    assert_eq!(table.test_size(), 256);
    let report = ExactIndependentEvaluator::new()
        .evaluation_exact(&table)
        .unwrap();
    assert_eq!(report.status, AssumptionStatus::NotFalsified);

    let first = &report.branches[0];
    assert_eq!(first.prevalence[&Label::from("a")], q(1, 4));
    assert_accuracies(first, [((3, 4), (1, 2)), ((1, 2), (3, 4)), ((3, 4), (3, 4))]);

    let second = &report.branches[1];
    assert_eq!(second.prevalence[&Label::from("a")], q(3, 4));
    assert_accuracies(second, [((1, 2), (1, 4)), ((1, 4), (1, 2)), ((1, 4), (1, 4))]);
}

#[test]
fn test_quadratic_coefficients() {
    let table = trio([24, 24, 36, 60, 12, 20, 24, 56]);
    let [a, b, c] = ExactIndependentEvaluator::new()
        .prevalence_quadratic(&table)
        .unwrap();
    assert_eq!(a, BigRational::new(BigInt::from(9), BigInt::from(262_144)));
    assert_eq!(b, -a.clone());
    assert_eq!(c, BigRational::new(BigInt::from(27), BigInt::from(4_194_304)));

    for p in [(1, 4), (3, 4)] {
        let p = BigRational::new(BigInt::from(p.0), BigInt::from(p.1));
        assert!((&a * &p * &p + &b * &p + &c).is_zero());
    }
}

// ============================================================================
// Boundaries and Errors
// ============================================================================

#[test]
fn test_unanimous_table_majority_and_independent_agree() {
    let table = VoteCountTable::new(LabelSet::binary(), [(["a", "a", "a"], 40)]).unwrap();
    let independent = ExactIndependentEvaluator::new()
        .evaluation_exact(&table)
        .unwrap();
    let majority = MajorityVotingEvaluator::new().evaluation_exact(&table).unwrap();

    assert_eq!(independent.branches.len(), 2);
    assert_eq!(independent.branches[0], majority.branches[0]);
    assert_eq!(
        majority.branches[0].accuracies[2][&Label::from("a")],
        q(1, 1)
    );
}

#[test]
fn test_uncorrelated_classifiers_are_degenerate_not_falsified() {
    // every classifier votes independently of the others with f = 1/2
    let table = trio([1, 1, 1, 1, 1, 1, 1, 1]);
    let err = ExactIndependentEvaluator::new()
        .evaluation_exact(&table)
        .unwrap_err();
    assert!(matches!(err, EvaluatorError::DegenerateSystem(_)));
    // majority voting still answers
    assert!(MajorityVotingEvaluator::new().evaluation_exact(&table).is_ok());
}

#[test]
fn test_independent_rejects_other_shapes() {
    let labels = LabelSet::new(["a", "b", "c"]).unwrap();
    let three_labels = VoteCountTable::new(labels, [(["a", "b", "c"], 4)]).unwrap();
    let pair = VoteCountTable::new(LabelSet::binary(), [(["a", "b"], 4)]).unwrap();
    for table in [three_labels, pair] {
        let err = ExactIndependentEvaluator::new()
            .evaluation_exact(&table)
            .unwrap_err();
        assert!(matches!(err, EvaluatorError::UnsupportedTable { .. }));
    }
}

#[test]
fn test_supervised_reference_on_uci() {
    let labeled = samples::uci_adult_labeled();
    let truth = SupervisedEvaluator::new().evaluate(&labeled);
    assert_eq!(truth.prevalence[&Label::from("a")], q(5687, 36842));
    assert_eq!(
        truth.accuracies[0][&Label::from("a")],
        q(715 + 161 + 2406 + 455, 5687)
    );
}

// ============================================================================
// Properties
// ============================================================================

fn close(x: Option<f64>, y: Option<f64>) -> bool {
    match (x, y) {
        (Some(x), Some(y)) => (x - y).abs() <= 1e-6 * x.abs().max(1.0),
        (None, None) => true,
        _ => false,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn exact_and_direct_float_agree(counts in prop::array::uniform8(1i64..60)) {
        let table = trio(counts);
        let evaluator = ExactIndependentEvaluator::new();
        let moments = evaluator.moments(&table).unwrap();
        let k = moments.radicand().to_f64().unwrap();
        prop_assume!(k.abs() > 1e-9);
        prop_assume!(moments
            .pair_moments
            .iter()
            .all(|d| d.to_f64().map_or(false, |d| d.abs() > 1e-4)));

        let exact = evaluator.evaluation_float(&table).unwrap();
        let direct = evaluator.evaluation_float_direct(&table).unwrap();
        prop_assert_eq!(exact.branches.len(), direct.len());
        for (e, d) in exact.branches.iter().zip(&direct) {
            for (x, y) in e.values().zip(d.values()) {
                prop_assert!(close(*x, *y), "{:?} vs {:?}", x, y);
            }
        }
    }

    #[test]
    fn majority_voting_is_always_rational(
        (r, n, rows) in (2usize..=3, 1usize..=4).prop_flat_map(|(r, n)| {
            (
                Just(r),
                Just(n),
                prop::collection::btree_map(prop::collection::vec(0..r, n), 1i64..30, 1..12),
            )
        })
    ) {
        let labels = LabelSet::new(NAMES.iter().take(r).copied()).unwrap();
        let table = VoteCountTable::new(
            labels,
            rows.into_iter()
                .map(|(pattern, count)| (pattern.into_iter().map(|i| NAMES[i]).collect::<Vec<_>>(), count)),
        )
        .unwrap();
        let report = MajorityVotingEvaluator::new().evaluation_exact(&table).unwrap();
        prop_assert_eq!(report.status, AssumptionStatus::NotSelfChecking);
        prop_assert_eq!(report.branches.len(), 1);
        prop_assert!(report.branches[0].is_rational());
        prop_assert!(report.branches[0].is_feasible());

        let total = report.branches[0]
            .prevalence
            .values()
            .fold(BigRational::zero(), |acc, v| match v {
                ExactValue::Rational(p) => acc + p,
                _ => acc,
            });
        prop_assert_eq!(total, BigRational::from_integer(BigInt::from(1)));
    }
}
