//! # Integration Tests
//!
//! End-to-end tests of the evaluation session on the sample datasets.
//!
//! ## Test Categories
//!
//! 1. **Comparison**: independent and majority evaluators side by side
//! 2. **Alarm**: verdicts on the UCI Adult trio
//! 3. **Configuration**: engine settings read from disk
//! 4. **Failures**: malformed and degenerate inputs surface as errors

use algeval_core::{
    samples, AlarmConfig, AlarmVerdict, AnswerKey, AssumptionStatus, AxiomError, EngineConfig,
    EngineError, EvaluationSession, EvaluatorError, ExactValue, InconclusiveReason, KeySelection,
    Label, LabelSet, SafetySpecification, VoteCountTable,
};
use num::{BigInt, BigRational};
use std::io::Write;
use tempfile::NamedTempFile;

fn ratio(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

fn session_for(table: &VoteCountTable) -> EvaluationSession {
    EvaluationSession::for_table(table, EngineConfig::default()).unwrap()
}

// =============================================================================
// COMPARISON TESTS
// =============================================================================

#[test]
fn test_uci_comparison_self_alarms() {
    let table = samples::uci_adult_observed();
    let report = session_for(&table).compare(&table).unwrap();

    assert!(report.is_self_alarmed());
    assert!(!report.independent.branches[0].prevalence[&Label::from("a")].is_rational());
    assert_eq!(report.majority.status, AssumptionStatus::NotSelfChecking);
    assert_eq!(
        report.majority.branches[0].prevalence[&Label::from("a")],
        ExactValue::ratio(7979, 36842)
    );

    let text = report.to_string();
    assert!(text.contains("FALSIFIED (irrational solution)"));
    assert!(text.contains("cannot self-alarm"));
}

#[test]
fn test_independent_trio_is_not_falsified() {
    let table = samples::independent_trio_observed();
    let report = session_for(&table).compare(&table).unwrap();
    assert!(!report.is_self_alarmed());
    assert_eq!(report.independent.status, AssumptionStatus::NotFalsified);
    assert_eq!(
        report.independent.branches[0].prevalence[&Label::from("a")],
        ExactValue::ratio(2, 5)
    );
}

#[test]
fn test_online_sample_comparison() {
    let table = samples::online_consumer_observed();
    let report = session_for(&table).compare(&table).unwrap();
    assert_eq!(report.independent.branches.len(), 2);
    assert_eq!(report.majority.branches.len(), 1);
    // 31 + 8 + 27 + 1 items have an a majority
    assert_eq!(
        report.majority.branches[0].prevalence[&Label::from("a")],
        ExactValue::ratio(67, 200)
    );
}

// =============================================================================
// ALARM TESTS
// =============================================================================

#[test]
fn test_uci_strict_label_requirement_alarms() {
    let table = samples::uci_adult_observed();
    let spec =
        SafetySpecification::labels([("a", ratio(9, 10)), ("b", ratio(9, 10))]).unwrap();
    let report = session_for(&table).alarm(&table, spec).unwrap();
    assert_eq!(report.verdict, AlarmVerdict::alarmed(36843));
    assert_eq!(report.misaligned_keys(), 36843);
}

#[test]
fn test_uci_grade_requirement_is_safe() {
    let table = samples::uci_adult_observed();
    let spec = SafetySpecification::grade(ratio(4, 5)).unwrap();
    let report = session_for(&table).alarm(&table, spec).unwrap();
    let witness = AnswerKey::new(LabelSet::binary(), [8021, 28821]).unwrap();
    assert_eq!(report.verdict, AlarmVerdict::safe(witness));
    assert_eq!(report.aligned_keys(), 2019);
}

#[test]
fn test_alarm_at_true_key() {
    let labeled = samples::uci_adult_labeled();
    let table = labeled.project();
    let truth = AnswerKey::from_labeled(&labeled);
    let spec = SafetySpecification::grade(ratio(9, 10)).unwrap();
    let report = session_for(&table)
        .alarm_at(&table, spec, KeySelection::Keys(vec![truth]))
        .unwrap();
    assert!(report.verdict.is_alarmed());
    assert_eq!(report.trace.len(), 1);
}

// =============================================================================
// CONFIGURATION TESTS
// =============================================================================

#[test]
fn test_config_file_limits_sweep() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"alarm": {{"max_answer_keys": 150}}}}"#).unwrap();
    let config = EngineConfig::from_file(file.path()).unwrap();
    assert_eq!(config.alarm, AlarmConfig::new().with_max_answer_keys(150));

    let table = samples::online_consumer_observed();
    let session = EvaluationSession::for_table(&table, config).unwrap();
    let spec = SafetySpecification::grade(ratio(1, 2)).unwrap();
    let report = session.alarm(&table, spec).unwrap();
    assert_eq!(
        report.verdict,
        AlarmVerdict::inconclusive(InconclusiveReason::SweepTooLarge {
            keys: Some(201),
            limit: 150
        })
    );
}

#[test]
fn test_malformed_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "alarm = true").unwrap();
    let err = EngineConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
}

// =============================================================================
// FAILURE TESTS
// =============================================================================

#[test]
fn test_table_of_wrong_size_is_rejected_not_renormalized() {
    let session =
        EvaluationSession::new(LabelSet::binary(), 3, 200, EngineConfig::default()).unwrap();
    let short = VoteCountTable::new(LabelSet::binary(), [(["a", "b", "a"], 199)]).unwrap();
    let err = session.compare(&short).unwrap_err();
    assert!(matches!(err, EngineError::Axiom(AxiomError::MalformedCountTable(_))));
    assert!(err.to_string().contains("counts sum to 199, expected 200"));
}

#[test]
fn test_degenerate_table_has_no_fallback() {
    let patterns = ["aaa", "aab", "aba", "abb", "baa", "bab", "bba", "bbb"];
    let table = VoteCountTable::new(
        LabelSet::binary(),
        patterns
            .iter()
            .map(|p| (p.chars().map(String::from).collect::<Vec<_>>(), 1)),
    )
    .unwrap();
    let err = session_for(&table).compare(&table).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Evaluator(EvaluatorError::DegenerateSystem(_))
    ));
}

#[test]
fn test_specification_with_unknown_label() {
    let table = samples::online_consumer_observed();
    let spec = SafetySpecification::labels([("c", ratio(1, 2))]).unwrap();
    let err = session_for(&table).alarm(&table, spec).unwrap_err();
    assert!(matches!(err, EngineError::InvalidSpecification(_)));
}
