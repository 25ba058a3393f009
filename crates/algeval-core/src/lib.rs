//! # Algebraic Evaluation Core
//!
//! Session facade over the axioms, variety and evaluator crates, plus the
//! consistency alarm that turns the axioms into a go/no-go signal.
//!
//! ## What Each Layer Answers
//!
//! | Layer | Component | Question |
//! |-------|-----------|----------|
//! | Axioms | `CountAlgebra` | Which counts could the test have produced? |
//! | Variety | `SubsetSimplexSpace` | Which of those fit the observed votes? |
//! | Evaluators | independent, majority | What are prevalence and accuracies, given an assumption? |
//! | Alarm | `ConsistencyAlarm` | Can *any* consistent evaluation meet the requirement? |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      EVALUATION SESSION                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │   vote-count table ──► check_table ──┬──► compare()             │
//! │                                      │      ├─ independent      │
//! │                                      │      └─ majority         │
//! │                                      │                          │
//! │                                      └──► alarm()               │
//! │                                             │                   │
//! │                  ┌──────────────────┐       ▼                   │
//! │                  │   axiom cache    │◄── ConsistencyAlarm       │
//! │                  │ Subset → AxiomSet│                           │
//! │                  └──────────────────┘                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use algeval_axioms::samples;
//! use algeval_core::{EngineConfig, EvaluationSession, SafetySpecification};
//!
//! let table = samples::online_consumer_observed();
//! let session = EvaluationSession::for_table(&table, EngineConfig::default())?;
//!
//! println!("{}", session.compare(&table)?);
//!
//! let spec: SafetySpecification = serde_json::from_str(r#"{"grade": "0.6"}"#)?;
//! let report = session.alarm(&table, spec)?;
//! if report.verdict.is_alarmed() {
//!     eprintln!("no consistent evaluation meets the requirement");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Guarantees
//!
//! - An alarm raised with single-classifier axioms stays valid when pair
//!   axioms are added; pair axioms only remove points.
//! - `Inconclusive` is never reported as `Safe`.
//! - No evaluator substitutes for another on failure.

pub mod alarm;
pub mod config;
pub mod error;
pub mod report;
pub mod session;
pub mod verdict;

pub use alarm::{
    parse_threshold, AlarmReport, AlarmState, ConsistencyAlarm, KeyEvaluation, KeyOutcome,
    KeySelection, SafetySpecification, SafetySpecificationSpec,
};
pub use config::{AlarmConfig, EngineConfig, ReportConfig};
pub use error::{EngineError, Result};
pub use report::ComparisonReport;
pub use session::EvaluationSession;
pub use verdict::{AlarmVerdict, InconclusiveReason};

// Re-export component types for convenience
pub use algeval_axioms::{
    samples, AnswerKey, AxiomError, CountAlgebra, Label, LabelSet, LabeledVoteCounts, Subset,
    VoteCountTable,
};
pub use algeval_evaluators::{
    AssumptionStatus, Evaluator, EvaluatorError, ExactIndependentEvaluator, ExactReport,
    ExactValue, MajorityVotingEvaluator, SupervisedEvaluator,
};
pub use algeval_variety::{EnumerationBound, Variety, VarietyError};
