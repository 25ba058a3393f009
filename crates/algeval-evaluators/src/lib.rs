//! # Evaluators
//!
//! Evaluation of classifier ensembles from observed vote counts alone,
//! in exact arithmetic.
//!
//! ## Overview
//!
//! An evaluator turns a [`VoteCountTable`](algeval_axioms::VoteCountTable)
//! into label prevalences and per-classifier label accuracies. The
//! observed counts alone cannot fix those numbers, so every unsupervised
//! evaluator adds a structural assumption. The evaluators here differ in
//! whether a wrong assumption can show up in their own output.
//!
//! | Evaluator | Assumption | Shape | Self-alarming |
//! |-----------|------------|-------|---------------|
//! | [`ExactIndependentEvaluator`] | errors independent given the label | 3 classifiers, 2 labels | yes |
//! | [`MajorityVotingEvaluator`] | majority response is the true label | any | no |
//! | [`SupervisedEvaluator`] | none, reads true labels | any | n/a |
//!
//! ## Self-Alarm
//!
//! Counts make every real prevalence rational. The independent evaluator
//! solves a quadratic whose roots share the radicand `K`; when `sqrt(K)`
//! is irrational the data cannot have come from independent classifiers,
//! and the report says so with [`AssumptionStatus::Falsified`]. Majority
//! voting only divides counts, so its output is rational for every table,
//! including tables where its assumption is badly wrong.
//!
//! ```text
//!   VoteCountTable
//!        │
//!        ├──► ExactIndependentEvaluator ──► two branches ──► rational? ──► NotFalsified
//!        │                                                     └─ no ───► Falsified
//!        │
//!        └──► MajorityVotingEvaluator ────► one branch ─────────────────► NotSelfChecking
//! ```
//!
//! ## Exact Values
//!
//! [`ExactValue`] is a rational, a rational plus a rational multiple of
//! one square root, or indeterminate (0/0). Deciding whether a root
//! simplifies is a perfect-square test on the reduced numerator and
//! denominator.
//!
//! ## Usage
//!
//! ```rust
//! use algeval_axioms::samples;
//! use algeval_evaluators::{Evaluator, ExactValue, MajorityVotingEvaluator};
//!
//! let report = MajorityVotingEvaluator::new()
//!     .evaluation_exact(&samples::uci_adult_observed())?;
//! assert_eq!(
//!     report.branches[0].prevalence[&"a".into()],
//!     ExactValue::ratio(7979, 36842)
//! );
//! # Ok::<(), algeval_evaluators::EvaluatorError>(())
//! ```

pub mod error;
pub mod evaluator;
pub mod exact;
pub mod moments;
pub mod supervised;

pub use error::{EvaluatorError, Result};
pub use evaluator::independent::ExactIndependentEvaluator;
pub use evaluator::majority::{MajorityVotingEvaluator, PatternTally};
pub use evaluator::{
    AssumptionStatus, Evaluation, Evaluator, ExactReport, Falsification, FloatReport,
};
pub use exact::{rational_sqrt, ExactValue, RadicalTerm};
pub use moments::{TrioMoments, PAIRS};
pub use supervised::{PairCorrelation, SupervisedEvaluator};
