//! Error types for the evaluation engine.

use crate::alarm::AlarmState;
use algeval_axioms::AxiomError;
use algeval_evaluators::EvaluatorError;
use algeval_variety::VarietyError;
use thiserror::Error;

/// Engine error type.
///
/// Component errors pass through unchanged so callers can still match on
/// `MalformedCountTable`, `ResourceBound` or `DegenerateSystem`.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Axiom or table error passthrough.
    #[error(transparent)]
    Axiom(#[from] AxiomError),

    /// Variety error passthrough.
    #[error(transparent)]
    Variety(#[from] VarietyError),

    /// Evaluator error passthrough.
    #[error(transparent)]
    Evaluator(#[from] EvaluatorError),

    /// Safety specification is unusable for this test.
    #[error("invalid safety specification: {0}")]
    InvalidSpecification(String),

    /// Alarm step called out of order.
    #[error("invalid alarm transition from {from} to {to}")]
    InvalidTransition {
        /// State the alarm was in
        from: AlarmState,
        /// State the call would have entered
        to: AlarmState,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading an input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Engine result type.
pub type Result<T> = std::result::Result<T, EngineError>;
