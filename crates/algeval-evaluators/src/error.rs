//! Error types for the evaluators.
//!
//! An irrational or complex solution is *not* an error: it is a
//! successful evaluation that falsifies its assumption, reported through
//! [`AssumptionStatus`](crate::AssumptionStatus).

use algeval_axioms::AxiomError;
use thiserror::Error;

/// Result type for evaluator operations.
pub type Result<T> = std::result::Result<T, EvaluatorError>;

/// Errors that can occur while evaluating a vote-count table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluatorError {
    /// The evaluator cannot handle this table's shape.
    #[error("{evaluator} cannot evaluate this table: {reason}")]
    UnsupportedTable {
        /// Evaluator name
        evaluator: String,
        /// What the evaluator needs
        reason: String,
    },

    /// The assumption's equations have no isolated solutions here.
    #[error("degenerate system: {0}")]
    DegenerateSystem(String),

    /// Passthrough from table or axiom validation.
    #[error(transparent)]
    Axiom(#[from] AxiomError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_table_display() {
        let err = EvaluatorError::UnsupportedTable {
            evaluator: "independent".to_string(),
            reason: "needs 3 classifiers, got 2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "independent cannot evaluate this table: needs 3 classifiers, got 2"
        );
    }

    #[test]
    fn test_degenerate_display() {
        let err = EvaluatorError::DegenerateSystem("pair (0,1) is uncorrelated".to_string());
        assert!(err.to_string().starts_with("degenerate system"));
    }
}
