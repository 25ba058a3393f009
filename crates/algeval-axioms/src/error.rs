//! Error types for axiom construction and count tables.
//!
//! Every variant is a caller-side problem: malformed input or a request
//! outside the generically supported arities. Nothing here is retried.

use thiserror::Error;

/// Result type alias for axiom operations.
pub type Result<T> = std::result::Result<T, AxiomError>;

/// Errors that can occur while building axioms or validating count tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AxiomError {
    /// The label set has fewer than two labels or repeats one.
    #[error("invalid label set: {0}")]
    InvalidLabels(String),

    /// Classifier subset is empty, repeats an index, or reaches past N.
    #[error("invalid classifier subset {indices:?} for {classifiers} classifiers: {reason}")]
    InvalidSubset {
        /// Indices as requested by the caller
        indices: Vec<usize>,
        /// Number of classifiers in the session
        classifiers: usize,
        /// What is wrong with the request
        reason: String,
    },

    /// Axioms requested for a subset size with no generic construction.
    ///
    /// This is a scope boundary, not a bug.
    #[error("subset size {arity} is not supported (generic construction covers 1..={max})")]
    UnsupportedArity {
        /// Requested subset size M
        arity: usize,
        /// Largest supported subset size
        max: usize,
    },

    /// Observed or by-label counts are inconsistent.
    ///
    /// Tables are never renormalized to hide the problem.
    #[error("malformed count table: {0}")]
    MalformedCountTable(String),

    /// A label outside the session's label set.
    #[error("unknown label '{0}'")]
    UnknownLabel(String),

    /// An identity was evaluated at a point missing one of its variables.
    #[error("no value assigned to {0}")]
    UnassignedVariable(String),
}
