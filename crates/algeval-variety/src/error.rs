//! Error types for variety enumeration.

use crate::budget::Resource;
use algeval_axioms::AxiomError;
use thiserror::Error;

/// Result type alias for variety operations.
pub type Result<T> = std::result::Result<T, VarietyError>;

/// Errors raised while building or walking a subset's consistent variety.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VarietyError {
    /// Enumeration would exceed, or did exceed, a configured bound.
    ///
    /// Recoverable: the caller may raise the bound or accept an
    /// inconclusive answer. Nothing partial is returned.
    #[error("resource bound exceeded: {resource} needs {required}, limit is {limit}")]
    ResourceBound {
        /// Which bound was hit
        resource: Resource,
        /// Amount the enumeration needed (a lower bound when aborted mid-walk)
        required: u128,
        /// Configured limit
        limit: u128,
    },

    /// Answer key does not fit the space's labels or test size.
    #[error("invalid answer key: {0}")]
    InvalidAnswerKey(String),

    /// Axioms or tables were built for a different subset or algebra.
    #[error("axiom mismatch: {0}")]
    AxiomMismatch(String),

    /// Passthrough from axiom construction or evaluation.
    #[error(transparent)]
    Axiom(#[from] AxiomError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_bound_display() {
        let err = VarietyError::ResourceBound {
            resource: Resource::Variables,
            required: 27,
            limit: 8,
        };
        assert_eq!(
            err.to_string(),
            "resource bound exceeded: variables needs 27, limit is 8"
        );
    }

    #[test]
    fn test_axiom_passthrough_is_transparent() {
        let err: VarietyError = AxiomError::UnknownLabel("z".into()).into();
        assert_eq!(err.to_string(), AxiomError::UnknownLabel("z".into()).to_string());
    }
}
