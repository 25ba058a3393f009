//! # Enumeration Bound and Budget
//!
//! Variety enumeration is the one place in the pipeline with genuine
//! runaway cost: the ambient space grows like `R^(M+1)` in variables and
//! polynomially in Q in points. Every walk therefore runs under an
//! explicit, caller-supplied bound.
//!
//! ## Checks
//!
//! | Resource | When | Measured |
//! |----------|------|----------|
//! | Variables | preflight | `R^(M+1)` by-true-label unknowns |
//! | Candidates | preflight | upper estimate of leaves in the walk |
//! | Points | during the walk | leaves visited so far |
//!
//! Preflight checks run before any point is built. The point budget is
//! charged before each leaf is checked, so an abort never leaves a
//! partially checked leaf behind. An aborted walk returns no points.
//!
//! ## Example
//!
//! ```rust
//! use algeval_variety::{EnumerationBound, EnumerationBudget};
//!
//! let bound = EnumerationBound::new().with_max_points(2);
//! let mut budget = EnumerationBudget::new(bound.max_points);
//!
//! assert!(budget.consume(1).is_ok());
//! assert!(budget.consume(1).is_ok());
//! assert!(budget.consume(1).is_err());
//! assert_eq!(budget.remaining(), 0);
//! ```

use crate::error::{Result, VarietyError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource a bound applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// By-true-label variables of the subset, `R^(M+1)`.
    Variables,
    /// Estimated leaves of the enumeration tree.
    Candidates,
    /// Leaves actually visited.
    Points,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variables => write!(f, "variables"),
            Self::Candidates => write!(f, "candidates"),
            Self::Points => write!(f, "points"),
        }
    }
}

/// Limits for one enumeration.
///
/// # Example
///
/// ```rust
/// use algeval_variety::EnumerationBound;
///
/// let bound = EnumerationBound::new()
///     .with_max_variables(27)
///     .with_max_candidates(50_000)
///     .with_max_points(10_000);
/// assert_eq!(bound.max_variables, 27);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumerationBound {
    /// Largest accepted `R^(M+1)`.
    pub max_variables: u64,
    /// Largest accepted candidate estimate.
    pub max_candidates: u64,
    /// Largest number of leaves visited before aborting.
    pub max_points: u64,
}

impl EnumerationBound {
    /// Creates a bound with default values.
    ///
    /// Defaults:
    /// - Variables: 64 (pairs over up to four labels)
    /// - Candidates: 1,000,000
    /// - Points: 100,000
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_variables: 64,
            max_candidates: 1_000_000,
            max_points: 100_000,
        }
    }

    /// Sets the variable limit.
    #[must_use]
    pub const fn with_max_variables(mut self, limit: u64) -> Self {
        self.max_variables = limit;
        self
    }

    /// Sets the candidate-estimate limit.
    #[must_use]
    pub const fn with_max_candidates(mut self, limit: u64) -> Self {
        self.max_candidates = limit;
        self
    }

    /// Sets the visited-point limit.
    #[must_use]
    pub const fn with_max_points(mut self, limit: u64) -> Self {
        self.max_points = limit;
        self
    }

    /// Fails when `required` exceeds the limit for `resource`.
    pub fn check(&self, resource: Resource, required: u128) -> Result<()> {
        let limit = u128::from(match resource {
            Resource::Variables => self.max_variables,
            Resource::Candidates => self.max_candidates,
            Resource::Points => self.max_points,
        });
        if required > limit {
            return Err(VarietyError::ResourceBound {
                resource,
                required,
                limit,
            });
        }
        Ok(())
    }
}

impl Default for EnumerationBound {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts visited leaves against `max_points`.
///
/// Not shared between walks; each enumeration builds its own.
#[derive(Debug, Clone)]
pub struct EnumerationBudget {
    limit: u64,
    consumed: u64,
}

impl EnumerationBudget {
    /// Creates a budget allowing `limit` points.
    #[must_use]
    pub const fn new(limit: u64) -> Self {
        Self { limit, consumed: 0 }
    }

    /// Points charged so far.
    #[inline]
    #[must_use]
    pub const fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Charges `amount` points, returning what remains.
    ///
    /// # Errors
    ///
    /// `ResourceBound` on [`Resource::Points`]; the budget is unchanged.
    pub fn consume(&mut self, amount: u64) -> Result<u64> {
        let remaining = self.limit - self.consumed;
        if remaining < amount {
            return Err(VarietyError::ResourceBound {
                resource: Resource::Points,
                required: u128::from(self.consumed) + u128::from(amount),
                limit: u128::from(self.limit),
            });
        }
        self.consumed += amount;
        Ok(remaining - amount)
    }
}
