//! # Consistent Varieties
//!
//! Enumeration of every by-true-label count assignment that a subset's
//! evaluation axioms allow, given the observed vote counts and an answer
//! key. Used for verification and alarms, not for closed-form solving.
//!
//! ## Cost
//!
//! The ambient space has `R^(M+1)` variables and a number of points
//! polynomial in Q. Full enumeration is tractable for small tests and
//! impractical at deployment sizes, so every walk runs under an explicit
//! [`EnumerationBound`] and fails fast with
//! [`VarietyError::ResourceBound`] instead of running unbounded.
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`SubsetSimplexSpace`] | Ambient space, membership, enumeration, point search |
//! | [`AmbientSpace`] | Product of per-label simplices at one answer key |
//! | [`Variety`] | Consistent points, with projection onto sub-subsets |
//! | [`EnumerationBound`] | Variable, candidate and point limits |
//! | [`EnumerationBudget`] | Points charged during a walk |
//!
//! ## Monotone Shrink
//!
//! The axioms of a pair contain the axioms of each member, so projecting
//! a pair's variety onto one member lands inside that member's variety.
//! An alarm raised from single-classifier axioms stays raised when pair
//! data is added; the converse does not hold.
//!
//! ## Quick Start
//!
//! ```rust
//! use algeval_axioms::{samples, AnswerKey, CountAlgebra};
//! use algeval_variety::{EnumerationBound, SubsetSimplexSpace, VarietyError};
//!
//! let observed = samples::uci_adult_observed();
//! let algebra = CountAlgebra::new(observed.labels().clone(), 3, observed.test_size())?;
//! let pair = algebra.subset([0, 1])?;
//! let space = SubsetSimplexSpace::new(algebra.clone(), pair.clone())?;
//! let axioms = algebra.axioms_for_subset(&pair)?;
//! let key = AnswerKey::new(observed.labels().clone(), [5687, 31155])?;
//!
//! // far too many candidates for the default bound
//! let result = space.enumerate_variety(&axioms, &observed, &key, &EnumerationBound::default());
//! assert!(matches!(result, Err(VarietyError::ResourceBound { .. })));
//! # Ok::<(), VarietyError>(())
//! ```

mod budget;
mod error;
mod space;

pub use budget::{EnumerationBound, EnumerationBudget, Resource};
pub use error::{Result, VarietyError};
pub use space::{AmbientSpace, SimplexFactor, SubsetSimplexSpace, Variety};
