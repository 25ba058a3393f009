//! # Evaluation Axioms
//!
//! Counting identities that relate what a group of classifiers was *seen*
//! to do on a test (how often each joint response pattern occurred) to what
//! cannot be seen (how those counts split by the unknown true label).
//!
//! ## Purpose
//!
//! Every identity here holds for every real test, in every domain, because
//! it is true by counting. Nothing is assumed about the classifiers, so the
//! identities are the common ground that evaluators and alarms build on:
//!
//! 1. **Simplex identities** - label counts add up to the test size, and
//!    each true label's pattern counts add up to that label's count.
//! 2. **Marginalization identities** - a subset's counts sum onto every
//!    smaller subset.
//! 3. **Observation identities** - an observed pattern count is the sum of
//!    its by-true-label parts.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      COUNT ALGEBRA                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │   LabelSet (R)   Subset (M of N)   test size (Q)             │
//! │        │               │                 │                   │
//! │        └───────────────┼─────────────────┘                   │
//! │                        ▼                                     │
//! │               ┌─────────────────┐                            │
//! │               │  CountAlgebra   │                            │
//! │               └────────┬────────┘                            │
//! │            ┌───────────┼────────────┐                        │
//! │            ▼           ▼            ▼                        │
//! │        simplex   marginalization  observation                │
//! │            └───────────┼────────────┘                        │
//! │                        ▼                                     │
//! │                    AxiomSet  ◀── CountAssignment (residuals) │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use algeval_axioms::{samples, AnswerKey, CountAlgebra};
//!
//! let labeled = samples::uci_adult_labeled();
//! let algebra = CountAlgebra::new(labeled.labels().clone(), 3, labeled.test_size())?;
//! let pair = algebra.subset([0, 2])?;
//!
//! let axioms = algebra.axioms_for_subset(&pair)?;
//! let witness = labeled.witness(&algebra, &pair)?;
//! assert!(axioms.is_satisfied_by(&witness)?);
//! # Ok::<(), algeval_axioms::AxiomError>(())
//! ```
//!
//! ## Scope
//!
//! Construction is generic in N and R for subsets of size 1 and 2. Larger
//! subsets fail with [`AxiomError::UnsupportedArity`].

pub mod algebra;
pub mod answer_key;
pub mod error;
pub mod identity;
pub mod labels;
pub mod samples;
pub mod subset;
pub mod table;

pub use algebra::{CountAlgebra, MAX_GENERIC_ARITY};
pub use answer_key::{binomial, AnswerKey, AnswerKeySweep};
pub use error::{AxiomError, Result};
pub use identity::{AxiomKind, AxiomSet, CountAssignment, Identity, Variable};
pub use labels::{format_pattern, Label, LabelSet, Pattern};
pub use subset::Subset;
pub use table::{LabeledVoteCounts, PatternCount, VoteCountTable, VoteCountTableSpec};
