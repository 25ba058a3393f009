//! The count algebra: identity construction for classifier subsets.
//!
//! ## Identity Families
//!
//! | Family | Equation (per true label `l`) |
//! |--------|-------------------------------|
//! | Simplex | `sum_l Q_l = Q` and `sum_p R_{p;l} = Q_l` |
//! | Marginalization | `sum_r R_{q+r@k;l} = R_{q;l}` on the subset without member k |
//! | Observation | `R_p = sum_l R_{p;l}` |
//!
//! For a single classifier the marginal onto the empty subset *is* the
//! simplex identity, so marginalization starts at pairs.

use crate::error::{AxiomError, Result};
use crate::identity::{AxiomKind, AxiomSet, Identity, Variable};
use crate::labels::{format_pattern, Label, LabelSet};
use crate::subset::Subset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Largest subset size with a generic construction.
pub const MAX_GENERIC_ARITY: usize = 2;

/// Builds evaluation axioms for N classifiers over R labels on a test of Q items.
///
/// Axioms depend only on (L, N, Q, subset), so one algebra serves every
/// vote-count table of a session.
///
/// # Example
///
/// ```rust
/// use algeval_axioms::{AxiomKind, CountAlgebra, LabelSet};
///
/// let algebra = CountAlgebra::new(LabelSet::binary(), 3, 100)?;
/// let pair = algebra.subset([0, 1])?;
/// let axioms = algebra.axioms_for_subset(&pair)?;
/// assert_eq!(axioms.of_kind(AxiomKind::Observation).count(), 4 + 2 + 2);
/// # Ok::<(), algeval_axioms::AxiomError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountAlgebra {
    labels: LabelSet,
    classifiers: usize,
    test_size: u64,
}

impl CountAlgebra {
    /// Fixes the label set, classifier count and test size.
    ///
    /// # Errors
    ///
    /// `InvalidSubset` when there are no classifiers, `MalformedCountTable`
    /// when the test is empty or too large for exact `i64` constants.
    pub fn new(labels: LabelSet, classifiers: usize, test_size: u64) -> Result<Self> {
        if classifiers == 0 {
            return Err(AxiomError::InvalidSubset {
                indices: Vec::new(),
                classifiers,
                reason: "no classifiers".to_string(),
            });
        }
        if test_size == 0 || i64::try_from(test_size).is_err() {
            return Err(AxiomError::MalformedCountTable(format!(
                "test size {test_size} out of range"
            )));
        }
        Ok(Self {
            labels,
            classifiers,
            test_size,
        })
    }

    /// Label set L.
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Number of classifiers N.
    pub fn classifiers(&self) -> usize {
        self.classifiers
    }

    /// Test size Q.
    pub fn test_size(&self) -> u64 {
        self.test_size
    }

    /// Validates a subset of this algebra's classifiers.
    pub fn subset(&self, indices: impl IntoIterator<Item = usize>) -> Result<Subset> {
        Subset::new(indices, self.classifiers)
    }

    /// `sum_l Q_l - Q = 0`.
    pub fn label_simplex_identity(&self) -> Identity {
        self.labels
            .iter()
            .fold(Identity::new(AxiomKind::Simplex), |id, l| {
                id.add_term(Variable::LabelTotal(l.clone()), 1)
            })
            .add_constant(-(self.test_size as i64))
    }

    /// `sum_p R_{p;l} - Q_l = 0` over every response pattern of `subset`.
    pub fn simplex_identity(&self, subset: &Subset, true_label: &Label) -> Result<Identity> {
        self.check_subset(subset)?;
        self.labels.require(true_label)?;
        let identity = self
            .labels
            .patterns(subset.size())
            .iter()
            .fold(Identity::new(AxiomKind::Simplex), |id, p| {
                id.add_term(Variable::label_response(subset, p, true_label), 1)
            })
            .add_term(Variable::LabelTotal(true_label.clone()), -1);
        Ok(identity)
    }

    /// Marginalization identities of `subset` for one true label.
    ///
    /// For every member k and every pattern q of the subset without k,
    /// the counts with each response symbol inserted at k sum to the
    /// smaller subset's count. Empty for single classifiers.
    pub fn marginalization_identities(
        &self,
        subset: &Subset,
        true_label: &Label,
    ) -> Result<Vec<Identity>> {
        self.check_subset(subset)?;
        self.labels.require(true_label)?;
        let mut out = Vec::new();
        for k in 0..subset.size() {
            let Some(smaller) = subset.without(k) else {
                continue;
            };
            for q in self.labels.patterns(smaller.size()) {
                let identity = self
                    .labels
                    .iter()
                    .fold(Identity::new(AxiomKind::Marginalization), |id, r| {
                        let mut full = q.clone();
                        full.insert(k, r.clone());
                        id.add_term(Variable::label_response(subset, &full, true_label), 1)
                    })
                    .add_term(Variable::label_response(&smaller, &q, true_label), -1);
                out.push(identity);
            }
        }
        Ok(out)
    }

    /// `R_p - sum_l R_{p;l} = 0` for one observable pattern.
    pub fn observation_identity(&self, subset: &Subset, pattern: &[Label]) -> Result<Identity> {
        self.check_subset(subset)?;
        if pattern.len() != subset.size() {
            return Err(AxiomError::MalformedCountTable(format!(
                "pattern {} does not match subset {subset}",
                format_pattern(pattern)
            )));
        }
        for label in pattern {
            self.labels.require(label)?;
        }
        let identity = self
            .labels
            .iter()
            .fold(Identity::new(AxiomKind::Observation), |id, l| {
                id.add_term(Variable::label_response(subset, pattern, l), -1)
            })
            .add_term(Variable::response(subset, pattern), 1);
        Ok(identity)
    }

    /// The generating set of `subset`'s evaluation ideal.
    ///
    /// Holds the label simplex and, for the subset and each of its
    /// non-empty proper subsets, every simplex, marginalization and
    /// observation identity. Duplicates are removed.
    pub fn axioms_for_subset(&self, subset: &Subset) -> Result<AxiomSet> {
        self.check_subset(subset)?;
        let mut identities = BTreeSet::new();
        identities.insert(self.label_simplex_identity());

        let mut ladder = vec![subset.clone()];
        ladder.extend(subset.proper_subsets());
        for s in &ladder {
            for true_label in self.labels.iter() {
                identities.insert(self.simplex_identity(s, true_label)?);
                identities.extend(self.marginalization_identities(s, true_label)?);
            }
            for pattern in self.labels.patterns(s.size()) {
                identities.insert(self.observation_identity(s, &pattern)?);
            }
        }

        debug!(
            subset = %subset,
            identities = identities.len(),
            "built evaluation axioms"
        );
        Ok(AxiomSet::new(subset.clone(), identities))
    }

    /// Axioms for every m-sized subset of the N classifiers.
    pub fn axioms_at_arity(&self, m: usize) -> Result<Vec<AxiomSet>> {
        if m > MAX_GENERIC_ARITY {
            return Err(AxiomError::UnsupportedArity {
                arity: m,
                max: MAX_GENERIC_ARITY,
            });
        }
        if m == 0 || m > self.classifiers {
            return Err(AxiomError::InvalidSubset {
                indices: Vec::new(),
                classifiers: self.classifiers,
                reason: format!("no subsets of size {m}"),
            });
        }
        Subset::all_of_size(self.classifiers, m)
            .iter()
            .map(|s| self.axioms_for_subset(s))
            .collect()
    }

    fn check_subset(&self, subset: &Subset) -> Result<()> {
        if let Some(&last) = subset.indices().last() {
            if last >= self.classifiers {
                return Err(AxiomError::InvalidSubset {
                    indices: subset.indices().to_vec(),
                    classifiers: self.classifiers,
                    reason: format!("index {last} out of range"),
                });
            }
        }
        if subset.size() > MAX_GENERIC_ARITY {
            return Err(AxiomError::UnsupportedArity {
                arity: subset.size(),
                max: MAX_GENERIC_ARITY,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn algebra(r: usize, n: usize, q: u64) -> CountAlgebra {
        let names = ["a", "b", "c", "d"];
        let labels = LabelSet::new(names.iter().take(r).copied()).unwrap();
        CountAlgebra::new(labels, n, q).unwrap()
    }

    #[test]
    fn test_single_classifier_counts() {
        let alg = algebra(2, 1, 10);
        let axioms = alg.axioms_for_subset(&alg.subset([0]).unwrap()).unwrap();
        // label simplex + 2 per-label simplex + 2 observation
        assert_eq!(axioms.len(), 5);
        assert_eq!(axioms.of_kind(AxiomKind::Marginalization).count(), 0);
        assert_eq!(axioms.unknowns().len(), 4);
    }

    #[test]
    fn test_pair_marginalization_count() {
        let alg = algebra(3, 2, 10);
        let pair = alg.subset([0, 1]).unwrap();
        let a = Label::from("a");
        // two members, R^(M-1) = 3 kept patterns each
        assert_eq!(alg.marginalization_identities(&pair, &a).unwrap().len(), 6);
        let axioms = alg.axioms_for_subset(&pair).unwrap();
        assert_eq!(axioms.of_kind(AxiomKind::Marginalization).count(), 18);
        assert_eq!(axioms.of_kind(AxiomKind::Observation).count(), 9 + 3 + 3);
        assert_eq!(axioms.of_kind(AxiomKind::Simplex).count(), 1 + 3 * 3);
    }

    #[test]
    fn test_arity_three_is_unsupported() {
        let alg = algebra(2, 3, 10);
        let trio = alg.subset([0, 1, 2]).unwrap();
        assert_eq!(
            alg.axioms_for_subset(&trio).unwrap_err(),
            AxiomError::UnsupportedArity { arity: 3, max: 2 }
        );
        assert!(matches!(
            alg.axioms_at_arity(3),
            Err(AxiomError::UnsupportedArity { .. })
        ));
    }

    #[test]
    fn test_subset_out_of_range() {
        let alg = algebra(2, 2, 10);
        let foreign = Subset::new([4], 5).unwrap();
        assert!(matches!(
            alg.axioms_for_subset(&foreign),
            Err(AxiomError::InvalidSubset { .. })
        ));
        assert!(alg.subset([0, 2]).is_err());
    }

    #[test]
    fn test_single_classifier_axioms_by_hand() {
        // R=3, one classifier: qs (4,6,8), responses (2,4,12),
        // errors R_{b;a}=1, R_{c;a}=2, R_{a;b}=0, R_{c;b}=5, R_{a;c}=1, R_{b;c}=2
        let alg = algebra(3, 1, 18);
        let single = alg.subset([0]).unwrap();
        let l = |s: &str| Label::from(s);
        let mut point = crate::CountAssignment::new();
        for (label, q) in [("a", 4), ("b", 6), ("c", 8)] {
            point.insert(Variable::LabelTotal(l(label)), q);
        }
        for (label, r) in [("a", 2), ("b", 4), ("c", 12)] {
            point.insert(Variable::response(&single, &[l(label)]), r);
        }
        let by_label = [
            ("a", "a", 1),
            ("b", "a", 1),
            ("c", "a", 2),
            ("a", "b", 0),
            ("b", "b", 1),
            ("c", "b", 5),
            ("a", "c", 1),
            ("b", "c", 2),
            ("c", "c", 5),
        ];
        for (voted, truth, n) in by_label {
            point.insert(Variable::label_response(&single, &[l(voted)], &l(truth)), n);
        }
        let axioms = alg.axioms_for_subset(&single).unwrap();
        assert!(axioms.is_satisfied_by(&point).unwrap());

        point.insert(Variable::label_response(&single, &[l("c")], &l("c")), 6);
        let violated = axioms.violations(&point).unwrap();
        assert_eq!(violated.len(), 2);
    }
}
