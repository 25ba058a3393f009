//! The simplex space of a subset and its consistent variety.
//!
//! For an answer key `{Q_l}` the by-true-label counts of an M-sized
//! subset range over a product of simplices: for each true label, R^M
//! nonnegative parts summing to `Q_l`. The variety is the part of that
//! space the subset's axioms allow once observed counts are fixed.
//!
//! ## Walk
//!
//! ```text
//! observed patterns (count > 0)    p_1      p_2     ...    p_k
//!                                   │        │              │
//! split across true labels      n_1 = Σ_l   n_2 = Σ_l      forced by the
//! (each part <= remaining Q_l)  R_{p1;l}    R_{p2;l}       remaining totals
//!                                   └────────┴──── ... ─────┘
//!                                                │
//!                         marginalize onto proper sub-subsets
//!                                                │
//!                              exact check of every identity
//! ```
//!
//! Unobserved patterns have every by-label part fixed at zero by the
//! observation identities, so they never branch.

use crate::budget::{EnumerationBound, EnumerationBudget, Resource};
use crate::error::{Result, VarietyError};
use algeval_axioms::{
    binomial, AnswerKey, AxiomError, AxiomSet, CountAlgebra, CountAssignment, Label, LabelSet,
    Pattern, Subset, Variable, VoteCountTable, MAX_GENERIC_ARITY,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;
use tracing::{debug, warn};

/// One factor of the ambient space: R^M parts summing to `Q_l`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimplexFactor {
    /// True label the factor partitions
    pub true_label: Label,
    /// `Q_l`
    pub total: u64,
    /// Number of parts, R^M
    pub parts: usize,
}

/// The product of simplices for one subset at one answer key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbientSpace {
    subset: Subset,
    key: AnswerKey,
    patterns: Vec<Pattern>,
}

impl AmbientSpace {
    /// Subset the space belongs to.
    pub fn subset(&self) -> &Subset {
        &self.subset
    }

    /// Answer key fixing each factor's total.
    pub fn key(&self) -> &AnswerKey {
        &self.key
    }

    /// One factor per true label, in label-set order.
    pub fn factors(&self) -> Vec<SimplexFactor> {
        self.key
            .labels()
            .iter()
            .zip(self.key.totals())
            .map(|(label, total)| SimplexFactor {
                true_label: label.clone(),
                total: *total,
                parts: self.patterns.len(),
            })
            .collect()
    }

    /// Number of by-true-label variables, R^(M+1).
    pub fn dimension(&self) -> usize {
        self.patterns.len() * self.key.labels().len()
    }

    /// Number of integer points, `None` on overflow.
    ///
    /// Ignores the observed counts, so this bounds the variety from above.
    pub fn cardinality(&self) -> Option<u128> {
        let parts = self.patterns.len() as u64;
        self.key.totals().iter().try_fold(1u128, |acc, &q| {
            acc.checked_mul(binomial(q + parts - 1, parts - 1)?)
        })
    }

    /// True when `point` assigns every by-label part of the subset and
    /// each true label's parts sum to its `Q_l`.
    pub fn contains(&self, point: &CountAssignment) -> bool {
        self.key
            .labels()
            .iter()
            .zip(self.key.totals())
            .all(|(label, &total)| {
                let mut sum = 0u64;
                for pattern in &self.patterns {
                    match point.get(&Variable::label_response(&self.subset, pattern, label)) {
                        Some(n) => sum += n,
                        None => return false,
                    }
                }
                sum == total
            })
    }
}

/// Every consistent count assignment found for one subset and answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variety {
    subset: Subset,
    key: AnswerKey,
    points: BTreeSet<CountAssignment>,
}

impl Variety {
    /// Subset whose axioms the points satisfy.
    pub fn subset(&self) -> &Subset {
        &self.subset
    }

    /// Answer key the points were enumerated at.
    pub fn key(&self) -> &AnswerKey {
        &self.key
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no assignment is consistent.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in canonical order.
    pub fn points(&self) -> impl Iterator<Item = &CountAssignment> {
        self.points.iter()
    }

    /// Membership test.
    pub fn contains(&self, point: &CountAssignment) -> bool {
        self.points.contains(point)
    }

    /// Restricts every point to the variables of `subset`.
    ///
    /// # Errors
    ///
    /// `AxiomMismatch` unless `subset` is contained in this variety's subset.
    pub fn project(&self, subset: &Subset) -> Result<Variety> {
        if !subset
            .indices()
            .iter()
            .all(|i| self.subset.indices().contains(i))
        {
            return Err(VarietyError::AxiomMismatch(format!(
                "cannot project variety of {} onto {subset}",
                self.subset
            )));
        }
        Ok(Variety {
            subset: subset.clone(),
            key: self.key.clone(),
            points: self.points.iter().map(|p| p.restrict_to(subset)).collect(),
        })
    }

    /// True when every point here is also a point of `other`.
    pub fn is_subset_of(&self, other: &Variety) -> bool {
        self.points.is_subset(&other.points)
    }
}

/// Enumeration and membership for one M-sized subset of the classifiers.
///
/// # Example
///
/// ```rust
/// use algeval_axioms::{AnswerKey, CountAlgebra, LabelSet, VoteCountTable};
/// use algeval_variety::{EnumerationBound, SubsetSimplexSpace};
///
/// let observed = VoteCountTable::new(LabelSet::binary(), [(["a"], 2), (["b"], 1)])?;
/// let algebra = CountAlgebra::new(LabelSet::binary(), 1, 3)?;
/// let subset = algebra.subset([0])?;
/// let space = SubsetSimplexSpace::new(algebra.clone(), subset.clone())?;
/// let axioms = algebra.axioms_for_subset(&subset)?;
///
/// let key = AnswerKey::new(LabelSet::binary(), [1, 2])?;
/// let variety = space.enumerate_variety(&axioms, &observed, &key, &EnumerationBound::default())?;
/// // R_{a;a} ranges over 0..=1, which fixes the rest
/// assert_eq!(variety.len(), 2);
/// # Ok::<(), algeval_variety::VarietyError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SubsetSimplexSpace {
    algebra: CountAlgebra,
    subset: Subset,
}

impl SubsetSimplexSpace {
    /// Binds a subset to an algebra.
    ///
    /// # Errors
    ///
    /// `InvalidSubset` or `UnsupportedArity` passed through from the algebra.
    pub fn new(algebra: CountAlgebra, subset: Subset) -> Result<Self> {
        let subset = algebra.subset(subset.indices().iter().copied())?;
        if subset.size() > MAX_GENERIC_ARITY {
            return Err(AxiomError::UnsupportedArity {
                arity: subset.size(),
                max: MAX_GENERIC_ARITY,
            }
            .into());
        }
        Ok(Self { algebra, subset })
    }

    /// Algebra fixing (L, N, Q).
    pub fn algebra(&self) -> &CountAlgebra {
        &self.algebra
    }

    /// Subset of the space.
    pub fn subset(&self) -> &Subset {
        &self.subset
    }

    /// The product of simplices at answer key `key`.
    pub fn ambient_space(&self, key: &AnswerKey) -> Result<AmbientSpace> {
        self.check_key(key)?;
        Ok(AmbientSpace {
            subset: self.subset.clone(),
            key: key.clone(),
            patterns: self.algebra.labels().patterns(self.subset.size()),
        })
    }

    /// Exact check of every identity of `axioms` at `point`.
    ///
    /// # Errors
    ///
    /// `AxiomMismatch` for axioms of another subset, and
    /// `UnassignedVariable` when `point` lacks a value the axioms need.
    pub fn is_consistent(&self, point: &CountAssignment, axioms: &AxiomSet) -> Result<bool> {
        self.check_axioms(axioms)?;
        Ok(axioms.is_satisfied_by(point)?)
    }

    /// Every consistent point at answer key `key`.
    ///
    /// `observed` is the N-classifier table; it is marginalized onto the
    /// subset here.
    ///
    /// # Errors
    ///
    /// `ResourceBound` when a preflight check fails or the walk visits more
    /// than `bound.max_points` leaves. No partial variety is returned.
    pub fn enumerate_variety(
        &self,
        axioms: &AxiomSet,
        observed: &VoteCountTable,
        key: &AnswerKey,
        bound: &EnumerationBound,
    ) -> Result<Variety> {
        let mut points = BTreeSet::new();
        let visited = self.walk(axioms, observed, key, bound, |point| {
            points.insert(point);
            ControlFlow::Continue(())
        })?;
        debug!(
            subset = %self.subset,
            key = %key,
            visited,
            points = points.len(),
            "enumerated variety"
        );
        Ok(Variety {
            subset: self.subset.clone(),
            key: key.clone(),
            points,
        })
    }

    /// First consistent point at `key` accepted by `predicate`.
    ///
    /// Walks in the same order as [`enumerate_variety`](Self::enumerate_variety)
    /// and under the same bound; `Ok(None)` means the whole variety was
    /// visited without a match.
    pub fn find_point<P>(
        &self,
        axioms: &AxiomSet,
        observed: &VoteCountTable,
        key: &AnswerKey,
        bound: &EnumerationBound,
        mut predicate: P,
    ) -> Result<Option<CountAssignment>>
    where
        P: FnMut(&CountAssignment) -> bool,
    {
        let mut found = None;
        self.walk(axioms, observed, key, bound, |point| {
            if predicate(&point) {
                found = Some(point);
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;
        Ok(found)
    }

    fn walk<F>(
        &self,
        axioms: &AxiomSet,
        observed: &VoteCountTable,
        key: &AnswerKey,
        bound: &EnumerationBound,
        visit: F,
    ) -> Result<u64>
    where
        F: FnMut(CountAssignment) -> ControlFlow<()>,
    {
        let plan = self.plan(axioms, observed, key, bound)?;
        let mut walk = Walk {
            axioms,
            key,
            plan: &plan,
            budget: EnumerationBudget::new(bound.max_points),
            remaining: key.totals().to_vec(),
            splits: Vec::with_capacity(plan.patterns.len()),
            visit,
        };
        if let Err(err) = walk.descend(0) {
            if matches!(err, VarietyError::ResourceBound { .. }) {
                warn!(subset = %self.subset, key = %key, error = %err, "enumeration aborted");
            }
            return Err(err);
        }
        Ok(walk.budget.consumed())
    }

    /// Validates inputs and runs the preflight checks.
    fn plan(
        &self,
        axioms: &AxiomSet,
        observed: &VoteCountTable,
        key: &AnswerKey,
        bound: &EnumerationBound,
    ) -> Result<Plan> {
        self.check_axioms(axioms)?;
        self.check_key(key)?;
        if observed.labels() != self.algebra.labels()
            || observed.arity() != self.algebra.classifiers()
        {
            return Err(VarietyError::AxiomMismatch(format!(
                "observed table covers {} classifiers over {}, algebra expects {} over {}",
                observed.arity(),
                observed.labels(),
                self.algebra.classifiers(),
                self.algebra.labels()
            )));
        }
        observed.check_test_size(self.algebra.test_size())?;

        let labels = self.algebra.labels();
        let r = labels.len() as u128;
        let variables = u32::try_from(self.subset.size() + 1)
            .ok()
            .and_then(|exp| r.checked_pow(exp))
            .unwrap_or(u128::MAX);
        bound.check(Resource::Variables, variables)?;

        let marginal = observed.marginalize(self.subset.indices())?;
        let patterns: Vec<(Pattern, u64)> = marginal
            .observed()
            .map(|(p, n)| (p.clone(), n))
            .collect();

        // the last pattern is forced by the remaining totals
        let candidates = patterns
            .iter()
            .take(patterns.len().saturating_sub(1))
            .try_fold(1u128, |acc, (_, n)| {
                let r = labels.len() as u64;
                acc.checked_mul(binomial(n + r - 1, r - 1)?)
            })
            .unwrap_or(u128::MAX);
        bound.check(Resource::Candidates, candidates)?;

        debug!(
            subset = %self.subset,
            variables,
            candidates,
            patterns = patterns.len(),
            "variety preflight passed"
        );

        let mut ladder = vec![self.subset.clone()];
        ladder.extend(self.subset.proper_subsets());
        let ladder = ladder
            .into_iter()
            .map(|s| {
                let positions = s
                    .indices()
                    .iter()
                    .filter_map(|i| self.subset.indices().iter().position(|j| j == i))
                    .collect();
                (s, positions)
            })
            .collect();

        Ok(Plan {
            labels: labels.clone(),
            patterns,
            ladder,
        })
    }

    fn check_axioms(&self, axioms: &AxiomSet) -> Result<()> {
        if axioms.subset() != &self.subset {
            return Err(VarietyError::AxiomMismatch(format!(
                "axioms for {} used with the space of {}",
                axioms.subset(),
                self.subset
            )));
        }
        Ok(())
    }

    fn check_key(&self, key: &AnswerKey) -> Result<()> {
        if key.labels() != self.algebra.labels() {
            return Err(VarietyError::InvalidAnswerKey(format!(
                "key over {} for an algebra over {}",
                key.labels(),
                self.algebra.labels()
            )));
        }
        if key.test_size() != self.algebra.test_size() {
            return Err(VarietyError::InvalidAnswerKey(format!(
                "key sums to {}, test size is {}",
                key.test_size(),
                self.algebra.test_size()
            )));
        }
        Ok(())
    }
}

/// Observed patterns to split and the sub-subsets to derive.
struct Plan {
    labels: LabelSet,
    patterns: Vec<(Pattern, u64)>,
    /// Each sub-subset with its members' positions inside the subset
    ladder: Vec<(Subset, Vec<usize>)>,
}

impl Plan {
    /// Builds the full assignment for one leaf of the walk.
    fn assemble(&self, key: &AnswerKey, splits: &[Vec<u64>]) -> CountAssignment {
        let r = self.labels.len();
        let mut point = CountAssignment::new();
        key.assign(&mut point);

        for (subset, positions) in &self.ladder {
            let mut seen: BTreeMap<Pattern, u64> = BTreeMap::new();
            let mut by_label: BTreeMap<Pattern, Vec<u64>> = BTreeMap::new();
            for ((pattern, n), split) in self.patterns.iter().zip(splits) {
                let q: Pattern = positions.iter().map(|&k| pattern[k].clone()).collect();
                *seen.entry(q.clone()).or_insert(0) += n;
                let parts = by_label.entry(q).or_insert_with(|| vec![0; r]);
                for (acc, part) in parts.iter_mut().zip(split) {
                    *acc += part;
                }
            }
            for q in self.labels.patterns(subset.size()) {
                point.insert(
                    Variable::response(subset, &q),
                    seen.get(&q).copied().unwrap_or(0),
                );
                let parts = by_label.get(&q);
                for (index, true_label) in self.labels.iter().enumerate() {
                    let n = parts.map_or(0, |v| v[index]);
                    point.insert(Variable::label_response(subset, &q, true_label), n);
                }
            }
        }
        point
    }
}

struct Walk<'a, F> {
    axioms: &'a AxiomSet,
    key: &'a AnswerKey,
    plan: &'a Plan,
    budget: EnumerationBudget,
    remaining: Vec<u64>,
    splits: Vec<Vec<u64>>,
    visit: F,
}

impl<F> Walk<'_, F>
where
    F: FnMut(CountAssignment) -> ControlFlow<()>,
{
    fn descend(&mut self, depth: usize) -> Result<ControlFlow<()>> {
        let plan = self.plan;
        let Some((_, n)) = plan.patterns.get(depth) else {
            self.budget.consume(1)?;
            let point = plan.assemble(self.key, &self.splits);
            if self.axioms.is_satisfied_by(&point)? {
                return Ok((self.visit)(point));
            }
            return Ok(ControlFlow::Continue(()));
        };

        for split in capped_compositions(*n, &self.remaining) {
            for (rem, part) in self.remaining.iter_mut().zip(&split) {
                *rem -= part;
            }
            self.splits.push(split);
            let flow = self.descend(depth + 1)?;
            if let Some(split) = self.splits.pop() {
                for (rem, part) in self.remaining.iter_mut().zip(&split) {
                    *rem += part;
                }
            }
            if flow.is_break() {
                return Ok(flow);
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}

/// Every way to write `total` as one part per cap with `part <= cap`.
fn capped_compositions(total: u64, caps: &[u64]) -> Vec<Vec<u64>> {
    let Some((&cap, rest)) = caps.split_first() else {
        return if total == 0 { vec![Vec::new()] } else { Vec::new() };
    };
    let rest_capacity: u64 = rest.iter().sum();
    let low = total.saturating_sub(rest_capacity);
    let high = cap.min(total);
    let mut out = Vec::new();
    for first in low..=high {
        for mut tail in capped_compositions(total - first, rest) {
            tail.insert(0, first);
            out.push(tail);
        }
    }
    out
}
