//! Variables, linear identities and count assignments.
//!
//! Every axiom is a linear equation with integer coefficients over three
//! kinds of count variables. Identities are stored as `expr = 0` and are
//! evaluated exactly in `i128`; there is no floating tolerance anywhere.

use crate::error::{AxiomError, Result};
use crate::labels::{Label, Pattern};
use crate::subset::Subset;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A count variable of the axiom vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Variable {
    /// `Q_l`: number of items whose true label is `l`.
    LabelTotal(Label),
    /// `R_p`: observed number of items where the subset voted pattern `p`.
    Response {
        /// Classifiers that voted
        subset: Subset,
        /// Their joint response
        pattern: Pattern,
    },
    /// `R_{p,l}`: items with true label `l` where the subset voted `p`.
    LabelResponse {
        /// Classifiers that voted
        subset: Subset,
        /// Their joint response
        pattern: Pattern,
        /// True label of the counted items
        true_label: Label,
    },
}

impl Variable {
    /// `R_p` for a pattern of a subset.
    pub fn response(subset: &Subset, pattern: &[Label]) -> Self {
        Self::Response {
            subset: subset.clone(),
            pattern: pattern.to_vec(),
        }
    }

    /// `R_{p,l}` for a pattern of a subset and a true label.
    pub fn label_response(subset: &Subset, pattern: &[Label], true_label: &Label) -> Self {
        Self::LabelResponse {
            subset: subset.clone(),
            pattern: pattern.to_vec(),
            true_label: true_label.clone(),
        }
    }

    /// True for the unobservable by-true-label counts.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::LabelResponse { .. })
    }

    /// The subset a response variable belongs to.
    pub fn subset(&self) -> Option<&Subset> {
        match self {
            Self::LabelTotal(_) => None,
            Self::Response { subset, .. } | Self::LabelResponse { subset, .. } => Some(subset),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let voted = |subset: &Subset, pattern: &Pattern| {
            subset
                .indices()
                .iter()
                .zip(pattern)
                .map(|(i, l)| format!("{l}_{i}"))
                .collect::<Vec<_>>()
                .join(",")
        };
        match self {
            Self::LabelTotal(label) => write!(f, "Q_{label}"),
            Self::Response { subset, pattern } => write!(f, "R_{{{}}}", voted(subset, pattern)),
            Self::LabelResponse {
                subset,
                pattern,
                true_label,
            } => write!(f, "R_{{{};{}}}", voted(subset, pattern), true_label),
        }
    }
}

/// Family an identity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AxiomKind {
    /// Label counts, or one true label's pattern counts, add up to a total.
    Simplex,
    /// Subset counts marginalize onto a smaller subset.
    Marginalization,
    /// Observed pattern counts split across true labels.
    Observation,
}

/// A linear identity `sum(coefficient * variable) + constant = 0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity {
    kind: AxiomKind,
    terms: BTreeMap<Variable, i64>,
    constant: i64,
}

impl Identity {
    pub(crate) fn new(kind: AxiomKind) -> Self {
        Self {
            kind,
            terms: BTreeMap::new(),
            constant: 0,
        }
    }

    pub(crate) fn add_term(mut self, variable: Variable, coefficient: i64) -> Self {
        let entry = self.terms.entry(variable).or_insert(0);
        *entry += coefficient;
        self.terms.retain(|_, c| *c != 0);
        self
    }

    pub(crate) fn add_constant(mut self, constant: i64) -> Self {
        self.constant += constant;
        self
    }

    /// Axiom family.
    pub fn kind(&self) -> AxiomKind {
        self.kind
    }

    /// Variables and their coefficients.
    pub fn terms(&self) -> &BTreeMap<Variable, i64> {
        &self.terms
    }

    /// Constant term.
    pub fn constant(&self) -> i64 {
        self.constant
    }

    /// Exact left-hand side at `point`; zero means the identity holds.
    ///
    /// # Errors
    ///
    /// `UnassignedVariable` when `point` lacks one of the identity's variables.
    pub fn residual(&self, point: &CountAssignment) -> Result<i128> {
        let mut total = i128::from(self.constant);
        for (variable, coefficient) in &self.terms {
            let value = point
                .get(variable)
                .ok_or_else(|| AxiomError::UnassignedVariable(variable.to_string()))?;
            total += i128::from(*coefficient) * i128::from(value);
        }
        Ok(total)
    }

    /// True when the residual at `point` is exactly zero.
    pub fn is_satisfied(&self, point: &CountAssignment) -> Result<bool> {
        Ok(self.residual(point)? == 0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (variable, coefficient) in &self.terms {
            let sign = if *coefficient < 0 { "-" } else { "+" };
            let magnitude = coefficient.unsigned_abs();
            if first {
                if *coefficient < 0 {
                    f.write_str("-")?;
                }
            } else {
                write!(f, " {sign} ")?;
            }
            if magnitude != 1 {
                write!(f, "{magnitude}*")?;
            }
            write!(f, "{variable}")?;
            first = false;
        }
        if self.constant != 0 || first {
            if first {
                write!(f, "{}", self.constant)?;
            } else if self.constant < 0 {
                write!(f, " - {}", self.constant.unsigned_abs())?;
            } else {
                write!(f, " + {}", self.constant)?;
            }
        }
        f.write_str(" = 0")
    }
}

/// Integer values for count variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CountAssignment {
    values: BTreeMap<Variable, u64>,
}

impl CountAssignment {
    /// Empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, replacing any previous one.
    pub fn insert(&mut self, variable: Variable, value: u64) {
        self.values.insert(variable, value);
    }

    /// Value of a variable.
    pub fn get(&self, variable: &Variable) -> Option<u64> {
        self.values.get(variable).copied()
    }

    /// Number of assigned variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing is assigned.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Assigned variables and values in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &u64)> {
        self.values.iter()
    }

    /// Keeps label totals and response variables of `subset`'s sub-subsets.
    pub fn restrict_to(&self, subset: &Subset) -> CountAssignment {
        let values = self
            .values
            .iter()
            .filter(|(variable, _)| match variable.subset() {
                None => true,
                Some(s) => s.indices().iter().all(|i| subset.indices().contains(i)),
            })
            .map(|(v, n)| (v.clone(), *n))
            .collect();
        CountAssignment { values }
    }

    /// Correct-answer count of a single classifier on `label`,
    /// i.e. `R_{l;l}` for the singleton subset.
    pub fn correct_count(&self, classifier: usize, label: &Label) -> Option<u64> {
        self.get(&Variable::LabelResponse {
            subset: Subset::single(classifier),
            pattern: vec![label.clone()],
            true_label: label.clone(),
        })
    }
}

impl FromIterator<(Variable, u64)> for CountAssignment {
    fn from_iter<T: IntoIterator<Item = (Variable, u64)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// The generating identities of one subset's evaluation ideal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxiomSet {
    subset: Subset,
    identities: Vec<Identity>,
}

impl AxiomSet {
    pub(crate) fn new(subset: Subset, identities: BTreeSet<Identity>) -> Self {
        Self {
            subset,
            identities: identities.into_iter().collect(),
        }
    }

    /// Subset these axioms were built for.
    pub fn subset(&self) -> &Subset {
        &self.subset
    }

    /// Number of identities.
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// True when the set has no identities.
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// All identities, deduplicated and ordered.
    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        self.identities.iter()
    }

    /// Identities of one family.
    pub fn of_kind(&self, kind: AxiomKind) -> impl Iterator<Item = &Identity> {
        self.identities.iter().filter(move |i| i.kind() == kind)
    }

    /// Every variable mentioned by some identity.
    pub fn variables(&self) -> BTreeSet<Variable> {
        self.identities
            .iter()
            .flat_map(|i| i.terms().keys().cloned())
            .collect()
    }

    /// The unobservable by-true-label variables.
    pub fn unknowns(&self) -> BTreeSet<Variable> {
        self.variables()
            .into_iter()
            .filter(Variable::is_unknown)
            .collect()
    }

    /// True when every identity holds exactly at `point`.
    pub fn is_satisfied_by(&self, point: &CountAssignment) -> Result<bool> {
        for identity in &self.identities {
            if !identity.is_satisfied(point)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Identities with a nonzero residual at `point`.
    pub fn violations(&self, point: &CountAssignment) -> Result<Vec<&Identity>> {
        let mut out = Vec::new();
        for identity in &self.identities {
            if !identity.is_satisfied(point)? {
                out.push(identity);
            }
        }
        Ok(out)
    }
}

/// Human-readable listing, one identity per line.
impl fmt::Display for AxiomSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "axioms for {} ({} identities)", self.subset, self.len())?;
        for identity in &self.identities {
            writeln!(f, "  [{:?}] {identity}", identity.kind())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(label: &str) -> Variable {
        Variable::LabelTotal(Label::from(label))
    }

    #[test]
    fn test_residual_is_exact() {
        let identity = Identity::new(AxiomKind::Simplex)
            .add_term(q("a"), 1)
            .add_term(q("b"), 1)
            .add_constant(-10);
        let point: CountAssignment = [(q("a"), 4), (q("b"), 6)].into_iter().collect();
        assert_eq!(identity.residual(&point).unwrap(), 0);

        let point: CountAssignment = [(q("a"), 4), (q("b"), 7)].into_iter().collect();
        assert_eq!(identity.residual(&point).unwrap(), 1);
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        let identity = Identity::new(AxiomKind::Simplex).add_term(q("a"), 1);
        let err = identity.residual(&CountAssignment::new()).unwrap_err();
        assert_eq!(err, AxiomError::UnassignedVariable("Q_a".into()));
    }

    #[test]
    fn test_cancelling_terms_are_dropped() {
        let identity = Identity::new(AxiomKind::Observation)
            .add_term(q("a"), 1)
            .add_term(q("a"), -1);
        assert!(identity.terms().is_empty());
        assert_eq!(identity.to_string(), "0 = 0");
    }

    #[test]
    fn test_identity_display() {
        let identity = Identity::new(AxiomKind::Simplex)
            .add_term(q("a"), 1)
            .add_term(q("b"), 1)
            .add_constant(-10);
        assert_eq!(identity.to_string(), "Q_a + Q_b - 10 = 0");
    }

    #[test]
    fn test_variable_display() {
        let pair = Subset::new([0, 2], 3).unwrap();
        let v = Variable::label_response(&pair, &[Label::from("a"), Label::from("b")], &Label::from("b"));
        assert_eq!(v.to_string(), "R_{a_0,b_2;b}");
    }
}
