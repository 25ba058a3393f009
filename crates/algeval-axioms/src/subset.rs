//! Classifier subsets.

use crate::error::{AxiomError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-empty set of classifier indices, kept in ascending order.
///
/// Response patterns over a subset list one label per member in this
/// order, so `{0, 2}` pairs classifier 0's vote with classifier 2's.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Subset(Vec<usize>);

impl Subset {
    /// Validates and sorts a subset of `classifiers` test takers.
    ///
    /// # Errors
    ///
    /// `InvalidSubset` when the subset is empty, larger than N, repeats an
    /// index or names a classifier at or past N.
    pub fn new(indices: impl IntoIterator<Item = usize>, classifiers: usize) -> Result<Self> {
        let requested: Vec<usize> = indices.into_iter().collect();
        let invalid = |reason: String| AxiomError::InvalidSubset {
            indices: requested.clone(),
            classifiers,
            reason,
        };

        if requested.is_empty() {
            return Err(invalid("subset is empty".to_string()));
        }
        if requested.len() > classifiers {
            return Err(invalid(format!(
                "size {} exceeds classifier count",
                requested.len()
            )));
        }
        if let Some(&bad) = requested.iter().find(|&&i| i >= classifiers) {
            return Err(invalid(format!("index {bad} out of range")));
        }

        let mut sorted = requested.clone();
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(invalid("index repeats".to_string()));
        }
        Ok(Self(sorted))
    }

    /// The subset holding a single classifier.
    pub(crate) fn single(index: usize) -> Self {
        Self(vec![index])
    }

    /// Subset size M.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Member indices in ascending order.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Drops the member at `position`; `None` when nothing would remain.
    pub fn without(&self, position: usize) -> Option<Subset> {
        if self.0.len() <= 1 || position >= self.0.len() {
            return None;
        }
        let mut rest = self.0.clone();
        rest.remove(position);
        Some(Subset(rest))
    }

    /// Every non-empty proper subset, smallest first.
    pub fn proper_subsets(&self) -> Vec<Subset> {
        let mut out = Vec::new();
        for size in 1..self.0.len() {
            out.extend(combinations(&self.0, size).into_iter().map(Subset));
        }
        out
    }

    /// Every m-combination of `classifiers` test takers, lexicographic.
    pub fn all_of_size(classifiers: usize, m: usize) -> Vec<Subset> {
        let all: Vec<usize> = (0..classifiers).collect();
        combinations(&all, m).into_iter().map(Subset).collect()
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.0.iter().map(usize::to_string).collect();
        write!(f, "{{{}}}", names.join(","))
    }
}

fn combinations(items: &[usize], k: usize) -> Vec<Vec<usize>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if items.len() < k {
        return Vec::new();
    }
    let mut out = Vec::new();
    for (i, &head) in items.iter().enumerate() {
        for mut tail in combinations(&items[i + 1..], k - 1) {
            tail.insert(0, head);
            out.push(tail);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subset_sorts_indices() {
        let subset = Subset::new([2, 0], 3).unwrap();
        assert_eq!(subset.indices(), &[0, 2]);
        assert_eq!(subset.to_string(), "{0,2}");
    }

    #[test]
    fn test_subset_rejects_out_of_range() {
        let err = Subset::new([0, 3], 3).unwrap_err();
        assert!(err.to_string().contains("index 3 out of range"));
    }

    #[test]
    fn test_subset_rejects_oversize_and_empty() {
        assert!(Subset::new([0, 1, 2], 2).is_err());
        assert!(Subset::new(std::iter::empty(), 2).is_err());
        assert!(Subset::new([1, 1], 3).is_err());
    }

    #[test]
    fn test_proper_subsets_of_trio() {
        let trio = Subset::new([0, 1, 2], 3).unwrap();
        let proper = trio.proper_subsets();
        assert_eq!(proper.len(), 6);
        assert_eq!(proper[0].indices(), &[0]);
        assert_eq!(proper[3].indices(), &[0, 1]);
    }

    #[test]
    fn test_without_position() {
        let pair = Subset::new([1, 4], 5).unwrap();
        assert_eq!(pair.without(0).unwrap().indices(), &[4]);
        assert!(Subset::single(1).without(0).is_none());
    }

    #[test]
    fn test_all_of_size() {
        assert_eq!(Subset::all_of_size(4, 2).len(), 6);
        assert!(Subset::all_of_size(2, 3).is_empty());
    }
}
