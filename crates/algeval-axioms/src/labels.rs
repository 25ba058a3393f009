//! Response labels and joint response patterns.

use crate::error::{AxiomError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A nominal response category.
///
/// Labels carry no numeric meaning; two labels are either equal or not.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Creates a label from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Label {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A joint response pattern: one label per classifier of a subset,
/// in ascending classifier order.
pub type Pattern = Vec<Label>;

/// Ordered set of R >= 2 distinct labels, fixed for one evaluation session.
///
/// # Example
///
/// ```rust
/// use algeval_axioms::LabelSet;
///
/// let labels = LabelSet::new(["a", "b"])?;
/// assert_eq!(labels.len(), 2);
/// assert_eq!(labels.patterns(2).len(), 4);
/// # Ok::<(), algeval_axioms::AxiomError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Label>", into = "Vec<Label>")]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    /// Creates a label set, keeping the given order.
    ///
    /// # Errors
    ///
    /// `InvalidLabels` when fewer than two labels are given or one repeats.
    pub fn new<I, L>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        let labels: Vec<Label> = labels.into_iter().map(Into::into).collect();
        if labels.len() < 2 {
            return Err(AxiomError::InvalidLabels(format!(
                "need at least 2 labels, got {}",
                labels.len()
            )));
        }
        let mut seen = HashSet::new();
        for label in &labels {
            if !seen.insert(label) {
                return Err(AxiomError::InvalidLabels(format!("label '{label}' repeats")));
            }
        }
        Ok(Self { labels })
    }

    /// The binary label set `{a, b}` used by most worked examples.
    pub fn binary() -> Self {
        Self {
            labels: vec![Label::from("a"), Label::from("b")],
        }
    }

    /// Number of labels R.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a constructed set; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterates labels in set order.
    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    /// Label at a position in set order.
    pub fn get(&self, index: usize) -> Option<&Label> {
        self.labels.get(index)
    }

    /// Position of a label in set order.
    pub fn index_of(&self, label: &Label) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// True when the label belongs to the set.
    pub fn contains(&self, label: &Label) -> bool {
        self.index_of(label).is_some()
    }

    /// Resolves a label, failing with `UnknownLabel` when absent.
    pub fn require(&self, label: &Label) -> Result<usize> {
        self.index_of(label)
            .ok_or_else(|| AxiomError::UnknownLabel(label.to_string()))
    }

    /// All R^m response patterns, lexicographic in set order.
    ///
    /// The first position varies slowest, so for `{a, b}` and m = 2 the
    /// order is `(a,a), (a,b), (b,a), (b,b)`.
    pub fn patterns(&self, m: usize) -> Vec<Pattern> {
        let mut patterns: Vec<Pattern> = vec![Vec::new()];
        for _ in 0..m {
            patterns = patterns
                .into_iter()
                .flat_map(|prefix| {
                    self.labels.iter().map(move |label| {
                        let mut next = prefix.clone();
                        next.push(label.clone());
                        next
                    })
                })
                .collect();
        }
        patterns
    }
}

impl TryFrom<Vec<Label>> for LabelSet {
    type Error = AxiomError;

    fn try_from(labels: Vec<Label>) -> Result<Self> {
        Self::new(labels)
    }
}

impl From<LabelSet> for Vec<Label> {
    fn from(set: LabelSet) -> Self {
        set.labels
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.labels.iter().map(Label::as_str).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// Formats a pattern as `(a,b,a)`.
pub fn format_pattern(pattern: &[Label]) -> String {
    let names: Vec<&str> = pattern.iter().map(Label::as_str).collect();
    format!("({})", names.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_set_rejects_single_label() {
        let err = LabelSet::new(["a"]).unwrap_err();
        assert!(matches!(err, AxiomError::InvalidLabels(_)));
    }

    #[test]
    fn test_label_set_rejects_duplicates() {
        let err = LabelSet::new(["a", "b", "a"]).unwrap_err();
        assert!(err.to_string().contains("repeats"));
    }

    #[test]
    fn test_patterns_lexicographic() {
        let labels = LabelSet::new(["a", "b", "c"]).unwrap();
        let patterns = labels.patterns(2);
        assert_eq!(patterns.len(), 9);
        assert_eq!(format_pattern(&patterns[0]), "(a,a)");
        assert_eq!(format_pattern(&patterns[1]), "(a,b)");
        assert_eq!(format_pattern(&patterns[8]), "(c,c)");
    }

    #[test]
    fn test_patterns_of_length_zero() {
        let labels = LabelSet::binary();
        assert_eq!(labels.patterns(0), vec![Vec::<Label>::new()]);
    }

    #[test]
    fn test_require_unknown_label() {
        let labels = LabelSet::binary();
        let err = labels.require(&Label::from("z")).unwrap_err();
        assert_eq!(err, AxiomError::UnknownLabel("z".into()));
    }

    #[test]
    fn test_label_set_serde_validates() {
        let parsed: LabelSet = serde_json::from_str(r#"["x","y"]"#).unwrap();
        assert_eq!(parsed.get(1), Some(&Label::from("y")));
        assert!(serde_json::from_str::<LabelSet>(r#"["x","x"]"#).is_err());
    }
}
