//! Named sample datasets.
//!
//! Each function returns a fresh value so tests and demos never share
//! state through a bundled table.

use crate::labels::{Label, LabelSet, Pattern};
use crate::table::{LabeledVoteCounts, VoteCountTable};
use std::collections::BTreeMap;

/// Three classifiers on the UCI Adult income task, split by true label.
///
/// 36,842 items; label `a` is the minority class (5,687 items).
pub fn uci_adult_labeled() -> LabeledVoteCounts {
    let a = [
        ("aaa", 715), ("aab", 161), ("aba", 2406), ("abb", 455),
        ("baa", 290), ("bab", 94), ("bba", 1335), ("bbb", 231),
    ];
    let b = [
        ("aaa", 271), ("aab", 469), ("aba", 3395), ("abb", 7517),
        ("baa", 272), ("bab", 399), ("bba", 6377), ("bbb", 12455),
    ];
    let mut counts = BTreeMap::new();
    counts.insert(Label::from("a"), patterns(&a));
    counts.insert(Label::from("b"), patterns(&b));
    LabeledVoteCounts::from_parts(LabelSet::binary(), 3, counts)
}

/// The observable side of [`uci_adult_labeled`].
pub fn uci_adult_observed() -> VoteCountTable {
    uci_adult_labeled().project()
}

/// Three raters on an online-consumer benchmark, 200 items.
pub fn online_consumer_observed() -> VoteCountTable {
    observed(&[
        ("aaa", 31), ("aab", 8), ("aba", 27), ("abb", 52),
        ("baa", 1), ("bab", 1), ("bba", 8), ("bbb", 72),
    ])
}

/// A trio whose errors are exactly independent, 625 items.
///
/// Generated from prevalence `P_a = 2/5` and label accuracies
/// `(3/5, 4/5)`, `(4/5, 3/5)`, `(3/5, 3/5)`.
pub fn independent_trio_observed() -> VoteCountTable {
    observed(&[
        ("aaa", 84), ("aab", 66), ("aba", 36), ("abb", 39),
        ("baa", 96), ("bab", 104), ("bba", 84), ("bbb", 116),
    ])
}

fn observed(rows: &[(&str, u64)]) -> VoteCountTable {
    VoteCountTable::from_parts(LabelSet::binary(), 3, patterns(rows))
}

fn patterns(rows: &[(&str, u64)]) -> BTreeMap<Pattern, u64> {
    rows.iter()
        .map(|(p, n)| (p.chars().map(|c| Label::new(c.to_string())).collect(), *n))
        .collect()
}
