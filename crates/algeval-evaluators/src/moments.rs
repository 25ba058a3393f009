//! Vote-frequency moments of a classifier trio.
//!
//! Generic over [`num::Num`] so the closed form can run once in exact
//! rationals and once, independently, in `f64`.

use algeval_axioms::{Label, VoteCountTable};
use num::Num;

/// Pairs in moment order: (0,1), (0,2), (1,2).
pub const PAIRS: [(usize, usize); 3] = [(0, 1), (0, 2), (1, 2)];

/// Moments of the second-label votes of three classifiers.
///
/// With `f_i` the share of items where classifier i voted the second
/// label and `f_ij`, `f_012` the shares where the pair or the whole trio
/// did:
///
/// ```text
/// Delta_ij = f_ij - f_i f_j
/// mu3      = f_012 - f_0 f_1 f_2 - (f_0 Delta_12 + f_1 Delta_02 + f_2 Delta_01)
/// K        = mu3^2 + 4 Delta_01 Delta_02 Delta_12
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TrioMoments<T> {
    /// `f_i` per classifier
    pub frequencies: [T; 3],
    /// `Delta_ij` in [`PAIRS`] order
    pub pair_moments: [T; 3],
    /// `mu3`
    pub trio_moment: T,
}

impl<T: Num + Clone> TrioMoments<T> {
    /// Computes the moments from a three-classifier table.
    ///
    /// `share(n, q)` turns a count into a frequency in `T`.
    pub fn from_table<F>(table: &VoteCountTable, beta: &Label, share: F) -> Self
    where
        F: Fn(u64, u64) -> T,
    {
        let q = table.test_size();
        let votes = |members: &[usize]| -> T {
            let n = table
                .observed()
                .filter(|(pattern, _)| members.iter().all(|&i| pattern[i] == *beta))
                .map(|(_, n)| n)
                .sum();
            share(n, q)
        };

        let frequencies = [votes(&[0]), votes(&[1]), votes(&[2])];
        let pair_moments = PAIRS.map(|(i, j)| {
            votes(&[i, j]) - frequencies[i].clone() * frequencies[j].clone()
        });
        let [f0, f1, f2] = frequencies.clone();
        let [d01, d02, d12] = pair_moments.clone();
        let trio_moment = votes(&[0, 1, 2])
            - f0.clone() * f1.clone() * f2.clone()
            - (f0 * d12 + f1 * d02 + f2 * d01);

        Self {
            frequencies,
            pair_moments,
            trio_moment,
        }
    }

    /// `Delta_01 Delta_02 Delta_12`.
    pub fn pair_product(&self) -> T {
        let [d01, d02, d12] = self.pair_moments.clone();
        d01 * d02 * d12
    }

    /// The shared radicand `K = mu3^2 + 4 Delta_01 Delta_02 Delta_12`.
    pub fn radicand(&self) -> T {
        let four = T::one() + T::one() + T::one() + T::one();
        self.trio_moment.clone() * self.trio_moment.clone() + four * self.pair_product()
    }

    /// `Delta` of the pair that leaves classifier `i` out.
    pub fn opposite_pair(&self, i: usize) -> &T {
        &self.pair_moments[2 - i]
    }

    /// True when some pair moment is zero.
    pub fn has_uncorrelated_pair(&self) -> bool {
        self.pair_moments.iter().any(T::is_zero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algeval_axioms::samples;
    use num::{BigInt, BigRational};

    fn exact(n: u64, q: u64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(q))
    }

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_independent_trio_moments() {
        let table = samples::independent_trio_observed();
        let m = TrioMoments::from_table(&table, &Label::from("b"), exact);
        assert_eq!(m.trio_moment, q(-24, 15625));
        assert_eq!(m.pair_product(), q(3456, 244_140_625));
        assert_eq!(m.radicand(), q(576, 9_765_625));
    }

    #[test]
    fn test_opposite_pair() {
        let table = samples::independent_trio_observed();
        let m = TrioMoments::from_table(&table, &Label::from("b"), exact);
        assert_eq!(m.opposite_pair(0), &m.pair_moments[2]);
        assert_eq!(m.opposite_pair(2), &m.pair_moments[0]);
        assert!(!m.has_uncorrelated_pair());
    }

    #[test]
    fn test_float_moments_track_exact() {
        let table = samples::uci_adult_observed();
        let b = Label::from("b");
        let exact_m = TrioMoments::from_table(&table, &b, exact);
        let float_m = TrioMoments::from_table(&table, &b, |n, q| n as f64 / q as f64);
        let k = num::ToPrimitive::to_f64(&exact_m.radicand()).unwrap();
        assert!((float_m.radicand() - k).abs() < 1e-15);
    }
}
