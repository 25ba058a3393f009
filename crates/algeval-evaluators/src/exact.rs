//! Exact values: rationals, rationals with one square root, and the
//! indeterminate 0/0.
//!
//! Whether a square root simplifies is a narrow integer question: the
//! reduced radicand must have a perfect-square numerator and denominator.
//! No general simplifier is involved.

use num::{BigInt, BigRational, Signed, ToPrimitive, Zero};
use serde::{Serialize, Serializer};
use std::fmt;

/// An exact evaluation value.
#[derive(Debug, Clone)]
pub enum ExactValue {
    /// A ratio of integers.
    Rational(BigRational),
    /// A rational plus an irrational root term, built by [`ExactValue::radical`].
    Radical(RadicalTerm),
    /// No items to measure, e.g. accuracy on a label nobody carries.
    Indeterminate,
}

impl ExactValue {
    /// `numerator / denominator`, indeterminate when the denominator is zero.
    pub fn ratio(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            return Self::Indeterminate;
        }
        Self::Rational(BigRational::new(
            BigInt::from(numerator),
            BigInt::from(denominator),
        ))
    }

    /// Builds `rational + coefficient * sqrt(radicand)`, collapsing to a
    /// rational whenever the root does.
    pub fn radical(rational: BigRational, coefficient: BigRational, radicand: BigRational) -> Self {
        if coefficient.is_zero() || radicand.is_zero() {
            return Self::Rational(rational);
        }
        if let Some(root) = rational_sqrt(&radicand) {
            return Self::Rational(rational + coefficient * root);
        }
        Self::Radical(RadicalTerm {
            rational,
            coefficient,
            radicand,
        })
    }

    /// True for plain rationals.
    pub fn is_rational(&self) -> bool {
        matches!(self, Self::Rational(_))
    }

    /// False for complex radicals and for indeterminate values.
    pub fn is_real(&self) -> bool {
        match self {
            Self::Rational(_) => true,
            Self::Radical(term) => !term.radicand.is_negative(),
            Self::Indeterminate => false,
        }
    }

    /// Radicand of an irrational value.
    pub fn radicand(&self) -> Option<&BigRational> {
        match self {
            Self::Radical(term) => Some(&term.radicand),
            _ => None,
        }
    }

    /// Nearest float, `None` for complex or indeterminate values.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Rational(r) => r.to_f64(),
            Self::Radical(term) => term.to_f64(),
            Self::Indeterminate => None,
        }
    }
}

/// `rational + coefficient * sqrt(radicand)` with a nonzero coefficient and a
/// radicand that is not a rational square.
///
/// A negative radicand makes the value complex.
#[derive(Debug, Clone)]
pub struct RadicalTerm {
    rational: BigRational,
    coefficient: BigRational,
    radicand: BigRational,
}

impl RadicalTerm {
    /// Rational part.
    pub fn rational(&self) -> &BigRational {
        &self.rational
    }

    /// Multiplier of the root.
    pub fn coefficient(&self) -> &BigRational {
        &self.coefficient
    }

    /// Number under the root.
    pub fn radicand(&self) -> &BigRational {
        &self.radicand
    }

    fn to_f64(&self) -> Option<f64> {
        if self.radicand.is_negative() {
            return None;
        }
        let root = self.radicand.to_f64()?.sqrt();
        Some(self.rational.to_f64()? + self.coefficient.to_f64()? * root)
    }
}

impl From<BigRational> for ExactValue {
    fn from(value: BigRational) -> Self {
        Self::Rational(value)
    }
}

/// Equality of the represented numbers.
///
/// Two radicals are equal when their rational parts match and their root
/// terms square to the same signed value.
impl PartialEq for ExactValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Rational(a), Self::Rational(b)) => a == b,
            (Self::Radical(a), Self::Radical(b)) => {
                a.rational == b.rational
                    && a.coefficient.is_positive() == b.coefficient.is_positive()
                    && a.radicand.is_negative() == b.radicand.is_negative()
                    && &a.coefficient * &a.coefficient * &a.radicand
                        == &b.coefficient * &b.coefficient * &b.radicand
            }
            (Self::Indeterminate, Self::Indeterminate) => true,
            _ => false,
        }
    }
}

impl Eq for ExactValue {}

impl fmt::Display for ExactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rational(r) => write!(f, "{r}"),
            Self::Radical(RadicalTerm {
                rational,
                coefficient,
                radicand,
            }) => {
                let magnitude = coefficient.abs();
                let root = if magnitude == BigRational::from_integer(BigInt::from(1)) {
                    format!("sqrt({radicand})")
                } else {
                    format!("{magnitude}*sqrt({radicand})")
                };
                match (rational.is_zero(), coefficient.is_negative()) {
                    (true, false) => write!(f, "{root}"),
                    (true, true) => write!(f, "-{root}"),
                    (false, false) => write!(f, "{rational} + {root}"),
                    (false, true) => write!(f, "{rational} - {root}"),
                }
            }
            Self::Indeterminate => write!(f, "indeterminate"),
        }
    }
}

impl Serialize for ExactValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Square root of a rational when it is itself rational.
pub fn rational_sqrt(value: &BigRational) -> Option<BigRational> {
    if value.is_negative() {
        return None;
    }
    let numer = value.numer();
    let denom = value.denom();
    let n = numer.sqrt();
    let d = denom.sqrt();
    (&n * &n == *numer && &d * &d == *denom).then(|| BigRational::new(n, d))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_rational_sqrt() {
        assert_eq!(rational_sqrt(&q(576, 9_765_625)), Some(q(24, 3125)));
        assert_eq!(rational_sqrt(&q(2, 1)), None);
        assert_eq!(rational_sqrt(&q(4, 3)), None);
        assert_eq!(rational_sqrt(&q(-4, 9)), None);
        assert_eq!(rational_sqrt(&q(0, 1)), Some(q(0, 1)));
    }

    #[test]
    fn test_radical_collapses_perfect_squares() {
        let v = ExactValue::radical(q(1, 2), q(1, 3), q(9, 4));
        assert_eq!(v, ExactValue::Rational(q(1, 1)));
        assert!(v.is_rational());

        let v = ExactValue::radical(q(1, 2), q(0, 1), q(2, 1));
        assert_eq!(v, ExactValue::Rational(q(1, 2)));
    }

    #[test]
    fn test_radical_term_is_canonical() {
        let ExactValue::Radical(term) = ExactValue::radical(q(1, 4), q(-1, 2), q(8, 3)) else {
            panic!("sqrt(8/3) is irrational");
        };
        assert_eq!(term.rational(), &q(1, 4));
        assert_eq!(term.coefficient(), &q(-1, 2));
        assert_eq!(term.radicand(), &q(8, 3));
        assert!(rational_sqrt(term.radicand()).is_none());

        // a perfect-square radicand never reaches the radical variant
        assert!(ExactValue::radical(q(1, 4), q(-1, 2), q(16, 9)).is_rational());
    }

    #[test]
    fn test_radical_equality_is_numeric() {
        // 1 + 2*sqrt(2) == 1 + sqrt(8)
        let a = ExactValue::radical(q(1, 1), q(2, 1), q(2, 1));
        let b = ExactValue::radical(q(1, 1), q(1, 1), q(8, 1));
        assert_eq!(a, b);
        let c = ExactValue::radical(q(1, 1), q(-1, 1), q(8, 1));
        assert_ne!(a, c);
    }

    #[test]
    fn test_to_f64() {
        let v = ExactValue::radical(q(1, 2), q(1, 2), q(2, 1));
        let expected = 0.5 + 0.5 * 2f64.sqrt();
        assert!((v.to_f64().unwrap() - expected).abs() < 1e-12);
        assert!(ExactValue::radical(q(0, 1), q(1, 1), q(-2, 1)).to_f64().is_none());
        assert!(ExactValue::Indeterminate.to_f64().is_none());
    }

    #[test]
    fn test_real_and_ratio() {
        assert!(!ExactValue::radical(q(0, 1), q(1, 1), q(-3, 1)).is_real());
        assert!(ExactValue::radical(q(0, 1), q(1, 1), q(3, 1)).is_real());
        assert_eq!(ExactValue::ratio(3, 0), ExactValue::Indeterminate);
        assert_eq!(ExactValue::ratio(2, 4), ExactValue::Rational(q(1, 2)));
    }

    #[test]
    fn test_display() {
        assert_eq!(ExactValue::ratio(7979, 36842).to_string(), "7979/36842");
        assert_eq!(
            ExactValue::radical(q(1, 2), q(-3, 4), q(5, 1)).to_string(),
            "1/2 - 3/4*sqrt(5)"
        );
        assert_eq!(
            ExactValue::radical(q(0, 1), q(1, 1), q(2, 1)).to_string(),
            "sqrt(2)"
        );
        assert_eq!(ExactValue::Indeterminate.to_string(), "indeterminate");
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&ExactValue::ratio(1, 3)).unwrap();
        assert_eq!(json, "\"1/3\"");
    }
}
