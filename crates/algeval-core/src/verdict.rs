//! Verdict types for consistency alarm results.

use algeval_axioms::AnswerKey;
use serde::{Deserialize, Serialize};

/// The final verdict of a consistency alarm.
///
/// The alarm returns one of three verdicts:
/// - `Safe`: some logically consistent evaluation meets the requirement
/// - `Alarmed`: no consistent evaluation does, at any answer key checked
/// - `Inconclusive`: the check could not be completed
///
/// `Inconclusive` is never folded into `Safe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmVerdict {
    /// At least one answer key admits an aligned evaluation.
    Safe {
        /// First aligned key of the sweep
        witness: AnswerKey,
    },

    /// Every answer key forces some classifier below the requirement.
    Alarmed {
        /// Number of keys checked
        keys: usize,
    },

    /// The variety could not be characterized within the configured bounds.
    Inconclusive {
        /// What stopped the check.
        reason: InconclusiveReason,
    },
}

impl AlarmVerdict {
    /// Create a Safe verdict.
    pub fn safe(witness: AnswerKey) -> Self {
        Self::Safe { witness }
    }

    /// Create an Alarmed verdict.
    pub fn alarmed(keys: usize) -> Self {
        Self::Alarmed { keys }
    }

    /// Create an Inconclusive verdict.
    pub fn inconclusive(reason: InconclusiveReason) -> Self {
        Self::Inconclusive { reason }
    }

    /// Returns true if this is a Safe verdict.
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe { .. })
    }

    /// Returns true if this is an Alarmed verdict.
    pub fn is_alarmed(&self) -> bool {
        matches!(self, Self::Alarmed { .. })
    }

    /// Returns true if the check did not finish.
    pub fn is_inconclusive(&self) -> bool {
        matches!(self, Self::Inconclusive { .. })
    }
}

impl std::fmt::Display for AlarmVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Safe { witness } => write!(f, "SAFE: aligned evaluation exists at {}", witness),
            Self::Alarmed { keys } => {
                write!(f, "ALARM: specification violated at all {} answer keys", keys)
            }
            Self::Inconclusive { reason } => write!(f, "INCONCLUSIVE: {}", reason),
        }
    }
}

/// Why an alarm could not reach a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InconclusiveReason {
    /// The answer-key sweep is larger than allowed.
    SweepTooLarge {
        /// Keys in the sweep, `None` when not representable
        keys: Option<u128>,
        /// Configured limit
        limit: u64,
    },

    /// Some keys hit the enumeration bound and none was aligned.
    BoundReached {
        /// Keys left unknown
        unknown_keys: usize,
        /// Keys proven misaligned
        misaligned_keys: usize,
    },
}

impl std::fmt::Display for InconclusiveReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SweepTooLarge { keys: Some(keys), limit } => {
                write!(f, "{} answer keys exceed the limit of {}", keys, limit)
            }
            Self::SweepTooLarge { keys: None, limit } => {
                write!(f, "answer-key sweep overflows the limit of {}", limit)
            }
            Self::BoundReached {
                unknown_keys,
                misaligned_keys,
            } => write!(
                f,
                "{} answer keys hit the enumeration bound, {} misaligned",
                unknown_keys, misaligned_keys
            ),
        }
    }
}
