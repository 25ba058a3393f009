//! Engine configuration.
//!
//! Every field has a default, so a configuration file only needs the
//! values it changes:
//!
//! ```json
//! { "alarm": { "pairwise": true }, "enumeration": { "max_points": 5000 } }
//! ```

use crate::error::{EngineError, Result};
use algeval_variety::EnumerationBound;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for an [`EvaluationSession`](crate::EvaluationSession).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Limits for every variety walk.
    pub enumeration: EnumerationBound,

    /// Consistency alarm settings.
    pub alarm: AlarmConfig,

    /// Comparison report formatting.
    pub report: ReportConfig,
}

impl EngineConfig {
    /// Parses a JSON configuration.
    ///
    /// # Errors
    ///
    /// `Config` when the text is not a valid configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// `Io` when the file cannot be read, `Config` when it does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Replaces the enumeration bound.
    #[must_use]
    pub fn with_enumeration(mut self, bound: EnumerationBound) -> Self {
        self.enumeration = bound;
        self
    }

    /// Replaces the alarm settings.
    #[must_use]
    pub fn with_alarm(mut self, alarm: AlarmConfig) -> Self {
        self.alarm = alarm;
        self
    }

    /// Replaces the report settings.
    #[must_use]
    pub fn with_report(mut self, report: ReportConfig) -> Self {
        self.report = report;
        self
    }
}

/// Consistency alarm settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Also search each pair's variety after the single-classifier check.
    pub pairwise: bool,

    /// Largest answer-key sweep the alarm will walk.
    pub max_answer_keys: u64,
}

impl AlarmConfig {
    /// Single-classifier checks over at most 100,000 answer keys.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pairwise: false,
            max_answer_keys: 100_000,
        }
    }

    /// Enables or disables the pairwise stage.
    #[must_use]
    pub const fn with_pairwise(mut self, enabled: bool) -> Self {
        self.pairwise = enabled;
        self
    }

    /// Sets the sweep limit.
    #[must_use]
    pub const fn with_max_answer_keys(mut self, limit: u64) -> Self {
        self.max_answer_keys = limit;
        self
    }
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Comparison report formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Decimal places of floating values.
    pub precision: usize,

    /// Print the exact prevalence expression under each branch.
    pub show_exact: bool,
}

impl ReportConfig {
    /// Six decimals, exact expressions shown.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            precision: 6,
            show_exact: true,
        }
    }

    /// Sets the decimal places.
    #[must_use]
    pub const fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Shows or hides exact expressions.
    #[must_use]
    pub const fn with_show_exact(mut self, show: bool) -> Self {
        self.show_exact = show;
        self
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::new()
    }
}
