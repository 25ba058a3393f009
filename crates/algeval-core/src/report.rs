//! Side-by-side comparison of the independent and majority evaluators.

use crate::config::ReportConfig;
use algeval_evaluators::{Evaluation, ExactReport, ExactValue};
use serde::Serialize;
use std::fmt;

/// Both evaluators on one table.
///
/// The status column is what makes the comparison useful: the independent
/// evaluator can certify its own failure, majority voting never can.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    /// Error-independent closed form
    pub independent: ExactReport,
    /// Majority voting
    pub majority: ExactReport,
    /// Formatting settings
    #[serde(skip)]
    pub config: ReportConfig,
}

impl ComparisonReport {
    /// Pairs two reports with the formatting settings.
    pub fn new(independent: ExactReport, majority: ExactReport, config: ReportConfig) -> Self {
        Self {
            independent,
            majority,
            config,
        }
    }

    /// True when the independent evaluator falsified its own assumption.
    pub fn is_self_alarmed(&self) -> bool {
        self.independent.status.is_falsified()
    }

    fn reports(&self) -> [&ExactReport; 2] {
        [&self.independent, &self.majority]
    }

    fn render(&self, value: &ExactValue) -> String {
        match value {
            ExactValue::Indeterminate => "indeterminate".to_string(),
            _ => value.to_f64().map_or_else(
                || "complex".to_string(),
                |x| format!("{:.*}", self.config.precision, x),
            ),
        }
    }

    fn write_branch(
        &self,
        f: &mut fmt::Formatter<'_>,
        index: usize,
        branch: &Evaluation<ExactValue>,
    ) -> fmt::Result {
        let prevalence: Vec<String> = branch
            .prevalence
            .iter()
            .map(|(l, v)| format!("{l}={}", self.render(v)))
            .collect();
        writeln!(f, "  branch {}: prevalence {}", index + 1, prevalence.join(" "))?;
        if self.config.show_exact {
            for (label, value) in &branch.prevalence {
                if matches!(value, ExactValue::Radical(_)) {
                    writeln!(f, "    exact P_{label} = {value}")?;
                }
            }
        }
        for (i, accuracies) in branch.accuracies.iter().enumerate() {
            let parts: Vec<String> = accuracies
                .iter()
                .map(|(l, v)| format!("{l}={}", self.render(v)))
                .collect();
            writeln!(f, "    classifier {i}: {}", parts.join(" "))?;
        }
        Ok(())
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<12} {:>8}  Status", "Evaluator", "Branches")?;
        for report in self.reports() {
            writeln!(
                f,
                "{:<12} {:>8}  {}",
                report.evaluator,
                report.branches.len(),
                report.status
            )?;
        }
        for report in self.reports() {
            writeln!(f)?;
            writeln!(f, "{}:", report.evaluator)?;
            for (index, branch) in report.branches.iter().enumerate() {
                self.write_branch(f, index, branch)?;
            }
        }
        Ok(())
    }
}
