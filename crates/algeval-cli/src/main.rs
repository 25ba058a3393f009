//! algeval CLI - algebraic evaluation of classifier ensembles on unlabeled tests

use algeval_core::{
    samples, AlarmReport, AlarmVerdict, ComparisonReport, EngineConfig, EvaluationSession,
    SafetySpecification, VoteCountTable,
};
use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "algeval")]
#[command(about = "Evaluate classifiers on unlabeled data and alarm on unsafe ensembles")]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Compare the independent and majority evaluators on a vote-count table
    Evaluate {
        /// Vote-count table (JSON)
        #[arg(short, long)]
        table: PathBuf,
        /// Print JSON instead of the text report
        #[arg(long)]
        json: bool,
    },
    /// Check a safety specification against every consistent evaluation
    ///
    /// Exits 0 when safe, 2 when alarmed and 3 when inconclusive.
    Alarm {
        /// Vote-count table (JSON)
        #[arg(short, long)]
        table: PathBuf,
        /// Safety specification (JSON), e.g. {"labels": {"a": "0.8"}}
        #[arg(short, long)]
        spec: PathBuf,
        /// Also apply pair axioms
        #[arg(long)]
        pairwise: bool,
        /// Print JSON instead of the text report
        #[arg(long)]
        json: bool,
    },
    /// Compare evaluators on a bundled dataset
    Sample {
        /// Dataset
        #[arg(value_enum)]
        dataset: Sample,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Sample {
    /// UCI Adult income trio, 36,842 items
    Uci,
    /// Online consumer raters, 200 items
    Online,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Evaluate { table, json } => {
            let report = evaluate(&read_table(&table)?, config)?;
            print_report(&report, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Alarm {
            table,
            spec,
            pairwise,
            json,
        } => {
            let report = alarm(&read_table(&table)?, read_spec(&spec)?, config, pairwise)?;
            print_report(&report, json)?;
            Ok(ExitCode::from(exit_status(&report.verdict)))
        }
        Commands::Sample { dataset } => {
            let table = match dataset {
                Sample::Uci => samples::uci_adult_observed(),
                Sample::Online => samples::online_consumer_observed(),
            };
            println!("{}", evaluate(&table, config)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            EngineConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))
        }
        None => Ok(EngineConfig::default()),
    }
}

fn read_table(path: &Path) -> anyhow::Result<VoteCountTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read table {}", path.display()))?;
    VoteCountTable::from_json_str(&text)
        .with_context(|| format!("invalid vote-count table {}", path.display()))
}

fn read_spec(path: &Path) -> anyhow::Result<SafetySpecification> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read specification {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("invalid safety specification {}", path.display()))
}

fn evaluate(table: &VoteCountTable, config: EngineConfig) -> anyhow::Result<ComparisonReport> {
    let session = EvaluationSession::for_table(table, config)?;
    Ok(session.compare(table)?)
}

fn alarm(
    table: &VoteCountTable,
    spec: SafetySpecification,
    mut config: EngineConfig,
    pairwise: bool,
) -> anyhow::Result<AlarmReport> {
    config.alarm.pairwise |= pairwise;
    let session = EvaluationSession::for_table(table, config)?;
    Ok(session.alarm(table, spec)?)
}

fn print_report<R>(report: &R, json: bool) -> anyhow::Result<()>
where
    R: serde::Serialize + std::fmt::Display,
{
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn exit_status(verdict: &AlarmVerdict) -> u8 {
    match verdict {
        AlarmVerdict::Safe { .. } => 0,
        AlarmVerdict::Alarmed { .. } => 2,
        AlarmVerdict::Inconclusive { .. } => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    const PAIR_TABLE: &str = r#"{
        "labels": ["a", "b"],
        "counts": [
            {"pattern": ["a", "b"], "count": 1},
            {"pattern": ["b", "a"], "count": 1}
        ]
    }"#;

    #[test]
    fn test_cli_parses_alarm() {
        let cli = Cli::try_parse_from([
            "algeval", "alarm", "--table", "t.json", "--spec", "s.json", "--pairwise",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Alarm { pairwise: true, json: false, .. }
        ));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_parses_sample() {
        let cli = Cli::try_parse_from(["algeval", "sample", "online", "--config", "c.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Sample { dataset: Sample::Online }));
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
        assert!(Cli::try_parse_from(["algeval", "sample", "iris"]).is_err());
    }

    #[test]
    fn test_alarm_from_files() {
        let dir = TempDir::new().unwrap();
        let table = read_table(&write(&dir, "table.json", PAIR_TABLE)).unwrap();
        let spec = read_spec(&write(&dir, "spec.json", r#"{"labels": {"a": "1/2", "b": "1/2"}}"#))
            .unwrap();

        let single = alarm(&table, spec.clone(), EngineConfig::default(), false).unwrap();
        assert!(single.verdict.is_safe());
        assert_eq!(exit_status(&single.verdict), 0);

        let paired = alarm(&table, spec, EngineConfig::default(), true).unwrap();
        assert!(paired.verdict.is_alarmed());
        assert_eq!(exit_status(&paired.verdict), 2);
    }

    #[test]
    fn test_config_file_enables_pairwise() {
        let dir = TempDir::new().unwrap();
        let config = load_config(Some(&write(&dir, "config.json", r#"{"alarm": {"pairwise": true}}"#)))
            .unwrap();
        let table = read_table(&write(&dir, "table.json", PAIR_TABLE)).unwrap();
        let spec = SafetySpecification::grade(algeval_core::parse_threshold("1/2").unwrap()).unwrap();
        let report = alarm(&table, spec, config, false).unwrap();
        assert!(report.pairwise);
    }

    #[test]
    fn test_bad_inputs_name_the_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "table.json", r#"{"labels": ["a", "b"], "counts": []}"#);
        let err = read_table(&path).unwrap_err();
        assert!(err.to_string().contains("invalid vote-count table"));

        let err = read_spec(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read specification"));
    }

    #[test]
    fn test_evaluate_sample() {
        let report = evaluate(&samples::uci_adult_observed(), EngineConfig::default()).unwrap();
        assert!(report.is_self_alarmed());
    }
}
