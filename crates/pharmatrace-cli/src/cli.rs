//! CLI command definitions and argument parsing.

use crate::config::OutputFormat;
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Pharmatrace CLI - Reconstruct and check the provenance of medicine batches.
#[derive(Debug, Parser)]
#[command(name = "pharmatrace")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PHARMATRACE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (verdict only)
    Quiet,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Quiet => OutputFormat::Quiet,
        }
    }
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconstruct and evaluate the provenance of a scanned item
    Lookup(LookupArgs),

    /// Evaluate a local JSON file of records without touching the ledger
    Check(CheckArgs),

    /// Inspect or create the configuration file
    Config(ConfigArgs),
}

/// Options shared by the evaluating commands.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct EvaluationArgs {
    /// Date to treat as "today" (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Skip the heuristic reasoning pass
    #[arg(long)]
    pub no_heuristic: bool,
}

/// Arguments for the lookup command.
#[derive(Debug, Parser)]
pub struct LookupArgs {
    /// Item id as printed on the scanned code
    pub item: String,

    /// Request budget in seconds (overrides the configuration)
    #[arg(short, long)]
    pub deadline: Option<u64>,

    #[command(flatten)]
    pub evaluation: EvaluationArgs,
}

/// Arguments for the check command.
#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// JSON file holding an array of record objects, oldest first
    pub file: PathBuf,

    #[command(flatten)]
    pub evaluation: EvaluationArgs,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lookup() {
        let cli = Cli::parse_from(["pharmatrace", "lookup", "1042", "--deadline", "5"]);
        match cli.command {
            Command::Lookup(args) => {
                assert_eq!(args.item, "1042");
                assert_eq!(args.deadline, Some(5));
                assert!(!args.evaluation.no_heuristic);
            }
            _ => panic!("Expected Lookup command"),
        }
    }

    #[test]
    fn test_parse_check_with_date() {
        let cli = Cli::parse_from([
            "pharmatrace",
            "check",
            "history.json",
            "--date",
            "2024-03-09",
            "--no-heuristic",
        ]);
        match cli.command {
            Command::Check(args) => {
                assert_eq!(args.file, PathBuf::from("history.json"));
                assert_eq!(args.evaluation.date, NaiveDate::from_ymd_opt(2024, 3, 9));
                assert!(args.evaluation.no_heuristic);
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_rejects_bad_date() {
        let result = Cli::try_parse_from(["pharmatrace", "check", "h.json", "--date", "09/03/2024"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "pharmatrace",
            "-vv",
            "--format",
            "json",
            "--no-color",
            "config",
            "init",
            "--force",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format, Some(CliFormat::Json));
        assert!(cli.no_color);
        match cli.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { force },
            }) => assert!(force),
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_lookup_requires_item() {
        assert!(Cli::try_parse_from(["pharmatrace", "lookup"]).is_err());
    }
}
