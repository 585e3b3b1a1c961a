//! Command-line parsing for the FRED -> Postgres loader.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! loading code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fred-etl", version, about = "Load FRED economic series into a Postgres star schema")]
pub struct Cli {
    /// Env file holding FRED_API_KEY and DB_URL (default: FRED.env, then .env).
    #[arg(long, global = true, value_name = "FILE")]
    pub env_file: Option<PathBuf>,

    /// Log level filter used when RUST_LOG is not set (e.g. info, debug, fred_etl=trace).
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Also write logs to a daily-rolling file in this directory.
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the series that can be loaded.
    Series,
    /// Fetch the selected series and load them into the warehouse.
    ///
    /// Without `--series`, an interactive picker lists the catalog.
    Load(LoadArgs),
}

/// Options for a load run.
#[derive(Debug, Args, Clone)]
pub struct LoadArgs {
    /// Series to load, by catalog label or FRED id (repeatable).
    #[arg(short = 's', long = "series", value_name = "LABEL_OR_ID")]
    pub series: Vec<String>,

    /// First observation date (inclusive). Defaults to 1959-01-01.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start: Option<NaiveDate>,

    /// Last observation date (inclusive). Defaults to today.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub end: Option<NaiveDate>,

    /// Load into an in-memory warehouse and report what would be written.
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_load_with_repeated_series() {
        let cli = Cli::parse_from([
            "fred-etl",
            "load",
            "-s",
            "Unemployment Rate",
            "--series",
            "GDP",
            "--start",
            "2000-01-01",
            "--end",
            "2000-12-31",
        ]);
        let Command::Load(args) = cli.command else {
            panic!("expected load");
        };
        assert_eq!(args.series, vec!["Unemployment Rate", "GDP"]);
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2000, 1, 1));
        assert_eq!(args.end, NaiveDate::from_ymd_opt(2000, 12, 31));
        assert!(!args.dry_run);
    }

    #[test]
    fn rejects_malformed_dates() {
        let result = Cli::try_parse_from(["fred-etl", "load", "--start", "01/02/2000"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["fred-etl", "series", "--log-level", "debug"]);
        assert_eq!(cli.log_level, "debug");
        assert!(matches!(cli.command, Command::Series));
    }
}
