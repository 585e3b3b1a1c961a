//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - reads configuration (before anything else happens)
//! - collects the series selection (flags or interactive picker)
//! - validates the request, opens the warehouse and runs the batch
//! - prints the per-series report

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::info;

use crate::cli::{Command, LoadArgs};
use crate::config::{DEFAULT_TIMEOUT, Settings};
use crate::data::{Catalog, FredClient};
use crate::error::AppError;
use crate::warehouse::{MemoryWarehouse, PgWarehouse};

pub mod pipeline;

use pipeline::BatchRequest;

/// First observation date offered when `--start` is omitted.
pub const DEFAULT_START: (i32, u32, u32) = (1959, 1, 1);

/// Exit code for a batch where at least one series failed.
const PARTIAL_FAILURE_EXIT: u8 = 3;

/// Entry point for the `fred-etl` binary.
pub fn run() -> Result<(), AppError> {
    // We want plain `fred-etl` and `fred-etl -s GDP` to behave like `fred-etl load ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let _log_guard = crate::logging::init(&cli.log_level, cli.log_dir.as_deref())?;

    match cli.command {
        Command::Series => handle_series(),
        Command::Load(args) => handle_load(args, cli.env_file.as_deref()),
    }
}

fn handle_series() -> Result<(), AppError> {
    print!("{}", crate::report::format_catalog(Catalog::builtin()));
    Ok(())
}

fn handle_load(args: LoadArgs, env_file: Option<&std::path::Path>) -> Result<(), AppError> {
    // Missing credentials stop the run before the picker or any I/O.
    let settings = Settings::from_env(env_file)?;
    let catalog = Catalog::builtin();

    let selections = if args.series.is_empty() {
        crate::cli::picker::prompt_for_series(catalog)?
    } else {
        args.series.clone()
    };

    let request = BatchRequest {
        selections,
        start: Some(args.start.unwrap_or_else(default_start)),
        end: Some(args.end.unwrap_or_else(|| Local::now().date_naive())),
    };
    let plan = pipeline::validate(&request)?;

    let client = FredClient::new(&settings)?;
    let report = if args.dry_run {
        let mut warehouse = MemoryWarehouse::new();
        let report = pipeline::run_plan(&plan, catalog, &client, &mut warehouse);
        print!("{}", crate::report::format_dry_run_summary(&warehouse));
        report
    } else {
        let mut warehouse = PgWarehouse::connect(&settings.database_url, DEFAULT_TIMEOUT)
            .map_err(crate::error::EtlError::from)?;
        info!("warehouse connection established");
        pipeline::run_plan(&plan, catalog, &client, &mut warehouse)
    };

    print!("{}", crate::report::format_batch_report(&report));

    let failed = report.failed().count();
    if failed > 0 {
        return Err(AppError::new(
            PARTIAL_FAILURE_EXIT,
            format!("{failed} of {} series failed to load.", report.outcomes.len()),
        ));
    }
    Ok(())
}

fn default_start() -> NaiveDate {
    let (y, m, d) = DEFAULT_START;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

/// Rewrite argv so `fred-etl` defaults to `fred-etl load`.
///
/// Rules:
/// - `fred-etl`                      -> `fred-etl load`
/// - `fred-etl -s GDP ...`           -> `fred-etl load -s GDP ...`
/// - `fred-etl --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("load".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "load" | "series");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "load flags".
    if arg1.starts_with('-') {
        argv.insert(1, "load".to_string());
        return argv;
    }

    argv
}
