//! # valtab CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use valtab_cli::discover::{run_discover, DiscoverArgs};
use valtab_cli::extract::{run_extract, ExtractArgs};
use valtab_cli::run::{run_once, run_watch, RunArgs, WatchArgs};
use valtab_cli::validate::{run_validate, ValidateArgs};

/// Statutory valuation table toolchain.
///
/// Discovers, extracts, and validates published valuation tables, and runs
/// the scheduled update cycle.
#[derive(Parser, Debug)]
#[command(name = "valtab", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Pipeline configuration file (YAML).
    #[arg(long, global = true, env = "VALTAB_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List candidate and primary sources in a saved index page.
    Discover(DiscoverArgs),

    /// Extract one record kind from a saved document.
    Extract(ExtractArgs),

    /// Validate a JSON array of records.
    Validate(ValidateArgs),

    /// Run one update cycle.
    Run(RunArgs),

    /// Run update cycles on a fixed interval until interrupted.
    Watch(WatchArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "valtab CLI starting");

    let config = match valtab_cli::load_pipeline(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };

    let result = match cli.command {
        Commands::Discover(args) => run_discover(&args, &config),
        Commands::Extract(args) => run_extract(&args, &config),
        Commands::Validate(args) => run_validate(&args),
        Commands::Run(args) => run_once(&args, config),
        Commands::Watch(args) => run_watch(&args, config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
