//! # scaudit CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scaudit_cli::audit::{run_audit, RunArgs};
use scaudit_cli::discover::{run_discover, DiscoverArgs};
use scaudit_cli::score::{run_score, ScoreArgs};

/// Supply chain ESG audits with human-in-the-loop review.
#[derive(Parser, Debug)]
#[command(name = "scaudit", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML audit configuration (scoring weights, thresholds).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Audit a company's suppliers.
    Run(RunArgs),

    /// Score one supplier from raw inputs.
    Score(ScoreArgs),

    /// List a company's suppliers.
    Discover(DiscoverArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Logs go to stderr; stdout carries the event stream and results.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Run(args) => run_audit(args, config),
        Commands::Score(args) => run_score(args, config),
        Commands::Discover(args) => run_discover(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
