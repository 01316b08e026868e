//! Consolidator command line front-end.
//!
//! Reads a consolidation group and per-entity trial balances from JSON
//! files and writes the consolidated result to stdout.

mod commands;
mod provider;

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use consolidator_shared::{AppConfig, AppError};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{GenerateArgs, Outcome, SuggestArgs};

#[derive(Parser)]
#[command(name = "consolidate")]
#[command(version, about = "Multi-entity financial consolidation", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a consolidated trial balance for a group
    Generate(GenerateArgs),

    /// Suggest inter-company eliminations from related-party balances
    Suggest(SuggestArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => return Ok(report(&AppError::from(e))),
    };

    init_tracing(&config, cli.verbose);
    info!(
        balance_tolerance = %config.consolidation.balance_tolerance,
        fetch_timeout_secs = config.consolidation.fetch_timeout_secs,
        "Configuration loaded"
    );

    let result = match cli.command {
        Command::Generate(args) => commands::run_generate(args, config.consolidation).await,
        Command::Suggest(args) => commands::run_suggest(args, config.consolidation).await,
    };

    match result {
        Ok(Outcome { json, error }) => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
            stdout.flush()?;
            Ok(error.map_or(ExitCode::SUCCESS, |e| report(&e)))
        }
        Err(e) => Ok(report(&e)),
    }
}

/// Installs the global subscriber. All log output goes to stderr.
fn init_tracing(config: &AppConfig, verbose: bool) {
    let default_filter = if verbose {
        "debug"
    } else {
        config.logging.filter.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let json = config.logging.json;
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
}

fn report(err: &AppError) -> ExitCode {
    error!(code = err.error_code(), "{err}");
    eprintln!("{}: {err}", err.error_code());
    ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
}
