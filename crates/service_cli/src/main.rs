//! Margin CLI - command-line operations for margin analysis.
//!
//! # Commands
//!
//! - `margin optimise` - Select combination strategies that minimise
//!   posted margin per account
//! - `margin stress` - Monte Carlo VaR and scenario-grid stress reports
//! - `margin check` - Print the effective run configuration
//!
//! # Architecture
//!
//! The service layer of the A-M-S architecture: this binary wires the
//! adapter (CSV ingest), margin (models, optimiser, risk) and report
//! layers into one batch pipeline.

use clap::{Parser, Subcommand};
use service_cli::commands::{check, optimise, stress};
use service_cli::{Result, RunConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Margin analysis CLI
#[derive(Parser)]
#[command(name = "margin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "margin.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select combination strategies minimising posted margin
    Optimise(optimise::OptimiseArgs),

    /// Run Monte Carlo VaR and scenario-grid stress reports
    Stress(stress::StressArgs),

    /// Check the effective run configuration
    Check,
}

fn main() -> Result<()> {
    // Initialise tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let config =
        RunConfig::load_or_default(std::path::Path::new(&cli.config))?.with_env_override();

    match cli.command {
        Commands::Optimise(args) => optimise::run(&args),
        Commands::Stress(args) => stress::run(&args, &config),
        Commands::Check => check::run(&config),
    }
}
