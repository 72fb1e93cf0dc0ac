//! Optimise command implementation.
//!
//! Loads and normalises the holding, selects combination strategies per
//! account, and writes the optimised holding CSV.

use clap::Args;
use margin_optimiser::{optimise_accounts, OptimiserOptions};
use tracing::info;

use super::{load_normalised_holding, InputArgs};
use crate::error::Result;

/// Arguments of the `optimise` command.
#[derive(Args, Clone, Debug)]
pub struct OptimiseArgs {
    /// Input tables
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Output CSV for the optimised holding
    #[arg(long, default_value = "optimal_holding.csv")]
    pub output: String,

    /// Also write the normalised per-leg holding to this CSV
    #[arg(long)]
    pub processed_output: Option<String>,

    /// Closing session: enable SSE/SZSE option auto-hedging
    #[arg(long)]
    pub is_close: bool,

    /// Keep residual rows whose remaining quantity is zero
    #[arg(long)]
    pub keep_exhausted: bool,
}

/// Run the optimise command.
pub fn run(args: &OptimiseArgs) -> Result<()> {
    info!("Starting margin optimisation...");
    let legs = load_normalised_holding(&args.inputs)?;
    let unoptimised: f64 = legs.iter().map(|l| l.total_margin).sum();
    info!(legs = legs.len(), unoptimised, "holding normalised");

    if let Some(processed) = &args.processed_output {
        adapter_loader::write_normalised_holding(processed, &legs)?;
    }

    let options = OptimiserOptions {
        is_close: args.is_close,
        keep_exhausted: args.keep_exhausted,
        ..OptimiserOptions::default()
    };
    let reports = optimise_accounts(&legs, &options)?;
    let optimised: f64 = reports.iter().map(|r| r.total_margin()).sum();
    info!(
        accounts = reports.len(),
        optimised,
        saving = unoptimised - optimised,
        "optimisation complete"
    );

    adapter_loader::write_optimised_holding(&args.output, &reports)?;
    info!("The optimal holding is saved to {}", args.output);
    Ok(())
}
