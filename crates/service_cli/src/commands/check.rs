//! Check command implementation.
//!
//! Prints the effective run configuration so operators can confirm the
//! defaults a batch will use.

use tracing::info;

use crate::config::RunConfig;
use crate::error::Result;

/// Run the check command.
pub fn run(config: &RunConfig) -> Result<()> {
    info!("margin {}", env!("CARGO_PKG_VERSION"));
    info!("  output_dir: {}", config.output_dir.display());
    info!("  stress.n_paths: {}", config.stress.n_paths);
    info!("  stress.n_steps: {}", config.stress.n_steps);
    info!("  stress.percentile: {}", config.stress.percentile);
    info!(
        "  stress.target_risk_ratio: {}",
        config.stress.target_risk_ratio
    );
    match config.stress.seed {
        Some(seed) => info!("  stress.seed: {}", seed),
        None => info!("  stress.seed: (entropy)"),
    }
    info!("  stress.scenarios: {:?}", config.stress.scenarios);
    Ok(())
}
