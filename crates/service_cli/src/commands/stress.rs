//! Stress command implementation.
//!
//! Loads and normalises the holding, runs the Monte Carlo VaR and
//! scenario-grid sub-engines, and writes the three report CSVs into
//! the output directory.

use std::path::PathBuf;

use adapter_loader::{load_accounts, load_covariance, load_drift, load_supplements};
use clap::Args;
use margin_risk::{run_scenario_grid, run_stress_var, DriftTable, StressConfig, SupplementSchedule};
use tracing::info;

use super::{load_normalised_holding, require_file, InputArgs};
use crate::config::RunConfig;
use crate::error::{CliError, Result};

/// Arguments of the `stress` command.
#[derive(Args, Clone, Debug)]
pub struct StressArgs {
    /// Input tables
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Account equity CSV (account, equity)
    #[arg(long)]
    pub accounts: String,

    /// Covariance CSV (square; diagonal vols, upper-triangle correlations)
    #[arg(long)]
    pub cov: String,

    /// Drift CSV (underlying, mu); zero drift when omitted
    #[arg(long)]
    pub mu: Option<String>,

    /// Supplement schedule CSV (account, T+0, T+1, ...); none when omitted
    #[arg(long)]
    pub supplement: Option<String>,

    /// Monte Carlo path count (config default when omitted)
    #[arg(long)]
    pub n_paths: Option<usize>,

    /// RNG seed (config default when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Scenario grid as comma-separated returns, e.g. "-0.05,0,0.05"
    #[arg(long)]
    pub scenarios: Option<String>,

    /// Report directory (config default when omitted)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

/// Parses a comma-separated shock grid.
fn parse_grid(grid: &str) -> Result<Vec<f64>> {
    grid.split(',')
        .map(|field| {
            field.trim().parse::<f64>().map_err(|_| {
                CliError::invalid_argument(format!("scenario return {:?}", field.trim()))
            })
        })
        .collect()
}

/// Run the stress command.
pub fn run(args: &StressArgs, config: &RunConfig) -> Result<()> {
    info!("Starting stress test...");
    require_file(&args.accounts)?;
    require_file(&args.cov)?;

    let legs = load_normalised_holding(&args.inputs)?;
    let accounts = load_accounts(&args.accounts)?;
    let cov = load_covariance(&args.cov)?;
    let drift = match &args.mu {
        Some(path) => {
            require_file(path)?;
            load_drift(path)?
        }
        None => DriftTable::new(),
    };
    let supplements = match &args.supplement {
        Some(path) => {
            require_file(path)?;
            load_supplements(path)?
        }
        None => SupplementSchedule::new(),
    };

    let mut stress_config = StressConfig::builder()
        .n_paths(args.n_paths.unwrap_or(config.stress.n_paths))
        .n_steps(config.stress.n_steps)
        .percentile(config.stress.percentile)
        .target_risk_ratio(config.stress.target_risk_ratio);
    if let Some(seed) = args.seed.or(config.stress.seed) {
        stress_config = stress_config.seed(seed);
    }
    let stress_config = stress_config.build()?;

    let shocks = match &args.scenarios {
        Some(grid) => parse_grid(grid)?,
        None => config.stress.scenarios.clone(),
    };

    let var_report = run_stress_var(
        &legs,
        &accounts,
        &supplements,
        &cov,
        &drift,
        &stress_config,
    )?;
    let scenario_report = run_scenario_grid(
        &legs,
        &accounts,
        &shocks,
        stress_config.target_risk_ratio(),
    );

    let output_dir = args.output_dir.clone().unwrap_or_else(|| {
        config.output_dir.clone()
    });
    std::fs::create_dir_all(&output_dir)?;
    adapter_loader::write_var_report(output_dir.join("var_report.csv"), &var_report)?;
    adapter_loader::write_scenario_reports(
        output_dir.join("scenario_risk_ratio.csv"),
        output_dir.join("scenario_supplement.csv"),
        &scenario_report,
    )?;
    info!(
        accounts = var_report.rows.len(),
        dir = %output_dir.display(),
        "stress reports written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grid() {
        assert_eq!(
            parse_grid("-0.05, 0, 0.05").unwrap(),
            vec![-0.05, 0.0, 0.05]
        );
        assert!(parse_grid("-0.05,x").is_err());
    }
}
