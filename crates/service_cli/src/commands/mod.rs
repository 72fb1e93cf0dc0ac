//! Command implementations.
//!
//! Shared here: the market-data argument bundle and the loading helpers
//! the `optimise` and `stress` commands both use.

pub mod check;
pub mod optimise;
pub mod stress;

use std::path::Path;

use adapter_loader::{
    load_future_quotes, load_holdings, load_margin_ratios, load_option_quotes, QuoteFlavour,
};
use clap::Args;
use margin_models::holdings::{normalise_holdings, Leg, MarketData};

use crate::error::{CliError, Result};

/// Input tables shared by every pipeline command.
#[derive(Args, Clone, Debug)]
pub struct InputArgs {
    /// Holdings CSV (account, code, long_quantity, short_quantity)
    #[arg(long)]
    pub holdings: String,

    /// Margin-ratio CSV (variety, margin_ratio)
    #[arg(long)]
    pub margin_ratios: String,

    /// Equity-venue futures quotes CSV
    #[arg(long)]
    pub equity_futures: Option<String>,

    /// Commodity-venue futures quotes CSV (contract_unit column)
    #[arg(long)]
    pub commodity_futures: Option<String>,

    /// Equity-venue option quotes CSV
    #[arg(long)]
    pub equity_options: Option<String>,

    /// Commodity-venue option quotes CSV (contract_unit column)
    #[arg(long)]
    pub commodity_options: Option<String>,
}

/// Fails with [`CliError::FileNotFound`] unless `path` exists.
fn require_file(path: &str) -> Result<()> {
    if Path::new(path).exists() {
        Ok(())
    } else {
        Err(CliError::FileNotFound(path.to_string()))
    }
}

/// Loads and normalises the holding described by `args`.
pub fn load_normalised_holding(args: &InputArgs) -> Result<Vec<Leg>> {
    require_file(&args.holdings)?;
    require_file(&args.margin_ratios)?;
    for optional in [
        &args.equity_futures,
        &args.commodity_futures,
        &args.equity_options,
        &args.commodity_options,
    ]
    .into_iter()
    .flatten()
    {
        require_file(optional)?;
    }

    let holdings = load_holdings(&args.holdings)?;
    let ratios = load_margin_ratios(&args.margin_ratios)?;
    let market = MarketData {
        equity_futures: args
            .equity_futures
            .as_deref()
            .map(|p| load_future_quotes(p, QuoteFlavour::Equity))
            .transpose()?
            .unwrap_or_default(),
        commodity_futures: args
            .commodity_futures
            .as_deref()
            .map(|p| load_future_quotes(p, QuoteFlavour::Commodity))
            .transpose()?
            .unwrap_or_default(),
        equity_options: args
            .equity_options
            .as_deref()
            .map(|p| load_option_quotes(p, QuoteFlavour::Equity))
            .transpose()?
            .unwrap_or_default(),
        commodity_options: args
            .commodity_options
            .as_deref()
            .map(|p| load_option_quotes(p, QuoteFlavour::Commodity))
            .transpose()?
            .unwrap_or_default(),
    };

    Ok(normalise_holdings(&holdings, &market, &ratios)?)
}
