//! Scenario-grid risk analysis.
//!
//! Evaluates every account under a fixed grid of single-step underlying
//! returns — the same scalar shock applied uniformly to each leg's own
//! underlying (a parallel shift) — and reports, per account and grid
//! point:
//!
//! - `risk_ratio = margin / (equity + pnl)`
//! - `supplement = max(margin / target_risk_ratio - (equity + pnl), 0)`
//!
//! Equity is reset to its base value for every grid point.

use std::collections::BTreeMap;

use margin_models::holdings::Leg;
use rayon::prelude::*;
use tracing::info;

use crate::reval::evaluate_account_shock;
use crate::tables::AccountEquityTable;

/// One account's scenario row, aligned with the shock grid.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioRow {
    /// Account identifier
    pub account: String,
    /// `margin / (equity + pnl)` per grid point
    pub risk_ratio: Vec<f64>,
    /// Required deposit per grid point
    pub supplement: Vec<f64>,
}

/// The scenario report: the shock grid plus one row per account that
/// holds positions. The two pivots of the report share this shape.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioReport {
    /// Underlying-return grid
    pub shocks: Vec<f64>,
    /// Rows in account order
    pub rows: Vec<ScenarioRow>,
}

/// Runs the scenario grid over every account.
///
/// Accounts without legs are skipped; an empty grid or holding yields
/// an empty report.
pub fn run_scenario_grid(
    legs: &[Leg],
    accounts: &AccountEquityTable,
    shocks: &[f64],
    target_risk_ratio: f64,
) -> ScenarioReport {
    let mut by_account: BTreeMap<&str, Vec<&Leg>> = BTreeMap::new();
    for leg in legs {
        by_account.entry(leg.account.as_str()).or_default().push(leg);
    }
    info!(
        accounts = by_account.len(),
        scenarios = shocks.len(),
        "running scenario grid"
    );

    let work: Vec<(&str, f64, Vec<&Leg>)> = accounts
        .iter()
        .filter_map(|(account, equity)| {
            by_account
                .get(account)
                .map(|account_legs| (account, equity, account_legs.clone()))
        })
        .collect();

    let rows: Vec<ScenarioRow> = work
        .into_par_iter()
        .map(|(account, equity, account_legs)| {
            let mut risk_ratio = Vec::with_capacity(shocks.len());
            let mut supplement = Vec::with_capacity(shocks.len());
            for &shock in shocks {
                let (pnl, margin) = evaluate_account_shock(&account_legs, shock);
                let stressed_equity = equity + pnl;
                risk_ratio.push(margin / stressed_equity);
                supplement.push((margin / target_risk_ratio - stressed_equity).max(0.0));
            }
            ScenarioRow {
                account: account.to_string(),
                risk_ratio,
                supplement,
            }
        })
        .collect();

    ScenarioReport {
        shocks: shocks.to_vec(),
        rows,
    }
}
