//! Per-leg revaluation under underlying-return shocks.
//!
//! Futures reprice linearly; options reprice by delta-gamma expansion
//! around the quoted underlying price:
//!
//! ```text
//! price = close + (s - udl) · δ + ½ (s - udl)² · γ,   s = udl · (1 + r)
//! ```
//!
//! Margins recompute from the shocked prices through the same formulas
//! the normaliser used, and account totals respect CFFEX/SHFE
//! single-side netting in every scenario cell.

use margin_core::types::Side;
use margin_models::holdings::{Instrument, Leg};
use margin_models::margin;
use margin_models::netting::NettingAccumulator;

use crate::paths::{ReturnPaths, UnderlyingIndex};

/// Per-unit price and margin of a leg under a single return shock.
///
/// Returns `(price, margin)`; the price is of the contract itself (the
/// option premium for options), the margin is per unit.
#[inline]
pub fn shocked_price_and_margin(leg: &Leg, shock: f64) -> (f64, f64) {
    match &leg.instrument {
        Instrument::Future(terms) => {
            let price = terms.close_price * (1.0 + shock);
            let unit_margin = margin::future_margin(price, terms.multiplier, leg.margin_ratio);
            (price, unit_margin)
        }
        Instrument::Option(terms) => {
            let s = terms.underlying_price * (1.0 + shock);
            let ds = s - terms.underlying_price;
            let price = terms.close_price + ds * terms.delta + 0.5 * ds * ds * terms.gamma;
            let unit_margin = match leg.side {
                Side::Long => 0.0,
                Side::Short => margin::short_option_margin(
                    leg.exchange,
                    terms.kind,
                    price,
                    s,
                    terms.strike_price,
                    terms.multiplier,
                    leg.margin_ratio,
                ),
            };
            (price, unit_margin)
        }
    }
}

/// P&L and netted margin of one account across a path cube.
///
/// Both outputs are flat `(step, path)` arrays of length
/// `n_step * n_path`.
#[derive(Clone, Debug)]
pub struct AccountPaths {
    /// Steps in the cube
    pub n_step: usize,
    /// Paths in the cube
    pub n_path: usize,
    /// Account P&L per cell
    pub pnl: Vec<f64>,
    /// Netted account margin per cell
    pub margin: Vec<f64>,
}

/// Revalues an account's legs over every `(step, path)` cell.
///
/// # Panics
///
/// Panics if a leg's underlying is not in `index`; the caller builds
/// the index from the same holding.
pub fn evaluate_account_paths(
    legs: &[&Leg],
    paths: &ReturnPaths,
    index: &UnderlyingIndex,
) -> AccountPaths {
    let n_step = paths.n_step();
    let n_path = paths.n_path();
    let cells = n_step * n_path;

    let mut pnl = vec![0.0; cells];
    let mut netting = NettingAccumulator::new(cells);
    let mut leg_margin = vec![0.0; cells];

    for leg in legs {
        let u = index
            .position(leg.underlying())
            .expect("underlying indexed from this holding");
        let quantity = leg.quantity as f64;
        let signed_quantity = leg.signed_quantity();
        let close = leg.close_price();

        for step in 0..n_step {
            let returns = paths.slice(step, u);
            let base = step * n_path;
            for (path, &shock) in returns.iter().enumerate() {
                let (price, unit_margin) = shocked_price_and_margin(leg, shock);
                let cell = base + path;
                pnl[cell] += (price - close) * signed_quantity * leg.multiplier();
                leg_margin[cell] = unit_margin * quantity;
            }
        }
        netting.add(leg, &leg_margin);
    }

    AccountPaths {
        n_step,
        n_path,
        pnl,
        margin: netting.finish(),
    }
}

/// P&L and netted margin of one account under a single uniform shock.
pub fn evaluate_account_shock(legs: &[&Leg], shock: f64) -> (f64, f64) {
    let mut pnl = 0.0;
    let mut netting = NettingAccumulator::new(1);
    for leg in legs {
        let (price, unit_margin) = shocked_price_and_margin(leg, shock);
        pnl += (price - leg.close_price()) * leg.signed_quantity() * leg.multiplier();
        netting.add(leg, &[unit_margin * leg.quantity as f64]);
    }
    (pnl, netting.finish()[0])
}
