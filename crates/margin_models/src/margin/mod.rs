//! Per-unit margin formulas.
//!
//! All functions return the margin for a single contract unit; callers
//! multiply by quantity. The same functions serve as the "shocked"
//! variants: the stress engine calls them pointwise with substituted
//! close/underlying prices.
//!
//! Rules by venue:
//! - Futures (any venue): `close × multiplier × ratio`
//! - Long options: zero
//! - SSE/SZSE ETF short options: premium plus an out-of-the-money-adjusted
//!   floor of 12%/7% of the underlying (puts capped at strike)
//! - CFFEX index short options: premium plus the ratio-scaled underlying
//!   with a 0.5 minimum-safety factor
//! - Commodity short options: premium plus the underlying future margin
//!   less half the out-of-the-money amount (capped at that margin)

use margin_core::types::{Exchange, OptionKind};

/// Minimum safety factor for CFFEX index option margin.
const CFFEX_MIN_SAFETY_FACTOR: f64 = 0.5;

/// Per-unit margin of a futures position.
#[inline]
pub fn future_margin(close_price: f64, multiplier: f64, margin_ratio: f64) -> f64 {
    close_price * multiplier * margin_ratio
}

/// Out-of-the-money amount of an option.
#[inline]
fn out_of_the_money(kind: OptionKind, underlying_price: f64, strike_price: f64) -> f64 {
    match kind {
        OptionKind::Call => (strike_price - underlying_price).max(0.0),
        OptionKind::Put => (underlying_price - strike_price).max(0.0),
    }
}

/// Per-unit margin of a short option position.
///
/// `margin_ratio` is the underlying variety's ratio; it is not referenced
/// for SSE/SZSE, whose rule carries its own 12%/7% floors.
pub fn short_option_margin(
    exchange: Exchange,
    kind: OptionKind,
    close_price: f64,
    underlying_price: f64,
    strike_price: f64,
    multiplier: f64,
    margin_ratio: f64,
) -> f64 {
    let otm = out_of_the_money(kind, underlying_price, strike_price);

    match exchange {
        Exchange::Sse | Exchange::Szse => match kind {
            OptionKind::Call => {
                multiplier
                    * (close_price
                        + (0.12 * underlying_price - otm).max(0.07 * underlying_price))
            }
            OptionKind::Put => {
                multiplier
                    * (close_price + (0.12 * underlying_price - otm).max(0.07 * strike_price))
                        .min(strike_price)
            }
        },
        Exchange::Cffex => {
            let floor = match kind {
                OptionKind::Call => CFFEX_MIN_SAFETY_FACTOR * underlying_price * margin_ratio,
                OptionKind::Put => CFFEX_MIN_SAFETY_FACTOR * strike_price * margin_ratio,
            };
            multiplier * (close_price + (underlying_price * margin_ratio - otm).max(floor))
        }
        Exchange::Shfe | Exchange::Czce | Exchange::Dce | Exchange::Gfex => {
            let underlying_margin = underlying_price * margin_ratio;
            multiplier * (close_price + underlying_margin - 0.5 * otm.min(underlying_margin))
        }
    }
}
