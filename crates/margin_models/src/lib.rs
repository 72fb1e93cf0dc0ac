//! # Margin Models (L2: Domain)
//!
//! Position records, holding normalisation, exchange margin formulas, and
//! the two-leg combination-strategy catalog.
//!
//! This crate provides:
//! - `holdings`: Raw position and market-quote records, the per-leg
//!   [`holdings::Leg`] record, and the normaliser that splits gross
//!   long/short rows, joins market data, and computes initial margins
//! - `margin`: Per-unit margin formulas for futures and short options
//!   under the exchange-specific rules, with shocked variants for the
//!   stress engine
//! - `netting`: Single-side ("larger side") netting for CFFEX and SHFE
//!   futures, scalar and per-scenario
//! - `strategies`: The closed catalog of two-leg combination strategies
//!   with validity predicates and combined-margin formulas

#![warn(missing_docs)]

pub mod holdings;
pub mod margin;
pub mod netting;
pub mod strategies;

pub use holdings::{
    FutureTerms, HoldingError, Instrument, Leg, MarginRatioTable, OptionQuote, OptionTerms,
    RawPosition,
};
pub use strategies::{analyse_pair, StrategyInstance, StrategyKind};
