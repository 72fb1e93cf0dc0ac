//! Serde row types for the CSV tables.
//!
//! These mirror the upstream feed columns exactly; conversion into the
//! domain records (renaming `contract_unit` to `multiplier`, parsing
//! the call/put flag) happens in [`crate::load`].

use chrono::NaiveDate;
use serde::Deserialize;

/// One gross holding row.
#[derive(Clone, Debug, Deserialize)]
pub struct HoldingRecord {
    /// Sub-account identifier
    pub account: String,
    /// Position code `"<symbol>.<alias>"`
    pub code: String,
    /// Gross bought quantity
    pub long_quantity: i64,
    /// Gross sold quantity (non-positive)
    pub short_quantity: i64,
}

/// Futures quote row from an equity-venue feed.
#[derive(Clone, Debug, Deserialize)]
pub struct FutureQuoteRecord {
    /// Contract symbol
    pub future_code: String,
    /// Last trade date
    pub last_tradedate: NaiveDate,
    /// Contract size
    pub multiplier: f64,
    /// Settlement/close price
    pub close_price: f64,
}

/// Futures quote row from a commodity-venue feed (`contract_unit`
/// instead of `multiplier`).
#[derive(Clone, Debug, Deserialize)]
pub struct CommodityFutureQuoteRecord {
    /// Contract symbol
    pub future_code: String,
    /// Last trade date
    pub last_tradedate: NaiveDate,
    /// Contract size
    pub contract_unit: f64,
    /// Settlement/close price
    pub close_price: f64,
}

/// Option quote row from an equity-venue feed.
#[derive(Clone, Debug, Deserialize)]
pub struct OptionQuoteRecord {
    /// Contract symbol
    pub option_code: String,
    /// Underlying symbol
    pub option_mark_code: String,
    /// Last trade date
    pub last_tradedate: NaiveDate,
    /// `call` or `put`
    pub call_put: String,
    /// Strike price
    pub strike_price: f64,
    /// Contract size
    pub multiplier: f64,
    /// Option close price
    pub close_price: f64,
    /// Underlying close price
    pub udl_price: f64,
    /// Option delta
    pub delta: f64,
    /// Option gamma
    pub gamma: f64,
}

/// Option quote row from a commodity-venue feed (`contract_unit`
/// instead of `multiplier`).
#[derive(Clone, Debug, Deserialize)]
pub struct CommodityOptionQuoteRecord {
    /// Contract symbol
    pub option_code: String,
    /// Underlying symbol
    pub option_mark_code: String,
    /// Last trade date
    pub last_tradedate: NaiveDate,
    /// `call` or `put`
    pub call_put: String,
    /// Strike price
    pub strike_price: f64,
    /// Contract size
    pub contract_unit: f64,
    /// Option close price
    pub close_price: f64,
    /// Underlying close price
    pub udl_price: f64,
    /// Option delta
    pub delta: f64,
    /// Option gamma
    pub gamma: f64,
}

/// Margin-ratio row.
#[derive(Clone, Debug, Deserialize)]
pub struct MarginRatioRecord {
    /// Variety symbol
    pub variety: String,
    /// Margin ratio
    pub margin_ratio: f64,
}

/// Drift row.
#[derive(Clone, Debug, Deserialize)]
pub struct DriftRecord {
    /// Underlying tag
    pub underlying: String,
    /// Annualised drift
    pub mu: f64,
}

/// Account equity row.
#[derive(Clone, Debug, Deserialize)]
pub struct AccountRecord {
    /// Account identifier
    pub account: String,
    /// Account equity
    pub equity: f64,
}
