//! # Adapter Loader (A: Input/Output)
//!
//! CSV ingestion for the margin pipeline and CSV writers for its
//! reports.
//!
//! Input tables (all UTF-8 CSV with headers):
//! - holdings: `account, code, long_quantity, short_quantity`
//! - futures quotes: `future_code, last_tradedate, multiplier,
//!   close_price` (commodity feeds say `contract_unit` instead of
//!   `multiplier`; the loader renames on ingest)
//! - option quotes: `option_code, option_mark_code, last_tradedate,
//!   call_put, strike_price, multiplier|contract_unit, close_price,
//!   udl_price, delta, gamma`
//! - margin ratios: `variety, margin_ratio`
//! - covariance: square, first column `underlying`, one column per
//!   underlying (diagonal vols, upper-triangle correlations)
//! - drift: `underlying, mu`
//! - accounts: `account, equity`
//! - supplement: `account, T+0, T+1, ...`
//!
//! Character-encoding conversion is out of scope; inputs are expected
//! in UTF-8.

#![warn(missing_docs)]

pub mod load;
pub mod records;
pub mod write;

mod error;

pub use error::LoaderError;
pub use load::{
    load_accounts, load_covariance, load_drift, load_future_quotes, load_holdings,
    load_margin_ratios, load_option_quotes, load_supplements, QuoteFlavour,
};
pub use write::{
    write_normalised_holding, write_optimised_holding, write_scenario_reports, write_var_report,
};
