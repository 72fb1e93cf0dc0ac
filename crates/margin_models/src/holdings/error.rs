//! Holding-pipeline error types.
//!
//! This module provides structured error handling for holding
//! normalisation with the offending code and missing field carried for
//! diagnostics.

use margin_core::types::CodeError;
use thiserror::Error;

/// Errors that can occur while normalising broker holdings.
///
/// # Variants
///
/// - `Code`: Wrapped position-code classification error
/// - `MissingMarketData`: A market-data join left a required field unset
///
/// # Examples
///
/// ```
/// use margin_models::holdings::HoldingError;
///
/// let err = HoldingError::missing_market_data("M2405.DCE", "close_price");
/// assert!(format!("{}", err).contains("M2405.DCE"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HoldingError {
    /// Unparseable code or unknown exchange alias.
    #[error("Position code error: {0}")]
    Code(#[from] CodeError),

    /// A required market-data field is unavailable for a held contract.
    #[error("Missing market data for {code}: {field}")]
    MissingMarketData {
        /// Contract code the join failed for
        code: String,
        /// Missing field or table
        field: &'static str,
    },
}

impl HoldingError {
    /// Create a missing-market-data error.
    pub fn missing_market_data(code: impl Into<String>, field: &'static str) -> Self {
        Self::MissingMarketData {
            code: code.into(),
            field,
        }
    }

    /// Check if this is a missing-market-data error.
    pub fn is_missing_market_data(&self) -> bool {
        matches!(self, Self::MissingMarketData { .. })
    }

    /// Check if this is a code classification error.
    pub fn is_code_error(&self) -> bool {
        matches!(self, Self::Code(_))
    }
}
