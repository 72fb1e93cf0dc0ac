//! Exchange identifiers for the Chinese futures and options venues.
//!
//! This module provides the closed [`Exchange`] enumeration together with
//! the alias normalisation used by upstream data sources (e.g. `CFE` and
//! `CCFX` both denote CFFEX).
//!
//! # Examples
//!
//! ```
//! use margin_core::types::exchange::Exchange;
//!
//! let cffex = Exchange::from_code("CCFX").unwrap();
//! assert_eq!(cffex, Exchange::Cffex);
//! assert!(cffex.is_equity());
//! assert_eq!(cffex.code(), "CFFEX");
//! ```

use std::fmt;
use std::str::FromStr;

use super::error::CodeError;

/// The seven venues positions may trade on.
///
/// Two subsets matter for margin rules: the *equity* venues
/// (CFFEX, SSE, SZSE) and the *commodity* venues (SHFE, CZCE, DCE, GFEX).
/// CFFEX and SHFE additionally apply single-side netting to futures.
///
/// # Examples
///
/// ```
/// use margin_core::types::exchange::Exchange;
///
/// assert!(Exchange::Dce.is_commodity());
/// assert!(Exchange::Sse.is_equity());
/// assert!(Exchange::Shfe.nets_single_side());
/// assert!(!Exchange::Dce.nets_single_side());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Exchange {
    /// China Financial Futures Exchange (index futures and options)
    Cffex,
    /// Shanghai Stock Exchange (ETF options)
    Sse,
    /// Shenzhen Stock Exchange (ETF options)
    Szse,
    /// Shanghai Futures Exchange
    Shfe,
    /// Zhengzhou Commodity Exchange
    Czce,
    /// Dalian Commodity Exchange
    Dce,
    /// Guangzhou Futures Exchange
    Gfex,
}

impl Exchange {
    /// All exchanges, in canonical order.
    pub const ALL: [Exchange; 7] = [
        Exchange::Cffex,
        Exchange::Sse,
        Exchange::Szse,
        Exchange::Shfe,
        Exchange::Czce,
        Exchange::Dce,
        Exchange::Gfex,
    ];

    /// Returns the canonical exchange code.
    pub fn code(&self) -> &'static str {
        match self {
            Exchange::Cffex => "CFFEX",
            Exchange::Sse => "SSE",
            Exchange::Szse => "SZSE",
            Exchange::Shfe => "SHFE",
            Exchange::Czce => "CZCE",
            Exchange::Dce => "DCE",
            Exchange::Gfex => "GFEX",
        }
    }

    /// Normalises an exchange alias into its canonical value.
    ///
    /// Accepts the canonical code plus the aliases seen in upstream data
    /// feeds (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`CodeError::UnknownExchange`] for an unrecognised alias.
    ///
    /// # Examples
    ///
    /// ```
    /// use margin_core::types::exchange::Exchange;
    ///
    /// assert_eq!(Exchange::from_code("CFE").unwrap(), Exchange::Cffex);
    /// assert_eq!(Exchange::from_code("XSHG").unwrap(), Exchange::Sse);
    /// assert_eq!(Exchange::from_code("xdce").unwrap(), Exchange::Dce);
    /// assert!(Exchange::from_code("NYSE").is_err());
    /// ```
    pub fn from_code(alias: &str) -> Result<Self, CodeError> {
        match alias.to_ascii_uppercase().as_str() {
            "CCFX" | "CFE" | "CFFEX" => Ok(Exchange::Cffex),
            "XSHG" | "SH" | "SSE" => Ok(Exchange::Sse),
            "XSHE" | "SZ" | "SZSE" => Ok(Exchange::Szse),
            "XSGE" | "SHFE" => Ok(Exchange::Shfe),
            "XZCE" | "CZCE" => Ok(Exchange::Czce),
            "XDCE" | "DCE" => Ok(Exchange::Dce),
            "GFEX" => Ok(Exchange::Gfex),
            _ => Err(CodeError::UnknownExchange(alias.to_string())),
        }
    }

    /// Whether this is an equity venue (CFFEX, SSE, SZSE).
    pub fn is_equity(&self) -> bool {
        matches!(self, Exchange::Cffex | Exchange::Sse | Exchange::Szse)
    }

    /// Whether this is a commodity venue (SHFE, CZCE, DCE, GFEX).
    pub fn is_commodity(&self) -> bool {
        !self.is_equity()
    }

    /// Whether the venue applies single-side ("larger side") netting to
    /// its futures legs. CFFEX nets across all futures of an account;
    /// SHFE nets independently per variety.
    pub fn nets_single_side(&self) -> bool {
        matches!(self, Exchange::Cffex | Exchange::Shfe)
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Exchange {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Exchange::from_code(s)
    }
}
