//! Position classification enums.
//!
//! # Examples
//!
//! ```
//! use margin_core::types::position::{PositionType, Side};
//!
//! assert_eq!(Side::Long.sign(), 1.0);
//! assert_eq!(Side::Short.suffix(), ".S");
//! assert_eq!(PositionType::Future.to_string(), "Future");
//! ```

use std::fmt;

/// The instrument class of a position.
///
/// `Stock` exists in the taxonomy for future extension; the holding
/// normaliser rejects positions that are neither futures nor options.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum PositionType {
    /// Exchange-traded future
    Future,
    /// Exchange-traded option
    Option,
    /// Cash equity (not processed)
    Stock,
}

impl fmt::Display for PositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PositionType::Future => "Future",
            PositionType::Option => "Option",
            PositionType::Stock => "Stock",
        };
        f.write_str(name)
    }
}

/// Direction of a leg after the gross long/short split.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Side {
    /// Bought-side holding
    Long,
    /// Sold-side holding
    Short,
}

impl Side {
    /// Signed unit quantity: `+1` for long, `-1` for short.
    pub fn sign(&self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }

    /// The `code_dir` suffix identifying this side of a symbol.
    pub fn suffix(&self) -> &'static str {
        match self {
            Side::Long => ".L",
            Side::Short => ".S",
        }
    }

    /// The opposite direction.
    pub fn opposite(&self) -> Side {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::Long => "long",
            Side::Short => "short",
        };
        f.write_str(name)
    }
}

/// Call/put flag of an option leg.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum OptionKind {
    /// Right to buy the underlying
    Call,
    /// Right to sell the underlying
    Put,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionKind::Call => "call",
            OptionKind::Put => "put",
        };
        f.write_str(name)
    }
}
