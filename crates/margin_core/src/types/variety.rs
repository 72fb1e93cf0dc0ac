//! Asset-family ("variety") symbols and the inter-commodity pair table.
//!
//! A variety is the family code underlying a contract: `IF` for CSI-300
//! index futures, `M` for soybean meal, `CU` for copper. ETF and index
//! options on SSE/SZSE carry the synthetic tag [`Variety::etf`].
//!
//! # Examples
//!
//! ```
//! use margin_core::types::exchange::Exchange;
//! use margin_core::types::variety::Variety;
//!
//! let meal = Variety::new("m");
//! let oil = Variety::new("Y");
//! assert_eq!(meal.as_str(), "M");
//!
//! // Soybean meal / soybean oil is not an eligible DCE spread pair,
//! // but soybean oil / palm oil is.
//! let palm = Variety::new("P");
//! assert!(!Variety::is_commodity_pair(Exchange::Dce, &meal, &oil));
//! assert!(Variety::is_commodity_pair(Exchange::Dce, &oil, &palm));
//! ```

use std::fmt;

use super::exchange::Exchange;

/// Inter-commodity spread pairs eligible for netting on DCE.
///
/// The set is closed: it is the pair list published by the exchange for
/// lock/spread combination margin. CZCE's list is not yet supplied and
/// stays empty, so no CZCE inter-commodity combination is ever formed.
const DCE_COMMODITY_PAIRS: &[(&str, &str)] = &[
    ("A", "B"),
    ("A", "M"),
    ("B", "M"),
    ("Y", "P"),
    ("C", "CS"),
    ("JM", "J"),
    ("JM", "I"),
    ("J", "I"),
    ("L", "V"),
    ("L", "PP"),
    ("L", "EG"),
    ("L", "EB"),
    ("L", "PG"),
    ("V", "PP"),
    ("V", "EG"),
    ("V", "EB"),
    ("V", "PG"),
    ("PP", "EG"),
    ("PP", "EB"),
    ("PP", "PG"),
    ("EG", "EB"),
    ("EG", "PG"),
    ("EB", "PG"),
];

/// An upper-cased asset-family symbol.
///
/// Stored normalised so that lookups (margin ratios, covariance labels,
/// pair membership) are case-insensitive at the edges.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Variety(String);

impl Variety {
    /// Synthetic variety tag for SSE/SZSE ETF and index options.
    pub const ETF_TAG: &'static str = "ETF";

    /// Creates a variety from a symbol, upper-casing it.
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Variety(symbol.as_ref().to_ascii_uppercase())
    }

    /// The synthetic `ETF` variety.
    pub fn etf() -> Self {
        Variety(Self::ETF_TAG.to_string())
    }

    /// The normalised symbol.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether an unordered variety pair is eligible for inter-commodity
    /// spread netting on the given exchange.
    ///
    /// Only DCE currently carries a pair list; every other exchange
    /// (including CZCE, whose list is to-be-supplied) returns `false`.
    pub fn is_commodity_pair(exchange: Exchange, v1: &Variety, v2: &Variety) -> bool {
        let pairs: &[(&str, &str)] = match exchange {
            Exchange::Dce => DCE_COMMODITY_PAIRS,
            _ => &[],
        };
        pairs.iter().any(|&(a, b)| {
            (v1.as_str() == a && v2.as_str() == b) || (v1.as_str() == b && v2.as_str() == a)
        })
    }
}

impl fmt::Display for Variety {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Variety {
    fn from(symbol: &str) -> Self {
        Variety::new(symbol)
    }
}
