//! Position and market-quote records.
//!
//! The holding pipeline works on three shapes of data:
//!
//! 1. [`RawPosition`] rows as reported by the broker: gross long and short
//!    quantities keyed by `(account, code)`.
//! 2. Market quotes ([`FutureQuote`], [`OptionQuote`]) joined by symbol.
//! 3. [`Leg`] rows, one per held direction, carrying everything the
//!    optimiser and the stress engine need. After normalisation legs are
//!    immutable inputs to both.

mod error;
mod normaliser;

pub use error::HoldingError;
pub use normaliser::{normalise_holdings, MarketData};

use std::collections::HashMap;

use chrono::NaiveDate;
use margin_core::types::{Exchange, OptionKind, PositionType, Side, Variety};

use crate::margin;

/// A gross broker holding row, pre-split.
///
/// The short quantity is conventionally non-positive in the source data.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawPosition {
    /// Sub-account identifier
    pub account: String,
    /// Position code, `"<symbol>.<alias>"`
    pub code: String,
    /// Gross bought quantity (non-negative)
    pub long_quantity: i64,
    /// Gross sold quantity (non-positive)
    pub short_quantity: i64,
}

/// Market quote for a futures contract.
///
/// Commodity feeds publish the contract size as `contract_unit`; the
/// loader renames it into `multiplier` before quotes reach this type.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FutureQuote {
    /// Contract symbol, `"<symbol>.<alias>"`
    pub code: String,
    /// Last trade date of the contract
    pub last_tradedate: NaiveDate,
    /// Contract size
    pub multiplier: f64,
    /// Settlement/close price
    pub close_price: f64,
}

/// Market quote for an option contract.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OptionQuote {
    /// Contract symbol, `"<symbol>.<alias>"`
    pub code: String,
    /// Underlying symbol (the option mark code)
    pub underlying_code: String,
    /// Last trade date of the contract
    pub last_tradedate: NaiveDate,
    /// Call/put flag
    pub kind: OptionKind,
    /// Strike price
    pub strike_price: f64,
    /// Contract size
    pub multiplier: f64,
    /// Option settlement/close price
    pub close_price: f64,
    /// Underlying close price
    pub underlying_price: f64,
    /// Option delta
    pub delta: f64,
    /// Option gamma
    pub gamma: f64,
}

/// Per-variety margin ratios.
#[derive(Clone, Debug, Default)]
pub struct MarginRatioTable {
    ratios: HashMap<Variety, f64>,
}

impl MarginRatioTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(variety, ratio)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Variety, f64)>) -> Self {
        Self {
            ratios: pairs.into_iter().collect(),
        }
    }

    /// Inserts or replaces a ratio.
    pub fn insert(&mut self, variety: Variety, ratio: f64) {
        self.ratios.insert(variety, ratio);
    }

    /// Looks up the ratio for a variety.
    pub fn get(&self, variety: &Variety) -> Option<f64> {
        self.ratios.get(variety).copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.ratios.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }
}

/// Contract terms of a futures leg.
#[derive(Clone, Debug, PartialEq)]
pub struct FutureTerms {
    /// Contract size
    pub multiplier: f64,
    /// Settlement/close price
    pub close_price: f64,
    /// Last trade date
    pub last_tradedate: NaiveDate,
}

/// Contract terms of an option leg.
#[derive(Clone, Debug, PartialEq)]
pub struct OptionTerms {
    /// Underlying symbol (option mark code)
    pub underlying: String,
    /// Underlying close price
    pub underlying_price: f64,
    /// Strike price
    pub strike_price: f64,
    /// Call/put flag
    pub kind: OptionKind,
    /// Contract size
    pub multiplier: f64,
    /// Option settlement/close price
    pub close_price: f64,
    /// Last trade date
    pub last_tradedate: NaiveDate,
    /// Option delta
    pub delta: f64,
    /// Option gamma
    pub gamma: f64,
}

/// Contract terms, tagged by instrument class.
#[derive(Clone, Debug, PartialEq)]
pub enum Instrument {
    /// Futures contract terms
    Future(FutureTerms),
    /// Option contract terms
    Option(OptionTerms),
}

/// One held direction of one contract within an account.
///
/// Produced by [`normalise_holdings`]; immutable afterwards except for
/// the single-side netting pass, which may zero `margin`/`total_margin`.
#[derive(Clone, Debug, PartialEq)]
pub struct Leg {
    /// Sub-account identifier
    pub account: String,
    /// Contract symbol
    pub code: String,
    /// Unique identifier within an account: `code + ".L"` or `code + ".S"`
    pub code_dir: String,
    /// Held direction
    pub side: Side,
    /// Held quantity (strictly positive)
    pub quantity: u64,
    /// Venue
    pub exchange: Exchange,
    /// Asset-family symbol
    pub variety: Variety,
    /// Contract terms
    pub instrument: Instrument,
    /// Per-variety margin ratio. Never referenced for SSE/SZSE options,
    /// whose formulas carry their own floors; zero there.
    pub margin_ratio: f64,
    /// Per-unit initial margin
    pub margin: f64,
    /// `margin * quantity`
    pub total_margin: f64,
}

impl Leg {
    /// Builds a futures leg, computing its initial margin.
    #[allow(clippy::too_many_arguments)]
    pub fn future(
        account: impl Into<String>,
        code: impl Into<String>,
        side: Side,
        quantity: u64,
        exchange: Exchange,
        variety: Variety,
        terms: FutureTerms,
        margin_ratio: f64,
    ) -> Self {
        let account = account.into();
        let code = code.into();
        let margin = margin::future_margin(terms.close_price, terms.multiplier, margin_ratio);
        Self {
            code_dir: format!("{}{}", code, side.suffix()),
            account,
            code,
            side,
            quantity,
            exchange,
            variety,
            instrument: Instrument::Future(terms),
            margin_ratio,
            margin,
            total_margin: margin * quantity as f64,
        }
    }

    /// Builds an option leg, computing its initial margin (zero for longs).
    #[allow(clippy::too_many_arguments)]
    pub fn option(
        account: impl Into<String>,
        code: impl Into<String>,
        side: Side,
        quantity: u64,
        exchange: Exchange,
        variety: Variety,
        terms: OptionTerms,
        margin_ratio: f64,
    ) -> Self {
        let account = account.into();
        let code = code.into();
        let margin = match side {
            Side::Long => 0.0,
            Side::Short => margin::short_option_margin(
                exchange,
                terms.kind,
                terms.close_price,
                terms.underlying_price,
                terms.strike_price,
                terms.multiplier,
                margin_ratio,
            ),
        };
        Self {
            code_dir: format!("{}{}", code, side.suffix()),
            account,
            code,
            side,
            quantity,
            exchange,
            variety,
            instrument: Instrument::Option(terms),
            margin_ratio,
            margin,
            total_margin: margin * quantity as f64,
        }
    }

    /// Instrument class of this leg.
    pub fn position_type(&self) -> PositionType {
        match self.instrument {
            Instrument::Future(_) => PositionType::Future,
            Instrument::Option(_) => PositionType::Option,
        }
    }

    /// Whether this is a futures leg.
    pub fn is_future(&self) -> bool {
        matches!(self.instrument, Instrument::Future(_))
    }

    /// Whether this is an option leg.
    pub fn is_option(&self) -> bool {
        matches!(self.instrument, Instrument::Option(_))
    }

    /// Option terms, if this is an option leg.
    pub fn option_terms(&self) -> Option<&OptionTerms> {
        match &self.instrument {
            Instrument::Option(terms) => Some(terms),
            Instrument::Future(_) => None,
        }
    }

    /// Contract size.
    pub fn multiplier(&self) -> f64 {
        match &self.instrument {
            Instrument::Future(terms) => terms.multiplier,
            Instrument::Option(terms) => terms.multiplier,
        }
    }

    /// Settlement/close price of the contract itself.
    pub fn close_price(&self) -> f64 {
        match &self.instrument {
            Instrument::Future(terms) => terms.close_price,
            Instrument::Option(terms) => terms.close_price,
        }
    }

    /// Last trade date of the contract.
    pub fn last_tradedate(&self) -> NaiveDate {
        match &self.instrument {
            Instrument::Future(terms) => terms.last_tradedate,
            Instrument::Option(terms) => terms.last_tradedate,
        }
    }

    /// The underlying tag used for correlation lookups: the variety
    /// symbol for futures, the quoted underlying code for options.
    pub fn underlying(&self) -> &str {
        match &self.instrument {
            Instrument::Future(_) => self.variety.as_str(),
            Instrument::Option(terms) => &terms.underlying,
        }
    }

    /// Quantity signed by direction: positive long, negative short.
    pub fn signed_quantity(&self) -> f64 {
        self.side.sign() * self.quantity as f64
    }
}
