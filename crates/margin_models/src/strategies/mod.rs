//! Two-leg combination strategies.
//!
//! This module provides:
//! - `StrategyKind`: The closed set of combination variants recognised by
//!   the exchanges, in three families (futures, options, future-option)
//! - `StrategyInstance`: A priced combination over a normalised leg pair
//! - `catalog`: The dispatcher — normalisation swap, validity predicates,
//!   and combined-margin formulas
//!
//! Strategy instances are transient optimisation artifacts: the catalog
//! creates them during pair enumeration, the optimiser selects integer
//! counts of them, the reporter consumes them.

mod catalog;

pub use catalog::analyse_pair;

use std::fmt;

/// The closed set of recognised two-leg combination variants.
///
/// Grouped in three families, dispatched by the position types of the
/// pair. Within a family, at most one variant matches a normalised pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StrategyKind {
    // Future + Future
    /// Same contract held both ways
    FutureLockPosition,
    /// Same variety, different expiries
    CalendarSpread,
    /// Exchange-listed variety pair
    InterCommoditySpread,
    // Option + Option
    /// Long low-strike call, short high-strike call
    BullCallSpread,
    /// Long high-strike call, short low-strike call
    BearCallSpread,
    /// Long low-strike put, short high-strike put
    BullPutSpread,
    /// Long high-strike put, short low-strike put
    BearPutSpread,
    /// Short call and short put at the same strike
    Straddle,
    /// Short call and short put, put strike below call strike
    Strangle,
    /// Same option held both ways
    OptionLockPosition,
    /// SSE/SZSE end-of-session offsetting of a locked option pair
    AutoHedging,
    // Future + Option
    /// Short call against a long future on its underlying
    CoveredCall,
    /// Short put against a short future on its underlying
    CoveredPut,
    /// Long call against a short future on its underlying
    ProtectiveCall,
    /// Long put against a long future on its underlying
    ProtectivePut,
}

impl StrategyKind {
    /// The variant tag used in reports.
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::FutureLockPosition => "FutureLockPosition",
            StrategyKind::CalendarSpread => "CalendarSpread",
            StrategyKind::InterCommoditySpread => "InterCommoditySpread",
            StrategyKind::BullCallSpread => "BullCallSpread",
            StrategyKind::BearCallSpread => "BearCallSpread",
            StrategyKind::BullPutSpread => "BullPutSpread",
            StrategyKind::BearPutSpread => "BearPutSpread",
            StrategyKind::Straddle => "Straddle",
            StrategyKind::Strangle => "Strangle",
            StrategyKind::OptionLockPosition => "OptionLockPosition",
            StrategyKind::AutoHedging => "AutoHedging",
            StrategyKind::CoveredCall => "CoveredCall",
            StrategyKind::CoveredPut => "CoveredPut",
            StrategyKind::ProtectiveCall => "ProtectiveCall",
            StrategyKind::ProtectivePut => "ProtectivePut",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A priced combination over an ordered (post-swap) leg pair.
#[derive(Clone, Debug, PartialEq)]
pub struct StrategyInstance {
    /// `code_dir` of the pair, in normalised order
    pub legs: (String, String),
    /// Variant tag
    pub kind: StrategyKind,
    /// Combined per-unit margin for the pair
    pub margin: f64,
    /// `pos1.margin + pos2.margin - margin`, less any variant penalty
    pub margin_saving: f64,
}
