//! Strategy dispatch: normalisation swaps, predicates, combined margins.
//!
//! Given two legs of one account on one exchange, [`analyse_pair`]
//! dispatches on their position types to a family, applies the family's
//! ordering swap, and returns the first variant whose predicate holds:
//!
//! - **Futures family** (identity swap): lock, calendar, inter-commodity.
//! - **Options family** (short leg to `pos2`; of two same-side legs the
//!   put goes to `pos1`): the four vertical spreads, straddle, strangle,
//!   lock, auto-hedge.
//! - **Future-option family** (future to `pos1`): covered and protective
//!   calls/puts.
//!
//! Strike comparisons use a 1e-6 tolerance. The auto-hedge variant only
//! exists during a closing session (`is_close`) and its saving carries a
//! fixed penalty so real combinations are preferred by the optimiser.

use margin_core::types::{Exchange, OptionKind, Side, Variety};

use super::{StrategyInstance, StrategyKind};
use crate::holdings::{Leg, OptionTerms};

/// Strike / margin comparison tolerance.
const EPSILON: f64 = 1e-6;

/// Saving penalty applied to the auto-hedge variant.
const AUTO_HEDGING_PENALTY: f64 = 10.0;

/// Analyses a leg pair for a valid combination strategy.
///
/// Both legs must belong to the same account and exchange (the optimiser
/// enumerates within such groups). Returns `None` when no variant
/// matches, or when the pair mixes instrument classes no family accepts.
pub fn analyse_pair(pos1: &Leg, pos2: &Leg, is_close: bool) -> Option<StrategyInstance> {
    debug_assert_eq!(pos1.exchange, pos2.exchange);

    let matched = if pos1.is_future() && pos2.is_future() {
        analyse_futures(pos1, pos2)
    } else if pos1.is_option() && pos2.is_option() {
        analyse_options(pos1, pos2, is_close)
    } else {
        analyse_future_option(pos1, pos2)
    };

    matched.map(|(pos1, pos2, kind, margin)| {
        let mut margin_saving = pos1.margin + pos2.margin - margin;
        if kind == StrategyKind::AutoHedging {
            // De-prioritises end-of-session offsetting against real
            // combination strategies.
            margin_saving -= AUTO_HEDGING_PENALTY;
        }
        StrategyInstance {
            legs: (pos1.code_dir.clone(), pos2.code_dir.clone()),
            kind,
            margin,
            margin_saving,
        }
    })
}

type Match<'a> = (&'a Leg, &'a Leg, StrategyKind, f64);

fn analyse_futures<'a>(pos1: &'a Leg, pos2: &'a Leg) -> Option<Match<'a>> {
    let exchange = pos1.exchange;
    if pos1.side == pos2.side {
        return None;
    }
    let max_margin = pos1.margin.max(pos2.margin);

    if pos1.code == pos2.code && matches!(exchange, Exchange::Czce | Exchange::Dce | Exchange::Gfex)
    {
        return Some((pos1, pos2, StrategyKind::FutureLockPosition, max_margin));
    }
    if pos1.variety == pos2.variety
        && pos1.code != pos2.code
        && matches!(exchange, Exchange::Czce | Exchange::Dce | Exchange::Gfex)
    {
        return Some((pos1, pos2, StrategyKind::CalendarSpread, max_margin));
    }
    if Variety::is_commodity_pair(exchange, &pos1.variety, &pos2.variety)
        && matches!(exchange, Exchange::Czce | Exchange::Dce)
    {
        return Some((pos1, pos2, StrategyKind::InterCommoditySpread, max_margin));
    }
    None
}

fn analyse_options<'a>(pos1: &'a Leg, pos2: &'a Leg, is_close: bool) -> Option<Match<'a>> {
    // Ordering swap: a lone short leg goes to pos2; of a same-side pair
    // the put goes first.
    let (pos1, pos2) = {
        let o1 = pos1.option_terms()?;
        let o2 = pos2.option_terms()?;
        if pos1.side == Side::Short && pos2.side == Side::Long {
            (pos2, pos1)
        } else if pos1.side == pos2.side
            && o1.kind == OptionKind::Call
            && o2.kind == OptionKind::Put
        {
            (pos2, pos1)
        } else {
            (pos1, pos2)
        }
    };
    let o1 = pos1.option_terms()?;
    let o2 = pos2.option_terms()?;

    let exchange = pos1.exchange;
    let equity = matches!(exchange, Exchange::Sse | Exchange::Szse);
    let spread_venue = matches!(
        exchange,
        Exchange::Sse | Exchange::Szse | Exchange::Dce | Exchange::Gfex
    );
    let straddle_venue = matches!(
        exchange,
        Exchange::Sse | Exchange::Szse | Exchange::Czce | Exchange::Dce | Exchange::Gfex
    );

    let same_series =
        o1.underlying == o2.underlying && o1.last_tradedate == o2.last_tradedate;
    let opposite = pos1.side != pos2.side;
    let both_short = pos1.side == Side::Short && pos2.side == Side::Short;
    let strike_diff = o1.strike_price - o2.strike_price;

    // Vertical spreads: long pos1 against short pos2, same option kind.
    if same_series && opposite && o1.kind == OptionKind::Call && o2.kind == OptionKind::Call {
        if strike_diff < -EPSILON && spread_venue {
            let margin = if equity { 0.0 } else { pos2.margin * 0.2 };
            return Some((pos1, pos2, StrategyKind::BullCallSpread, margin));
        }
        if strike_diff > EPSILON && spread_venue {
            let width = strike_diff * o1.multiplier;
            let margin = if equity { width } else { width.min(pos2.margin) };
            return Some((pos1, pos2, StrategyKind::BearCallSpread, margin));
        }
    }
    if same_series && opposite && o1.kind == OptionKind::Put && o2.kind == OptionKind::Put {
        if strike_diff < -EPSILON && spread_venue {
            let width = -strike_diff * o2.multiplier;
            let margin = if equity { width } else { width.min(pos2.margin) };
            return Some((pos1, pos2, StrategyKind::BullPutSpread, margin));
        }
        if strike_diff > EPSILON && spread_venue {
            let margin = if equity { 0.0 } else { pos2.margin * 0.2 };
            return Some((pos1, pos2, StrategyKind::BearPutSpread, margin));
        }
    }

    // Short volatility pairs: put at pos1, call at pos2 after the swap.
    if same_series && both_short && o1.kind != o2.kind && straddle_venue {
        if strike_diff.abs() < EPSILON {
            let margin = strangle_margin(pos1, pos2, o1, o2);
            return Some((pos1, pos2, StrategyKind::Straddle, margin));
        }
        if strike_diff < -EPSILON {
            let margin = strangle_margin(pos1, pos2, o1, o2);
            return Some((pos1, pos2, StrategyKind::Strangle, margin));
        }
    }

    // Locked pairs: the same contract held both ways.
    if pos1.code == pos2.code && opposite {
        if matches!(exchange, Exchange::Dce | Exchange::Gfex) {
            return Some((
                pos1,
                pos2,
                StrategyKind::OptionLockPosition,
                pos2.margin * 0.2,
            ));
        }
        if equity && is_close {
            return Some((pos1, pos2, StrategyKind::AutoHedging, 0.0));
        }
    }

    None
}

/// Straddle/strangle combined margin: the leg with the larger margin
/// keeps it, plus the other leg's premium. Margin ties fall back to the
/// larger close price; a full tie keeps the second leg as the higher one.
fn strangle_margin(pos1: &Leg, pos2: &Leg, o1: &OptionTerms, o2: &OptionTerms) -> f64 {
    let margin_diff = pos1.margin - pos2.margin;
    let (high, low) = if margin_diff > EPSILON {
        ((pos1, o1), (pos2, o2))
    } else if margin_diff < -EPSILON {
        ((pos2, o2), (pos1, o1))
    } else if o1.close_price - o2.close_price > EPSILON {
        ((pos1, o1), (pos2, o2))
    } else {
        ((pos2, o2), (pos1, o1))
    };
    high.0.margin + low.1.close_price * low.1.multiplier
}

fn analyse_future_option<'a>(pos1: &'a Leg, pos2: &'a Leg) -> Option<Match<'a>> {
    // Ordering swap: future to pos1.
    let (pos1, pos2) = if pos1.is_option() {
        (pos2, pos1)
    } else {
        (pos1, pos2)
    };
    let option = pos2.option_terms()?;
    if pos1.code != option.underlying {
        return None;
    }

    let exchange = pos1.exchange;
    let covered_venue = matches!(exchange, Exchange::Dce | Exchange::Gfex);
    let premium = option.close_price * option.multiplier;

    match (pos1.side, pos2.side, option.kind) {
        (Side::Long, Side::Short, OptionKind::Call) if covered_venue => Some((
            pos1,
            pos2,
            StrategyKind::CoveredCall,
            pos1.margin + premium,
        )),
        (Side::Short, Side::Short, OptionKind::Put) if covered_venue => Some((
            pos1,
            pos2,
            StrategyKind::CoveredPut,
            pos1.margin + premium,
        )),
        (Side::Short, Side::Long, OptionKind::Call) if exchange == Exchange::Dce => Some((
            pos1,
            pos2,
            StrategyKind::ProtectiveCall,
            pos1.margin * 0.8,
        )),
        (Side::Long, Side::Long, OptionKind::Put) if exchange == Exchange::Dce => Some((
            pos1,
            pos2,
            StrategyKind::ProtectivePut,
            pos1.margin * 0.8,
        )),
        _ => None,
    }
}
