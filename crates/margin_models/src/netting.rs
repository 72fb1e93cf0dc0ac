//! Single-side ("larger side") margin netting.
//!
//! CFFEX and SHFE only charge margin on the larger side of a futures
//! book: the side whose `total_margin` sum is greater keeps its margin,
//! the other side is charged nothing. CFFEX applies the rule across all
//! futures legs of an account; SHFE applies it independently per variety.
//! Options are never netted. The pass is idempotent.
//!
//! Two forms are provided:
//! - [`apply_single_side`] mutates a normalised leg table in place
//!   (the base-case pass run once after normalisation);
//! - [`NettingAccumulator`] computes the same deduction per scenario cell
//!   for the stress engine, where every cell re-prices every leg.

use std::collections::HashMap;

use margin_core::types::{Exchange, Side, Variety};

use crate::holdings::Leg;

/// Netting scope of a futures leg: CFFEX nets account-wide, SHFE per
/// variety, everything else not at all.
fn netting_group(leg: &Leg) -> Option<(Exchange, Option<&Variety>)> {
    if !leg.is_future() {
        return None;
    }
    match leg.exchange {
        Exchange::Cffex => Some((Exchange::Cffex, None)),
        Exchange::Shfe => Some((Exchange::Shfe, Some(&leg.variety))),
        _ => None,
    }
}

/// Applies single-side netting in place, account by account.
///
/// Legs on the smaller side of each netting group get
/// `margin = total_margin = 0`. Ties keep the long side.
pub fn apply_single_side(legs: &mut [Leg]) {
    // Sum both sides per (account, group).
    let mut sums: HashMap<(String, Exchange, Option<Variety>), (f64, f64)> = HashMap::new();
    for leg in legs.iter() {
        if let Some((exchange, variety)) = netting_group(leg) {
            let key = (leg.account.clone(), exchange, variety.cloned());
            let entry = sums.entry(key).or_insert((0.0, 0.0));
            match leg.side {
                Side::Long => entry.0 += leg.total_margin,
                Side::Short => entry.1 += leg.total_margin,
            }
        }
    }

    for leg in legs.iter_mut() {
        if let Some((exchange, variety)) = netting_group(leg) {
            let key = (leg.account.clone(), exchange, variety.cloned());
            let (long_sum, short_sum) = sums[&key];
            // Ties keep the long side.
            let kept = if long_sum >= short_sum {
                Side::Long
            } else {
                Side::Short
            };
            if leg.side != kept {
                leg.margin = 0.0;
                leg.total_margin = 0.0;
            }
        }
    }
}

/// Per-scenario netting-aware margin aggregation.
///
/// Accumulates per-leg margin arrays (one value per scenario cell) into a
/// running total while tracking the long/short futures aggregates of each
/// netting group; [`NettingAccumulator::finish`] subtracts the smaller
/// side per cell.
#[derive(Clone, Debug)]
pub struct NettingAccumulator {
    cells: usize,
    total: Vec<f64>,
    groups: HashMap<(Exchange, Option<Variety>), (Vec<f64>, Vec<f64>)>,
}

impl NettingAccumulator {
    /// Creates an accumulator for `cells` scenario cells, all zero.
    pub fn new(cells: usize) -> Self {
        Self {
            cells,
            total: vec![0.0; cells],
            groups: HashMap::new(),
        }
    }

    /// Number of scenario cells.
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// Adds one leg's total-margin array (already scaled by quantity).
    ///
    /// # Panics
    ///
    /// Panics if `margins.len()` differs from the cell count.
    pub fn add(&mut self, leg: &Leg, margins: &[f64]) {
        assert_eq!(margins.len(), self.cells, "margin array length mismatch");
        for (acc, m) in self.total.iter_mut().zip(margins) {
            *acc += m;
        }
        if let Some((exchange, variety)) = netting_group(leg) {
            let key = (exchange, variety.cloned());
            let (long, short) = self
                .groups
                .entry(key)
                .or_insert_with(|| (vec![0.0; self.cells], vec![0.0; self.cells]));
            let side = match leg.side {
                Side::Long => long,
                Side::Short => short,
            };
            for (acc, m) in side.iter_mut().zip(margins) {
                *acc += m;
            }
        }
    }

    /// Total margin per cell with the smaller side of each netting group
    /// subtracted.
    pub fn finish(mut self) -> Vec<f64> {
        for (_, (long, short)) in self.groups.iter() {
            for (cell, total) in self.total.iter_mut().enumerate() {
                *total -= long[cell].min(short[cell]);
            }
        }
        std::mem::take(&mut self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use margin_core::types::{OptionKind, Side};

    use crate::holdings::{FutureTerms, OptionTerms};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 19).unwrap()
    }

    fn future_leg(
        account: &str,
        code: &str,
        side: Side,
        quantity: u64,
        exchange: Exchange,
        variety: &str,
        margin: f64,
    ) -> Leg {
        // Close/multiplier/ratio chosen so the per-unit margin comes out
        // at the requested value.
        Leg::future(
            account,
            code,
            side,
            quantity,
            exchange,
            Variety::new(variety),
            FutureTerms {
                multiplier: 1.0,
                close_price: margin,
                last_tradedate: date(),
            },
            1.0,
        )
    }

    fn short_etf_option(account: &str, code: &str) -> Leg {
        Leg::option(
            account,
            code,
            Side::Short,
            1,
            Exchange::Sse,
            Variety::etf(),
            OptionTerms {
                underlying: "510050.SH".to_string(),
                underlying_price: 3.0,
                strike_price: 3.0,
                kind: OptionKind::Call,
                multiplier: 10000.0,
                close_price: 0.1,
                last_tradedate: date(),
                delta: 0.5,
                gamma: 0.01,
            },
            0.0,
        )
    }

    #[test]
    fn test_cffex_nets_across_varieties() {
        // Long total 300000, short total 180000 -> short side zeroed.
        let mut legs = vec![
            future_leg("A1", "IF2401.CFE", Side::Long, 2, Exchange::Cffex, "IF", 150_000.0),
            future_leg("A1", "IC2401.CFE", Side::Short, 1, Exchange::Cffex, "IC", 180_000.0),
        ];
        apply_single_side(&mut legs);
        assert_eq!(legs[0].margin, 150_000.0);
        assert_eq!(legs[1].margin, 0.0);
        assert_eq!(legs[1].total_margin, 0.0);
        // Quantities survive untouched.
        assert_eq!(legs[1].quantity, 1);
    }

    #[test]
    fn test_shfe_nets_per_variety() {
        // CU: long 90000 beats short 30000. AL: short 40000 beats long 20000.
        let mut legs = vec![
            future_leg("A1", "CU2401.SHFE", Side::Long, 3, Exchange::Shfe, "CU", 30_000.0),
            future_leg("A1", "CU2401.SHFE", Side::Short, 1, Exchange::Shfe, "CU", 30_000.0),
            future_leg("A1", "AL2401.SHFE", Side::Long, 1, Exchange::Shfe, "AL", 20_000.0),
            future_leg("A1", "AL2401.SHFE", Side::Short, 2, Exchange::Shfe, "AL", 20_000.0),
        ];
        apply_single_side(&mut legs);
        assert!(legs[0].margin > 0.0);
        assert_eq!(legs[1].margin, 0.0);
        assert_eq!(legs[2].margin, 0.0);
        assert!(legs[3].margin > 0.0);
    }

    #[test]
    fn test_tie_keeps_long() {
        let mut legs = vec![
            future_leg("A1", "CU2401.SHFE", Side::Long, 1, Exchange::Shfe, "CU", 30_000.0),
            future_leg("A1", "CU2401.SHFE", Side::Short, 1, Exchange::Shfe, "CU", 30_000.0),
        ];
        apply_single_side(&mut legs);
        assert!(legs[0].margin > 0.0);
        assert_eq!(legs[1].margin, 0.0);
    }

    #[test]
    fn test_accounts_net_independently() {
        let mut legs = vec![
            future_leg("A1", "CU2401.SHFE", Side::Long, 2, Exchange::Shfe, "CU", 30_000.0),
            future_leg("A1", "CU2401.SHFE", Side::Short, 1, Exchange::Shfe, "CU", 30_000.0),
            future_leg("A2", "CU2401.SHFE", Side::Long, 1, Exchange::Shfe, "CU", 30_000.0),
            future_leg("A2", "CU2401.SHFE", Side::Short, 2, Exchange::Shfe, "CU", 30_000.0),
        ];
        apply_single_side(&mut legs);
        assert!(legs[0].margin > 0.0);
        assert_eq!(legs[1].margin, 0.0);
        assert_eq!(legs[2].margin, 0.0);
        assert!(legs[3].margin > 0.0);
    }

    #[test]
    fn test_non_netting_exchanges_untouched() {
        let mut legs = vec![
            future_leg("A1", "M2401.DCE", Side::Long, 3, Exchange::Dce, "M", 8_000.0),
            future_leg("A1", "M2405.DCE", Side::Short, 2, Exchange::Dce, "M", 9_000.0),
        ];
        apply_single_side(&mut legs);
        assert!(legs.iter().all(|l| l.margin > 0.0));
    }

    #[test]
    fn test_options_never_netted() {
        let mut legs = vec![
            future_leg("A1", "IF2401.CFE", Side::Long, 1, Exchange::Cffex, "IF", 150_000.0),
            short_etf_option("A1", "10004356.SH"),
        ];
        let option_margin = legs[1].margin;
        apply_single_side(&mut legs);
        assert_eq!(legs[1].margin, option_margin);
    }

    #[test]
    fn test_idempotent() {
        let mut once = vec![
            future_leg("A1", "CU2401.SHFE", Side::Long, 3, Exchange::Shfe, "CU", 30_000.0),
            future_leg("A1", "CU2401.SHFE", Side::Short, 1, Exchange::Shfe, "CU", 30_000.0),
            future_leg("A1", "AL2401.SHFE", Side::Short, 2, Exchange::Shfe, "AL", 20_000.0),
        ];
        apply_single_side(&mut once);
        let mut twice = once.clone();
        apply_single_side(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_accumulator_matches_scalar_pass() {
        let legs = vec![
            future_leg("A1", "CU2401.SHFE", Side::Long, 3, Exchange::Shfe, "CU", 30_000.0),
            future_leg("A1", "CU2401.SHFE", Side::Short, 1, Exchange::Shfe, "CU", 30_000.0),
            future_leg("A1", "AL2401.SHFE", Side::Long, 1, Exchange::Shfe, "AL", 20_000.0),
            future_leg("A1", "AL2401.SHFE", Side::Short, 2, Exchange::Shfe, "AL", 20_000.0),
        ];
        let mut acc = NettingAccumulator::new(1);
        for leg in &legs {
            acc.add(leg, &[leg.total_margin]);
        }
        let netted = acc.finish();

        let mut scalar = legs.clone();
        apply_single_side(&mut scalar);
        let expected: f64 = scalar.iter().map(|l| l.total_margin).sum();
        approx::assert_relative_eq!(netted[0], expected);
    }

    #[test]
    fn test_accumulator_kept_side_varies_by_cell() {
        // Cell 0: long side bigger; cell 1: short side bigger.
        let long = future_leg("A1", "CU2401.SHFE", Side::Long, 1, Exchange::Shfe, "CU", 1.0);
        let short = future_leg("A1", "CU2401.SHFE", Side::Short, 1, Exchange::Shfe, "CU", 1.0);
        let mut acc = NettingAccumulator::new(2);
        acc.add(&long, &[100.0, 40.0]);
        acc.add(&short, &[60.0, 90.0]);
        let netted = acc.finish();
        assert_eq!(netted, vec![100.0, 90.0]);
    }

    #[test]
    fn test_accumulator_without_netting_groups_is_plain_sum() {
        let leg = future_leg("A1", "M2401.DCE", Side::Long, 1, Exchange::Dce, "M", 1.0);
        let option = short_etf_option("A1", "10004356.SH");
        let mut acc = NettingAccumulator::new(2);
        acc.add(&leg, &[10.0, 20.0]);
        acc.add(&option, &[5.0, 5.0]);
        assert_eq!(acc.finish(), vec![15.0, 25.0]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arbitrary_legs() -> impl Strategy<Value = Vec<Leg>> {
            let leg = (
                prop::sample::select(vec!["CU", "AL", "RB"]),
                prop::bool::ANY,
                1u64..5,
                1u32..50,
            )
                .prop_map(|(variety, long, quantity, margin)| {
                    let side = if long { Side::Long } else { Side::Short };
                    future_leg(
                        "A1",
                        &format!("{}2401.SHFE", variety),
                        side,
                        quantity,
                        Exchange::Shfe,
                        variety,
                        margin as f64 * 1000.0,
                    )
                });
            prop::collection::vec(leg, 0..8)
        }

        proptest! {
            // Applying the pass twice is the same as applying it once.
            #[test]
            fn single_side_netting_is_idempotent(mut legs in arbitrary_legs()) {
                apply_single_side(&mut legs);
                let once = legs.clone();
                apply_single_side(&mut legs);
                prop_assert_eq!(once, legs);
            }

            // Per variety, exactly one side survives with margin (when
            // both sides are present).
            #[test]
            fn at_most_one_side_keeps_margin(mut legs in arbitrary_legs()) {
                apply_single_side(&mut legs);
                for variety in ["CU", "AL", "RB"] {
                    let kept_sides: std::collections::HashSet<Side> = legs
                        .iter()
                        .filter(|l| l.variety.as_str() == variety && l.margin > 0.0)
                        .map(|l| l.side)
                        .collect();
                    prop_assert!(kept_sides.len() <= 1, "variety {}", variety);
                }
            }
        }
    }
}
