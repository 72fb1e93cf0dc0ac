//! Per-account optimisation engine.
//!
//! Groups normalised legs by `(exchange, account)` and, per group:
//!
//! - **CFFEX / SHFE**: single-side netting (already applied by the
//!   normaliser) *is* the optimisation; the legs pass through as
//!   residual rows.
//! - **Everything else**: enumerate leg pairs `(i, j)`, `i < j`, over
//!   the group sorted by `code_dir`, keep catalog matches with positive
//!   saving, and solve the capacity-constrained selection MILP.
//!
//! Groups are independent pure functions of their own legs, so they are
//! evaluated in parallel with rayon.

use std::collections::BTreeMap;

use margin_core::types::{Exchange, PositionType};
use margin_models::holdings::Leg;
use margin_models::strategies::{analyse_pair, StrategyInstance, StrategyKind};
use rayon::prelude::*;
use tracing::debug;

use crate::error::OptimiserError;
use crate::milp::{solve_milp, MilpConfig, MilpProblem};

/// Engine options.
#[derive(Clone, Debug)]
pub struct OptimiserOptions {
    /// Closing-session flag; enables the SSE/SZSE auto-hedge variant.
    pub is_close: bool,
    /// Keep residual rows whose remaining quantity is zero.
    pub keep_exhausted: bool,
    /// MILP driver budgets.
    pub milp: MilpConfig,
}

impl Default for OptimiserOptions {
    fn default() -> Self {
        Self {
            is_close: false,
            keep_exhausted: false,
            milp: MilpConfig::default(),
        }
    }
}

/// One row of an optimised holding: a residual leg or a selected
/// strategy with its count.
#[derive(Clone, Debug, PartialEq)]
pub enum HoldingEntry {
    /// A leg (or what is left of it after strategy assignment).
    Leg {
        /// Leg identifier (`code + ".L"|".S"`)
        code_dir: String,
        /// Instrument class
        position_type: PositionType,
        /// Remaining quantity
        quantity: u64,
        /// Per-unit margin
        margin: f64,
    },
    /// A selected combination strategy.
    Strategy {
        /// The pair's leg identifiers, normalised order
        legs: (String, String),
        /// Variant tag
        kind: StrategyKind,
        /// Registered count
        quantity: u64,
        /// Combined per-unit margin
        margin: f64,
    },
}

impl HoldingEntry {
    /// Quantity-scaled margin of this row.
    pub fn total_margin(&self) -> f64 {
        match self {
            HoldingEntry::Leg {
                quantity, margin, ..
            }
            | HoldingEntry::Strategy {
                quantity, margin, ..
            } => margin * *quantity as f64,
        }
    }

    /// Registered quantity of this row.
    pub fn quantity(&self) -> u64 {
        match self {
            HoldingEntry::Leg { quantity, .. } | HoldingEntry::Strategy { quantity, .. } => {
                *quantity
            }
        }
    }
}

/// Optimisation result for one `(exchange, account)` group.
#[derive(Clone, Debug, PartialEq)]
pub struct AccountOptimisation {
    /// Venue of the group
    pub exchange: Exchange,
    /// Account of the group
    pub account: String,
    /// Residual legs followed by selected strategies
    pub entries: Vec<HoldingEntry>,
}

impl AccountOptimisation {
    /// Total posted margin of the group.
    pub fn total_margin(&self) -> f64 {
        self.entries.iter().map(HoldingEntry::total_margin).sum()
    }
}

/// A candidate strategy instance bound to its leg indexes.
struct Candidate {
    leg1: usize,
    leg2: usize,
    strategy: StrategyInstance,
}

/// Optimises every `(exchange, account)` group of a normalised holding.
///
/// Groups come back sorted by exchange then account. Accounts with no
/// optimisable pair simply report their legs unchanged; an empty input
/// yields an empty report.
pub fn optimise_accounts(
    legs: &[Leg],
    options: &OptimiserOptions,
) -> Result<Vec<AccountOptimisation>, OptimiserError> {
    let mut groups: BTreeMap<(Exchange, String), Vec<&Leg>> = BTreeMap::new();
    for leg in legs {
        groups
            .entry((leg.exchange, leg.account.clone()))
            .or_default()
            .push(leg);
    }

    // Materialise the groups so the parallel collect keeps the sorted
    // (exchange, account) report order.
    let groups: Vec<((Exchange, String), Vec<&Leg>)> = groups.into_iter().collect();
    groups
        .into_par_iter()
        .map(|((exchange, account), mut group)| {
            group.sort_by(|a, b| a.code_dir.cmp(&b.code_dir));
            optimise_group(exchange, &account, &group, options)
        })
        .collect()
}

fn residual_entry(leg: &Leg, quantity: u64) -> HoldingEntry {
    HoldingEntry::Leg {
        code_dir: leg.code_dir.clone(),
        position_type: leg.position_type(),
        quantity,
        margin: leg.margin,
    }
}

/// Optimises one sorted group.
fn optimise_group(
    exchange: Exchange,
    account: &str,
    group: &[&Leg],
    options: &OptimiserOptions,
) -> Result<AccountOptimisation, OptimiserError> {
    // CFFEX/SHFE: netting is the optimisation.
    if exchange.nets_single_side() {
        return Ok(AccountOptimisation {
            exchange,
            account: account.to_string(),
            entries: group
                .iter()
                .map(|leg| residual_entry(leg, leg.quantity))
                .collect(),
        });
    }

    let candidates = enumerate_candidates(group, options.is_close);
    debug!(
        %exchange,
        account,
        legs = group.len(),
        candidates = candidates.len(),
        "optimising account group"
    );

    if candidates.is_empty() {
        return Ok(AccountOptimisation {
            exchange,
            account: account.to_string(),
            entries: group
                .iter()
                .map(|leg| residual_entry(leg, leg.quantity))
                .collect(),
        });
    }

    // Incidence matrix: one capacity row per leg, one column per
    // candidate, 1 where the candidate consumes the leg.
    let mut constraints = vec![vec![0.0; candidates.len()]; group.len()];
    for (j, candidate) in candidates.iter().enumerate() {
        constraints[candidate.leg1][j] = 1.0;
        constraints[candidate.leg2][j] = 1.0;
    }
    let problem = MilpProblem {
        objective: candidates
            .iter()
            .map(|c| c.strategy.margin_saving)
            .collect(),
        constraints,
        upper: group.iter().map(|leg| leg.quantity as f64).collect(),
    };

    let result = solve_milp(&problem, &options.milp)
        .map_err(|e| OptimiserError::optimisation_failed(account, exchange.code(), e))?;

    // Residual legs first, then selected strategies.
    let mut entries = Vec::new();
    for (i, leg) in group.iter().enumerate() {
        let consumed: u64 = candidates
            .iter()
            .zip(&result.x)
            .filter(|(c, _)| c.leg1 == i || c.leg2 == i)
            .map(|(_, &count)| count)
            .sum();
        debug_assert!(consumed <= leg.quantity, "capacity violated");
        let remaining = leg.quantity - consumed;
        if remaining > 0 || options.keep_exhausted {
            entries.push(residual_entry(leg, remaining));
        }
    }
    for (candidate, &count) in candidates.iter().zip(&result.x) {
        if count > 0 {
            entries.push(HoldingEntry::Strategy {
                legs: candidate.strategy.legs.clone(),
                kind: candidate.strategy.kind,
                quantity: count,
                margin: candidate.strategy.margin,
            });
        }
    }

    Ok(AccountOptimisation {
        exchange,
        account: account.to_string(),
        entries,
    })
}

/// Enumerates valid, saving-positive strategy instances over the sorted
/// group. Pairs are visited `(i, j)` with `i < j`; every family's
/// normalisation swap makes the visit order immaterial beyond that.
fn enumerate_candidates(group: &[&Leg], is_close: bool) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for i in 0..group.len() {
        if !matches!(
            group[i].position_type(),
            PositionType::Future | PositionType::Option
        ) {
            continue;
        }
        for j in (i + 1)..group.len() {
            if !matches!(
                group[j].position_type(),
                PositionType::Future | PositionType::Option
            ) {
                continue;
            }
            if let Some(strategy) = analyse_pair(group[i], group[j], is_close) {
                if strategy.margin_saving > 0.0 {
                    candidates.push(Candidate {
                        leg1: i,
                        leg2: j,
                        strategy,
                    });
                }
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use margin_core::types::{Side, Variety};
    use margin_models::holdings::FutureTerms;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    fn dce_future(code: &str, side: Side, quantity: u64, close: f64) -> Leg {
        Leg::future(
            "A1",
            code,
            side,
            quantity,
            Exchange::Dce,
            Variety::new("M"),
            FutureTerms {
                multiplier: 10.0,
                close_price: close,
                last_tradedate: date(),
            },
            0.1,
        )
    }

    #[test]
    fn test_empty_holding() {
        let result = optimise_accounts(&[], &OptimiserOptions::default()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_single_leg_passes_through() {
        let legs = vec![dce_future("M2401.DCE", Side::Long, 3, 3000.0)];
        let result = optimise_accounts(&legs, &OptimiserOptions::default()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].entries.len(), 1);
        assert_eq!(
            result[0].entries[0],
            HoldingEntry::Leg {
                code_dir: "M2401.DCE.L".to_string(),
                position_type: PositionType::Future,
                quantity: 3,
                margin: 3000.0,
            }
        );
    }

    #[test]
    fn test_groups_split_by_account() {
        let mut a = dce_future("M2401.DCE", Side::Long, 1, 3000.0);
        a.account = "A1".to_string();
        let mut b = dce_future("M2401.DCE", Side::Long, 1, 3000.0);
        b.account = "A2".to_string();
        let result = optimise_accounts(&[a, b], &OptimiserOptions::default()).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].account, "A1");
        assert_eq!(result[1].account, "A2");
    }

    #[test]
    fn test_exhausted_residuals_filtered_by_default() {
        let legs = vec![
            dce_future("M2401.DCE", Side::Long, 2, 3000.0),
            dce_future("M2405.DCE", Side::Short, 2, 3000.0),
        ];
        let result = optimise_accounts(&legs, &OptimiserOptions::default()).unwrap();
        assert_eq!(result[0].entries.len(), 1);
        assert!(matches!(
            result[0].entries[0],
            HoldingEntry::Strategy { quantity: 2, .. }
        ));

        let keep = OptimiserOptions {
            keep_exhausted: true,
            ..OptimiserOptions::default()
        };
        let result = optimise_accounts(&legs, &keep).unwrap();
        assert_eq!(result[0].entries.len(), 3);
    }
}
