//! Holding normalisation.
//!
//! Turns gross broker rows into per-direction [`Leg`] records:
//!
//! 1. Classify each code into (exchange, type, variety).
//! 2. Split rows holding both directions into two legs; drop zero sides;
//!    short quantities arrive non-positive and are negated.
//! 3. Join the matching market-data table by symbol.
//! 4. Join the margin-ratio table by variety and compute the per-leg
//!    initial margin.
//! 5. Apply single-side netting per account (CFFEX and SHFE futures).
//!
//! The normaliser aborts on the first unclassifiable code or failed join.

use std::collections::HashMap;

use margin_core::parse::parse_position_code;
use margin_core::types::{Exchange, PositionType, Side, Variety};
use tracing::debug;

use super::{
    FutureQuote, FutureTerms, HoldingError, Leg, MarginRatioTable, OptionQuote, OptionTerms,
    RawPosition,
};
use crate::netting;

/// The four optional market-data tables, one per asset class.
///
/// Commodity feeds publish `contract_unit` for the contract size; the
/// loader renames it to `multiplier` before quotes land here, so the two
/// futures (and two options) tables are interchangeable at this level.
#[derive(Clone, Debug, Default)]
pub struct MarketData {
    /// Equity-venue futures quotes (CFFEX index futures)
    pub equity_futures: Vec<FutureQuote>,
    /// Commodity-venue futures quotes
    pub commodity_futures: Vec<FutureQuote>,
    /// Equity-venue option quotes (ETF and index options)
    pub equity_options: Vec<OptionQuote>,
    /// Commodity-venue option quotes
    pub commodity_options: Vec<OptionQuote>,
}

impl MarketData {
    fn future_index(&self) -> HashMap<&str, &FutureQuote> {
        self.equity_futures
            .iter()
            .chain(self.commodity_futures.iter())
            .map(|q| (q.code.as_str(), q))
            .collect()
    }

    fn option_index(&self) -> HashMap<&str, &OptionQuote> {
        self.equity_options
            .iter()
            .chain(self.commodity_options.iter())
            .map(|q| (q.code.as_str(), q))
            .collect()
    }
}

/// Whether the margin formulas reference the per-variety ratio for this
/// leg. SSE/SZSE option margins carry their own floors.
fn needs_margin_ratio(exchange: Exchange, position_type: PositionType) -> bool {
    match position_type {
        PositionType::Future => true,
        PositionType::Option => !matches!(exchange, Exchange::Sse | Exchange::Szse),
        PositionType::Stock => false,
    }
}

fn lookup_margin_ratio(
    ratios: &MarginRatioTable,
    variety: &Variety,
    exchange: Exchange,
    position_type: PositionType,
    code: &str,
) -> Result<f64, HoldingError> {
    if needs_margin_ratio(exchange, position_type) {
        ratios
            .get(variety)
            .ok_or_else(|| HoldingError::missing_market_data(code, "margin_ratio"))
    } else {
        Ok(0.0)
    }
}

/// Normalises raw broker holdings into per-direction legs.
///
/// Output legs are grouped by account in input order, with single-side
/// netting already applied; they are immutable inputs to the optimiser
/// and the stress engine from here on.
///
/// # Errors
///
/// - [`HoldingError::Code`] when a position code cannot be classified
/// - [`HoldingError::MissingMarketData`] when a held contract has no
///   quote row or no margin ratio where one is required
pub fn normalise_holdings(
    raw: &[RawPosition],
    market: &MarketData,
    ratios: &MarginRatioTable,
) -> Result<Vec<Leg>, HoldingError> {
    let futures = market.future_index();
    let options = market.option_index();

    let mut legs = Vec::new();
    for position in raw {
        let parsed = parse_position_code(&position.code)?;

        let mut sides = Vec::with_capacity(2);
        if position.long_quantity > 0 {
            sides.push((Side::Long, position.long_quantity as u64));
        }
        if position.short_quantity < 0 {
            sides.push((Side::Short, position.short_quantity.unsigned_abs()));
        }

        for (side, quantity) in sides {
            let margin_ratio = lookup_margin_ratio(
                ratios,
                &parsed.variety,
                parsed.exchange,
                parsed.position_type,
                &position.code,
            )?;
            let leg = match parsed.position_type {
                PositionType::Future => {
                    let quote = futures.get(position.code.as_str()).ok_or_else(|| {
                        HoldingError::missing_market_data(&position.code, "futures quote")
                    })?;
                    Leg::future(
                        &position.account,
                        &position.code,
                        side,
                        quantity,
                        parsed.exchange,
                        parsed.variety.clone(),
                        FutureTerms {
                            multiplier: quote.multiplier,
                            close_price: quote.close_price,
                            last_tradedate: quote.last_tradedate,
                        },
                        margin_ratio,
                    )
                }
                PositionType::Option => {
                    let quote = options.get(position.code.as_str()).ok_or_else(|| {
                        HoldingError::missing_market_data(&position.code, "options quote")
                    })?;
                    Leg::option(
                        &position.account,
                        &position.code,
                        side,
                        quantity,
                        parsed.exchange,
                        parsed.variety.clone(),
                        OptionTerms {
                            underlying: quote.underlying_code.clone(),
                            underlying_price: quote.underlying_price,
                            strike_price: quote.strike_price,
                            kind: quote.kind,
                            multiplier: quote.multiplier,
                            close_price: quote.close_price,
                            last_tradedate: quote.last_tradedate,
                            delta: quote.delta,
                            gamma: quote.gamma,
                        },
                        margin_ratio,
                    )
                }
                PositionType::Stock => {
                    return Err(HoldingError::Code(
                        margin_core::types::CodeError::InvalidCode(position.code.clone()),
                    ))
                }
            };
            legs.push(leg);
        }
    }

    netting::apply_single_side(&mut legs);
    debug!(legs = legs.len(), "normalised holdings");
    Ok(legs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use margin_core::types::OptionKind;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    fn meal_future_quote(code: &str, close: f64) -> FutureQuote {
        FutureQuote {
            code: code.to_string(),
            last_tradedate: date(),
            multiplier: 10.0,
            close_price: close,
        }
    }

    fn meal_option_quote(code: &str, kind: OptionKind, strike: f64) -> OptionQuote {
        OptionQuote {
            code: code.to_string(),
            underlying_code: "M2405.DCE".to_string(),
            last_tradedate: date(),
            kind,
            strike_price: strike,
            multiplier: 10.0,
            close_price: 40.0,
            underlying_price: 3000.0,
            delta: 0.5,
            gamma: 0.001,
        }
    }

    fn ratios() -> MarginRatioTable {
        MarginRatioTable::from_pairs([(Variety::new("M"), 0.07)])
    }

    #[test]
    fn test_split_both_directions() {
        let raw = vec![RawPosition {
            account: "A1".to_string(),
            code: "M2405.DCE".to_string(),
            long_quantity: 3,
            short_quantity: -2,
        }];
        let market = MarketData {
            commodity_futures: vec![meal_future_quote("M2405.DCE", 3000.0)],
            ..Default::default()
        };
        let legs = normalise_holdings(&raw, &market, &ratios()).unwrap();
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].code_dir, "M2405.DCE.L");
        assert_eq!(legs[0].quantity, 3);
        assert_eq!(legs[1].code_dir, "M2405.DCE.S");
        assert_eq!(legs[1].quantity, 2);
        // DCE does not net single-side; both legs keep their margin.
        assert!(legs.iter().all(|l| l.margin > 0.0));
    }

    #[test]
    fn test_zero_side_dropped() {
        let raw = vec![RawPosition {
            account: "A1".to_string(),
            code: "M2405.DCE".to_string(),
            long_quantity: 5,
            short_quantity: 0,
        }];
        let market = MarketData {
            commodity_futures: vec![meal_future_quote("M2405.DCE", 3000.0)],
            ..Default::default()
        };
        let legs = normalise_holdings(&raw, &market, &ratios()).unwrap();
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].side, Side::Long);
    }

    #[test]
    fn test_option_join_and_margin() {
        let raw = vec![RawPosition {
            account: "A1".to_string(),
            code: "M2405-C-3100.DCE".to_string(),
            long_quantity: 0,
            short_quantity: -1,
        }];
        let market = MarketData {
            commodity_options: vec![meal_option_quote(
                "M2405-C-3100.DCE",
                OptionKind::Call,
                3100.0,
            )],
            ..Default::default()
        };
        let legs = normalise_holdings(&raw, &market, &ratios()).unwrap();
        assert_eq!(legs.len(), 1);
        let leg = &legs[0];
        assert_eq!(leg.side, Side::Short);
        assert_eq!(leg.underlying(), "M2405.DCE");
        // otm = 100, udl_margin = 210 -> 10 * (40 + 210 - 50)
        approx::assert_relative_eq!(leg.margin, 10.0 * 200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_quote_errors() {
        let raw = vec![RawPosition {
            account: "A1".to_string(),
            code: "M2405.DCE".to_string(),
            long_quantity: 1,
            short_quantity: 0,
        }];
        let err = normalise_holdings(&raw, &MarketData::default(), &ratios()).unwrap_err();
        assert!(err.is_missing_market_data());
    }

    #[test]
    fn test_missing_margin_ratio_errors() {
        let raw = vec![RawPosition {
            account: "A1".to_string(),
            code: "CU2403.SHFE".to_string(),
            long_quantity: 1,
            short_quantity: 0,
        }];
        let market = MarketData {
            commodity_futures: vec![FutureQuote {
                code: "CU2403.SHFE".to_string(),
                last_tradedate: date(),
                multiplier: 5.0,
                close_price: 70000.0,
            }],
            ..Default::default()
        };
        let err = normalise_holdings(&raw, &market, &ratios()).unwrap_err();
        assert_eq!(
            err,
            HoldingError::missing_market_data("CU2403.SHFE", "margin_ratio")
        );
    }

    #[test]
    fn test_invalid_code_aborts() {
        let raw = vec![RawPosition {
            account: "A1".to_string(),
            code: "garbage".to_string(),
            long_quantity: 1,
            short_quantity: 0,
        }];
        let err = normalise_holdings(&raw, &MarketData::default(), &ratios()).unwrap_err();
        assert!(err.is_code_error());
    }

    #[test]
    fn test_etf_option_needs_no_ratio() {
        let raw = vec![RawPosition {
            account: "A1".to_string(),
            code: "10004356.SH".to_string(),
            long_quantity: 0,
            short_quantity: -1,
        }];
        let market = MarketData {
            equity_options: vec![OptionQuote {
                code: "10004356.SH".to_string(),
                underlying_code: "510050.SH".to_string(),
                last_tradedate: date(),
                kind: OptionKind::Call,
                strike_price: 3.0,
                multiplier: 10000.0,
                close_price: 0.1,
                underlying_price: 3.0,
                delta: 0.5,
                gamma: 0.01,
            }],
            ..Default::default()
        };
        // Empty ratio table is fine for ETF options.
        let legs = normalise_holdings(&raw, &market, &MarginRatioTable::new()).unwrap();
        approx::assert_relative_eq!(legs[0].margin, 10000.0 * (0.1 + 0.36), epsilon = 1e-9);
    }

    #[test]
    fn test_shfe_netting_applied() {
        let raw = vec![RawPosition {
            account: "A1".to_string(),
            code: "CU2403.SHFE".to_string(),
            long_quantity: 3,
            short_quantity: -1,
        }];
        let market = MarketData {
            commodity_futures: vec![FutureQuote {
                code: "CU2403.SHFE".to_string(),
                last_tradedate: date(),
                multiplier: 5.0,
                close_price: 70000.0,
            }],
            ..Default::default()
        };
        let ratios = MarginRatioTable::from_pairs([(Variety::new("CU"), 0.1)]);
        let legs = normalise_holdings(&raw, &market, &ratios).unwrap();
        let long = legs.iter().find(|l| l.side == Side::Long).unwrap();
        let short = legs.iter().find(|l| l.side == Side::Short).unwrap();
        assert!(long.margin > 0.0);
        assert_eq!(short.margin, 0.0);
        assert_eq!(short.total_margin, 0.0);
    }
}
