//! Position-code grammar.
//!
//! A position code has the form `"<symbol>.<alias>"`, e.g. `M2401.DCE`,
//! `IF2406.CFE` or `510050C2312M03000.SH`. Parsing yields the venue, the
//! instrument class, and the variety symbol:
//!
//! - CFFEX futures are `IF|IC|IM|IH` + 4 digits; CFFEX options are
//!   `IO|MO|HO` + 4 digits + strike suffix, keeping the raw prefix as
//!   variety.
//! - SSE/SZSE symbols are options when they are 8 digits or 6 digits
//!   followed by a `C`/`P`/`-C-`/`-P-` marker; the variety is the
//!   synthetic `ETF` tag.
//! - Commodity symbols are futures when an alphabetic prefix is followed
//!   by exactly 4 digits, options when a strike marker follows; the
//!   variety is the upper-cased prefix.
//!
//! # Examples
//!
//! ```
//! use margin_core::parse::parse_position_code;
//! use margin_core::types::{Exchange, PositionType};
//!
//! let parsed = parse_position_code("m2401.DCE").unwrap();
//! assert_eq!(parsed.exchange, Exchange::Dce);
//! assert_eq!(parsed.position_type, PositionType::Future);
//! assert_eq!(parsed.variety.as_str(), "M");
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{CodeError, Exchange, PositionType, Variety};

static CFFEX_FUTURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(IF|IC|IM|IH)[0-9]{4}$").unwrap());
static CFFEX_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(IO|MO|HO)[0-9]{4}.+$").unwrap());
static ETF_OPTION_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{8}$").unwrap());
static ETF_OPTION_MARKED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{6}(C|P|-C-|-P-).").unwrap());
static COMMODITY_FUTURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)[0-9]{4}$").unwrap());
static COMMODITY_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)[0-9]{4}(C|P|-C-|-P-).").unwrap());

/// The taxonomy triple extracted from a position code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCode {
    /// Venue the symbol trades on
    pub exchange: Exchange,
    /// Instrument class
    pub position_type: PositionType,
    /// Asset-family symbol (synthetic `ETF` for SSE/SZSE options)
    pub variety: Variety,
}

/// Parses a `"<symbol>.<alias>"` position code.
///
/// # Errors
///
/// - [`CodeError::UnknownExchange`] when the alias is not recognised
/// - [`CodeError::InvalidCode`] when the code has no `.` separator or the
///   symbol matches no grammar for its exchange
pub fn parse_position_code(code: &str) -> Result<ParsedCode, CodeError> {
    let (symbol, alias) = code
        .split_once('.')
        .ok_or_else(|| CodeError::InvalidCode(code.to_string()))?;
    if symbol.is_empty() || alias.contains('.') {
        return Err(CodeError::InvalidCode(code.to_string()));
    }
    let exchange = Exchange::from_code(alias)?;

    let classified = match exchange {
        Exchange::Cffex => {
            if let Some(caps) = CFFEX_FUTURE.captures(symbol) {
                Some((PositionType::Future, Variety::new(&caps[1])))
            } else {
                CFFEX_OPTION
                    .captures(symbol)
                    .map(|caps| (PositionType::Option, Variety::new(&caps[1])))
            }
        }
        Exchange::Sse | Exchange::Szse => {
            if ETF_OPTION_NUMERIC.is_match(symbol) || ETF_OPTION_MARKED.is_match(symbol) {
                Some((PositionType::Option, Variety::etf()))
            } else {
                None
            }
        }
        Exchange::Shfe | Exchange::Czce | Exchange::Dce | Exchange::Gfex => {
            if let Some(caps) = COMMODITY_FUTURE.captures(symbol) {
                Some((PositionType::Future, Variety::new(&caps[1])))
            } else {
                COMMODITY_OPTION
                    .captures(symbol)
                    .map(|caps| (PositionType::Option, Variety::new(&caps[1])))
            }
        }
    };

    let (position_type, variety) =
        classified.ok_or_else(|| CodeError::InvalidCode(code.to_string()))?;
    Ok(ParsedCode {
        exchange,
        position_type,
        variety,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> ParsedCode {
        parse_position_code(code).unwrap()
    }

    #[test]
    fn test_cffex_future() {
        let parsed = parse("IF2406.CFE");
        assert_eq!(parsed.exchange, Exchange::Cffex);
        assert_eq!(parsed.position_type, PositionType::Future);
        assert_eq!(parsed.variety.as_str(), "IF");
    }

    #[test]
    fn test_cffex_option_keeps_raw_prefix() {
        let parsed = parse("IO2406-C-3800.CCFX");
        assert_eq!(parsed.exchange, Exchange::Cffex);
        assert_eq!(parsed.position_type, PositionType::Option);
        assert_eq!(parsed.variety.as_str(), "IO");

        let parsed = parse("MO2406-P-5200.CFE");
        assert_eq!(parsed.variety.as_str(), "MO");
    }

    #[test]
    fn test_cffex_unrecognised_symbol() {
        assert!(parse_position_code("AB2406.CFE").is_err());
        // A bare option prefix with no strike suffix is not a contract.
        assert!(parse_position_code("IO2406.CFE").is_err());
    }

    #[test]
    fn test_etf_option_numeric_symbol() {
        let parsed = parse("10004356.SH");
        assert_eq!(parsed.exchange, Exchange::Sse);
        assert_eq!(parsed.position_type, PositionType::Option);
        assert_eq!(parsed.variety.as_str(), "ETF");
    }

    #[test]
    fn test_etf_option_marked_symbol() {
        let parsed = parse("510050C2312M03000.XSHG");
        assert_eq!(parsed.exchange, Exchange::Sse);
        assert_eq!(parsed.position_type, PositionType::Option);

        let parsed = parse("159915-P-2312-1750.SZ");
        assert_eq!(parsed.exchange, Exchange::Szse);
        assert_eq!(parsed.position_type, PositionType::Option);
        assert_eq!(parsed.variety.as_str(), "ETF");
    }

    #[test]
    fn test_etf_plain_equity_symbol_rejected() {
        // A 6-digit cash-equity symbol is neither a future nor an option.
        assert!(parse_position_code("510050.SH").is_err());
    }

    #[test]
    fn test_commodity_future() {
        let parsed = parse("cu2403.SHFE");
        assert_eq!(parsed.exchange, Exchange::Shfe);
        assert_eq!(parsed.position_type, PositionType::Future);
        assert_eq!(parsed.variety.as_str(), "CU");

        let parsed = parse("M2405.XDCE");
        assert_eq!(parsed.exchange, Exchange::Dce);
        assert_eq!(parsed.variety.as_str(), "M");
    }

    #[test]
    fn test_commodity_option() {
        let parsed = parse("m2405-C-3100.DCE");
        assert_eq!(parsed.exchange, Exchange::Dce);
        assert_eq!(parsed.position_type, PositionType::Option);
        assert_eq!(parsed.variety.as_str(), "M");

        let parsed = parse("SR2405C6000.CZCE");
        assert_eq!(parsed.exchange, Exchange::Czce);
        assert_eq!(parsed.position_type, PositionType::Option);
        assert_eq!(parsed.variety.as_str(), "SR");
    }

    #[test]
    fn test_missing_separator() {
        assert!(matches!(
            parse_position_code("M2401DCE"),
            Err(CodeError::InvalidCode(_))
        ));
    }

    #[test]
    fn test_unknown_exchange_alias() {
        assert!(matches!(
            parse_position_code("M2401.ICE"),
            Err(CodeError::UnknownExchange(_))
        ));
    }

    #[test]
    fn test_extra_separator_rejected() {
        assert!(parse_position_code("M2401.DCE.L").is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Every well-formed commodity futures code parses, with the
            // upper-cased prefix as its variety.
            #[test]
            fn commodity_future_codes_always_parse(
                prefix in "[A-Za-z]{1,2}",
                digits in "[0-9]{4}",
                alias in prop::sample::select(vec!["SHFE", "CZCE", "DCE", "GFEX"]),
            ) {
                let code = format!("{}{}.{}", prefix, digits, alias);
                let parsed = parse_position_code(&code).unwrap();
                prop_assert_eq!(parsed.position_type, PositionType::Future);
                prop_assert_eq!(parsed.variety.as_str(), prefix.to_ascii_uppercase());
            }

            // Every well-formed commodity option code parses as an option
            // of the same variety.
            #[test]
            fn commodity_option_codes_always_parse(
                prefix in "[A-Za-z]{1,2}",
                digits in "[0-9]{4}",
                marker in prop::sample::select(vec!["C", "P", "-C-", "-P-"]),
                strike in "[0-9]{3,5}",
            ) {
                let code = format!("{}{}{}{}.DCE", prefix, digits, marker, strike);
                let parsed = parse_position_code(&code).unwrap();
                prop_assert_eq!(parsed.exchange, Exchange::Dce);
                prop_assert_eq!(parsed.position_type, PositionType::Option);
                prop_assert_eq!(parsed.variety.as_str(), prefix.to_ascii_uppercase());
            }

            // The parser never panics on arbitrary input.
            #[test]
            fn arbitrary_input_never_panics(code in ".{0,40}") {
                let _ = parse_position_code(&code);
            }
        }
    }
}
