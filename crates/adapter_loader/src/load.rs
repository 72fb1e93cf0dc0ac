//! CSV table readers.

use std::path::Path;

use margin_core::types::OptionKind;
use margin_models::holdings::{FutureQuote, MarginRatioTable, OptionQuote, RawPosition};
use margin_core::types::Variety;
use margin_risk::{AccountEquityTable, CovarianceTable, DriftTable, SupplementSchedule};
use tracing::debug;

use crate::error::LoaderError;
use crate::records::{
    AccountRecord, CommodityFutureQuoteRecord, CommodityOptionQuoteRecord, DriftRecord,
    FutureQuoteRecord, HoldingRecord, MarginRatioRecord, OptionQuoteRecord,
};

/// Which feed a quote table comes from; commodity feeds publish
/// `contract_unit` for the contract size.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QuoteFlavour {
    /// Equity-venue feed (`multiplier` column)
    Equity,
    /// Commodity-venue feed (`contract_unit` column)
    Commodity,
}

fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>, LoaderError> {
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?)
}

fn parse_call_put(flag: &str, table: &'static str) -> Result<OptionKind, LoaderError> {
    match flag.to_ascii_lowercase().as_str() {
        "call" | "c" => Ok(OptionKind::Call),
        "put" | "p" => Ok(OptionKind::Put),
        other => Err(LoaderError::invalid_field(
            table,
            format!("call_put = {:?}", other),
        )),
    }
}

/// Loads gross holdings.
pub fn load_holdings(path: impl AsRef<Path>) -> Result<Vec<RawPosition>, LoaderError> {
    let mut rows = Vec::new();
    for record in reader(path.as_ref())?.deserialize() {
        let record: HoldingRecord = record?;
        rows.push(RawPosition {
            account: record.account,
            code: record.code,
            long_quantity: record.long_quantity,
            short_quantity: record.short_quantity,
        });
    }
    debug!(rows = rows.len(), path = %path.as_ref().display(), "loaded holdings");
    Ok(rows)
}

/// Loads a futures quote table.
pub fn load_future_quotes(
    path: impl AsRef<Path>,
    flavour: QuoteFlavour,
) -> Result<Vec<FutureQuote>, LoaderError> {
    let mut quotes = Vec::new();
    match flavour {
        QuoteFlavour::Equity => {
            for record in reader(path.as_ref())?.deserialize() {
                let record: FutureQuoteRecord = record?;
                quotes.push(FutureQuote {
                    code: record.future_code,
                    last_tradedate: record.last_tradedate,
                    multiplier: record.multiplier,
                    close_price: record.close_price,
                });
            }
        }
        QuoteFlavour::Commodity => {
            for record in reader(path.as_ref())?.deserialize() {
                let record: CommodityFutureQuoteRecord = record?;
                quotes.push(FutureQuote {
                    code: record.future_code,
                    last_tradedate: record.last_tradedate,
                    multiplier: record.contract_unit,
                    close_price: record.close_price,
                });
            }
        }
    }
    Ok(quotes)
}

/// Loads an option quote table.
pub fn load_option_quotes(
    path: impl AsRef<Path>,
    flavour: QuoteFlavour,
) -> Result<Vec<OptionQuote>, LoaderError> {
    let mut quotes = Vec::new();
    match flavour {
        QuoteFlavour::Equity => {
            for record in reader(path.as_ref())?.deserialize() {
                let record: OptionQuoteRecord = record?;
                quotes.push(OptionQuote {
                    kind: parse_call_put(&record.call_put, "option quotes")?,
                    code: record.option_code,
                    underlying_code: record.option_mark_code,
                    last_tradedate: record.last_tradedate,
                    strike_price: record.strike_price,
                    multiplier: record.multiplier,
                    close_price: record.close_price,
                    underlying_price: record.udl_price,
                    delta: record.delta,
                    gamma: record.gamma,
                });
            }
        }
        QuoteFlavour::Commodity => {
            for record in reader(path.as_ref())?.deserialize() {
                let record: CommodityOptionQuoteRecord = record?;
                quotes.push(OptionQuote {
                    kind: parse_call_put(&record.call_put, "option quotes")?,
                    code: record.option_code,
                    underlying_code: record.option_mark_code,
                    last_tradedate: record.last_tradedate,
                    strike_price: record.strike_price,
                    multiplier: record.contract_unit,
                    close_price: record.close_price,
                    underlying_price: record.udl_price,
                    delta: record.delta,
                    gamma: record.gamma,
                });
            }
        }
    }
    Ok(quotes)
}

/// Loads the per-variety margin-ratio table.
pub fn load_margin_ratios(path: impl AsRef<Path>) -> Result<MarginRatioTable, LoaderError> {
    let mut table = MarginRatioTable::new();
    for record in reader(path.as_ref())?.deserialize() {
        let record: MarginRatioRecord = record?;
        table.insert(Variety::new(&record.variety), record.margin_ratio);
    }
    Ok(table)
}

/// Loads the square covariance table (first column names the row's
/// underlying; remaining columns must match the row labels in order).
pub fn load_covariance(path: impl AsRef<Path>) -> Result<CovarianceTable, LoaderError> {
    let mut reader = reader(path.as_ref())?;
    let headers = reader.headers()?.clone();
    let labels: Vec<String> = headers.iter().skip(1).map(|s| s.to_string()).collect();
    if labels.is_empty() {
        return Err(LoaderError::invalid_shape(
            "covariance",
            "no underlying columns",
        ));
    }

    let n = labels.len();
    let mut data = vec![0.0; n * n];
    let mut row_count = 0usize;
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        if i >= n {
            return Err(LoaderError::invalid_shape(
                "covariance",
                format!("more than {} rows", n),
            ));
        }
        let row_label = record.get(0).unwrap_or_default();
        if row_label != labels[i] {
            return Err(LoaderError::invalid_shape(
                "covariance",
                format!("row {} is {:?}, expected {:?}", i, row_label, labels[i]),
            ));
        }
        if record.len() != n + 1 {
            return Err(LoaderError::invalid_shape(
                "covariance",
                format!("row {} has {} fields, expected {}", i, record.len(), n + 1),
            ));
        }
        for j in 0..n {
            let field = record.get(j + 1).unwrap_or_default();
            data[i * n + j] = field.parse::<f64>().map_err(|_| {
                LoaderError::invalid_field(
                    "covariance",
                    format!("({}, {}) = {:?}", labels[i], labels[j], field),
                )
            })?;
        }
        row_count += 1;
    }
    if row_count != n {
        return Err(LoaderError::invalid_shape(
            "covariance",
            format!("{} rows for {} columns", row_count, n),
        ));
    }
    Ok(CovarianceTable::new(labels, data))
}

/// Loads the drift table.
pub fn load_drift(path: impl AsRef<Path>) -> Result<DriftTable, LoaderError> {
    let mut pairs = Vec::new();
    for record in reader(path.as_ref())?.deserialize() {
        let record: DriftRecord = record?;
        pairs.push((record.underlying, record.mu));
    }
    Ok(DriftTable::from_pairs(pairs))
}

/// Loads the account equity table.
pub fn load_accounts(path: impl AsRef<Path>) -> Result<AccountEquityTable, LoaderError> {
    let mut pairs = Vec::new();
    for record in reader(path.as_ref())?.deserialize() {
        let record: AccountRecord = record?;
        pairs.push((record.account, record.equity));
    }
    Ok(AccountEquityTable::from_pairs(pairs))
}

/// Loads the supplement schedule: `account` then one column per step.
pub fn load_supplements(path: impl AsRef<Path>) -> Result<SupplementSchedule, LoaderError> {
    let mut reader = reader(path.as_ref())?;
    let n_steps = reader.headers()?.len().saturating_sub(1);
    let mut pairs = Vec::new();
    for record in reader.records() {
        let record = record?;
        let account = record.get(0).unwrap_or_default().to_string();
        let mut deposits = Vec::with_capacity(n_steps);
        for j in 0..n_steps {
            let field = record.get(j + 1).unwrap_or("0");
            deposits.push(field.parse::<f64>().map_err(|_| {
                LoaderError::invalid_field(
                    "supplement",
                    format!("{} step {} = {:?}", account, j, field),
                )
            })?);
        }
        pairs.push((account, deposits));
    }
    Ok(SupplementSchedule::from_pairs(pairs))
}
