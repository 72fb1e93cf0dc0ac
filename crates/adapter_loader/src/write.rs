//! CSV report writers.

use std::path::Path;

use margin_models::holdings::Leg;
use margin_optimiser::{AccountOptimisation, HoldingEntry};
use margin_risk::{ScenarioReport, VarReport};
use tracing::info;

use crate::error::LoaderError;

/// Writes the normalised per-leg holding.
pub fn write_normalised_holding(
    path: impl AsRef<Path>,
    legs: &[Leg],
) -> Result<(), LoaderError> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    writer.write_record([
        "exchange",
        "account",
        "code_dir",
        "type",
        "variety",
        "side",
        "quantity",
        "margin",
        "total_margin",
    ])?;
    for leg in legs {
        writer.write_record([
            leg.exchange.code().to_string(),
            leg.account.clone(),
            leg.code_dir.clone(),
            leg.position_type().to_string(),
            leg.variety.to_string(),
            leg.side.to_string(),
            leg.quantity.to_string(),
            leg.margin.to_string(),
            leg.total_margin.to_string(),
        ])?;
    }
    writer.flush()?;
    info!(rows = legs.len(), path = %path.as_ref().display(), "wrote normalised holding");
    Ok(())
}

/// Writes the optimised holding: one row per residual leg and per
/// selected strategy.
pub fn write_optimised_holding(
    path: impl AsRef<Path>,
    reports: &[AccountOptimisation],
) -> Result<(), LoaderError> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    writer.write_record([
        "exchange",
        "account",
        "code_dir",
        "type",
        "quantity",
        "margin",
        "total_margin",
    ])?;
    let mut rows = 0usize;
    for report in reports {
        for entry in &report.entries {
            let (code_dir, entry_type, quantity, margin) = match entry {
                HoldingEntry::Leg {
                    code_dir,
                    position_type,
                    quantity,
                    margin,
                } => (code_dir.clone(), position_type.to_string(), quantity, margin),
                HoldingEntry::Strategy {
                    legs,
                    kind,
                    quantity,
                    margin,
                } => (
                    format!("({}, {})", legs.0, legs.1),
                    kind.to_string(),
                    quantity,
                    margin,
                ),
            };
            writer.write_record([
                report.exchange.code().to_string(),
                report.account.clone(),
                code_dir,
                entry_type,
                quantity.to_string(),
                margin.to_string(),
                (margin * *quantity as f64).to_string(),
            ])?;
            rows += 1;
        }
    }
    writer.flush()?;
    info!(rows, path = %path.as_ref().display(), "wrote optimised holding");
    Ok(())
}

/// Writes the VaR report: `account, T+0, ..., immediate_top_up`.
pub fn write_var_report(path: impl AsRef<Path>, report: &VarReport) -> Result<(), LoaderError> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    let mut header = vec!["account".to_string()];
    header.extend((0..report.n_steps).map(|i| format!("T+{}", i)));
    header.push("immediate_top_up".to_string());
    writer.write_record(&header)?;

    for row in &report.rows {
        let mut record = vec![row.account.clone()];
        record.extend(row.risk_ratio_var.iter().map(|v| v.to_string()));
        record.push(row.immediate_top_up.to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the two scenario pivots (risk ratio and supplement), one
/// column per grid shock.
pub fn write_scenario_reports(
    risk_ratio_path: impl AsRef<Path>,
    supplement_path: impl AsRef<Path>,
    report: &ScenarioReport,
) -> Result<(), LoaderError> {
    let mut header = vec!["account".to_string()];
    header.extend(report.shocks.iter().map(|r| r.to_string()));

    let mut risk_writer = csv::Writer::from_path(risk_ratio_path.as_ref())?;
    risk_writer.write_record(&header)?;
    for row in &report.rows {
        let mut record = vec![row.account.clone()];
        record.extend(row.risk_ratio.iter().map(|v| v.to_string()));
        risk_writer.write_record(&record)?;
    }
    risk_writer.flush()?;

    let mut supplement_writer = csv::Writer::from_path(supplement_path.as_ref())?;
    supplement_writer.write_record(&header)?;
    for row in &report.rows {
        let mut record = vec![row.account.clone()];
        record.extend(row.supplement.iter().map(|v| v.to_string()));
        supplement_writer.write_record(&record)?;
    }
    supplement_writer.flush()?;
    Ok(())
}
