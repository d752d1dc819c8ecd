//! Flat CSV export of the assessed records, for filing spreadsheets

use anyhow::{Context, Result};

use crate::error::EngineError;
use crate::tax::{DistributionTaxRecord, TaxRecord};

/// Export disposal tax records to CSV, one row per sale plus a total row
pub fn sales_csv(records: &[TaxRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record([
        "date",
        "holding",
        "asset_class",
        "quantity",
        "sale_price",
        "cost_basis",
        "profit",
        "day_trade",
        "basis_source",
        "rate",
        "tax",
        "exempt",
        "reason",
    ])?;

    let mut total = rust_decimal::Decimal::ZERO;
    for record in records {
        total += record.tax;
        writer.write_record([
            record.disposal.date.to_string(),
            record.disposal.holding.clone(),
            record.disposal.asset_class.as_str().to_string(),
            record.disposal.quantity.normalize().to_string(),
            record.disposal.sale_price.to_string(),
            record
                .disposal
                .cost_basis
                .map(|c| c.to_string())
                .unwrap_or_default(),
            record
                .disposal
                .profit
                .map(|p| p.to_string())
                .unwrap_or_default(),
            if record.disposal.day_trade { "yes" } else { "no" }.to_string(),
            record.disposal.basis_source.as_str().to_string(),
            record.rate.to_string(),
            record.tax.to_string(),
            if record.exempt { "yes" } else { "no" }.to_string(),
            record.reason.map(|r| r.to_string()).unwrap_or_default(),
        ])?;
    }

    let total_str = total.to_string();
    writer.write_record([
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        "TOTAL",
        total_str.as_str(),
        "",
        "",
    ])?;

    let bytes = writer.into_inner().context("failed to flush CSV buffer")?;
    String::from_utf8(bytes)
        .map_err(|e| EngineError::ExportError(format!("CSV output was not valid UTF-8: {e}")).into())
}

/// Export distribution tax records to CSV
pub fn distributions_csv(records: &[DistributionTaxRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record([
        "date",
        "holding",
        "asset_class",
        "gross",
        "rate",
        "tax",
        "net",
        "exempt",
        "reason",
    ])?;

    let mut total = rust_decimal::Decimal::ZERO;
    for record in records {
        total += record.tax;
        writer.write_record([
            record.date.to_string(),
            record.holding.clone(),
            record.asset_class.as_str().to_string(),
            record.gross.to_string(),
            record.rate.to_string(),
            record.tax.to_string(),
            record.net.to_string(),
            if record.exempt { "yes" } else { "no" }.to_string(),
            record.reason.map(|r| r.to_string()).unwrap_or_default(),
        ])?;
    }

    let total_str = total.to_string();
    writer.write_record(["", "", "", "", "TOTAL", total_str.as_str(), "", "", ""])?;

    let bytes = writer.into_inner().context("failed to flush CSV buffer")?;
    String::from_utf8(bytes)
        .map_err(|e| EngineError::ExportError(format!("CSV output was not valid UTF-8: {e}")).into())
}
