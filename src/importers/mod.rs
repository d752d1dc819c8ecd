//! CSV ingestion
//!
//! Readers for the three input files: movements, distributions and
//! holding metadata. Malformed rows are collected as skipped items with
//! their row numbers and never abort the batch; headers accept both
//! English and Portuguese column names.

pub mod distributions;
pub mod metadata;
pub mod movements;

pub use distributions::read_distributions;
pub use metadata::read_metadata;
pub use movements::read_movements;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::EngineError;
use crate::tax::SkippedItem;

/// Parsed rows plus whatever had to be skipped
#[derive(Debug)]
pub struct Imported<T> {
    pub items: T,
    pub skipped: Vec<SkippedItem>,
}

/// Find a column index by any of its accepted header names
pub(crate) fn find_column(headers: &StringRecord, names: &[&str]) -> Result<usize> {
    headers
        .iter()
        .position(|h| {
            let h = h.trim().to_lowercase();
            names.iter().any(|n| h == *n)
        })
        .ok_or_else(|| {
            EngineError::ImportError(format!("missing column, expected one of {:?}", names)).into()
        })
}

/// Fetch a cell by index, trimmed
pub(crate) fn cell<'a>(record: &'a StringRecord, idx: usize) -> Result<&'a str> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| anyhow!("row has too few columns"))
}

/// Parse ISO ("2025-03-10") or Brazilian ("10/03/2025") dates
pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .map_err(|_| anyhow!("unparsable date '{s}'"))
}

/// Parse a decimal accepting Brazilian formatting ("1.234,56")
pub(crate) fn parse_decimal(s: &str) -> Result<Decimal> {
    let cleaned = if s.contains(',') {
        s.replace('.', "").replace(',', ".")
    } else {
        s.to_string()
    };
    Decimal::from_str(cleaned.trim()).map_err(|_| anyhow!("unparsable number '{s}'"))
}
