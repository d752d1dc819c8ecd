//! Distribution CSV reader
//!
//! Expected columns: holding/ticker/ativo, date/data,
//! gross/gross_amount/valor/valor_bruto.

use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::{info, warn};

use super::{cell, find_column, parse_date, parse_decimal, Imported};
use crate::model::Distribution;
use crate::tax::SkippedItem;

pub fn read_distributions<P: AsRef<Path>>(path: P) -> Result<Imported<Vec<Distribution>>> {
    let path = path.as_ref();
    info!("reading distributions from {:?}", path);

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open distributions file {:?}", path))?;

    let headers = reader.headers().context("failed to read CSV headers")?.clone();
    let holding_col = find_column(&headers, &["holding", "ticker", "ativo"])?;
    let date_col = find_column(&headers, &["date", "data"])?;
    let gross_col = find_column(&headers, &["gross", "gross_amount", "valor", "valor_bruto"])?;

    let mut items = Vec::new();
    let mut skipped = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let row = idx + 2;
        let parsed = result
            .map_err(|e| anyhow!(e.to_string()))
            .and_then(|record| {
                let holding = cell(&record, holding_col)?.to_uppercase();
                if holding.is_empty() {
                    return Err(anyhow!("empty holding"));
                }
                Ok(Distribution {
                    holding,
                    date: parse_date(cell(&record, date_col)?)?,
                    gross_amount: parse_decimal(cell(&record, gross_col)?)?,
                })
            });

        match parsed {
            Ok(distribution) => items.push(distribution),
            Err(e) => {
                warn!("skipping distributions row {row}: {e}");
                skipped.push(SkippedItem {
                    row: Some(row),
                    context: "distributions".to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(parsed = items.len(), skipped = skipped.len(), "distributions read");
    Ok(Imported { items, skipped })
}
