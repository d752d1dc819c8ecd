//! Holding metadata CSV reader
//!
//! Optional per-holding classification hints: holding/ticker/ativo,
//! type/tipo, indexer/indexador, average_cost/preco_medio. Every column
//! except the holding may be empty.

use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use super::{cell, find_column, parse_decimal, Imported};
use crate::model::HoldingMetadata;
use crate::tax::SkippedItem;

pub fn read_metadata<P: AsRef<Path>>(
    path: P,
) -> Result<Imported<HashMap<String, HoldingMetadata>>> {
    let path = path.as_ref();
    info!("reading holding metadata from {:?}", path);

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open metadata file {:?}", path))?;

    let headers = reader.headers().context("failed to read CSV headers")?.clone();
    let holding_col = find_column(&headers, &["holding", "ticker", "ativo"])?;
    let type_col = find_column(&headers, &["type", "tipo", "explicit_type"]).ok();
    let indexer_col = find_column(&headers, &["indexer", "indexador"]).ok();
    let avg_cost_col =
        find_column(&headers, &["average_cost", "preco_medio", "preço_medio"]).ok();

    let mut items = HashMap::new();
    let mut skipped = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let row = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping metadata row {row}: {e}");
                skipped.push(SkippedItem {
                    row: Some(row),
                    context: "metadata".to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let parsed = (|| -> Result<(String, HoldingMetadata)> {
            let holding = cell(&record, holding_col)?.to_uppercase();
            if holding.is_empty() {
                return Err(anyhow!("empty holding"));
            }

            let non_empty = |idx: Option<usize>| -> Option<String> {
                idx.and_then(|i| record.get(i))
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
            };

            let average_cost = match non_empty(avg_cost_col) {
                Some(raw) => Some(parse_decimal(&raw)?),
                None => None,
            };

            Ok((
                holding,
                HoldingMetadata {
                    explicit_type: non_empty(type_col),
                    indexer: non_empty(indexer_col),
                    average_cost,
                },
            ))
        })();

        match parsed {
            Ok((holding, meta)) => {
                items.insert(holding, meta);
            }
            Err(e) => {
                warn!("skipping metadata row {row}: {e}");
                skipped.push(SkippedItem {
                    row: Some(row),
                    context: "metadata".to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(parsed = items.len(), skipped = skipped.len(), "metadata read");
    Ok(Imported { items, skipped })
}
