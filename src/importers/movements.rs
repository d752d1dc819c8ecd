//! Movement CSV reader
//!
//! Expected columns (English or Portuguese): holding/ticker/ativo,
//! direction/tipo/operacao, quantity/quantidade, price/preco, date/data.

use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

use super::{cell, find_column, parse_date, parse_decimal, Imported};
use crate::model::{Direction, Movement};
use crate::tax::SkippedItem;

struct Columns {
    holding: usize,
    direction: usize,
    quantity: usize,
    price: usize,
    date: usize,
}

pub fn read_movements<P: AsRef<Path>>(path: P) -> Result<Imported<Vec<Movement>>> {
    let path = path.as_ref();
    info!("reading movements from {:?}", path);

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open movements file {:?}", path))?;

    let headers = reader.headers().context("failed to read CSV headers")?.clone();
    let columns = Columns {
        holding: find_column(&headers, &["holding", "ticker", "ativo"])?,
        direction: find_column(&headers, &["direction", "tipo", "operacao", "operação"])?,
        quantity: find_column(&headers, &["quantity", "quantidade", "qtd"])?,
        price: find_column(&headers, &["price", "unit_price", "preco", "preço"])?,
        date: find_column(&headers, &["date", "data"])?,
    };

    let mut items = Vec::new();
    let mut skipped = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let row = idx + 2; // 1-based plus header
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping movements row {row}: {e}");
                skipped.push(SkippedItem {
                    row: Some(row),
                    context: "movements".to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        match parse_row(&record, &columns) {
            Ok(movement) => items.push(movement),
            Err(e) => {
                warn!("skipping movements row {row}: {e}");
                skipped.push(SkippedItem {
                    row: Some(row),
                    context: "movements".to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(parsed = items.len(), skipped = skipped.len(), "movements read");
    Ok(Imported { items, skipped })
}

fn parse_row(record: &csv::StringRecord, columns: &Columns) -> Result<Movement> {
    let holding = cell(record, columns.holding)?.to_uppercase();
    if holding.is_empty() {
        return Err(anyhow!("empty holding"));
    }

    let direction_str = cell(record, columns.direction)?;
    let direction = Direction::from_str(direction_str)
        .map_err(|_| anyhow!("unknown direction '{direction_str}'"))?;

    Ok(Movement {
        holding,
        direction,
        quantity: parse_decimal(cell(record, columns.quantity)?)?,
        unit_price: parse_decimal(cell(record, columns.price)?)?,
        date: parse_date(cell(record, columns.date)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_english_headers() {
        let file = write_csv(
            "holding,direction,quantity,price,date\n\
             PETR4,buy,100,25.50,2025-01-10\n\
             PETR4,sell,50,30,2025-02-10\n",
        );
        let imported = read_movements(file.path()).unwrap();
        assert_eq!(imported.items.len(), 2);
        assert!(imported.skipped.is_empty());
        assert_eq!(imported.items[0].quantity, dec!(100));
        assert_eq!(imported.items[1].direction, Direction::Sell);
    }

    #[test]
    fn test_reads_portuguese_headers_and_values() {
        let file = write_csv(
            "Ativo,Tipo,Quantidade,Preço,Data\n\
             mxrf11,compra,10,\"10,50\",05/03/2025\n",
        );
        let imported = read_movements(file.path()).unwrap();
        assert_eq!(imported.items.len(), 1);
        let m = &imported.items[0];
        assert_eq!(m.holding, "MXRF11");
        assert_eq!(m.direction, Direction::Buy);
        assert_eq!(m.unit_price, dec!(10.50));
        assert_eq!(m.date, chrono::NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
    }

    #[test]
    fn test_bad_rows_are_skipped_with_row_numbers() {
        let file = write_csv(
            "holding,direction,quantity,price,date\n\
             PETR4,buy,100,25.50,2025-01-10\n\
             PETR4,hold,1,1,2025-01-11\n\
             PETR4,sell,abc,30,2025-02-10\n\
             ,buy,1,1,2025-01-12\n",
        );
        let imported = read_movements(file.path()).unwrap();
        assert_eq!(imported.items.len(), 1);
        assert_eq!(imported.skipped.len(), 3);
        assert_eq!(imported.skipped[0].row, Some(3));
        assert!(imported.skipped[0].reason.contains("hold"));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let file = write_csv("holding,quantity,price,date\nPETR4,1,1,2025-01-10\n");
        assert!(read_movements(file.path()).is_err());
    }
}
