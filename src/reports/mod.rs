// Reports module - period filters, per-class summaries, tables and export

pub mod export;
pub mod tables;

pub use export::{distributions_csv, sales_csv};
pub use tables::{
    annual_summary_text, class_summary_table, darf_table, distributions_table, sales_table,
    skipped_banner,
};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::model::AssetClass;
use crate::tax::TaxRecord;

/// Reporting window relative to "today"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    Month,
    Quarter,
    #[default]
    Year,
    All,
}

impl Period {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" | "mes" | "mês" => Some(Period::Month),
            "quarter" | "trimestre" => Some(Period::Quarter),
            "year" | "ano" => Some(Period::Year),
            "all" | "total" => Some(Period::All),
            _ => None,
        }
    }

    /// `true` when `date` falls inside this window around `today`
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Period::Month => date.year() == today.year() && date.month() == today.month(),
            Period::Quarter => {
                date.year() == today.year() && (date.month() - 1) / 3 == (today.month() - 1) / 3
            }
            Period::Year => date.year() == today.year(),
            Period::All => true,
        }
    }
}

/// Sales totals grouped by asset class
#[derive(Debug, Clone, Serialize)]
pub struct ClassSummary {
    pub asset_class: AssetClass,
    pub count: usize,
    pub proceeds: Decimal,
    pub profit: Decimal,
    pub tax: Decimal,
    pub exempt_profit: Decimal,
}

/// Group tax records by asset class, largest proceeds first
pub fn sales_by_class(records: &[TaxRecord]) -> Vec<ClassSummary> {
    let mut by_class: std::collections::BTreeMap<AssetClass, ClassSummary> =
        std::collections::BTreeMap::new();

    for record in records {
        let entry = by_class
            .entry(record.disposal.asset_class)
            .or_insert_with(|| ClassSummary {
                asset_class: record.disposal.asset_class,
                count: 0,
                proceeds: Decimal::ZERO,
                profit: Decimal::ZERO,
                tax: Decimal::ZERO,
                exempt_profit: Decimal::ZERO,
            });
        entry.count += 1;
        entry.proceeds += record.disposal.gross_proceeds;
        entry.profit += record.disposal.profit.unwrap_or(Decimal::ZERO);
        entry.tax += record.tax;
        if record.exempt {
            entry.exempt_profit += record.disposal.profit.unwrap_or(Decimal::ZERO);
        }
    }

    let mut summaries: Vec<ClassSummary> = by_class.into_values().collect();
    summaries.sort_by(|a, b| b.proceeds.cmp(&a.proceeds));
    summaries
}
