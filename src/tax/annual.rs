//! Annual consolidation
//!
//! Rolls disposal and distribution tax records up into the per-year
//! totals used for the yearly filing view.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tax::distributions::DistributionTaxRecord;
use crate::tax::regime::TaxRecord;

/// Year totals for disposals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisposalYearTotals {
    pub count: usize,
    pub proceeds: Decimal,
    pub profit: Decimal,
    pub tax: Decimal,
    pub exempt_profit: Decimal,
}

/// Year totals for income distributions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistributionYearTotals {
    pub count: usize,
    pub gross: Decimal,
    pub tax: Decimal,
    pub net: Decimal,
}

/// Consolidated annual summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnualSummary {
    pub year: i32,
    pub disposals: DisposalYearTotals,
    pub distributions: DistributionYearTotals,
    pub total_tax: Decimal,
    pub total_exempt_profit: Decimal,
}

/// Summarize one calendar year of records
pub fn summarize(
    year: i32,
    records: &[TaxRecord],
    distribution_records: &[DistributionTaxRecord],
) -> AnnualSummary {
    use chrono::Datelike;

    let mut disposals = DisposalYearTotals::default();
    for record in records.iter().filter(|r| r.disposal.date.year() == year) {
        disposals.count += 1;
        disposals.proceeds += record.disposal.gross_proceeds;
        disposals.profit += record.disposal.profit.unwrap_or(Decimal::ZERO);
        disposals.tax += record.tax;
        if record.exempt {
            disposals.exempt_profit += record.disposal.profit.unwrap_or(Decimal::ZERO);
        }
    }

    let mut distributions = DistributionYearTotals::default();
    for record in distribution_records.iter().filter(|r| r.date.year() == year) {
        distributions.count += 1;
        distributions.gross += record.gross;
        distributions.tax += record.tax;
        distributions.net += record.net;
    }

    AnnualSummary {
        year,
        total_tax: disposals.tax + distributions.tax,
        total_exempt_profit: disposals.exempt_profit,
        disposals,
        distributions,
    }
}
