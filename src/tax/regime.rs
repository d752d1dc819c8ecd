//! Tax regimes per asset class
//!
//! Holds the per-class regime table (flat rates, progressive brackets,
//! monthly-exemption thresholds) and the monthly profit buckets the
//! exemption tests read. Buckets are built once as an immutable snapshot
//! by folding over all disposal results, so evaluating any one disposal is
//! a pure function of (disposal, snapshot) and is independent of
//! evaluation order within the month.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::model::AssetClass;
use crate::tax::disposal::DisposalResult;

/// Calendar month key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The next calendar month, wrapping December into January
    pub fn following(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Cumulative ordinary profit per (asset class, calendar month).
///
/// Accumulates only positive profit from non-day-trade disposals; losses
/// and day-trade gains never enter a bucket, and classes are isolated
/// from each other. There is no carry across months.
#[derive(Debug, Default)]
pub struct MonthlyProfitBuckets {
    buckets: HashMap<(AssetClass, MonthKey), Decimal>,
}

impl MonthlyProfitBuckets {
    /// Fold every disposal result into a snapshot
    pub fn fold(disposals: &[DisposalResult]) -> Self {
        let mut buckets: HashMap<(AssetClass, MonthKey), Decimal> = HashMap::new();
        for disposal in disposals {
            if disposal.day_trade {
                continue;
            }
            let Some(profit) = disposal.profit else { continue };
            if profit <= Decimal::ZERO {
                continue;
            }
            let key = (disposal.asset_class, MonthKey::from_date(disposal.date));
            *buckets.entry(key).or_insert(Decimal::ZERO) += profit;
        }
        Self { buckets }
    }

    pub fn ordinary_profit(&self, class: AssetClass, month: MonthKey) -> Decimal {
        self.buckets
            .get(&(class, month))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Why a record carries no tax
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExemptionReason {
    /// Monthly ordinary stock profit within the R$ 20.000 threshold
    StockMonthlyThreshold,
    /// Monthly ordinary crypto profit within the R$ 35.000 threshold
    CryptoMonthlyThreshold,
    /// Cost basis not found; profit unknown, never taxed on gross
    CostBasisNotFound,
    /// Stock dividends are exempt
    StockDistribution,
    /// FII distributions are exempt
    RealEstateFundDistribution,
    /// ETF distributions are exempt
    EtfDistribution,
    /// Unclassified holding; distributions treated as exempt by default
    UnclassifiedDistribution,
}

impl ExemptionReason {
    pub fn reason(&self) -> &'static str {
        match self {
            ExemptionReason::StockMonthlyThreshold => {
                "monthly stock profit within the R$ 20.000,00 exemption"
            }
            ExemptionReason::CryptoMonthlyThreshold => {
                "monthly crypto profit within the R$ 35.000,00 exemption"
            }
            ExemptionReason::CostBasisNotFound => "cost basis not found",
            ExemptionReason::StockDistribution => "stock dividends are exempt",
            ExemptionReason::RealEstateFundDistribution => "FII distributions are exempt",
            ExemptionReason::EtfDistribution => "ETF distributions are exempt",
            ExemptionReason::UnclassifiedDistribution => {
                "unclassified holding, distribution treated as exempt"
            }
        }
    }
}

impl fmt::Display for ExemptionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Tax liability for one disposal; the source of truth for obligation
/// aggregation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxRecord {
    pub disposal: DisposalResult,
    pub rate: Decimal,
    pub tax: Decimal,
    pub exempt: bool,
    pub reason: Option<ExemptionReason>,
}

impl TaxRecord {
    pub fn is_payable(&self) -> bool {
        !self.exempt && self.tax > Decimal::ZERO
    }
}

/// Monthly exemption threshold for ordinary stock disposals
pub fn stock_exemption_limit() -> Decimal {
    Decimal::from(20_000)
}

/// Monthly exemption threshold for ordinary crypto disposals
pub fn crypto_exemption_limit() -> Decimal {
    Decimal::from(35_000)
}

/// Fixed income rate tiered by holding period in calendar days
pub fn fixed_income_rate(holding_days: i64) -> Decimal {
    if holding_days <= 180 {
        Decimal::new(225, 3) // 22.5%
    } else if holding_days <= 360 {
        Decimal::new(20, 2) // 20%
    } else if holding_days <= 720 {
        Decimal::new(175, 3) // 17.5%
    } else {
        Decimal::new(15, 2) // 15%
    }
}

/// Crypto progressive rate over the monthly threshold, bracketed by this
/// disposal's profit size
pub fn crypto_progressive_rate(profit: Decimal) -> Decimal {
    if profit <= Decimal::from(5_000) {
        Decimal::new(15, 2)
    } else if profit <= Decimal::from(10_000) {
        Decimal::new(175, 3)
    } else if profit <= Decimal::from(15_000) {
        Decimal::new(20, 2)
    } else {
        Decimal::new(225, 3)
    }
}

fn day_trade_rate() -> Decimal {
    Decimal::new(20, 2)
}

fn default_rate() -> Decimal {
    Decimal::new(15, 2)
}

fn taxed(disposal: &DisposalResult, rate: Decimal, profit: Decimal) -> TaxRecord {
    TaxRecord {
        disposal: disposal.clone(),
        rate,
        tax: profit * rate,
        exempt: false,
        reason: None,
    }
}

fn exempt(disposal: &DisposalResult, reason: ExemptionReason) -> TaxRecord {
    TaxRecord {
        disposal: disposal.clone(),
        rate: Decimal::ZERO,
        tax: Decimal::ZERO,
        exempt: true,
        reason: Some(reason),
    }
}

/// Apply the regime table to one disposal against the month snapshot.
///
/// Only positive profit is ever taxed. Losses yield a zero-tax record and
/// are not banked for future offset. The monthly exemption is a cliff:
/// once a class's month bucket crosses its threshold, every ordinary
/// disposal of that class in the month is taxable, not just the excess.
pub fn apply(disposal: &DisposalResult, buckets: &MonthlyProfitBuckets) -> TaxRecord {
    let Some(profit) = disposal.profit else {
        return exempt(disposal, ExemptionReason::CostBasisNotFound);
    };

    if profit < Decimal::ZERO {
        // Loss: zero tax, no exemption flag, nothing carried forward
        return TaxRecord {
            disposal: disposal.clone(),
            rate: Decimal::ZERO,
            tax: Decimal::ZERO,
            exempt: false,
            reason: None,
        };
    }

    let month = MonthKey::from_date(disposal.date);

    match disposal.asset_class {
        AssetClass::Stock => {
            if disposal.day_trade {
                taxed(disposal, day_trade_rate(), profit)
            } else if buckets.ordinary_profit(AssetClass::Stock, month) <= stock_exemption_limit() {
                exempt(disposal, ExemptionReason::StockMonthlyThreshold)
            } else {
                taxed(disposal, default_rate(), profit)
            }
        }
        AssetClass::RealEstateFund => taxed(disposal, Decimal::new(20, 2), profit),
        AssetClass::ExchangeTradedFund | AssetClass::DepositaryReceipt => {
            let rate = if disposal.day_trade {
                day_trade_rate()
            } else {
                default_rate()
            };
            taxed(disposal, rate, profit)
        }
        AssetClass::FixedIncome => {
            let rate = disposal
                .first_buy_date
                .map(|buy| fixed_income_rate((disposal.date - buy).num_days()))
                .unwrap_or_else(default_rate);
            taxed(disposal, rate, profit)
        }
        AssetClass::Crypto => {
            if disposal.day_trade {
                taxed(disposal, day_trade_rate(), profit)
            } else if buckets.ordinary_profit(AssetClass::Crypto, month) <= crypto_exemption_limit()
            {
                exempt(disposal, ExemptionReason::CryptoMonthlyThreshold)
            } else {
                taxed(disposal, crypto_progressive_rate(profit), profit)
            }
        }
        AssetClass::Unknown => taxed(disposal, default_rate(), profit),
    }
}
