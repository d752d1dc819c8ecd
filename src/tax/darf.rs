//! DARF-style payment obligations
//!
//! Groups realized tax liabilities by the month their payment instrument
//! is due: the month after the sale, payable on its last business day
//! (weekends shift backward to Friday). Zero and exempt records never
//! become obligations but stay in the reporting totals.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::tax::regime::{MonthKey, TaxRecord};

/// Settlement status relative to a reference "today"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObligationStatus {
    Overdue { days: i64 },
    DueToday,
    DueSoon { days: i64 },
    Pending { days: i64 },
}

impl ObligationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ObligationStatus::Overdue { .. } => "OVERDUE",
            ObligationStatus::DueToday => "DUE TODAY",
            ObligationStatus::DueSoon { .. } => "DUE SOON",
            ObligationStatus::Pending { .. } => "PENDING",
        }
    }
}

/// One monthly payment obligation aggregating all liabilities due that month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxObligation {
    pub due_month: MonthKey,
    pub due_date: NaiveDate,
    pub total: Decimal,
    pub records: Vec<TaxRecord>,
}

impl TaxObligation {
    pub fn status(&self, today: NaiveDate) -> ObligationStatus {
        let days = (self.due_date - today).num_days();
        if days < 0 {
            ObligationStatus::Overdue { days: -days }
        } else if days == 0 {
            ObligationStatus::DueToday
        } else if days <= 7 {
            ObligationStatus::DueSoon { days }
        } else {
            ObligationStatus::Pending { days }
        }
    }
}

/// Last calendar day of the month, shifted backward to the nearest weekday
pub fn last_business_day(month: MonthKey) -> NaiveDate {
    let first_of_next = month.following();
    let mut date = NaiveDate::from_ymd_opt(first_of_next.year, first_of_next.month, 1)
        .expect("month key is always a valid calendar month")
        .pred_opt()
        .expect("month start always has a predecessor");

    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date = date
            .pred_opt()
            .expect("weekday shift stays within the month");
    }

    date
}

/// Due date for liabilities realized in `sale_month`: the last business
/// day of the following month (December wraps into January)
pub fn due_date_for(sale_month: MonthKey) -> NaiveDate {
    last_business_day(sale_month.following())
}

/// Aggregate payable records into obligations, one per due month, sorted
/// by due date ascending
pub fn aggregate(records: &[TaxRecord]) -> Vec<TaxObligation> {
    let mut by_due_month: BTreeMap<MonthKey, Vec<TaxRecord>> = BTreeMap::new();

    for record in records {
        if !record.is_payable() {
            continue;
        }
        let due_month = MonthKey::from_date(record.disposal.date).following();
        by_due_month.entry(due_month).or_default().push(record.clone());
    }

    by_due_month
        .into_iter()
        .map(|(due_month, records)| TaxObligation {
            due_month,
            due_date: last_business_day(due_month),
            total: records.iter().map(|r| r.tax).sum(),
            records,
        })
        .collect()
}

/// The next obligation to settle: the first not yet overdue, or the most
/// overdue one when everything has lapsed
pub fn next_obligation(obligations: &[TaxObligation], today: NaiveDate) -> Option<&TaxObligation> {
    obligations
        .iter()
        .find(|o| o.due_date >= today)
        .or_else(|| obligations.first())
}
