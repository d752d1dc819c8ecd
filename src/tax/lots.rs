//! FIFO lot ledger
//!
//! Tracks acquisition lots per holding and consumes them oldest-first to
//! produce the cost basis for a disposal. Shortfall (selling more than the
//! recorded lot history covers) is a reported condition, not an error:
//! callers fall back to alternate cost-basis sources when the ledger
//! history is incomplete.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};

/// A slice of acquired quantity still unsold
#[derive(Debug, Clone, PartialEq)]
pub struct Lot {
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub date: NaiveDate,
}

/// A fragment consumed from a lot, kept for audit
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LotFragment {
    pub acquired: NaiveDate,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

impl LotFragment {
    pub fn cost(&self) -> Decimal {
        self.quantity * self.unit_cost
    }
}

/// Outcome of consuming quantity from a holding's lot queue
#[derive(Debug, Clone)]
pub struct Consumption {
    pub fragments: Vec<LotFragment>,
    pub matched_quantity: Decimal,
    pub matched_cost: Decimal,
    pub shortfall: Decimal,
}

impl Consumption {
    pub fn is_fully_matched(&self) -> bool {
        self.shortfall.is_zero()
    }

    /// Quantity-weighted average unit cost of the matched fragments.
    /// `None` when nothing could be matched (cost basis unknown, not zero).
    pub fn average_unit_cost(&self) -> Option<Decimal> {
        if self.matched_quantity > Decimal::ZERO {
            Some(self.matched_cost / self.matched_quantity)
        } else {
            None
        }
    }
}

/// Per-holding FIFO queues of acquisition lots
#[derive(Debug, Default)]
pub struct LotLedger {
    lots: HashMap<String, VecDeque<Lot>>,
}

impl LotLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an acquisition lot. Movements are fed in ascending date
    /// order, so each queue stays date-ordered.
    pub fn acquire(&mut self, holding: &str, quantity: Decimal, unit_cost: Decimal, date: NaiveDate) {
        self.lots
            .entry(holding.to_string())
            .or_default()
            .push_back(Lot {
                quantity,
                unit_cost,
                date,
            });
    }

    /// Consume `quantity` oldest-lot-first, considering only lots dated
    /// on/before `as_of`. Partially consumed lots shrink in place.
    pub fn consume(&mut self, holding: &str, quantity: Decimal, as_of: NaiveDate) -> Consumption {
        let mut fragments = Vec::new();
        let mut remaining = quantity;
        let mut matched_cost = Decimal::ZERO;

        if let Some(queue) = self.lots.get_mut(holding) {
            while remaining > Decimal::ZERO {
                let Some(lot) = queue.front_mut() else { break };
                if lot.date > as_of {
                    break;
                }

                let take = lot.quantity.min(remaining);
                fragments.push(LotFragment {
                    acquired: lot.date,
                    quantity: take,
                    unit_cost: lot.unit_cost,
                });
                matched_cost += take * lot.unit_cost;
                remaining -= take;
                lot.quantity -= take;

                if lot.quantity.is_zero() {
                    queue.pop_front();
                }
            }
        }

        Consumption {
            fragments,
            matched_quantity: quantity - remaining,
            matched_cost,
            shortfall: remaining,
        }
    }

    /// Total unsold quantity for a holding across all lots
    pub fn open_quantity(&self, holding: &str) -> Decimal {
        self.lots
            .get(holding)
            .map(|q| q.iter().map(|l| l.quantity).sum())
            .unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_fifo_consumes_oldest_first() {
        let mut ledger = LotLedger::new();
        ledger.acquire("PETR4", dec!(100), dec!(10), d(2025, 1, 10));
        ledger.acquire("PETR4", dec!(100), dec!(20), d(2025, 2, 10));

        let c = ledger.consume("PETR4", dec!(150), d(2025, 3, 1));
        assert!(c.is_fully_matched());
        assert_eq!(c.fragments.len(), 2);
        assert_eq!(c.fragments[0].quantity, dec!(100));
        assert_eq!(c.fragments[0].unit_cost, dec!(10));
        assert_eq!(c.fragments[1].quantity, dec!(50));
        assert_eq!(c.fragments[1].unit_cost, dec!(20));
        // (100*10 + 50*20) / 150
        assert_eq!(c.average_unit_cost(), Some(dec!(2000) / dec!(150)));
        assert_eq!(ledger.open_quantity("PETR4"), dec!(50));
    }

    #[test]
    fn test_partial_lot_shrinks_in_place() {
        let mut ledger = LotLedger::new();
        ledger.acquire("VALE3", dec!(100), dec!(50), d(2025, 1, 5));

        let first = ledger.consume("VALE3", dec!(30), d(2025, 1, 20));
        assert_eq!(first.matched_quantity, dec!(30));
        assert_eq!(ledger.open_quantity("VALE3"), dec!(70));

        let second = ledger.consume("VALE3", dec!(70), d(2025, 1, 21));
        assert!(second.is_fully_matched());
        assert_eq!(ledger.open_quantity("VALE3"), dec!(0));
    }

    #[test]
    fn test_shortfall_is_reported_not_an_error() {
        let mut ledger = LotLedger::new();
        ledger.acquire("MGLU3", dec!(10), dec!(4), d(2025, 1, 10));

        let c = ledger.consume("MGLU3", dec!(25), d(2025, 2, 1));
        assert!(!c.is_fully_matched());
        assert_eq!(c.matched_quantity, dec!(10));
        assert_eq!(c.shortfall, dec!(15));
        assert_eq!(c.average_unit_cost(), Some(dec!(4)));
    }

    #[test]
    fn test_unknown_holding_matches_nothing() {
        let mut ledger = LotLedger::new();
        let c = ledger.consume("GHOST3", dec!(5), d(2025, 1, 1));
        assert_eq!(c.matched_quantity, dec!(0));
        assert_eq!(c.shortfall, dec!(5));
        // Unknown basis, not zero
        assert_eq!(c.average_unit_cost(), None);
    }

    #[test]
    fn test_lots_after_as_of_are_untouched() {
        let mut ledger = LotLedger::new();
        ledger.acquire("ITSA4", dec!(50), dec!(8), d(2025, 1, 10));
        ledger.acquire("ITSA4", dec!(50), dec!(9), d(2025, 3, 10));

        let c = ledger.consume("ITSA4", dec!(80), d(2025, 2, 1));
        assert_eq!(c.matched_quantity, dec!(50));
        assert_eq!(c.shortfall, dec!(30));
        // The March lot is still intact
        assert_eq!(ledger.open_quantity("ITSA4"), dec!(50));
    }

    #[test]
    fn test_fractional_quantities() {
        let mut ledger = LotLedger::new();
        ledger.acquire("BTC", dec!(0.5), dec!(200000), d(2025, 1, 2));
        ledger.acquire("BTC", dec!(0.25), dec!(240000), d(2025, 1, 15));

        let c = ledger.consume("BTC", dec!(0.6), d(2025, 2, 1));
        assert!(c.is_fully_matched());
        assert_eq!(c.matched_cost, dec!(0.5) * dec!(200000) + dec!(0.1) * dec!(240000));
    }
}
