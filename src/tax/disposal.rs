//! Disposal evaluation
//!
//! Turns each sell movement into a `DisposalResult`: FIFO cost basis from
//! the lot ledger with the legally-required best-effort fallback chain,
//! realized profit/loss, and same-day round-trip (day-trade) detection.
//! A disposal whose basis cannot be resolved is marked as such - profit is
//! unknown, never assumed zero, so it is never taxed on gross proceeds.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{AssetClass, HoldingMetadata, Movement};
use crate::tax::lots::{LotFragment, LotLedger};

/// Where the resolved unit cost came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BasisSource {
    /// Fully matched against FIFO lots
    FifoLots,
    /// Ledger history was short; used the holding's known average cost
    KnownAverageCost,
    /// Ledger history was short; used the earliest recorded buy price
    EarliestBuyPrice,
    /// No source available - profit/loss is not computable
    NotFound,
}

impl BasisSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            BasisSource::FifoLots => "FIFO",
            BasisSource::KnownAverageCost => "AVG_COST",
            BasisSource::EarliestBuyPrice => "FIRST_BUY",
            BasisSource::NotFound => "NOT_FOUND",
        }
    }
}

/// Derived once per sell movement; never mutated afterward
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisposalResult {
    pub holding: String,
    pub date: NaiveDate,
    pub asset_class: AssetClass,
    pub quantity: Decimal,
    pub sale_price: Decimal,
    pub gross_proceeds: Decimal,
    pub basis_source: BasisSource,
    /// Resolved unit cost; `None` when the basis could not be found
    pub unit_cost: Option<Decimal>,
    /// Quantity-weighted total cost basis
    pub cost_basis: Option<Decimal>,
    /// Realized profit/loss; `None` when the basis could not be found
    pub profit: Option<Decimal>,
    pub day_trade: bool,
    /// Earliest buy on/before the sale, used for holding-period regimes
    pub first_buy_date: Option<NaiveDate>,
    /// FIFO fragments actually consumed, for audit
    pub consumed: Vec<LotFragment>,
}

/// Evaluate one sell movement against the holding's lot ledger.
///
/// `history` is every valid movement for this holding in ascending date
/// order; it feeds the day-trade test and the cost-basis fallbacks. The
/// ledger must already reflect every movement strictly before this sale.
pub fn evaluate(
    sale: &Movement,
    class: AssetClass,
    ledger: &mut LotLedger,
    history: &[Movement],
    metadata: Option<&HoldingMetadata>,
) -> DisposalResult {
    let consumption = ledger.consume(&sale.holding, sale.quantity, sale.date);

    let earliest_buy = history
        .iter()
        .find(|m| m.is_buy() && m.date <= sale.date);
    let first_buy_date = earliest_buy.map(|m| m.date);

    let (basis_source, unit_cost) = if consumption.is_fully_matched() {
        (BasisSource::FifoLots, consumption.average_unit_cost())
    } else if let Some(avg) = metadata
        .and_then(|m| m.average_cost)
        .filter(|avg| *avg > Decimal::ZERO)
    {
        debug!(
            holding = %sale.holding,
            shortfall = %consumption.shortfall,
            "lot history short, falling back to known average cost"
        );
        (BasisSource::KnownAverageCost, Some(avg))
    } else if let Some(buy) = earliest_buy {
        debug!(
            holding = %sale.holding,
            shortfall = %consumption.shortfall,
            "lot history short, falling back to earliest buy price"
        );
        (BasisSource::EarliestBuyPrice, Some(buy.unit_price))
    } else {
        (BasisSource::NotFound, None)
    };

    let cost_basis = unit_cost.map(|c| c * sale.quantity);
    let profit = unit_cost.map(|c| (sale.unit_price - c) * sale.quantity);

    let day_trade = history
        .iter()
        .any(|m| m.is_buy() && m.date == sale.date);

    DisposalResult {
        holding: sale.holding.clone(),
        date: sale.date,
        asset_class: class,
        quantity: sale.quantity,
        sale_price: sale.unit_price,
        gross_proceeds: sale.gross(),
        basis_source,
        unit_cost,
        cost_basis,
        profit,
        day_trade,
        first_buy_date,
        consumed: consumption.fragments,
    }
}
