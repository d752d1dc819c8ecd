//! Evaluation pipeline
//!
//! Runs the full assessment: input validation, ahead-of-pass asset
//! classification, per-holding FIFO evaluation in ascending date order,
//! the monthly bucket fold, regime application, distribution taxation and
//! obligation aggregation. The pipeline is pure with respect to its
//! inputs; the same ledger always produces the same records, since the
//! output feeds regulatory filings.
//!
//! Holdings are independent of each other (no shared state), so the
//! per-holding loop could be parallelized; within one holding the order
//! is load-bearing because every disposal depends on the lots consumed
//! before it.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

use crate::model::{AssetClass, Distribution, HoldingMetadata, Movement};
use crate::tax::classify::{self, QuoteLookup};
use crate::tax::darf::{self, TaxObligation};
use crate::tax::disposal::{self, DisposalResult};
use crate::tax::distributions::{self, DistributionTaxRecord};
use crate::tax::lots::LotLedger;
use crate::tax::regime::{self, MonthlyProfitBuckets, TaxRecord};

/// An input row excluded from the computation, reported so totals are
/// understood as a lower bound
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedItem {
    /// Source row number when the item came from a file import
    pub row: Option<usize>,
    pub context: String,
    pub reason: String,
}

impl SkippedItem {
    pub fn new(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            row: None,
            context: context.into(),
            reason: reason.into(),
        }
    }
}

/// Complete output of one assessment pass
#[derive(Debug, Serialize)]
pub struct TaxAssessment {
    /// Per-disposal tax records, ordered by (date, holding)
    pub records: Vec<TaxRecord>,
    /// Per-distribution tax records, ordered by (date, holding)
    pub distribution_records: Vec<DistributionTaxRecord>,
    /// Monthly payment obligations, ordered by due date
    pub obligations: Vec<TaxObligation>,
    /// Resolved classification per holding (Unknown entries are the
    /// classification gaps surfaced to the caller)
    pub classes: BTreeMap<String, AssetClass>,
    /// Input rows excluded from the computation
    pub skipped: Vec<SkippedItem>,
}

fn validate_movements(
    movements: &[Movement],
    skipped: &mut Vec<SkippedItem>,
) -> Vec<Movement> {
    movements
        .iter()
        .filter(|m| {
            if m.quantity <= rust_decimal::Decimal::ZERO {
                skipped.push(SkippedItem::new(
                    format!("movement {} {}", m.holding, m.date),
                    format!("non-positive quantity {}", m.quantity),
                ));
                return false;
            }
            if m.unit_price <= rust_decimal::Decimal::ZERO {
                skipped.push(SkippedItem::new(
                    format!("movement {} {}", m.holding, m.date),
                    format!("non-positive unit price {}", m.unit_price),
                ));
                return false;
            }
            true
        })
        .cloned()
        .collect()
}

fn validate_distributions(
    distributions: &[Distribution],
    skipped: &mut Vec<SkippedItem>,
) -> Vec<Distribution> {
    distributions
        .iter()
        .filter(|d| {
            if d.gross_amount <= rust_decimal::Decimal::ZERO {
                skipped.push(SkippedItem::new(
                    format!("distribution {} {}", d.holding, d.date),
                    format!("non-positive gross amount {}", d.gross_amount),
                ));
                return false;
            }
            true
        })
        .cloned()
        .collect()
}

/// Resolve every holding's class once, ahead of the evaluation pass. The
/// external lookup is consulted at most once per holding, so racing
/// lookups can never reorder evaluation.
fn resolve_classes(
    movements: &[Movement],
    distributions: &[Distribution],
    metadata: &HashMap<String, HoldingMetadata>,
    lookup: &dyn QuoteLookup,
) -> BTreeMap<String, AssetClass> {
    let holdings: BTreeMap<String, ()> = movements
        .iter()
        .map(|m| m.holding.clone())
        .chain(distributions.iter().map(|d| d.holding.clone()))
        .map(|h| (h, ()))
        .collect();

    let mut classes = BTreeMap::new();
    for holding in holdings.into_keys() {
        let class = classify::classify(&holding, metadata.get(&holding), lookup);
        if class == AssetClass::Unknown {
            warn!(holding = %holding, "holding could not be classified, using conservative defaults");
        }
        classes.insert(holding, class);
    }
    classes
}

/// Evaluate one holding's movements in ascending date order against a
/// fresh lot ledger
fn evaluate_holding(
    holding: &str,
    movements: &[Movement],
    class: AssetClass,
    metadata: Option<&HoldingMetadata>,
) -> Vec<DisposalResult> {
    let mut ledger = LotLedger::new();
    let mut disposals = Vec::new();

    for movement in movements {
        if movement.is_buy() {
            ledger.acquire(
                holding,
                movement.quantity,
                movement.unit_price,
                movement.date,
            );
        } else {
            disposals.push(disposal::evaluate(
                movement, class, &mut ledger, movements, metadata,
            ));
        }
    }

    disposals
}

/// Run the full assessment over a movement and distribution ledger.
///
/// Malformed rows are excluded and reported, never fatal. Holdings are
/// processed in lexical order and records are re-sorted by date at the
/// end, so the output is deterministic regardless of input ordering.
pub fn assess(
    movements: &[Movement],
    distributions: &[Distribution],
    metadata: &HashMap<String, HoldingMetadata>,
    lookup: &dyn QuoteLookup,
) -> TaxAssessment {
    let mut skipped = Vec::new();

    let valid_movements = validate_movements(movements, &mut skipped);
    let valid_distributions = validate_distributions(distributions, &mut skipped);
    if !skipped.is_empty() {
        warn!(count = skipped.len(), "excluded malformed input rows");
    }

    let classes = resolve_classes(&valid_movements, &valid_distributions, metadata, lookup);

    // Group per holding and restore ascending date order; the FIFO queue
    // depends on it
    let mut by_holding: BTreeMap<&str, Vec<Movement>> = BTreeMap::new();
    for movement in &valid_movements {
        by_holding
            .entry(movement.holding.as_str())
            .or_default()
            .push(movement.clone());
    }

    let mut all_disposals = Vec::new();
    for (holding, group) in &mut by_holding {
        group.sort_by_key(|m| m.date);
        let class = classes
            .get(*holding)
            .copied()
            .unwrap_or(AssetClass::Unknown);
        let disposals = evaluate_holding(holding, group, class, metadata.get(*holding));
        debug!(holding = %holding, disposals = disposals.len(), "evaluated holding");
        all_disposals.extend(disposals);
    }

    // Immutable month snapshot first, regimes second: every disposal in a
    // month sees the same cumulative, whatever order it was evaluated in
    let buckets = MonthlyProfitBuckets::fold(&all_disposals);

    let mut records: Vec<TaxRecord> = all_disposals
        .iter()
        .map(|d| regime::apply(d, &buckets))
        .collect();
    records.sort_by(|a, b| {
        (a.disposal.date, &a.disposal.holding).cmp(&(b.disposal.date, &b.disposal.holding))
    });

    let mut distribution_records: Vec<DistributionTaxRecord> = valid_distributions
        .iter()
        .map(|d| {
            let class = classes
                .get(&d.holding)
                .copied()
                .unwrap_or(AssetClass::Unknown);
            distributions::evaluate(d, class)
        })
        .collect();
    distribution_records.sort_by(|a, b| (a.date, &a.holding).cmp(&(b.date, &b.holding)));

    let obligations = darf::aggregate(&records);

    info!(
        disposals = records.len(),
        distributions = distribution_records.len(),
        obligations = obligations.len(),
        skipped = skipped.len(),
        "assessment complete"
    );

    TaxAssessment {
        records,
        distribution_records,
        obligations,
        classes,
        skipped,
    }
}

impl TaxAssessment {
    /// Years present in the assessed records, ascending
    pub fn years(&self) -> Vec<i32> {
        use chrono::Datelike;
        self.records
            .iter()
            .map(|r| r.disposal.date.year())
            .chain(self.distribution_records.iter().map(|r| r.date.year()))
            .sorted()
            .dedup()
            .collect()
    }
}
