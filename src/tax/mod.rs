// Tax module - Brazilian tax liability computation (FIFO lots, regimes, DARF)

pub mod annual;
pub mod classify;
pub mod darf;
pub mod disposal;
pub mod distributions;
pub mod engine;
pub mod lots;
pub mod regime;

pub use annual::{summarize, AnnualSummary};
pub use classify::{classify, NoLookup, QuoteLookup};
pub use darf::{aggregate, next_obligation, ObligationStatus, TaxObligation};
pub use disposal::{BasisSource, DisposalResult};
pub use distributions::DistributionTaxRecord;
pub use engine::{assess, SkippedItem, TaxAssessment};
pub use lots::{Consumption, Lot, LotFragment, LotLedger};
pub use regime::{ExemptionReason, MonthKey, MonthlyProfitBuckets, TaxRecord};
