//! Apura - Brazilian investment tax liability engine
//!
//! Computes capital gains and distribution taxes over a ledger of buy/sell
//! movements: FIFO cost basis per holding, day-trade detection, per-class
//! tax regimes (flat, progressive and monthly-exemption), and the monthly
//! DARF payment schedule with legally defined due dates.

pub mod config;
pub mod error;
pub mod importers;
pub mod model;
pub mod reports;
pub mod tax;
pub mod utils;
