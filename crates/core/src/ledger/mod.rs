//! Dual-tier ledger.
//!
//! This module implements:
//! - The transaction model and its tier/direction classification
//! - Balance derivation for the main treasury and each outlet's petty cash
//! - Chart series over a snapshot
//! - The observable in-memory snapshot with per-entry sync state
//! - The explicit session context passed to every mutation
//! - Error types for ledger operations

pub mod balance;
pub mod chart;
pub mod context;
pub mod error;
pub mod snapshot;
pub mod types;

#[cfg(test)]
mod balance_props;

pub use balance::{BalanceCalculator, BalanceSheet};
pub use chart::{ChartPoint, ChartScope, chart_series};
pub use context::SessionContext;
pub use error::LedgerError;
pub use snapshot::{LedgerEntry, LedgerSnapshot, LedgerState, SyncState};
pub use types::{Direction, NewTransaction, Tier, Transaction};
