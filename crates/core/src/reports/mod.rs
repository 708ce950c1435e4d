//! Period reports.
//!
//! This module provides pure logic for summarizing a date range of the
//! ledger:
//! - Main-treasury income and expense, net of transfers
//! - Per-branch income and expense with closing petty cash
//! - Expense breakdown by category
//! - Total assets at the end of the range

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
