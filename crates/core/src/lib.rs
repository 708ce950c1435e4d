//! Core business logic for Treasury.
//!
//! This crate derives cash balances from a soft-deletable transaction log and
//! coordinates every change to that log. It has ZERO persistence dependencies:
//! the record store is reached only through the traits in [`store`].
//!
//! # Modules
//!
//! - `ledger` - Transaction model, balance calculator, chart series, snapshot
//! - `store` - Record-store collaborator traits
//! - `coordinator` - Validated, optimistic mutations with store reconciliation
//! - `payroll` - Employees and the pay-day status classifier
//! - `dashboard` - Alerts and the at-a-glance overview
//! - `reports` - Period summaries

pub mod coordinator;
pub mod dashboard;
pub mod ledger;
pub mod payroll;
pub mod reports;
pub mod store;

pub use coordinator::{MutationCoordinator, PayrollReceipt, TopUpReceipt, WriteTicket};
pub use ledger::{
    BalanceCalculator, Direction, LedgerError, LedgerSnapshot, NewTransaction, SessionContext,
    SyncState, Tier, Transaction,
};
pub use payroll::{Employee, NewEmployee, PayrollStatus};
