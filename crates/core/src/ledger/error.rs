//! Ledger error types.
//!
//! Validation and funds errors are raised before any store interaction and
//! leave the snapshot untouched. Remote failures are raised after the
//! optimistic change was rolled back (or, for a split transfer, after the
//! compensating write was attempted).

use rust_decimal::Decimal;
use thiserror::Error;
use treasury_shared::StoreError;
use treasury_shared::types::{EmployeeId, LocalRef, TransactionId};

use super::types::Tier;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Rejected before the store ==========
    /// Non-positive amount, missing field or impossible combination.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The balance the mutation draws from cannot cover it.
    #[error("Insufficient {tier} funds: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Balance that was checked.
        tier: Tier,
        /// What the snapshot holds.
        available: Decimal,
        /// What the mutation needs.
        requested: Decimal,
    },

    /// No snapshot entry with that identity.
    #[error("Transaction not found: {0}")]
    NotFound(String),

    /// The entry exists but is in the wrong place for this operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    // ========== Raised after the store answered ==========
    /// The store rejected or timed out the write; the local change was undone.
    #[error("{operation} failed at the record store: {source}")]
    RemoteWriteFailure {
        /// Coordinator operation that issued the write.
        operation: &'static str,
        /// What the store reported.
        #[source]
        source: StoreError,
    },

    /// The petty-cash leg of a top-up failed after the treasury leg
    /// committed, and erasing the treasury leg failed too.
    #[error("Top-up split: leg {committed} committed, petty leg {failed_leg} failed: {reason}")]
    PartialTransferFailure {
        /// The leg that reached the store.
        committed: TransactionId,
        /// Local handle of the leg left in the failed state.
        failed_leg: LocalRef,
        /// Why the second leg failed.
        reason: StoreError,
    },

    /// The salary expense committed but the employee's paid date could not
    /// be stored, and erasing the expense failed too.
    #[error("Payroll split: expense {committed} committed, {employee} not marked paid: {reason}")]
    PayrollNotMarked {
        /// The salary expense that reached the store.
        committed: TransactionId,
        /// Employee whose paid date is missing.
        employee: EmployeeId,
        /// Why the paid date was not stored.
        reason: StoreError,
    },

    /// The background write task died.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Shorthand for a remote failure.
    #[must_use]
    pub fn remote(operation: &'static str, source: StoreError) -> Self {
        Self::RemoteWriteFailure { operation, source }
    }

    /// Returns the error code for callers rendering a message.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::RemoteWriteFailure { .. } => "REMOTE_WRITE_FAILURE",
            Self::PartialTransferFailure { .. } => "PARTIAL_TRANSFER_FAILURE",
            Self::PayrollNotMarked { .. } => "PAYROLL_NOT_MARKED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the snapshot was left exactly as before the call.
    #[must_use]
    pub fn left_snapshot_unchanged(&self) -> bool {
        !matches!(
            self,
            Self::PartialTransferFailure { .. } | Self::PayrollNotMarked { .. } | Self::Internal(_)
        )
    }

    /// Returns true if issuing the same mutation again may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RemoteWriteFailure { source, .. } => source.is_transient(),
            Self::PartialTransferFailure { .. } | Self::PayrollNotMarked { .. } => true,
            _ => false,
        }
    }
}
