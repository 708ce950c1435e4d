//! Errors reported by record-store collaborators.

use thiserror::Error;

/// Result type alias using `StoreError`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a record-store operation.
///
/// Schema and encoding are the store's business; callers only need to know
/// whether the write was refused, lost, or never happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The addressed record does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The store refused the write.
    #[error("Write rejected: {0}")]
    Rejected(String),

    /// The store did not answer in time.
    #[error("Store timed out after {0} ms")]
    Timeout(u64),

    /// The store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Anything else.
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Returns the error code for log lines and callers.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Rejected(_) => "REJECTED",
            Self::Timeout(_) => "TIMEOUT",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if repeating the same write may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Unavailable(_))
    }
}
