//! Payroll error types.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::ledger::LedgerError;

/// Employee record validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayrollError {
    /// Name is empty or blank.
    #[error("Employee name cannot be empty")]
    EmptyName,

    /// Salary is zero or negative.
    #[error("Salary must be positive, got {0}")]
    InvalidSalary(Decimal),

    /// Pay day outside 1-31.
    #[error("Pay day must be between 1 and 31, got {0}")]
    InvalidPayDay(u8),
}

impl PayrollError {
    /// Returns the error code for callers rendering a message.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyName => "EMPTY_NAME",
            Self::InvalidSalary(_) => "INVALID_SALARY",
            Self::InvalidPayDay(_) => "INVALID_PAY_DAY",
        }
    }
}

impl From<PayrollError> for LedgerError {
    fn from(err: PayrollError) -> Self {
        Self::Validation(err.to_string())
    }
}
