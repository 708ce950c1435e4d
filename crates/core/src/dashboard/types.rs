//! Dashboard data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use treasury_shared::types::{Branch, EmployeeId};

use crate::ledger::{BalanceSheet, ChartPoint};

/// Something the user should look at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Alert {
    /// An outlet's petty cash fell under the threshold.
    LowPettyCash {
        /// The outlet.
        branch: Branch,
        /// Current petty cash.
        balance: Decimal,
        /// Configured threshold.
        threshold: Decimal,
    },
    /// An unpaid employee's pay day is close.
    PayrollDue {
        /// Target for navigation.
        employee_id: EmployeeId,
        /// Display name.
        name: String,
        /// Where the employee works.
        branch: Branch,
        /// Days until pay day; zero means today.
        days_left: i64,
    },
}

impl Alert {
    /// One-line text for notification lists.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::LowPettyCash {
                branch, balance, ..
            } => format!(
                "Petty cash of {} is running low ({balance} left)",
                branch.display_name()
            ),
            Self::PayrollDue {
                name, days_left: 0, ..
            } => format!("Salary of {name} is due today"),
            Self::PayrollDue {
                name, days_left, ..
            } => format!("Salary of {name} is due in {days_left} day(s)"),
        }
    }

    /// Branch the alert concerns.
    #[must_use]
    pub const fn branch(&self) -> Branch {
        match self {
            Self::LowPettyCash { branch, .. } | Self::PayrollDue { branch, .. } => *branch,
        }
    }
}

/// At-a-glance view for one caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardOverview {
    /// Business date the overview was built for.
    pub as_of: NaiveDate,
    /// Current balances.
    pub balances: BalanceSheet,
    /// Recent daily income and expense in the caller's scope.
    pub chart: Vec<ChartPoint>,
    /// Open alerts.
    pub alerts: Vec<Alert>,
    /// Writes still in flight.
    pub pending_writes: usize,
    /// Writes that failed and await retry or discard.
    pub failed_writes: usize,
}
