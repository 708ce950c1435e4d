//! Record-store collaborators.
//!
//! The core never talks to a database. It issues writes through these traits
//! and the embedding application supplies the implementation. Every call is
//! asynchronous and fallible; timeouts are the implementation's concern and
//! come back as [`StoreError::Timeout`](treasury_shared::StoreError).

use async_trait::async_trait;
use chrono::NaiveDate;
use treasury_shared::StoreResult;
use treasury_shared::types::{Branch, EmployeeId, TransactionId};

use crate::ledger::{SessionContext, Transaction};
use crate::payroll::{Employee, NewEmployee};

/// Which transactions a query returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Only this branch; `None` for all.
    pub branch: Option<Branch>,
    /// Maximum rows, newest dates first.
    pub limit: Option<usize>,
}

impl TransactionFilter {
    /// Filter visible to `ctx`, capped at `limit` rows.
    #[must_use]
    pub const fn scoped(ctx: &SessionContext, limit: usize) -> Self {
        Self {
            branch: ctx.branch_filter(),
            limit: Some(limit),
        }
    }

    /// Returns true if `tx` passes the branch restriction.
    #[must_use]
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.branch.is_none_or(|branch| tx.branch == branch)
    }
}

/// Persistence of transactions.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Persists a new transaction and returns its assigned id.
    async fn create(&self, transaction: &Transaction) -> StoreResult<TransactionId>;

    /// Replaces the stored fields of `id`.
    async fn update(&self, id: TransactionId, transaction: &Transaction) -> StoreResult<()>;

    /// Flags `id` as deleted.
    async fn soft_delete(&self, id: TransactionId) -> StoreResult<()>;

    /// Clears the deleted flag of `id`.
    async fn restore(&self, id: TransactionId) -> StoreResult<()>;

    /// Erases `id` for good.
    async fn permanent_delete(&self, id: TransactionId) -> StoreResult<()>;

    /// Non-deleted transactions matching `filter`.
    async fn query_active(&self, filter: &TransactionFilter) -> StoreResult<Vec<Transaction>>;

    /// Deleted transactions matching `filter`.
    async fn query_trash(&self, filter: &TransactionFilter) -> StoreResult<Vec<Transaction>>;
}

/// Persistence of employees.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Persists a new employee and returns its assigned id.
    async fn create(&self, employee: &NewEmployee) -> StoreResult<EmployeeId>;

    /// Replaces the stored fields of `employee.id`.
    async fn update(&self, employee: &Employee) -> StoreResult<()>;

    /// Removes an employee.
    async fn delete(&self, id: EmployeeId) -> StoreResult<()>;

    /// Employees of `branch`, or everyone when `None`.
    async fn list(&self, branch: Option<Branch>) -> StoreResult<Vec<Employee>>;

    /// Records the last salary payment of `id`.
    async fn set_last_paid_date(&self, id: EmployeeId, date: NaiveDate) -> StoreResult<()>;
}
