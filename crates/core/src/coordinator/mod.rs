//! Mutation coordination.
//!
//! Every change to the ledger goes through [`MutationCoordinator`]:
//!
//! 1. Validate the request against the current in-memory snapshot
//! 2. Apply it optimistically so subscribers see it at once
//! 3. Issue the record-store write on a background task
//! 4. Promote the entry on success, roll it back on failure
//!
//! Steps 1 and 2 run synchronously under the snapshot lock. The caller gets a
//! [`WriteTicket`] and may await it to learn how the write settled. Dropping
//! the ticket does not cancel the write.
//!
//! Validation never consults the store. Two processes holding stale snapshots
//! can therefore both pass a sufficiency check and overdraw a balance once
//! both writes land.

mod payroll;
mod transactions;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::info;
use treasury_shared::config::LedgerConfig;
use treasury_shared::types::{Branch, EmployeeId, LocalRef, TransactionId};

use crate::dashboard::{DashboardOverview, DashboardService};
use crate::ledger::{
    BalanceCalculator, BalanceSheet, ChartPoint, ChartScope, LedgerError, LedgerSnapshot,
    SessionContext, Tier, chart_series,
};
use crate::payroll::{Employee, EmployeeRoster, PayrollStatus};
use crate::reports::{PeriodReport, ReportError, ReportService};
use crate::store::{EmployeeStore, TransactionFilter, TransactionStore};

/// Handle to a write running in the background.
#[must_use = "the write runs in the background; await `settled` to learn its outcome"]
#[derive(Debug)]
pub struct WriteTicket<T> {
    local_refs: Vec<LocalRef>,
    handle: JoinHandle<Result<T, LedgerError>>,
}

impl<T> WriteTicket<T> {
    fn new(local_refs: Vec<LocalRef>, handle: JoinHandle<Result<T, LedgerError>>) -> Self {
        Self { local_refs, handle }
    }

    /// Local handle of the (first) affected snapshot entry.
    #[must_use]
    pub fn local_ref(&self) -> Option<LocalRef> {
        self.local_refs.first().copied()
    }

    /// Local handles of every affected snapshot entry.
    #[must_use]
    pub fn local_refs(&self) -> &[LocalRef] {
        &self.local_refs
    }

    /// Returns true once the background write has finished.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the write to settle.
    ///
    /// # Errors
    ///
    /// Returns the error the write settled with, or `Internal` if the
    /// background task panicked.
    pub async fn settled(self) -> Result<T, LedgerError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(LedgerError::Internal(format!("write task failed: {e}"))),
        }
    }
}

/// Both legs of a committed top-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopUpReceipt {
    /// The main-treasury expense.
    pub treasury_leg: TransactionId,
    /// The petty-cash income.
    pub petty_cash_leg: TransactionId,
}

/// A committed salary payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollReceipt {
    /// The salary expense.
    pub transaction_id: TransactionId,
    /// Who was paid.
    pub employee_id: EmployeeId,
    /// Recorded paid date.
    pub paid_on: NaiveDate,
}

/// Validates, applies and persists ledger and roster changes.
///
/// Cloning is cheap; clones share the snapshot, roster and stores.
#[derive(Clone)]
pub struct MutationCoordinator {
    snapshot: LedgerSnapshot,
    roster: EmployeeRoster,
    transactions: Arc<dyn TransactionStore>,
    employees: Arc<dyn EmployeeStore>,
    settings: Arc<LedgerConfig>,
}

impl std::fmt::Debug for MutationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationCoordinator")
            .field("snapshot", &self.snapshot)
            .field("roster", &self.roster)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl MutationCoordinator {
    /// Creates a coordinator with an empty snapshot and roster.
    ///
    /// Call [`refresh`](Self::refresh) to load what the store already holds.
    #[must_use]
    pub fn new(
        transactions: Arc<dyn TransactionStore>,
        employees: Arc<dyn EmployeeStore>,
        settings: LedgerConfig,
    ) -> Self {
        Self {
            snapshot: LedgerSnapshot::new(),
            roster: EmployeeRoster::default(),
            transactions,
            employees,
            settings: Arc::new(settings),
        }
    }

    /// Uses an existing snapshot instead of an empty one.
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: LedgerSnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Uses an existing roster instead of an empty one.
    #[must_use]
    pub fn with_roster(mut self, roster: EmployeeRoster) -> Self {
        self.roster = roster;
        self
    }

    /// The observable ledger.
    #[must_use]
    pub fn snapshot(&self) -> &LedgerSnapshot {
        &self.snapshot
    }

    /// The observable employee list.
    #[must_use]
    pub fn roster(&self) -> &EmployeeRoster {
        &self.roster
    }

    /// Rules and thresholds in force.
    #[must_use]
    pub fn settings(&self) -> &LedgerConfig {
        &self.settings
    }

    // ========== Queries ==========

    /// Balances of the current snapshot.
    #[must_use]
    pub fn balances(&self) -> BalanceSheet {
        BalanceCalculator::balance_sheet(&self.snapshot.active())
    }

    /// Main-treasury balance of the current snapshot.
    #[must_use]
    pub fn main_treasury_balance(&self) -> Decimal {
        BalanceCalculator::main_treasury_balance(&self.snapshot.active())
    }

    /// Petty cash of one outlet in the current snapshot.
    #[must_use]
    pub fn petty_cash(&self, branch: Branch) -> Decimal {
        BalanceCalculator::branch_petty_cash(&self.snapshot.active(), branch)
    }

    /// Chart series for `scope` over the current snapshot.
    #[must_use]
    pub fn chart(&self, scope: ChartScope) -> Vec<ChartPoint> {
        chart_series(
            &self.snapshot.active(),
            scope,
            &self.settings.transfer_category,
            self.settings.chart_window,
        )
    }

    /// Payroll status of every employee visible to `ctx`.
    #[must_use]
    pub fn payroll_statuses(&self, ctx: &SessionContext) -> Vec<(Employee, PayrollStatus)> {
        self.roster
            .statuses(ctx.today, self.settings.due_soon_days)
            .into_iter()
            .filter(|(employee, _)| ctx.can_see(employee.branch))
            .collect()
    }

    /// Balances, chart, alerts and write counters for `ctx`.
    #[must_use]
    pub fn overview(&self, ctx: &SessionContext) -> DashboardOverview {
        DashboardService::overview(
            ctx,
            &self.snapshot.state(),
            &self.roster.employees(),
            &self.settings,
        )
    }

    /// Summary of `from..=to` over the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `from` is after `to`.
    pub fn period_report(
        &self,
        ctx: &SessionContext,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PeriodReport, ReportError> {
        ReportService::period_report(
            ctx,
            &self.snapshot.active(),
            from,
            to,
            &self.settings.transfer_category,
        )
    }

    // ========== Loading ==========

    /// Reloads active and trashed transactions visible to `ctx`.
    ///
    /// Entries still pending or failed locally are kept.
    ///
    /// # Errors
    ///
    /// Returns `RemoteWriteFailure` if either query fails; the snapshot is
    /// left as it was.
    pub async fn refresh(&self, ctx: &SessionContext) -> Result<(), LedgerError> {
        let active_filter = TransactionFilter::scoped(ctx, self.settings.active_limit);
        let trash_filter = TransactionFilter::scoped(ctx, self.settings.trash_limit);

        let (active, trash) = tokio::try_join!(
            self.transactions.query_active(&active_filter),
            self.transactions.query_trash(&trash_filter),
        )
        .map_err(|e| LedgerError::remote("refresh", e))?;

        info!(
            branch = %ctx.branch,
            active = active.len(),
            trash = trash.len(),
            "Snapshot refreshed"
        );
        self.snapshot.load(active, trash);
        Ok(())
    }

    /// Reloads the employees visible to `ctx`.
    ///
    /// # Errors
    ///
    /// Returns `RemoteWriteFailure` if the query fails.
    pub async fn refresh_employees(&self, ctx: &SessionContext) -> Result<(), LedgerError> {
        let employees = self
            .employees
            .list(ctx.branch_filter())
            .await
            .map_err(|e| LedgerError::remote("refresh_employees", e))?;

        info!(branch = %ctx.branch, employees = employees.len(), "Roster refreshed");
        self.roster.replace_all(employees);
        Ok(())
    }

    fn spawn<T, F>(&self, local_refs: Vec<LocalRef>, write: F) -> WriteTicket<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, LedgerError>> + Send + 'static,
    {
        WriteTicket::new(local_refs, tokio::spawn(write))
    }
}

fn require_positive(amount: Decimal, what: &str) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "{what} must be positive, got {amount}"
        )));
    }
    Ok(())
}

fn require_visible(ctx: &SessionContext, branch: Branch) -> Result<(), LedgerError> {
    if ctx.can_see(branch) {
        Ok(())
    } else {
        Err(LedgerError::Validation(format!(
            "{} cannot change records of {}",
            ctx.branch.display_name(),
            branch.display_name()
        )))
    }
}

fn require_funds(tier: Tier, available: Decimal, requested: Decimal) -> Result<(), LedgerError> {
    if available < requested {
        return Err(LedgerError::InsufficientFunds {
            tier,
            available,
            requested,
        });
    }
    Ok(())
}

fn not_found(id: TransactionId) -> LedgerError {
    LedgerError::NotFound(id.to_string())
}
