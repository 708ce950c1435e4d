//! Salary payments and roster changes.

use tracing::{debug, error, info, warn};
use treasury_shared::types::{EmployeeId, LocalRef};

use super::{MutationCoordinator, PayrollReceipt, WriteTicket, require_funds, require_visible};
use crate::ledger::{BalanceCalculator, Direction, LedgerError, SessionContext, Tier, Transaction};
use crate::payroll::{Employee, NewEmployee, PayrollStatus};

impl MutationCoordinator {
    /// Pays one month of salary.
    ///
    /// Records a main-treasury expense under the payroll category, filed
    /// under the employee's branch, then stores today as the last paid date.
    /// The main treasury is only checked when `check_payroll_funds` is on.
    ///
    /// # Errors
    ///
    /// Returns `Validation` or `InsufficientFunds` without touching anything.
    /// The ticket settles with `RemoteWriteFailure` once both the expense and
    /// the paid date were rolled back, or with `PayrollNotMarked` when the
    /// expense committed but neither the paid date nor the rollback could be
    /// stored.
    pub fn pay_employee(
        &self,
        ctx: &SessionContext,
        employee: &Employee,
    ) -> Result<WriteTicket<PayrollReceipt>, LedgerError> {
        employee.validate()?;
        require_visible(ctx, employee.branch)?;

        let today = ctx.today;
        let employee_id = employee.id;
        if PayrollStatus::classify(employee, today) == PayrollStatus::Paid {
            warn!(employee_id = %employee_id, "Employee already paid this month, paying again");
        }

        let expense = Transaction {
            id: None,
            branch: employee.branch,
            direction: Direction::Expense,
            tier: Tier::MainTreasury,
            category: self.settings.payroll_category.clone(),
            amount: employee.salary_amount,
            description: format!("Salary {}: {}", today.format("%B %Y"), employee.name),
            date: today,
            deleted: false,
        };
        let local_ref = LocalRef::generate();
        let check_funds = self.settings.check_payroll_funds;

        self.snapshot.try_modify(|state| {
            if check_funds {
                let available = BalanceCalculator::main_treasury_balance(&state.active());
                require_funds(Tier::MainTreasury, available, expense.amount)?;
            }
            state.push_pending(local_ref, expense.clone());
            Ok(())
        })?;
        let previous_paid = self.roster.set_last_paid(employee_id, Some(today));

        info!(
            employee_id = %employee_id,
            branch = %employee.branch,
            amount = %expense.amount,
            "Salary applied, write issued"
        );

        let snapshot = self.snapshot.clone();
        let roster = self.roster.clone();
        let transactions = self.transactions.clone();
        let employees = self.employees.clone();
        Ok(self.spawn(vec![local_ref], async move {
            let undo_paid = || {
                if let Some(previous) = previous_paid {
                    roster.set_last_paid(employee_id, previous);
                }
            };

            let transaction_id = match transactions.create(&expense).await {
                Ok(id) => {
                    snapshot.promote(local_ref, id);
                    id
                }
                Err(e) => {
                    snapshot.remove(local_ref);
                    undo_paid();
                    warn!(
                        employee_id = %employee_id,
                        error = %e,
                        "Salary expense failed, rolled back"
                    );
                    return Err(LedgerError::remote("pay_employee", e));
                }
            };

            let reason = match employees.set_last_paid_date(employee_id, today).await {
                Ok(()) => {
                    info!(
                        employee_id = %employee_id,
                        transaction_id = %transaction_id,
                        "Salary committed"
                    );
                    return Ok(PayrollReceipt {
                        transaction_id,
                        employee_id,
                        paid_on: today,
                    });
                }
                Err(e) => e,
            };

            undo_paid();
            warn!(
                employee_id = %employee_id,
                transaction_id = %transaction_id,
                error = %reason,
                "Paid date not stored, erasing salary expense"
            );
            match transactions.permanent_delete(transaction_id).await {
                Ok(()) => {
                    snapshot.remove(local_ref);
                    Err(LedgerError::remote("pay_employee", reason))
                }
                Err(compensation) => {
                    error!(
                        employee_id = %employee_id,
                        transaction_id = %transaction_id,
                        error = %compensation,
                        "Compensation failed, salary recorded without paid date"
                    );
                    Err(LedgerError::PayrollNotMarked {
                        committed: transaction_id,
                        employee: employee_id,
                        reason,
                    })
                }
            }
        }))
    }

    /// Adds an employee. Branch users can only add to their own branch.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad fields and `RemoteWriteFailure` if the
    /// store refuses the record.
    pub async fn add_employee(
        &self,
        ctx: &SessionContext,
        mut input: NewEmployee,
    ) -> Result<Employee, LedgerError> {
        if !ctx.is_central() && input.branch != ctx.branch {
            debug!(
                requested = %input.branch,
                branch = %ctx.branch,
                "Employee filed under caller's branch"
            );
            input.branch = ctx.branch;
        }
        input.name = input.name.trim().to_string();
        input.validate()?;

        let id = self
            .employees
            .create(&input)
            .await
            .map_err(|e| LedgerError::remote("add_employee", e))?;
        let employee = Employee::from_new(id, input);

        info!(employee_id = %id, branch = %employee.branch, "Employee added");
        self.roster.upsert(employee.clone());
        Ok(employee)
    }

    /// Replaces an employee's record.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad fields or a foreign branch, `NotFound` if
    /// the employee is unknown to the roster, and `RemoteWriteFailure` if the
    /// store refuses the update.
    pub async fn update_employee(
        &self,
        ctx: &SessionContext,
        employee: Employee,
    ) -> Result<(), LedgerError> {
        employee.validate()?;
        require_visible(ctx, employee.branch)?;
        let current = self
            .roster
            .get(employee.id)
            .ok_or_else(|| LedgerError::NotFound(employee.id.to_string()))?;
        require_visible(ctx, current.branch)?;

        self.employees
            .update(&employee)
            .await
            .map_err(|e| LedgerError::remote("update_employee", e))?;

        info!(employee_id = %employee.id, "Employee updated");
        self.roster.upsert(employee);
        Ok(())
    }

    /// Removes an employee.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the employee is unknown to the roster and
    /// `RemoteWriteFailure` if the store refuses the delete.
    pub async fn delete_employee(
        &self,
        ctx: &SessionContext,
        id: EmployeeId,
    ) -> Result<(), LedgerError> {
        let current = self
            .roster
            .get(id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        require_visible(ctx, current.branch)?;

        self.employees
            .delete(id)
            .await
            .map_err(|e| LedgerError::remote("delete_employee", e))?;

        info!(employee_id = %id, "Employee deleted");
        self.roster.remove(id);
        Ok(())
    }
}
