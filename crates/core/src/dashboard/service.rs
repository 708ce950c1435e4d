//! Dashboard computations.

use treasury_shared::config::LedgerConfig;

use super::types::{Alert, DashboardOverview};
use crate::ledger::{
    BalanceCalculator, ChartScope, LedgerState, SessionContext, Transaction, chart_series,
};
use crate::payroll::{Employee, PayrollStatus, days_until_pay_day};

/// Builds alerts and overviews from a snapshot.
pub struct DashboardService;

impl DashboardService {
    /// Open alerts for `ctx`: low petty cash first, then pay days, soonest
    /// first.
    ///
    /// Head office watches every outlet and employee; a branch user only its
    /// own.
    #[must_use]
    pub fn alerts(
        ctx: &SessionContext,
        transactions: &[Transaction],
        employees: &[Employee],
        settings: &LedgerConfig,
    ) -> Vec<Alert> {
        let threshold = settings.low_petty_cash_threshold;
        let mut alerts: Vec<Alert> = ctx
            .visible_outlets()
            .into_iter()
            .filter_map(|branch| {
                let balance = BalanceCalculator::branch_petty_cash(transactions, branch);
                (balance < threshold).then_some(Alert::LowPettyCash {
                    branch,
                    balance,
                    threshold,
                })
            })
            .collect();

        let mut due: Vec<Alert> = employees
            .iter()
            .filter(|e| ctx.can_see(e.branch))
            .filter(|e| {
                PayrollStatus::classify_with_window(e, ctx.today, settings.due_soon_days)
                    == PayrollStatus::DueSoon
            })
            .map(|e| Alert::PayrollDue {
                employee_id: e.id,
                name: e.name.clone(),
                branch: e.branch,
                days_left: days_until_pay_day(e, ctx.today),
            })
            .collect();
        due.sort_by_key(|alert| match alert {
            Alert::PayrollDue { days_left, .. } => *days_left,
            Alert::LowPettyCash { .. } => i64::MIN,
        });

        alerts.append(&mut due);
        alerts
    }

    /// Everything a dashboard shows, for `ctx`.
    #[must_use]
    pub fn overview(
        ctx: &SessionContext,
        state: &LedgerState,
        employees: &[Employee],
        settings: &LedgerConfig,
    ) -> DashboardOverview {
        let active = state.active();

        DashboardOverview {
            as_of: ctx.today,
            balances: BalanceCalculator::balance_sheet(&active),
            chart: chart_series(
                &active,
                ChartScope::for_context(ctx),
                &settings.transfer_category,
                settings.chart_window,
            ),
            alerts: Self::alerts(ctx, &active, employees, settings),
            pending_writes: state.pending_count(),
            failed_writes: state.failed().len(),
        }
    }
}
