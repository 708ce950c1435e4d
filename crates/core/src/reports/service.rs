//! Report generation service.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use treasury_shared::types::Branch;

use super::error::ReportError;
use super::types::{BranchSummary, CategoryTotal, PeriodReport};
use crate::ledger::{BalanceCalculator, Direction, SessionContext, Tier, Transaction};

/// Service for generating period reports.
pub struct ReportService;

impl ReportService {
    /// Summarizes `from..=to` for `ctx`.
    ///
    /// Income and expense exclude transfer entries so a top-up is not counted
    /// as revenue and cost. Total assets and closing petty cash cover every
    /// entry dated up to `to`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `from` is after `to`.
    pub fn period_report(
        ctx: &SessionContext,
        transactions: &[Transaction],
        from: NaiveDate,
        to: NaiveDate,
        transfer_category: &str,
    ) -> Result<PeriodReport, ReportError> {
        if from > to {
            return Err(ReportError::InvalidDateRange {
                start: from,
                end: to,
            });
        }

        let closing: Vec<Transaction> = transactions
            .iter()
            .filter(|t| !t.deleted && t.date <= to && ctx.can_see(t.branch))
            .cloned()
            .collect();
        let in_range: Vec<&Transaction> = closing
            .iter()
            .filter(|t| t.date >= from && !t.is_transfer(transfer_category))
            .collect();

        let main_income = Self::sum(&in_range, |t| {
            t.tier == Tier::MainTreasury && t.direction == Direction::Income
        });
        let main_expense = Self::sum(&in_range, |t| {
            t.tier == Tier::MainTreasury && t.direction == Direction::Expense
        });

        let branches = Branch::ALL
            .into_iter()
            .filter(|b| ctx.can_see(*b))
            .map(|branch| BranchSummary {
                branch,
                income: Self::sum(&in_range, |t| {
                    t.branch == branch && t.direction == Direction::Income
                }),
                expense: Self::sum(&in_range, |t| {
                    t.branch == branch && t.direction == Direction::Expense
                }),
                closing_petty_cash: if branch.is_central() {
                    Decimal::ZERO
                } else {
                    BalanceCalculator::branch_petty_cash(&closing, branch)
                },
            })
            .collect();

        Ok(PeriodReport {
            from,
            to,
            main_income,
            main_expense,
            net: main_income - main_expense,
            total_assets: BalanceCalculator::total_assets(&closing),
            branches,
            expense_by_category: Self::expense_by_category(&in_range),
            transaction_count: in_range.len(),
        })
    }

    /// Summarizes one calendar month.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMonth` for a month outside 1-12.
    pub fn monthly_report(
        ctx: &SessionContext,
        transactions: &[Transaction],
        year: i32,
        month: u32,
        transfer_category: &str,
    ) -> Result<PeriodReport, ReportError> {
        let from = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(ReportError::InvalidMonth { year, month })?;
        let to = NaiveDate::from_ymd_opt(year, month, crate::payroll::days_in_month(from))
            .ok_or(ReportError::InvalidMonth { year, month })?;
        Self::period_report(ctx, transactions, from, to, transfer_category)
    }

    fn sum(transactions: &[&Transaction], include: impl Fn(&Transaction) -> bool) -> Decimal {
        transactions
            .iter()
            .filter(|t| include(**t))
            .map(|t| t.amount)
            .sum()
    }

    fn expense_by_category(transactions: &[&Transaction]) -> Vec<CategoryTotal> {
        let mut totals: HashMap<&str, Decimal> = HashMap::new();
        for tx in transactions.iter().filter(|t| t.direction == Direction::Expense) {
            *totals.entry(tx.category.as_str()).or_default() += tx.amount;
        }

        let mut rows: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|(category, total)| CategoryTotal {
                category: category.to_string(),
                total,
            })
            .collect();
        rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
        rows
    }
}
