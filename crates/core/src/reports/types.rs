//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use treasury_shared::types::Branch;

/// Summary of one date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodReport {
    /// First day, inclusive.
    pub from: NaiveDate,
    /// Last day, inclusive.
    pub to: NaiveDate,
    /// Main-treasury income in the range, transfers excluded.
    pub main_income: Decimal,
    /// Main-treasury expense in the range, transfers excluded.
    pub main_expense: Decimal,
    /// Income minus expense.
    pub net: Decimal,
    /// Everything the organization held at the end of `to`.
    pub total_assets: Decimal,
    /// One row per branch visible to the caller.
    pub branches: Vec<BranchSummary>,
    /// Expense per category, largest first.
    pub expense_by_category: Vec<CategoryTotal>,
    /// Entries counted in the range.
    pub transaction_count: usize,
}

/// Activity of one branch over the range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSummary {
    /// The branch.
    pub branch: Branch,
    /// Income filed under the branch, both tiers.
    pub income: Decimal,
    /// Expense filed under the branch, both tiers.
    pub expense: Decimal,
    /// Petty cash at the end of the range; zero for head office.
    pub closing_petty_cash: Decimal,
}

/// Expense total of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// Category label.
    pub category: String,
    /// Sum of expenses.
    pub total: Decimal,
}
