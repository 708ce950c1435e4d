//! Chart series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use treasury_shared::types::Branch;

use super::context::SessionContext;
use super::types::{Direction, Tier, Transaction};

/// What a chart covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartScope {
    /// Every entry filed under one branch, both tiers.
    Branch(Branch),
    /// Every main-treasury entry of the organization.
    Organization,
}

impl ChartScope {
    /// Default scope for a caller: head office gets the organization view.
    #[must_use]
    pub const fn for_context(ctx: &SessionContext) -> Self {
        if ctx.is_central() {
            Self::Organization
        } else {
            Self::Branch(ctx.branch)
        }
    }

    fn includes(self, tx: &Transaction) -> bool {
        match self {
            Self::Branch(branch) => tx.branch == branch,
            Self::Organization => tx.tier == Tier::MainTreasury,
        }
    }
}

/// Income and expense of one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Business date.
    pub date: NaiveDate,
    /// Income that day.
    pub income: Decimal,
    /// Expense that day.
    pub expense: Decimal,
}

/// Daily income/expense for `scope`, oldest first, limited to the last
/// `window` dates that carry data.
///
/// Transfer entries are left out so a top-up does not show as revenue on one
/// side and cost on the other.
#[must_use]
pub fn chart_series(
    transactions: &[Transaction],
    scope: ChartScope,
    transfer_category: &str,
    window: usize,
) -> Vec<ChartPoint> {
    let mut by_date: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();

    for tx in transactions
        .iter()
        .filter(|tx| !tx.deleted && scope.includes(tx) && !tx.is_transfer(transfer_category))
    {
        let totals = by_date.entry(tx.date).or_default();
        match tx.direction {
            Direction::Income => totals.0 += tx.amount,
            Direction::Expense => totals.1 += tx.amount,
        }
    }

    let skip = by_date.len().saturating_sub(window);
    by_date
        .into_iter()
        .skip(skip)
        .map(|(date, (income, expense))| ChartPoint {
            date,
            income,
            expense,
        })
        .collect()
}
