//! Transaction model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use treasury_shared::types::{Branch, TransactionId};

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Money received.
    Income,
    /// Money paid out.
    Expense,
}

/// Which balance a transaction moves.
///
/// Set once when the transaction is created and never re-derived from the
/// category text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    /// The single central balance, whatever branch the entry is filed under.
    MainTreasury,
    /// The petty-cash drawer of the entry's branch.
    BranchPettyCash,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MainTreasury => f.write_str("main treasury"),
            Self::BranchPettyCash => f.write_str("petty cash"),
        }
    }
}

/// One cash movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Store-assigned identifier; `None` until the first write succeeds.
    pub id: Option<TransactionId>,
    /// Branch the movement is filed under.
    pub branch: Branch,
    /// Income or expense.
    pub direction: Direction,
    /// Balance affected.
    pub tier: Tier,
    /// Free label such as "Penjualan" or the transfer marker.
    pub category: String,
    /// Always positive.
    pub amount: Decimal,
    /// Free text.
    pub description: String,
    /// Business date the movement is attributed to.
    pub date: NaiveDate,
    /// In the trash.
    #[serde(default)]
    pub deleted: bool,
}

impl Transaction {
    /// Amount with the sign of its direction: positive for income.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::Income => self.amount,
            Direction::Expense => -self.amount,
        }
    }

    /// Returns true if the category is the reserved transfer marker.
    #[must_use]
    pub fn is_transfer(&self, transfer_category: &str) -> bool {
        self.category.trim().eq_ignore_ascii_case(transfer_category.trim())
    }

    /// Returns true if this entry moves the given outlet's petty cash.
    #[must_use]
    pub fn moves_petty_cash_of(&self, branch: Branch) -> bool {
        self.tier == Tier::BranchPettyCash && self.branch == branch
    }

    /// Returns true if this is a petty-cash expense, the only kind that is
    /// checked against an available balance.
    #[must_use]
    pub fn is_petty_cash_expense(&self) -> bool {
        self.tier == Tier::BranchPettyCash && self.direction == Direction::Expense
    }
}

/// Request to record a new transaction.
///
/// `branch` falls back to the session's branch and `date` to the session's
/// business date; an empty description is replaced by the category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Target branch, or the caller's own.
    pub branch: Option<Branch>,
    /// Income or expense.
    pub direction: Direction,
    /// Balance affected.
    pub tier: Tier,
    /// Category label.
    pub category: String,
    /// Amount; must be positive.
    pub amount: Decimal,
    /// Optional free text.
    pub description: Option<String>,
    /// Business date, or today.
    pub date: Option<NaiveDate>,
}

impl NewTransaction {
    /// Income on the given tier.
    #[must_use]
    pub fn income(tier: Tier, category: impl Into<String>, amount: Decimal) -> Self {
        Self::new(Direction::Income, tier, category, amount)
    }

    /// Expense on the given tier.
    #[must_use]
    pub fn expense(tier: Tier, category: impl Into<String>, amount: Decimal) -> Self {
        Self::new(Direction::Expense, tier, category, amount)
    }

    fn new(direction: Direction, tier: Tier, category: impl Into<String>, amount: Decimal) -> Self {
        Self {
            branch: None,
            direction,
            tier,
            category: category.into(),
            amount,
            description: None,
            date: None,
        }
    }

    /// Files the transaction under `branch`.
    #[must_use]
    pub fn at(mut self, branch: Branch) -> Self {
        self.branch = Some(branch);
        self
    }

    /// Attributes the transaction to `date`.
    #[must_use]
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Attaches a description.
    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
