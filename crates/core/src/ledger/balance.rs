//! Balance derivation.
//!
//! Main treasury and petty cash are never stored: they are recomputed from the
//! active transactions every time they are read. Deleted entries are skipped
//! here as well, so a raw slice that still contains trash is safe to pass.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use treasury_shared::types::Branch;

use super::types::{Tier, Transaction};

/// Pure balance queries over a transaction snapshot.
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Income minus expense over every main-treasury entry, whatever branch
    /// it is filed under.
    #[must_use]
    pub fn main_treasury_balance(transactions: &[Transaction]) -> Decimal {
        Self::net(transactions, |tx| tx.tier == Tier::MainTreasury)
    }

    /// Income minus expense over the petty-cash entries of one branch.
    #[must_use]
    pub fn branch_petty_cash(transactions: &[Transaction], branch: Branch) -> Decimal {
        Self::net(transactions, |tx| tx.moves_petty_cash_of(branch))
    }

    /// Main treasury plus the petty cash of every outlet.
    ///
    /// The central office holds no petty cash, so a stray petty-cash row filed
    /// under it is left out here and in [`balance_sheet`](Self::balance_sheet).
    #[must_use]
    pub fn total_assets(transactions: &[Transaction]) -> Decimal {
        Branch::OUTLETS
            .into_iter()
            .map(|branch| Self::branch_petty_cash(transactions, branch))
            .fold(Self::main_treasury_balance(transactions), |acc, petty| {
                acc + petty
            })
    }

    /// All balances at once.
    #[must_use]
    pub fn balance_sheet(transactions: &[Transaction]) -> BalanceSheet {
        let petty_cash: BTreeMap<Branch, Decimal> = Branch::OUTLETS
            .into_iter()
            .map(|branch| (branch, Self::branch_petty_cash(transactions, branch)))
            .collect();
        let main_treasury = Self::main_treasury_balance(transactions);
        let total_assets = petty_cash.values().fold(main_treasury, |acc, p| acc + p);

        BalanceSheet {
            main_treasury,
            petty_cash,
            total_assets,
        }
    }

    fn net(transactions: &[Transaction], include: impl Fn(&Transaction) -> bool) -> Decimal {
        transactions
            .iter()
            .filter(|tx| !tx.deleted && include(tx))
            .map(Transaction::signed_amount)
            .sum()
    }
}

/// Balances of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    /// Central balance.
    pub main_treasury: Decimal,
    /// Petty cash per outlet.
    pub petty_cash: BTreeMap<Branch, Decimal>,
    /// Everything the organization holds.
    pub total_assets: Decimal,
}

impl BalanceSheet {
    /// Petty cash of one outlet; zero for the central office.
    #[must_use]
    pub fn petty_cash_of(&self, branch: Branch) -> Decimal {
        self.petty_cash.get(&branch).copied().unwrap_or(Decimal::ZERO)
    }
}
