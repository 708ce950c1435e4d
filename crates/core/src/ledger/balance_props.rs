//! Property-based tests for BalanceCalculator.
//!
//! - Conservation: total assets equal main treasury plus every petty-cash drawer
//! - Transfer neutrality: a complete top-up never changes total assets
//! - Determinism: the same snapshot always yields the same balances
//! - Trash exclusion: deleted entries never count

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use treasury_shared::types::Branch;

use super::balance::BalanceCalculator;
use super::types::{Direction, Tier, Transaction};

const TRANSFER: &str = "Top Up Kas Kecil";

/// Strategy to generate positive amounts (1 to 10,000,000 rupiah).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(Decimal::from)
}

fn branch_strategy() -> impl Strategy<Value = Branch> {
    prop_oneof![
        Just(Branch::BoxFactory),
        Just(Branch::MaintenanceAlfa),
        Just(Branch::SaufaOlshop),
        Just(Branch::Pusat),
    ]
}

fn outlet_strategy() -> impl Strategy<Value = Branch> {
    prop_oneof![
        Just(Branch::BoxFactory),
        Just(Branch::MaintenanceAlfa),
        Just(Branch::SaufaOlshop),
    ]
}

fn transaction_strategy() -> impl Strategy<Value = Transaction> {
    (
        branch_strategy(),
        prop_oneof![Just(Direction::Income), Just(Direction::Expense)],
        prop_oneof![Just(Tier::MainTreasury), Just(Tier::BranchPettyCash)],
        positive_amount(),
        0u32..60,
        any::<bool>(),
    )
        .prop_map(|(branch, direction, tier, amount, day, deleted)| Transaction {
            id: None,
            branch,
            direction,
            tier,
            category: "Operasional".to_string(),
            amount,
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Days::new(u64::from(day)),
            deleted,
        })
}

fn snapshot_strategy() -> impl Strategy<Value = Vec<Transaction>> {
    prop::collection::vec(transaction_strategy(), 0..40)
}

fn top_up_legs(branch: Branch, amount: Decimal) -> [Transaction; 2] {
    let date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
    let leg = |direction, tier, branch| Transaction {
        id: None,
        branch,
        direction,
        tier,
        category: TRANSFER.to_string(),
        amount,
        description: String::new(),
        date,
        deleted: false,
    };
    [
        leg(Direction::Expense, Tier::MainTreasury, Branch::Pusat),
        leg(Direction::Income, Tier::BranchPettyCash, branch),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* snapshot, total assets SHALL equal the main treasury plus the
    /// petty cash of every branch.
    #[test]
    fn prop_conservation(snapshot in snapshot_strategy()) {
        let petty: Decimal = Branch::ALL
            .into_iter()
            .map(|b| BalanceCalculator::branch_petty_cash(&snapshot, b))
            .sum();

        prop_assert_eq!(
            BalanceCalculator::total_assets(&snapshot),
            BalanceCalculator::main_treasury_balance(&snapshot) + petty
        );
    }

    /// *For any* snapshot, appending both legs of a top-up SHALL leave total
    /// assets unchanged and move exactly `amount` between the tiers.
    #[test]
    fn prop_transfer_neutrality(
        snapshot in snapshot_strategy(),
        branch in outlet_strategy(),
        amount in positive_amount(),
    ) {
        let before_total = BalanceCalculator::total_assets(&snapshot);
        let before_main = BalanceCalculator::main_treasury_balance(&snapshot);
        let before_petty = BalanceCalculator::branch_petty_cash(&snapshot, branch);

        let mut after = snapshot.clone();
        after.extend(top_up_legs(branch, amount));

        prop_assert_eq!(BalanceCalculator::total_assets(&after), before_total);
        prop_assert_eq!(BalanceCalculator::main_treasury_balance(&after), before_main - amount);
        prop_assert_eq!(
            BalanceCalculator::branch_petty_cash(&after, branch),
            before_petty + amount
        );
    }

    /// *For any* snapshot, evaluating twice SHALL give identical sheets, and
    /// evaluation order of the entries SHALL not matter.
    #[test]
    fn prop_deterministic_and_order_independent(snapshot in snapshot_strategy()) {
        let first = BalanceCalculator::balance_sheet(&snapshot);
        let second = BalanceCalculator::balance_sheet(&snapshot);
        prop_assert_eq!(&first, &second);

        let mut reversed = snapshot.clone();
        reversed.reverse();
        prop_assert_eq!(BalanceCalculator::balance_sheet(&reversed), first);
    }

    /// *For any* snapshot, dropping the deleted entries SHALL not change any
    /// balance.
    #[test]
    fn prop_trash_never_counts(snapshot in snapshot_strategy()) {
        let active: Vec<Transaction> = snapshot.iter().filter(|t| !t.deleted).cloned().collect();
        prop_assert_eq!(
            BalanceCalculator::balance_sheet(&snapshot),
            BalanceCalculator::balance_sheet(&active)
        );
    }
}
