//! Tests for period reports.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use treasury_shared::types::Branch;

use super::error::ReportError;
use super::service::ReportService;
use crate::ledger::{Direction, SessionContext, Tier, Transaction};

const TRANSFER: &str = "Top Up Kas Kecil";

fn day(month: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, d).unwrap()
}

fn tx(
    direction: Direction,
    tier: Tier,
    branch: Branch,
    category: &str,
    amount: Decimal,
    date: NaiveDate,
) -> Transaction {
    Transaction {
        id: None,
        branch,
        direction,
        tier,
        category: category.to_string(),
        amount,
        description: String::new(),
        date,
        deleted: false,
    }
}

/// February opening capital, then a March with a top-up, sales, costs and
/// one trashed entry.
#[rustfmt::skip]
fn ledger() -> Vec<Transaction> {
    use Branch::{BoxFactory, Pusat, SaufaOlshop};
    use Direction::{Expense, Income};
    use Tier::{BranchPettyCash, MainTreasury};

    let mut trashed = tx(Expense, MainTreasury, Pusat, "Sewa", dec!(900000), day(3, 4));
    trashed.deleted = true;

    vec![
        tx(Income, MainTreasury, Pusat, "Modal", dec!(10000000), day(2, 1)),
        tx(Expense, MainTreasury, Pusat, TRANSFER, dec!(1000000), day(3, 2)),
        tx(Income, BranchPettyCash, BoxFactory, TRANSFER, dec!(1000000), day(3, 2)),
        tx(Income, MainTreasury, BoxFactory, "Penjualan", dec!(2500000), day(3, 10)),
        tx(Expense, MainTreasury, Pusat, "Listrik", dec!(400000), day(3, 12)),
        tx(Expense, BranchPettyCash, BoxFactory, "Operasional", dec!(150000), day(3, 15)),
        tx(Expense, MainTreasury, SaufaOlshop, "Listrik", dec!(200000), day(3, 20)),
        trashed,
        tx(Income, MainTreasury, Pusat, "Penjualan", dec!(700000), day(4, 1)),
    ]
}

fn central() -> SessionContext {
    SessionContext::central(day(3, 31))
}

#[test]
fn test_main_totals_exclude_transfers_and_trash() {
    let report =
        ReportService::period_report(&central(), &ledger(), day(3, 1), day(3, 31), TRANSFER)
            .unwrap();

    assert_eq!(report.main_income, dec!(2500000));
    assert_eq!(report.main_expense, dec!(600000));
    assert_eq!(report.net, dec!(1900000));
    assert_eq!(report.transaction_count, 4);
}

#[test]
fn test_total_assets_are_taken_at_period_end() {
    let report =
        ReportService::period_report(&central(), &ledger(), day(3, 1), day(3, 31), TRANSFER)
            .unwrap();

    // 10,000,000 - 1,000,000 + 2,500,000 - 400,000 - 200,000 main
    // plus 1,000,000 - 150,000 petty cash; the April sale is not counted.
    assert_eq!(report.total_assets, dec!(11750000));
}

#[test]
fn test_branch_summaries_cover_both_tiers() {
    let report =
        ReportService::period_report(&central(), &ledger(), day(3, 1), day(3, 31), TRANSFER)
            .unwrap();

    assert_eq!(report.branches.len(), Branch::ALL.len());
    let box_factory = report
        .branches
        .iter()
        .find(|b| b.branch == Branch::BoxFactory)
        .unwrap();
    assert_eq!(box_factory.income, dec!(2500000));
    assert_eq!(box_factory.expense, dec!(150000));
    assert_eq!(box_factory.closing_petty_cash, dec!(850000));

    let pusat = report
        .branches
        .iter()
        .find(|b| b.branch == Branch::Pusat)
        .unwrap();
    assert_eq!(pusat.expense, dec!(400000));
    assert_eq!(pusat.closing_petty_cash, Decimal::ZERO);
}

#[test]
fn test_central_petty_row_is_not_reported_as_petty_cash() {
    let mut ledger = ledger();
    ledger.push(tx(
        Direction::Income,
        Tier::BranchPettyCash,
        Branch::Pusat,
        "Lain-lain",
        dec!(90000),
        day(3, 5),
    ));
    let report =
        ReportService::period_report(&central(), &ledger, day(3, 1), day(3, 31), TRANSFER)
            .unwrap();

    let pusat = report
        .branches
        .iter()
        .find(|b| b.branch == Branch::Pusat)
        .unwrap();
    assert_eq!(pusat.closing_petty_cash, Decimal::ZERO);
    let petty: Decimal = report.branches.iter().map(|b| b.closing_petty_cash).sum();
    assert_eq!(report.total_assets, dec!(10900000) + petty);
}

#[test]
fn test_branch_user_sees_only_own_branch() {
    let ctx = SessionContext::new(Branch::BoxFactory, day(3, 31));
    let report =
        ReportService::period_report(&ctx, &ledger(), day(3, 1), day(3, 31), TRANSFER).unwrap();

    assert_eq!(report.branches.len(), 1);
    assert_eq!(report.branches[0].branch, Branch::BoxFactory);
    assert_eq!(report.main_income, dec!(2500000));
    assert_eq!(report.main_expense, Decimal::ZERO);
    assert_eq!(report.total_assets, dec!(3350000));
}

#[test]
fn test_expense_categories_sorted_largest_first() {
    let report =
        ReportService::period_report(&central(), &ledger(), day(3, 1), day(3, 31), TRANSFER)
            .unwrap();

    let rows: Vec<(&str, Decimal)> = report
        .expense_by_category
        .iter()
        .map(|c| (c.category.as_str(), c.total))
        .collect();
    assert_eq!(
        rows,
        vec![("Listrik", dec!(600000)), ("Operasional", dec!(150000))]
    );
}

#[test]
fn test_invalid_date_range_rejected() {
    let err = ReportService::period_report(&central(), &ledger(), day(3, 31), day(3, 1), TRANSFER)
        .unwrap_err();

    assert_eq!(
        err,
        ReportError::InvalidDateRange {
            start: day(3, 31),
            end: day(3, 1),
        }
    );
    assert_eq!(err.error_code(), "INVALID_DATE_RANGE");
}

#[test]
fn test_monthly_report_spans_calendar_month() {
    let report = ReportService::monthly_report(&central(), &ledger(), 2025, 2, TRANSFER).unwrap();

    assert_eq!(report.from, day(2, 1));
    assert_eq!(report.to, day(2, 28));
    assert_eq!(report.main_income, dec!(10000000));
    assert_eq!(report.transaction_count, 1);
}

#[test]
fn test_monthly_report_rejects_bad_month() {
    let err = ReportService::monthly_report(&central(), &ledger(), 2025, 13, TRANSFER).unwrap_err();
    assert_eq!(err.error_code(), "INVALID_MONTH");
}

fn arb_transaction() -> impl Strategy<Value = Transaction> {
    (
        prop::bool::ANY,
        prop::bool::ANY,
        prop::sample::select(Branch::ALL.to_vec()),
        prop::sample::select(vec!["Listrik", "Sewa", TRANSFER]),
        1i64..5_000_000,
        1u32..=28,
    )
        .prop_map(|(income, main, branch, category, amount, d)| {
            tx(
                if income { Direction::Income } else { Direction::Expense },
                if main || branch.is_central() {
                    Tier::MainTreasury
                } else {
                    Tier::BranchPettyCash
                },
                branch,
                category,
                Decimal::from(amount),
                day(3, d),
            )
        })
}

proptest! {
    /// Net is always main income minus main expense.
    #[test]
    fn test_net_matches_totals(txs in prop::collection::vec(arb_transaction(), 0..40)) {
        let report =
            ReportService::period_report(&central(), &txs, day(3, 1), day(3, 31), TRANSFER)
                .unwrap();
        prop_assert_eq!(report.net, report.main_income - report.main_expense);
    }

    /// Category totals add up to the expense across all branch summaries.
    #[test]
    fn test_category_totals_match_branch_expense(
        txs in prop::collection::vec(arb_transaction(), 0..40),
    ) {
        let report =
            ReportService::period_report(&central(), &txs, day(3, 1), day(3, 31), TRANSFER)
                .unwrap();
        let by_category: Decimal = report.expense_by_category.iter().map(|c| c.total).sum();
        let by_branch: Decimal = report.branches.iter().map(|b| b.expense).sum();
        prop_assert_eq!(by_category, by_branch);
    }

    /// A transfer pair never changes total assets.
    #[test]
    fn test_transfer_pair_leaves_assets_unchanged(
        txs in prop::collection::vec(arb_transaction(), 0..20),
        amount in 1i64..1_000_000,
        outlet in prop::sample::select(Branch::OUTLETS.to_vec()),
    ) {
        let before =
            ReportService::period_report(&central(), &txs, day(3, 1), day(3, 31), TRANSFER)
                .unwrap();

        let mut with_transfer = txs;
        let amount = Decimal::from(amount);
        with_transfer.push(tx(
            Direction::Expense,
            Tier::MainTreasury,
            Branch::Pusat,
            TRANSFER,
            amount,
            day(3, 5),
        ));
        with_transfer.push(tx(
            Direction::Income,
            Tier::BranchPettyCash,
            outlet,
            TRANSFER,
            amount,
            day(3, 5),
        ));
        let after = ReportService::period_report(
            &central(),
            &with_transfer,
            day(3, 1),
            day(3, 31),
            TRANSFER,
        )
        .unwrap();

        prop_assert_eq!(before.total_assets, after.total_assets);
        prop_assert_eq!(before.main_income, after.main_income);
        prop_assert_eq!(before.main_expense, after.main_expense);
    }
}
