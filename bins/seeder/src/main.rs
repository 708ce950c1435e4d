//! Demo data seeder for Treasury development and testing.
//!
//! Records opening capital, tops up every outlet, hires employees, spreads
//! random transactions over the last `seed.days_back` days and pays overdue
//! salaries, all through the mutation coordinator. Finishes by logging the
//! balances, alerts, payroll status and this month's report.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use chrono::{Datelike, Duration, Local, NaiveDate};
use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use treasury_core::ledger::{LedgerError, NewTransaction, SessionContext, Tier};
use treasury_core::payroll::{NewEmployee, PayrollStatus};
use treasury_core::{MutationCoordinator, WriteTicket};
use treasury_shared::AppConfig;
use treasury_shared::config::SeedConfig;
use treasury_shared::types::Branch;
use treasury_store::{MemoryEmployeeStore, MemoryTransactionStore};

const OPENING_CAPITAL: i64 = 50_000_000;
const OUTLET_FLOAT: i64 = 2_000_000;

const NAMES: [&str; 12] = [
    "Andi", "Budi", "Citra", "Dewi", "Eko", "Fitri", "Gilang", "Hana", "Indra", "Joko", "Kartika",
    "Lestari",
];
const INCOME_CATEGORIES: [&str; 3] = ["Penjualan", "Jasa Servis", "Pendapatan Lain"];
const MAIN_EXPENSE_CATEGORIES: [&str; 3] = ["Listrik", "Sewa", "Bahan Baku"];
const PETTY_EXPENSE_CATEGORIES: [&str; 3] = ["Bensin", "Konsumsi", "Alat Tulis"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "treasury=debug,seeder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let coordinator = MutationCoordinator::new(
        Arc::new(MemoryTransactionStore::new()),
        Arc::new(MemoryEmployeeStore::new()),
        config.ledger.clone(),
    );

    let today = Local::now().date_naive();
    let start = today - Duration::days(config.seed.days_back);
    let central = SessionContext::central(today);

    info!(%start, %today, "Seeding treasury");
    seed_opening(&coordinator, &central.on(start)).await?;
    seed_employees(&coordinator, &central, &config.seed).await?;
    seed_transactions(&coordinator, start, today, &config.seed).await;
    pay_overdue(&coordinator, &central).await;

    coordinator.refresh(&central).await?;
    coordinator.refresh_employees(&central).await?;
    summarize(&coordinator, &central)?;
    Ok(())
}

/// Opening capital plus a float for every outlet.
async fn seed_opening(
    coordinator: &MutationCoordinator,
    ctx: &SessionContext,
) -> anyhow::Result<()> {
    coordinator
        .record_transaction(
            ctx,
            NewTransaction::income(
                Tier::MainTreasury,
                "Modal Awal",
                Decimal::from(OPENING_CAPITAL),
            ),
        )?
        .settled()
        .await?;

    for branch in Branch::OUTLETS {
        let receipt = coordinator
            .perform_top_up(ctx, branch, Decimal::from(OUTLET_FLOAT))?
            .settled()
            .await?;
        info!(
            branch = %branch,
            treasury_leg = %receipt.treasury_leg,
            petty_cash_leg = %receipt.petty_cash_leg,
            "Outlet funded"
        );
    }
    Ok(())
}

async fn seed_employees(
    coordinator: &MutationCoordinator,
    ctx: &SessionContext,
    seed: &SeedConfig,
) -> anyhow::Result<()> {
    let hires: Vec<NewEmployee> = {
        let mut rng = rand::rng();
        (0..seed.employees)
            .map(|i| NewEmployee {
                name: format!("{} {}", NAMES[i % NAMES.len()], i / NAMES.len() + 1),
                branch: *Branch::ALL.choose(&mut rng).unwrap_or(&Branch::Pusat),
                salary_amount: Decimal::from(rng.random_range(50..=120) * 50_000),
                pay_day_of_month: rng.random_range(1..=28),
                phone: None,
            })
            .collect()
    };

    for hire in hires {
        let employee = coordinator.add_employee(ctx, hire).await?;
        info!(
            employee_id = %employee.id,
            name = %employee.name,
            branch = %employee.branch,
            pay_day = employee.pay_day_of_month,
            "Employee hired"
        );
    }
    Ok(())
}

/// Random income and expenses; petty-cash spends that would overdraw are
/// skipped.
async fn seed_transactions(
    coordinator: &MutationCoordinator,
    start: NaiveDate,
    today: NaiveDate,
    seed: &SeedConfig,
) {
    let span = (today - start).num_days().max(0);
    let plans: Vec<(SessionContext, NewTransaction)> = {
        let mut rng = rand::rng();
        (0..seed.transactions)
            .map(|_| {
                let date = start + Duration::days(rng.random_range(0..=span));
                let branch = *Branch::OUTLETS.choose(&mut rng).unwrap_or(&Branch::BoxFactory);
                let ctx = SessionContext::new(branch, date);
                let input = match rng.random_range(0..3) {
                    0 => NewTransaction::income(
                        Tier::MainTreasury,
                        pick(&mut rng, &INCOME_CATEGORIES),
                        Decimal::from(rng.random_range(5..=60) * 50_000),
                    ),
                    1 => NewTransaction::expense(
                        Tier::MainTreasury,
                        pick(&mut rng, &MAIN_EXPENSE_CATEGORIES),
                        Decimal::from(rng.random_range(2..=30) * 50_000),
                    ),
                    _ => NewTransaction::expense(
                        Tier::BranchPettyCash,
                        pick(&mut rng, &PETTY_EXPENSE_CATEGORIES),
                        Decimal::from(rng.random_range(1..=20) * 10_000),
                    ),
                };
                (ctx, input)
            })
            .collect()
    };

    let mut tickets = Vec::with_capacity(plans.len());
    for (ctx, input) in plans {
        match coordinator.record_transaction(&ctx, input) {
            Ok(ticket) => tickets.push(ticket),
            Err(LedgerError::InsufficientFunds {
                available,
                requested,
                ..
            }) => {
                warn!(
                    branch = %ctx.branch,
                    %available,
                    %requested,
                    "Petty cash too low, spend skipped"
                );
            }
            Err(e) => warn!(error = %e, "Transaction rejected"),
        }
    }
    settle_all(tickets).await;
}

async fn pay_overdue(coordinator: &MutationCoordinator, ctx: &SessionContext) {
    let mut tickets = Vec::new();
    for (employee, status) in coordinator.payroll_statuses(ctx) {
        if status != PayrollStatus::Overdue {
            continue;
        }
        match coordinator.pay_employee(ctx, &employee) {
            Ok(ticket) => tickets.push(ticket),
            Err(e) => warn!(employee_id = %employee.id, error = %e, "Salary not paid"),
        }
    }
    settle_all(tickets).await;
}

async fn settle_all<T>(tickets: Vec<WriteTicket<T>>) {
    for ticket in tickets {
        if let Err(e) = ticket.settled().await {
            warn!(code = e.error_code(), error = %e, "Write did not settle");
        }
    }
}

fn summarize(coordinator: &MutationCoordinator, ctx: &SessionContext) -> anyhow::Result<()> {
    let overview = coordinator.overview(ctx);
    info!(
        main_treasury = %overview.balances.main_treasury,
        total_assets = %overview.balances.total_assets,
        "Balances"
    );
    for (branch, petty_cash) in &overview.balances.petty_cash {
        info!(branch = %branch, %petty_cash, "Petty cash");
    }
    for alert in &overview.alerts {
        warn!(branch = %alert.branch(), "{}", alert.message());
    }
    for (employee, status) in coordinator.payroll_statuses(ctx) {
        info!(name = %employee.name, branch = %employee.branch, %status, "Payroll");
    }

    let month_start = ctx
        .today
        .with_day(1)
        .context("first day of the current month")?;
    let report = coordinator.period_report(ctx, month_start, ctx.today)?;
    info!(
        from = %report.from,
        to = %report.to,
        income = %report.main_income,
        expense = %report.main_expense,
        net = %report.net,
        entries = report.transaction_count,
        "Month to date"
    );
    Ok(())
}

fn pick(rng: &mut impl Rng, options: &[&'static str]) -> &'static str {
    options.choose(rng).copied().unwrap_or("Lain-lain")
}
