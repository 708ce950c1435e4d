//! Scripted store doubles for coordinator tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::Semaphore;
use treasury_shared::config::LedgerConfig;
use treasury_shared::types::{Branch, EmployeeId, TransactionId};
use treasury_shared::{StoreError, StoreResult};

use super::MutationCoordinator;
use crate::ledger::{Direction, SessionContext, Tier, Transaction};
use crate::payroll::{Employee, NewEmployee};
use crate::store::{EmployeeStore, TransactionFilter, TransactionStore};

/// Store operations a failure can be scripted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Create,
    Update,
    SoftDelete,
    Restore,
    PermanentDelete,
    Query,
    SetLastPaid,
}

#[derive(Default)]
struct Script {
    failures: Mutex<HashMap<Op, VecDeque<StoreError>>>,
    calls: Mutex<Vec<Op>>,
}

impl Script {
    fn fail_next(&self, op: Op, err: StoreError) {
        self.failures
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(err);
    }

    fn check(&self, op: Op) -> StoreResult<()> {
        self.calls.lock().unwrap().push(op);
        match self.failures.lock().unwrap().get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn count(&self, op: Op) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }
}

/// Where a gated store holds a call back.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Hold {
    /// Creates wait before anything is stored.
    Create,
    /// Creates store the row, then wait before replying.
    CreateReply,
    /// Updates wait before anything is stored.
    Update,
}

/// Transaction store that fails on demand and can hold calls back.
#[derive(Default)]
pub struct ScriptedTransactions {
    script: Script,
    rows: Mutex<Vec<Transaction>>,
    gate: Option<(Hold, Semaphore)>,
}

impl ScriptedTransactions {
    /// Store whose creates wait for [`release`](Self::release).
    pub fn gated() -> Self {
        Self::holding(Hold::Create)
    }

    /// Store whose creates persist at once but reply only after
    /// [`release`](Self::release).
    pub fn holding_replies() -> Self {
        Self::holding(Hold::CreateReply)
    }

    /// Store whose updates wait for [`release`](Self::release).
    pub fn holding_updates() -> Self {
        Self::holding(Hold::Update)
    }

    fn holding(hold: Hold) -> Self {
        Self {
            gate: Some((hold, Semaphore::new(0))),
            ..Self::default()
        }
    }

    pub fn fail_next(&self, op: Op, err: StoreError) {
        self.script.fail_next(op, err);
    }

    pub fn calls(&self, op: Op) -> usize {
        self.script.count(op)
    }

    pub fn release(&self, calls: usize) {
        if let Some((_, gate)) = &self.gate {
            gate.add_permits(calls);
        }
    }

    async fn wait(&self, at: Hold) {
        if let Some((hold, gate)) = &self.gate
            && *hold == at
        {
            gate.acquire().await.unwrap().forget();
        }
    }

    pub fn rows(&self) -> Vec<Transaction> {
        self.rows.lock().unwrap().clone()
    }

    pub fn seed(&self, transaction: Transaction) -> TransactionId {
        let id = TransactionId::generate();
        self.rows.lock().unwrap().push(Transaction {
            id: Some(id),
            ..transaction
        });
        id
    }

    fn with_row(&self, id: TransactionId, f: impl FnOnce(&mut Transaction)) -> StoreResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|t| t.id == Some(id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        f(row);
        Ok(())
    }

    fn query(&self, filter: &TransactionFilter, deleted: bool) -> Vec<Transaction> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.deleted == deleted && filter.matches(t))
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TransactionStore for ScriptedTransactions {
    async fn create(&self, transaction: &Transaction) -> StoreResult<TransactionId> {
        self.wait(Hold::Create).await;
        self.script.check(Op::Create)?;
        let id = self.seed(transaction.clone());
        self.wait(Hold::CreateReply).await;
        Ok(id)
    }

    async fn update(&self, id: TransactionId, transaction: &Transaction) -> StoreResult<()> {
        self.wait(Hold::Update).await;
        self.script.check(Op::Update)?;
        self.with_row(id, |row| {
            *row = Transaction {
                id: Some(id),
                deleted: row.deleted,
                ..transaction.clone()
            };
        })
    }

    async fn soft_delete(&self, id: TransactionId) -> StoreResult<()> {
        self.script.check(Op::SoftDelete)?;
        self.with_row(id, |row| row.deleted = true)
    }

    async fn restore(&self, id: TransactionId) -> StoreResult<()> {
        self.script.check(Op::Restore)?;
        self.with_row(id, |row| row.deleted = false)
    }

    async fn permanent_delete(&self, id: TransactionId) -> StoreResult<()> {
        self.script.check(Op::PermanentDelete)?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|t| t.id != Some(id));
        if rows.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn query_active(&self, filter: &TransactionFilter) -> StoreResult<Vec<Transaction>> {
        self.script.check(Op::Query)?;
        Ok(self.query(filter, false))
    }

    async fn query_trash(&self, filter: &TransactionFilter) -> StoreResult<Vec<Transaction>> {
        self.script.check(Op::Query)?;
        Ok(self.query(filter, true))
    }
}

/// Employee store that fails on demand.
#[derive(Default)]
pub struct ScriptedEmployees {
    script: Script,
    rows: Mutex<Vec<Employee>>,
}

impl ScriptedEmployees {
    pub fn fail_next(&self, op: Op, err: StoreError) {
        self.script.fail_next(op, err);
    }

    pub fn rows(&self) -> Vec<Employee> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmployeeStore for ScriptedEmployees {
    async fn create(&self, employee: &NewEmployee) -> StoreResult<EmployeeId> {
        self.script.check(Op::Create)?;
        let id = EmployeeId::generate();
        self.rows
            .lock()
            .unwrap()
            .push(Employee::from_new(id, employee.clone()));
        Ok(id)
    }

    async fn update(&self, employee: &Employee) -> StoreResult<()> {
        self.script.check(Op::Update)?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|e| e.id == employee.id)
            .ok_or_else(|| StoreError::NotFound(employee.id.to_string()))?;
        *row = employee.clone();
        Ok(())
    }

    async fn delete(&self, id: EmployeeId) -> StoreResult<()> {
        self.script.check(Op::PermanentDelete)?;
        self.rows.lock().unwrap().retain(|e| e.id != id);
        Ok(())
    }

    async fn list(&self, branch: Option<Branch>) -> StoreResult<Vec<Employee>> {
        self.script.check(Op::Query)?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|e| branch.is_none_or(|b| e.branch == b))
            .cloned()
            .collect())
    }

    async fn set_last_paid_date(&self, id: EmployeeId, date: NaiveDate) -> StoreResult<()> {
        self.script.check(Op::SetLastPaid)?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        row.last_paid_date = Some(date);
        Ok(())
    }
}

/// Coordinator wired to fresh doubles.
pub struct Harness {
    pub coordinator: MutationCoordinator,
    pub transactions: Arc<ScriptedTransactions>,
    pub employees: Arc<ScriptedEmployees>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(ScriptedTransactions::default(), LedgerConfig::default())
    }

    pub fn with(transactions: ScriptedTransactions, settings: LedgerConfig) -> Self {
        let transactions = Arc::new(transactions);
        let employees = Arc::new(ScriptedEmployees::default());
        let coordinator =
            MutationCoordinator::new(transactions.clone(), employees.clone(), settings);
        Self {
            coordinator,
            transactions,
            employees,
        }
    }

    /// Seeds a committed transaction in both the store and the snapshot.
    pub async fn seed(&self, transaction: Transaction) -> TransactionId {
        let id = self.transactions.seed(transaction);
        self.coordinator.refresh(&central()).await.unwrap();
        id
    }
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

pub fn central() -> SessionContext {
    SessionContext::central(day(10))
}

pub fn outlet(branch: Branch) -> SessionContext {
    SessionContext::new(branch, day(10))
}

pub fn entry(direction: Direction, tier: Tier, branch: Branch, amount: Decimal) -> Transaction {
    Transaction {
        id: None,
        branch,
        direction,
        tier,
        category: "Operasional".to_string(),
        amount,
        description: String::new(),
        date: day(1),
        deleted: false,
    }
}

pub fn capital(amount: Decimal) -> Transaction {
    entry(Direction::Income, Tier::MainTreasury, Branch::Pusat, amount)
}

pub fn employee(branch: Branch, pay_day: u8) -> NewEmployee {
    NewEmployee {
        name: "Wati".to_string(),
        branch,
        salary_amount: Decimal::from(3_000_000),
        pay_day_of_month: pay_day,
        phone: None,
    }
}
