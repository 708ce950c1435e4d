//! Transaction log held in memory.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use treasury_core::ledger::Transaction;
use treasury_core::store::{TransactionFilter, TransactionStore};
use treasury_shared::types::TransactionId;
use treasury_shared::{StoreError, StoreResult};

use crate::Availability;

#[derive(Debug, Clone)]
struct Row {
    seq: u64,
    transaction: Transaction,
}

/// In-memory [`TransactionStore`].
///
/// Queries return the newest entries first: by date, then by insertion order.
#[derive(Debug, Default)]
pub struct MemoryTransactionStore {
    rows: DashMap<TransactionId, Row>,
    next_seq: AtomicU64,
    availability: Availability,
}

impl MemoryTransactionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail with `Unavailable` until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.availability.set_offline(offline);
    }

    /// Number of stored records, trashed ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up one record.
    #[must_use]
    pub fn get(&self, id: TransactionId) -> Option<Transaction> {
        self.rows.get(&id).map(|row| row.transaction.clone())
    }

    fn modify(&self, id: TransactionId, f: impl FnOnce(&mut Transaction)) -> StoreResult<()> {
        let mut row = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        f(&mut row.transaction);
        Ok(())
    }

    fn query(&self, filter: &TransactionFilter, deleted: bool) -> Vec<Transaction> {
        let mut rows: Vec<Row> = self
            .rows
            .iter()
            .filter(|row| row.transaction.deleted == deleted && filter.matches(&row.transaction))
            .map(|row| row.value().clone())
            .collect();
        rows.sort_by(|a, b| {
            b.transaction
                .date
                .cmp(&a.transaction.date)
                .then(b.seq.cmp(&a.seq))
        });
        rows.into_iter()
            .take(filter.limit.unwrap_or(usize::MAX))
            .map(|row| row.transaction)
            .collect()
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn create(&self, transaction: &Transaction) -> StoreResult<TransactionId> {
        self.availability.check("transaction store")?;
        let id = TransactionId::generate();
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.rows.insert(
            id,
            Row {
                seq,
                transaction: Transaction {
                    id: Some(id),
                    ..transaction.clone()
                },
            },
        );
        debug!(transaction_id = %id, branch = %transaction.branch, "Transaction stored");
        Ok(id)
    }

    async fn update(&self, id: TransactionId, transaction: &Transaction) -> StoreResult<()> {
        self.availability.check("transaction store")?;
        self.modify(id, |row| {
            *row = Transaction {
                id: Some(id),
                deleted: row.deleted,
                ..transaction.clone()
            };
        })?;
        debug!(transaction_id = %id, "Transaction updated");
        Ok(())
    }

    async fn soft_delete(&self, id: TransactionId) -> StoreResult<()> {
        self.availability.check("transaction store")?;
        self.modify(id, |row| row.deleted = true)?;
        debug!(transaction_id = %id, "Transaction trashed");
        Ok(())
    }

    async fn restore(&self, id: TransactionId) -> StoreResult<()> {
        self.availability.check("transaction store")?;
        self.modify(id, |row| row.deleted = false)?;
        debug!(transaction_id = %id, "Transaction restored");
        Ok(())
    }

    async fn permanent_delete(&self, id: TransactionId) -> StoreResult<()> {
        self.availability.check("transaction store")?;
        self.rows
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        debug!(transaction_id = %id, "Transaction erased");
        Ok(())
    }

    async fn query_active(&self, filter: &TransactionFilter) -> StoreResult<Vec<Transaction>> {
        self.availability.check("transaction store")?;
        Ok(self.query(filter, false))
    }

    async fn query_trash(&self, filter: &TransactionFilter) -> StoreResult<Vec<Transaction>> {
        self.availability.check("transaction store")?;
        Ok(self.query(filter, true))
    }
}
