//! Observable in-memory ledger.
//!
//! The snapshot holds every entry the process knows about, active and
//! trashed, each tagged with its sync state. Consumers subscribe to a
//! `tokio::sync::watch` channel and see every optimistic change, promotion
//! and rollback as it happens.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use treasury_shared::types::{LocalRef, TransactionId};

use super::error::LedgerError;
use super::types::Transaction;

/// Where an entry stands with the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncState {
    /// Applied locally, write in flight.
    Pending(LocalRef),
    /// Confirmed by the store under this id.
    Committed(TransactionId),
    /// The write failed and nothing rolled it back; kept for retry.
    Failed(String),
}

/// One transaction plus its sync bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Stable local handle, valid from the optimistic insert onwards.
    pub local_ref: LocalRef,
    /// Sync state.
    pub sync: SyncState,
    /// The transaction itself.
    pub transaction: Transaction,
}

impl LedgerEntry {
    /// Returns true if the entry counts toward balances: not trashed and not
    /// a failed write.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.transaction.deleted && !self.is_failed()
    }

    /// Returns true once the store has confirmed the entry.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self.sync, SyncState::Committed(_))
    }

    /// Returns true while a create is in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.sync, SyncState::Pending(_))
    }

    /// Returns true if the last write failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.sync, SyncState::Failed(_))
    }
}

/// Contents of the snapshot at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    entries: Vec<LedgerEntry>,
}

impl LedgerState {
    /// Every entry in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Transactions that count toward balances.
    #[must_use]
    pub fn active(&self) -> Vec<Transaction> {
        self.entries
            .iter()
            .filter(|e| e.is_active())
            .map(|e| e.transaction.clone())
            .collect()
    }

    /// Trashed transactions awaiting restore or permanent deletion.
    #[must_use]
    pub fn trash(&self) -> Vec<Transaction> {
        self.entries
            .iter()
            .filter(|e| e.transaction.deleted && !e.is_failed())
            .map(|e| e.transaction.clone())
            .collect()
    }

    /// Entries whose write failed.
    #[must_use]
    pub fn failed(&self) -> Vec<LedgerEntry> {
        self.entries.iter().filter(|e| e.is_failed()).cloned().collect()
    }

    /// Number of creates still in flight.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_pending()).count()
    }

    /// Entry by local handle.
    #[must_use]
    pub fn by_ref(&self, local_ref: LocalRef) -> Option<&LedgerEntry> {
        self.entries.iter().find(|e| e.local_ref == local_ref)
    }

    /// Entry by store id.
    #[must_use]
    pub fn by_id(&self, id: TransactionId) -> Option<&LedgerEntry> {
        self.entries
            .iter()
            .find(|e| e.sync == SyncState::Committed(id))
    }

    pub(crate) fn position(&self, local_ref: LocalRef) -> Option<usize> {
        self.entries.iter().position(|e| e.local_ref == local_ref)
    }

    pub(crate) fn entry_mut(&mut self, local_ref: LocalRef) -> Option<&mut LedgerEntry> {
        self.entries.iter_mut().find(|e| e.local_ref == local_ref)
    }

    pub(crate) fn push_pending(&mut self, local_ref: LocalRef, transaction: Transaction) {
        self.entries.push(LedgerEntry {
            local_ref,
            sync: SyncState::Pending(local_ref),
            transaction,
        });
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> LedgerEntry {
        self.entries.remove(index)
    }

    /// Active transactions other than `local_ref`.
    pub(crate) fn active_except(&self, local_ref: LocalRef) -> Vec<Transaction> {
        self.entries
            .iter()
            .filter(|e| e.is_active() && e.local_ref != local_ref)
            .map(|e| e.transaction.clone())
            .collect()
    }
}

/// Shared, observable ledger.
///
/// Cloning is cheap and every clone sees the same state.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    sender: Arc<watch::Sender<LedgerState>>,
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(LedgerState::default());
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Creates a snapshot seeded with committed transactions.
    ///
    /// Transactions without an id are kept as pending.
    #[must_use]
    pub fn with_transactions(transactions: impl IntoIterator<Item = Transaction>) -> Self {
        let snapshot = Self::new();
        snapshot.sender.send_modify(|state| {
            state.entries = transactions.into_iter().map(new_entry).collect();
        });
        snapshot
    }

    /// Stream of snapshot states; the receiver starts at the current one.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LedgerState> {
        self.sender.subscribe()
    }

    /// Copy of the current state.
    #[must_use]
    pub fn state(&self) -> LedgerState {
        self.sender.borrow().clone()
    }

    /// Transactions that count toward balances.
    #[must_use]
    pub fn active(&self) -> Vec<Transaction> {
        self.sender.borrow().active()
    }

    /// Trashed transactions.
    #[must_use]
    pub fn trash(&self) -> Vec<Transaction> {
        self.sender.borrow().trash()
    }

    /// Entry by local handle.
    #[must_use]
    pub fn entry(&self, local_ref: LocalRef) -> Option<LedgerEntry> {
        self.sender.borrow().by_ref(local_ref).cloned()
    }

    /// Entry by store id.
    #[must_use]
    pub fn find(&self, id: TransactionId) -> Option<LedgerEntry> {
        self.sender.borrow().by_id(id).cloned()
    }

    // ========== Mutations (coordinator only) ==========

    /// Runs `f` against the state under the channel lock.
    ///
    /// Subscribers are notified only when `f` returns `Ok`, so `f` must check
    /// everything before it mutates anything.
    pub(crate) fn try_modify<R>(
        &self,
        f: impl FnOnce(&mut LedgerState) -> Result<R, LedgerError>,
    ) -> Result<R, LedgerError> {
        let mut outcome = Err(LedgerError::Internal("snapshot update did not run".into()));
        self.sender.send_if_modified(|state| {
            outcome = f(state);
            outcome.is_ok()
        });
        outcome
    }

    #[cfg(test)]
    pub(crate) fn insert_pending(&self, items: Vec<(LocalRef, Transaction)>) {
        self.sender.send_modify(|state| {
            for (local_ref, transaction) in items {
                state.push_pending(local_ref, transaction);
            }
        });
    }

    /// Marks an entry committed and stamps the store id on it.
    ///
    /// A refresh that ran after the store accepted the write may already
    /// have loaded the record under another handle; that copy is dropped so
    /// the id is held by one entry only.
    pub(crate) fn promote(&self, local_ref: LocalRef, id: TransactionId) -> bool {
        self.sender.send_if_modified(|state| {
            if state.position(local_ref).is_none() {
                return false;
            }
            state
                .entries
                .retain(|e| e.local_ref == local_ref || e.sync != SyncState::Committed(id));
            match state.entry_mut(local_ref) {
                Some(entry) => {
                    entry.sync = SyncState::Committed(id);
                    entry.transaction.id = Some(id);
                    true
                }
                None => false,
            }
        })
    }

    pub(crate) fn mark_failed(&self, local_ref: LocalRef, reason: String) -> bool {
        self.sender.send_if_modified(|state| match state.entry_mut(local_ref) {
            Some(entry) => {
                entry.sync = SyncState::Failed(reason);
                true
            }
            None => false,
        })
    }

    /// Removes an entry, returning it with its former position.
    pub(crate) fn remove(&self, local_ref: LocalRef) -> Option<(usize, LedgerEntry)> {
        let mut removed = None;
        self.sender.send_if_modified(|state| {
            removed = state
                .position(local_ref)
                .map(|index| (index, state.remove_at(index)));
            removed.is_some()
        });
        removed
    }

    /// Removes several entries with a single notification.
    pub(crate) fn remove_all(&self, local_refs: &[LocalRef]) -> usize {
        let mut removed = 0;
        self.sender.send_if_modified(|state| {
            let before = state.entries.len();
            state.entries.retain(|e| !local_refs.contains(&e.local_ref));
            removed = before - state.entries.len();
            removed > 0
        });
        removed
    }

    /// Puts a removed entry back where it was.
    pub(crate) fn reinsert(&self, index: usize, entry: LedgerEntry) {
        self.sender.send_modify(|state| {
            let index = index.min(state.entries.len());
            state.entries.insert(index, entry);
        });
    }

    /// Swaps the fields of an entry, returning the previous ones.
    ///
    /// The entry keeps its current trash state; moving between active and
    /// trash goes through [`set_deleted`](Self::set_deleted) only.
    pub(crate) fn replace(
        &self,
        local_ref: LocalRef,
        transaction: Transaction,
    ) -> Option<Transaction> {
        let mut previous = None;
        self.sender.send_if_modified(|state| {
            previous = state.entry_mut(local_ref).map(|entry| {
                let deleted = entry.transaction.deleted;
                std::mem::replace(
                    &mut entry.transaction,
                    Transaction {
                        deleted,
                        ..transaction
                    },
                )
            });
            previous.is_some()
        });
        previous
    }

    pub(crate) fn set_deleted(&self, local_ref: LocalRef, deleted: bool) -> bool {
        self.sender.send_if_modified(|state| match state.entry_mut(local_ref) {
            Some(entry) if entry.transaction.deleted != deleted => {
                entry.transaction.deleted = deleted;
                true
            }
            _ => false,
        })
    }

    /// Replaces every committed entry with the store's view, keeping pending
    /// and failed entries and the local handles of ids already known.
    pub(crate) fn load(&self, active: Vec<Transaction>, trash: Vec<Transaction>) {
        self.sender.send_modify(|state| {
            let known: HashMap<TransactionId, LocalRef> = state
                .entries
                .iter()
                .filter_map(|e| match e.sync {
                    SyncState::Committed(id) => Some((id, e.local_ref)),
                    _ => None,
                })
                .collect();

            let mut entries: Vec<LedgerEntry> = active
                .into_iter()
                .map(|tx| Transaction { deleted: false, ..tx })
                .chain(trash.into_iter().map(|tx| Transaction { deleted: true, ..tx }))
                .map(|tx| {
                    let local_ref = tx
                        .id
                        .and_then(|id| known.get(&id).copied())
                        .unwrap_or_else(LocalRef::generate);
                    LedgerEntry { local_ref, ..new_entry(tx) }
                })
                .collect();

            entries.extend(state.entries.drain(..).filter(|e| !e.is_committed()));
            state.entries = entries;
        });
    }
}

fn new_entry(transaction: Transaction) -> LedgerEntry {
    let local_ref = LocalRef::generate();
    let sync = match transaction.id {
        Some(id) => SyncState::Committed(id),
        None => SyncState::Pending(local_ref),
    };
    LedgerEntry {
        local_ref,
        sync,
        transaction,
    }
}
