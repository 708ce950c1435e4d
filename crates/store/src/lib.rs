//! Record stores for Treasury.
//!
//! This crate provides in-memory implementations of the store traits from
//! `treasury-core`:
//! - [`MemoryTransactionStore`] for the soft-deletable transaction log
//! - [`MemoryEmployeeStore`] for the employee records
//!
//! Both are safe to share between coordinators and can be switched offline
//! to exercise the failure paths of a coordinator.

mod employees;
mod transactions;

pub use employees::MemoryEmployeeStore;
pub use transactions::MemoryTransactionStore;

use std::sync::atomic::{AtomicBool, Ordering};

use treasury_shared::{StoreError, StoreResult};

/// Availability switch shared by both stores.
#[derive(Debug, Default)]
struct Availability {
    offline: AtomicBool,
}

impl Availability {
    fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check(&self, store: &str) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{store} is offline")));
        }
        Ok(())
    }
}
