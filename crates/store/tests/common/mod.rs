//! Wiring shared by the store integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use treasury_core::MutationCoordinator;
use treasury_core::ledger::SessionContext;
use treasury_shared::config::LedgerConfig;
use treasury_shared::types::Branch;
use treasury_store::{MemoryEmployeeStore, MemoryTransactionStore};

/// One pair of stores, shared by any number of coordinators.
pub struct Backend {
    pub transactions: Arc<MemoryTransactionStore>,
    pub employees: Arc<MemoryEmployeeStore>,
}

impl Backend {
    pub fn new() -> Self {
        Self {
            transactions: Arc::new(MemoryTransactionStore::new()),
            employees: Arc::new(MemoryEmployeeStore::new()),
        }
    }

    /// A coordinator with its own snapshot over these stores.
    pub fn coordinator(&self) -> MutationCoordinator {
        self.coordinator_with(LedgerConfig::default())
    }

    pub fn coordinator_with(&self, settings: LedgerConfig) -> MutationCoordinator {
        MutationCoordinator::new(self.transactions.clone(), self.employees.clone(), settings)
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
