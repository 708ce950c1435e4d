//! Employee records held in memory.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use tracing::debug;
use treasury_core::payroll::{Employee, NewEmployee};
use treasury_core::store::EmployeeStore;
use treasury_shared::types::{Branch, EmployeeId};
use treasury_shared::{StoreError, StoreResult};

use crate::Availability;

/// In-memory [`EmployeeStore`]. Lists are sorted by name.
#[derive(Debug, Default)]
pub struct MemoryEmployeeStore {
    rows: DashMap<EmployeeId, Employee>,
    availability: Availability,
}

impl MemoryEmployeeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail with `Unavailable` until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.availability.set_offline(offline);
    }

    /// Looks up one record.
    #[must_use]
    pub fn get(&self, id: EmployeeId) -> Option<Employee> {
        self.rows.get(&id).map(|row| row.value().clone())
    }
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn create(&self, employee: &NewEmployee) -> StoreResult<EmployeeId> {
        self.availability.check("employee store")?;
        let id = EmployeeId::generate();
        self.rows
            .insert(id, Employee::from_new(id, employee.clone()));
        debug!(employee_id = %id, branch = %employee.branch, "Employee stored");
        Ok(id)
    }

    async fn update(&self, employee: &Employee) -> StoreResult<()> {
        self.availability.check("employee store")?;
        let mut row = self
            .rows
            .get_mut(&employee.id)
            .ok_or_else(|| StoreError::NotFound(employee.id.to_string()))?;
        *row = employee.clone();
        debug!(employee_id = %employee.id, "Employee updated");
        Ok(())
    }

    async fn delete(&self, id: EmployeeId) -> StoreResult<()> {
        self.availability.check("employee store")?;
        self.rows
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        debug!(employee_id = %id, "Employee deleted");
        Ok(())
    }

    async fn list(&self, branch: Option<Branch>) -> StoreResult<Vec<Employee>> {
        self.availability.check("employee store")?;
        let mut employees: Vec<Employee> = self
            .rows
            .iter()
            .filter(|row| branch.is_none_or(|b| row.branch == b))
            .map(|row| row.value().clone())
            .collect();
        employees.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(employees)
    }

    async fn set_last_paid_date(&self, id: EmployeeId, date: NaiveDate) -> StoreResult<()> {
        self.availability.check("employee store")?;
        let mut row = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        row.last_paid_date = Some(date);
        debug!(employee_id = %id, %date, "Paid date stored");
        Ok(())
    }
}
