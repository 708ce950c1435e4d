//! Observable employee roster.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;
use treasury_shared::types::EmployeeId;

use super::employee::Employee;
use super::status::PayrollStatus;

/// Shared, observable list of employees.
#[derive(Debug, Clone)]
pub struct EmployeeRoster {
    sender: Arc<watch::Sender<Vec<Employee>>>,
}

impl Default for EmployeeRoster {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl EmployeeRoster {
    /// Creates a roster holding `employees`.
    #[must_use]
    pub fn new(employees: Vec<Employee>) -> Self {
        let (sender, _) = watch::channel(employees);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Stream of roster contents.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Employee>> {
        self.sender.subscribe()
    }

    /// Current employees.
    #[must_use]
    pub fn employees(&self) -> Vec<Employee> {
        self.sender.borrow().clone()
    }

    /// Employee by id.
    #[must_use]
    pub fn get(&self, id: EmployeeId) -> Option<Employee> {
        self.sender.borrow().iter().find(|e| e.id == id).cloned()
    }

    /// Every employee with their status on `today`.
    #[must_use]
    pub fn statuses(&self, today: NaiveDate, due_soon_days: i64) -> Vec<(Employee, PayrollStatus)> {
        self.sender
            .borrow()
            .iter()
            .map(|e| {
                let status = PayrollStatus::classify_with_window(e, today, due_soon_days);
                (e.clone(), status)
            })
            .collect()
    }

    pub(crate) fn replace_all(&self, employees: Vec<Employee>) {
        self.sender.send_replace(employees);
    }

    /// Inserts or replaces by id, returning the previous record.
    pub(crate) fn upsert(&self, employee: Employee) -> Option<Employee> {
        let mut previous = None;
        self.sender.send_modify(|list| {
            match list.iter_mut().find(|e| e.id == employee.id) {
                Some(slot) => previous = Some(std::mem::replace(slot, employee)),
                None => list.push(employee),
            }
        });
        previous
    }

    pub(crate) fn remove(&self, id: EmployeeId) -> Option<Employee> {
        let mut removed = None;
        self.sender.send_if_modified(|list| {
            removed = list
                .iter()
                .position(|e| e.id == id)
                .map(|index| list.remove(index));
            removed.is_some()
        });
        removed
    }

    /// Overwrites the last paid date, returning the previous value.
    pub(crate) fn set_last_paid(
        &self,
        id: EmployeeId,
        date: Option<NaiveDate>,
    ) -> Option<Option<NaiveDate>> {
        let mut previous = None;
        self.sender.send_if_modified(|list| {
            previous = list
                .iter_mut()
                .find(|e| e.id == id)
                .map(|e| std::mem::replace(&mut e.last_paid_date, date));
            previous.is_some()
        });
        previous
    }
}
