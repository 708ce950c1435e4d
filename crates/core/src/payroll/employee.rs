//! Employee records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use treasury_shared::types::{Branch, EmployeeId};

use super::error::PayrollError;

/// Latest day of month an employee can be paid on.
pub const MAX_PAY_DAY: u8 = 31;

/// A salaried employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Store-assigned identifier.
    pub id: EmployeeId,
    /// Display name.
    pub name: String,
    /// Branch the employee works at.
    pub branch: Branch,
    /// Monthly salary.
    pub salary_amount: Decimal,
    /// Day of month the salary is due (1-31, clamped in shorter months).
    pub pay_day_of_month: u8,
    /// Date of the last salary payment.
    pub last_paid_date: Option<NaiveDate>,
    /// Contact number.
    pub phone: Option<String>,
}

impl Employee {
    /// Builds the stored record from an input and its assigned id.
    #[must_use]
    pub fn from_new(id: EmployeeId, input: NewEmployee) -> Self {
        Self {
            id,
            name: input.name,
            branch: input.branch,
            salary_amount: input.salary_amount,
            pay_day_of_month: input.pay_day_of_month,
            last_paid_date: None,
            phone: input.phone,
        }
    }

    /// Checks the editable fields.
    ///
    /// # Errors
    ///
    /// Returns the first field that is out of range.
    pub fn validate(&self) -> Result<(), PayrollError> {
        validate_fields(&self.name, self.salary_amount, self.pay_day_of_month)
    }
}

/// Input for adding an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    /// Display name.
    pub name: String,
    /// Branch the employee works at.
    pub branch: Branch,
    /// Monthly salary.
    pub salary_amount: Decimal,
    /// Day of month the salary is due.
    pub pay_day_of_month: u8,
    /// Contact number.
    pub phone: Option<String>,
}

impl NewEmployee {
    /// Checks the fields.
    ///
    /// # Errors
    ///
    /// Returns the first field that is out of range.
    pub fn validate(&self) -> Result<(), PayrollError> {
        validate_fields(&self.name, self.salary_amount, self.pay_day_of_month)
    }
}

fn validate_fields(name: &str, salary: Decimal, pay_day: u8) -> Result<(), PayrollError> {
    if name.trim().is_empty() {
        return Err(PayrollError::EmptyName);
    }
    if salary <= Decimal::ZERO {
        return Err(PayrollError::InvalidSalary(salary));
    }
    if !(1..=MAX_PAY_DAY).contains(&pay_day) {
        return Err(PayrollError::InvalidPayDay(pay_day));
    }
    Ok(())
}
