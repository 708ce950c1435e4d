//! Employees and payroll status.
//!
//! Salary payments themselves go through the mutation coordinator, which
//! records the expense and stamps the employee's last paid date.

pub mod employee;
pub mod error;
pub mod roster;
pub mod status;

#[cfg(test)]
mod status_props;

pub use employee::{Employee, MAX_PAY_DAY, NewEmployee};
pub use error::PayrollError;
pub use roster::EmployeeRoster;
pub use status::{PayrollStatus, days_in_month, days_until_pay_day, pay_day_in_month};
