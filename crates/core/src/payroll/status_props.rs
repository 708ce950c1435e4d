//! Property-based tests for the pay-day classifier.
//!
//! - Purity: identical inputs always give the identical status
//! - Paid: a payment in the current month always classifies as paid
//! - Window: an unpaid employee is due soon exactly when pay day is 0-3 days away

use chrono::{Datelike, Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal_macros::dec;
use treasury_shared::types::{Branch, EmployeeId};

use super::employee::Employee;
use super::status::{PayrollStatus, days_until_pay_day};

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..3650).prop_map(|offset| NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Days::new(offset))
}

fn employee(pay_day: u8, last_paid: Option<NaiveDate>) -> Employee {
    Employee {
        id: EmployeeId::generate(),
        name: "Agus".to_string(),
        branch: Branch::MaintenanceAlfa,
        salary_amount: dec!(2500000),
        pay_day_of_month: pay_day,
        last_paid_date: last_paid,
        phone: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// *For any* employee and date, classifying twice SHALL give the same status.
    #[test]
    fn prop_classification_is_pure(
        pay_day in 1u8..=31,
        today in date_strategy(),
        last_paid in proptest::option::of(date_strategy()),
    ) {
        let emp = employee(pay_day, last_paid);
        prop_assert_eq!(
            PayrollStatus::classify(&emp, today),
            PayrollStatus::classify(&emp, today)
        );
    }

    /// *For any* payment dated in the month of `today`, the status SHALL be Paid.
    #[test]
    fn prop_payment_this_month_is_paid(pay_day in 1u8..=31, today in date_strategy()) {
        let paid_on = today.with_day(1).unwrap();
        let emp = employee(pay_day, Some(paid_on));
        prop_assert_eq!(PayrollStatus::classify(&emp, today), PayrollStatus::Paid);
    }

    /// *For any* unpaid employee, the status SHALL follow the signed day delta.
    #[test]
    fn prop_unpaid_status_follows_delta(pay_day in 1u8..=31, today in date_strategy()) {
        let emp = employee(pay_day, None);
        let delta = days_until_pay_day(&emp, today);
        let expected = match delta {
            d if d < 0 => PayrollStatus::Overdue,
            0..=3 => PayrollStatus::DueSoon,
            _ => PayrollStatus::NotDue,
        };
        prop_assert_eq!(PayrollStatus::classify(&emp, today), expected);
    }
}
