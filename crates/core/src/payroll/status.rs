//! Pay-day status classification.
//!
//! The status is recomputed from `(employee, today)` every time it is read.
//! Nothing about it is stored, so "paid" lapses on its own once the calendar
//! month turns.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::employee::Employee;

/// Default number of days before pay day that counts as due soon.
pub const DEFAULT_DUE_SOON_DAYS: i64 = 3;

/// Where an employee stands for the month of `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayrollStatus {
    /// Already paid this calendar month.
    Paid,
    /// Pay day is today or within the due-soon window.
    DueSoon,
    /// Pay day has passed this month without a payment.
    Overdue,
    /// Pay day is further away.
    NotDue,
}

impl PayrollStatus {
    /// Classifies with the default three-day window.
    #[must_use]
    pub fn classify(employee: &Employee, today: NaiveDate) -> Self {
        Self::classify_with_window(employee, today, DEFAULT_DUE_SOON_DAYS)
    }

    /// Classifies with a custom due-soon window.
    #[must_use]
    pub fn classify_with_window(employee: &Employee, today: NaiveDate, due_soon_days: i64) -> Self {
        if employee.last_paid_date.is_some_and(|paid| same_month(paid, today)) {
            return Self::Paid;
        }

        let delta = days_until_pay_day(employee, today);
        if delta < 0 {
            Self::Overdue
        } else if delta <= due_soon_days {
            Self::DueSoon
        } else {
            Self::NotDue
        }
    }

    /// Returns true if someone should act on this employee.
    #[must_use]
    pub const fn needs_attention(self) -> bool {
        matches!(self, Self::DueSoon | Self::Overdue)
    }

    /// Short label for listings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::DueSoon => "due soon",
            Self::Overdue => "overdue",
            Self::NotDue => "not due",
        }
    }
}

impl std::fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Pay day of the employee in the month of `today`, clamped to the month's
/// last day.
#[must_use]
pub fn pay_day_in_month(employee: &Employee, today: NaiveDate) -> NaiveDate {
    let day = u32::from(employee.pay_day_of_month).clamp(1, days_in_month(today));
    today.with_day(day).unwrap_or(today)
}

/// Signed days from `today` to this month's pay day; negative once it passed.
#[must_use]
pub fn days_until_pay_day(employee: &Employee, today: NaiveDate) -> i64 {
    (pay_day_in_month(employee, today) - today).num_days()
}

/// Number of days in the month containing `date`.
#[must_use]
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(28, |last| last.day())
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}
