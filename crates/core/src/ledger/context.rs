//! Session context.
//!
//! Who is acting and on which business date. Every coordinator call takes one
//! explicitly; there is no process-wide "current branch".

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use treasury_shared::types::Branch;

/// The acting branch and business date of a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Branch of the signed-in user; `Pusat` for head-office users.
    pub branch: Branch,
    /// Date stamped on new entries and used for payroll.
    pub today: NaiveDate,
}

impl SessionContext {
    /// Context for `branch` on an explicit date.
    #[must_use]
    pub const fn new(branch: Branch, today: NaiveDate) -> Self {
        Self { branch, today }
    }

    /// Head-office context on an explicit date.
    #[must_use]
    pub const fn central(today: NaiveDate) -> Self {
        Self::new(Branch::Pusat, today)
    }

    /// Context for `branch` dated with the local clock.
    #[must_use]
    pub fn for_today(branch: Branch) -> Self {
        Self::new(branch, Local::now().date_naive())
    }

    /// Returns true for head-office users, who see every branch.
    #[must_use]
    pub const fn is_central(&self) -> bool {
        self.branch.is_central()
    }

    /// Branch filter for store queries: `None` means all branches.
    #[must_use]
    pub const fn branch_filter(&self) -> Option<Branch> {
        if self.is_central() {
            None
        } else {
            Some(self.branch)
        }
    }

    /// Outlets whose petty cash this caller watches.
    #[must_use]
    pub fn visible_outlets(&self) -> Vec<Branch> {
        if self.is_central() {
            Branch::OUTLETS.to_vec()
        } else {
            vec![self.branch]
        }
    }

    /// Returns true if records of `branch` are visible to this caller.
    #[must_use]
    pub fn can_see(&self, branch: Branch) -> bool {
        self.is_central() || self.branch == branch
    }

    /// Same caller on another date.
    #[must_use]
    pub const fn on(self, today: NaiveDate) -> Self {
        Self::new(self.branch, today)
    }
}
