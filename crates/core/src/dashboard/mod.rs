//! Dashboard alerts and overview.
//!
//! Everything here is derived from a snapshot state and a roster on demand.

pub mod service;
pub mod types;

pub use service::DashboardService;
pub use types::{Alert, DashboardOverview};
