//! Common types used across the application.

pub mod branch;
pub mod id;

pub use branch::Branch;
pub use id::*;
