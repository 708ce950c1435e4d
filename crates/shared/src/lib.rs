//! Shared types, errors, and configuration for Treasury.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - The branch catalogue (outlets plus the central office)
//! - Errors reported by record-store collaborators
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{StoreError, StoreResult};
