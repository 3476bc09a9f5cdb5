//! Shared types, errors, and configuration for the accounts ledger.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Pagination types for list operations
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

#[cfg(test)]
mod error_tests;

pub use config::{AccountNumberPolicy, AppConfig, LedgerConfig};
pub use error::{AppError, AppResult};
