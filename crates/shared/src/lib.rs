//! Shared types, errors, and configuration for trialcheck.
//!
//! This crate provides common types used across all other crates:
//! - Accounting period identifiers (`YYYY-MM`)
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use types::Period;
