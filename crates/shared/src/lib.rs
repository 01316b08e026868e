//! Shared types, errors, and configuration for Consolidator.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Current-year / prior-year decimal amount pairs
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, ConsolidationConfig, SyntheticGrouping};
pub use error::{AppError, AppResult};
