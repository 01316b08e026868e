//! Core business logic for Consolidator.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Entity data arrives through the [`entity::EntityDataProvider`] boundary.
//!
//! # Modules
//!
//! - `chart` - Grouping, minor-head and major-head classification
//! - `entity` - Contributing entities, their trial balances and the data provider
//! - `consolidation` - Aggregation, eliminations, minority interest and totals

pub mod chart;
pub mod consolidation;
pub mod entity;
