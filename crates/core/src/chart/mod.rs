//! Chart-of-accounts classification.
//!
//! Every mapped trial-balance line carries a grouping code. The grouping
//! rolls up to a minor head and then to a major head:
//! - `A` - Assets
//! - `B` - Equity and Liabilities
//! - `C` - Profit & Loss Statement
//!
//! The classifier table is supplied alongside each entity's data and is
//! read-only to the engine.

pub mod classifier;
pub mod error;
pub mod rules;
pub mod types;

pub use classifier::GroupingClassifier;
pub use error::ChartError;
pub use rules::{HeadRules, head_matches};
pub use types::{Classification, GroupingEntry, MajorHead, MajorHeadEntry, Masters, MinorHeadEntry};
