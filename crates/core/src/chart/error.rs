//! Chart-of-accounts error types.

use thiserror::Error;

/// Errors raised while building a classifier from masters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    /// A grouping references a minor head that is not in the masters.
    #[error("Grouping {grouping} references unknown minor head {minor_head}")]
    UnknownMinorHead {
        /// Grouping code.
        grouping: String,
        /// Referenced minor head code.
        minor_head: String,
    },

    /// A minor head references a major head that is not in the masters.
    #[error("Minor head {minor_head} references unknown major head {major_head}")]
    UnknownMajorHead {
        /// Minor head code.
        minor_head: String,
        /// Referenced major head code.
        major_head: String,
    },

    /// The same grouping code appears twice.
    #[error("Duplicate grouping code: {0}")]
    DuplicateGrouping(String),
}
