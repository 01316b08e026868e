//! Consolidation error types.
//!
//! Hard failures only. Conditions the engine can recover from are
//! reported as [`ConsolidationWarning`](super::warning::ConsolidationWarning)
//! values inside the generated data.

use consolidator_shared::AppError;
use consolidator_shared::types::{EliminationId, EntityId, GroupId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Why an elimination entry was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EliminationDefect {
    /// Debit and credit legs reference the same grouping code.
    #[error("debit and credit grouping codes must differ")]
    SameGroupingCode,

    /// An amount is below zero.
    #[error("amounts cannot be negative")]
    NegativeAmount,

    /// A leg has a blank grouping code.
    #[error("both legs need a grouping code")]
    MissingGroupingCode,

    /// A leg's grouping code has leading or trailing whitespace.
    #[error("grouping codes cannot carry surrounding whitespace")]
    PaddedGroupingCode,
}

/// Which group invariant is broken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupDefect {
    /// The parent entity is listed as its own subsidiary.
    #[error("parent entity {0} cannot be its own subsidiary")]
    ParentAsSubsidiary(EntityId),

    /// A subsidiary is listed twice.
    #[error("subsidiary {0} is listed more than once")]
    DuplicateSubsidiary(EntityId),

    /// Ownership outside 0-100.
    #[error("ownership {ownership} for {entity_id} must be between 0 and 100")]
    OwnershipOutOfRange {
        /// Offending subsidiary.
        entity_id: EntityId,
        /// Configured ownership.
        ownership: Decimal,
    },

    /// `is_fully_owned` disagrees with the ownership percentage.
    #[error("fully-owned flag for {0} disagrees with its ownership")]
    FullyOwnedFlagMismatch(EntityId),

    /// An elimination ID is used twice.
    #[error("elimination {0} is listed more than once")]
    DuplicateElimination(EliminationId),

    /// A stored elimination breaks an entry rule.
    #[error("elimination {id}: {defect}")]
    InvalidElimination {
        /// Offending elimination.
        id: EliminationId,
        /// Rule it breaks.
        defect: EliminationDefect,
    },
}

/// Errors that can occur while configuring or consolidating a group.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConsolidationError {
    // ========== Generation Errors ==========
    /// The parent entity's trial balance could not be fetched.
    #[error("Parent entity {entity_id} data unavailable: {reason}")]
    MissingParentData {
        /// Parent entity.
        entity_id: EntityId,
        /// Fetch failure.
        reason: String,
    },

    /// Balance identity failed beyond tolerance.
    #[error(
        "Consolidated balance sheet does not balance. Difference CY: {difference_cy}, PY: {difference_py} (tolerance {tolerance})"
    )]
    UnbalancedResult {
        /// Assets minus liabilities, current year.
        difference_cy: Decimal,
        /// Assets minus liabilities, prior year.
        difference_py: Decimal,
        /// Allowed absolute difference.
        tolerance: Decimal,
    },

    // ========== Configuration Errors ==========
    /// An elimination entry was rejected at creation.
    #[error("Invalid elimination entry '{description}': {defect}")]
    InvalidEliminationEntry {
        /// Entry description.
        description: String,
        /// Rule it breaks.
        defect: EliminationDefect,
    },

    /// The group breaks one of its invariants.
    #[error("Invalid consolidation group: {0}")]
    InvalidGroup(GroupDefect),

    // ========== Lookup Errors ==========
    /// No such group for this tenant.
    #[error("Consolidation group not found: {0}")]
    GroupNotFound(GroupId),

    /// A group with this ID already exists.
    #[error("Consolidation group already exists: {0}")]
    GroupAlreadyExists(GroupId),

    /// The subsidiary is not part of the group.
    #[error("Subsidiary not found in group: {0}")]
    SubsidiaryNotFound(EntityId),

    /// The elimination is not part of the group.
    #[error("Elimination not found in group: {0}")]
    EliminationNotFound(EliminationId),
}

impl ConsolidationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingParentData { .. } => "MISSING_PARENT_DATA",
            Self::UnbalancedResult { .. } => "UNBALANCED_RESULT",
            Self::InvalidEliminationEntry { .. } => "INVALID_ELIMINATION_ENTRY",
            Self::InvalidGroup(_) => "INVALID_GROUP",
            Self::GroupNotFound(_) => "GROUP_NOT_FOUND",
            Self::GroupAlreadyExists(_) => "GROUP_ALREADY_EXISTS",
            Self::SubsidiaryNotFound(_) => "SUBSIDIARY_NOT_FOUND",
            Self::EliminationNotFound(_) => "ELIMINATION_NOT_FOUND",
        }
    }
}

impl From<GroupDefect> for ConsolidationError {
    fn from(defect: GroupDefect) -> Self {
        Self::InvalidGroup(defect)
    }
}

impl From<ConsolidationError> for AppError {
    fn from(err: ConsolidationError) -> Self {
        match err {
            ConsolidationError::MissingParentData { .. } => Self::DataUnavailable(err.to_string()),
            ConsolidationError::UnbalancedResult { .. } => Self::BusinessRule(err.to_string()),
            ConsolidationError::InvalidEliminationEntry { .. }
            | ConsolidationError::InvalidGroup(_) => Self::Validation(err.to_string()),
            ConsolidationError::GroupNotFound(_)
            | ConsolidationError::SubsidiaryNotFound(_)
            | ConsolidationError::EliminationNotFound(_) => Self::NotFound(err.to_string()),
            ConsolidationError::GroupAlreadyExists(_) => Self::Conflict(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ConsolidationError::GroupNotFound(GroupId::new()), "NOT_FOUND")]
    #[case(ConsolidationError::GroupAlreadyExists(GroupId::new()), "CONFLICT")]
    #[case(
        ConsolidationError::InvalidGroup(GroupDefect::DuplicateSubsidiary(EntityId::new())),
        "VALIDATION_ERROR"
    )]
    #[case(
        ConsolidationError::MissingParentData { entity_id: EntityId::new(), reason: "timeout".into() },
        "DATA_UNAVAILABLE"
    )]
    #[case(
        ConsolidationError::UnbalancedResult {
            difference_cy: Decimal::TEN,
            difference_py: Decimal::ZERO,
            tolerance: Decimal::ONE,
        },
        "BUSINESS_RULE_VIOLATION"
    )]
    fn test_maps_to_app_error(#[case] err: ConsolidationError, #[case] code: &str) {
        assert_eq!(AppError::from(err).error_code(), code);
    }

    #[test]
    fn test_invalid_entry_message_names_defect() {
        let err = ConsolidationError::InvalidEliminationEntry {
            description: "IC loan".into(),
            defect: EliminationDefect::SameGroupingCode,
        };
        assert_eq!(err.error_code(), "INVALID_ELIMINATION_ENTRY");
        assert!(err.to_string().contains("debit and credit grouping codes must differ"));
    }
}
