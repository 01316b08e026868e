//! Non-fatal data-quality signals.

use consolidator_shared::types::{EliminationId, EntityId, YearAmounts};
use serde::{Deserialize, Serialize};

/// A condition the engine recovered from, reported alongside the figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsolidationWarning {
    /// A subsidiary's data could not be fetched; it contributes zero.
    MissingSubsidiaryData {
        /// Subsidiary entity.
        entity_id: EntityId,
        /// Subsidiary label.
        entity_name: String,
        /// Fetch failure.
        reason: String,
    },

    /// A grouping code rolls up to different heads in different entities.
    ClassifierMismatch {
        /// Affected grouping code.
        grouping_code: String,
        /// Entity whose classifier disagrees.
        entity_id: EntityId,
        /// Heads already recorded for the row, as `major/minor`.
        expected: String,
        /// Heads in the disagreeing entity, as `major/minor`.
        found: String,
    },

    /// A grouping code is missing from the producing entity's classifier.
    UnclassifiedGrouping {
        /// Affected grouping code.
        grouping_code: String,
        /// Entity that produced the line.
        entity_id: EntityId,
    },

    /// An elimination leg references a grouping code no entity reported.
    UnmatchedEliminationLeg {
        /// Elimination entry.
        elimination_id: EliminationId,
        /// Grouping code of the skipped leg.
        grouping_code: String,
    },

    /// Eliminations flipped the sign of a grouping's balance.
    SignReversal {
        /// Affected grouping code.
        grouping_code: String,
        /// Pre-elimination amounts.
        closing: YearAmounts,
        /// Post-elimination amounts.
        consolidated: YearAmounts,
    },
}

impl ConsolidationWarning {
    /// Short machine-readable kind, matching the serialized tag.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingSubsidiaryData { .. } => "missing_subsidiary_data",
            Self::ClassifierMismatch { .. } => "classifier_mismatch",
            Self::UnclassifiedGrouping { .. } => "unclassified_grouping",
            Self::UnmatchedEliminationLeg { .. } => "unmatched_elimination_leg",
            Self::SignReversal { .. } => "sign_reversal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_tag_matches_kind() {
        let warning = ConsolidationWarning::UnclassifiedGrouping {
            grouping_code: "Z.10.01".into(),
            entity_id: EntityId::new(),
        };
        let json = serde_json::to_value(&warning).unwrap();

        assert_eq!(json["kind"], warning.kind());
        assert_eq!(json["grouping_code"], "Z.10.01");
    }
}
