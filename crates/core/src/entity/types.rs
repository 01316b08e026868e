//! Entity data types.

use consolidator_shared::types::{EntityId, YearAmounts};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chart::{Classification, GroupingClassifier};

/// Identity of a contributing entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// Entity ID.
    pub id: EntityId,
    /// Current display name.
    pub name: String,
}

impl EntityRef {
    /// Creates a new entity reference.
    #[must_use]
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// One ledger line of an entity's mapped trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceLine {
    /// Ledger name as it appears in the entity's books.
    #[serde(default)]
    pub ledger: String,
    /// Grouping code the ledger is mapped to.
    pub grouping_code: Option<String>,
    /// Closing balance, current year.
    pub closing_cy: Decimal,
    /// Closing balance, prior year.
    pub closing_py: Decimal,
    /// Whether the ledger has been mapped.
    pub is_mapped: bool,
    /// Ledger attribute: balance is with a related party.
    #[serde(default)]
    pub is_related_party: bool,
}

impl TrialBalanceLine {
    /// Grouping code if this line takes part in consolidation.
    ///
    /// Unmapped lines and lines without a grouping code are excluded.
    #[must_use]
    pub fn mapped_code(&self) -> Option<&str> {
        if !self.is_mapped {
            return None;
        }
        self.grouping_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    /// Closing balances as a CY/PY pair.
    #[must_use]
    pub fn closing(&self) -> YearAmounts {
        YearAmounts::new(self.closing_cy, self.closing_py)
    }
}

/// An entity's mapped trial balance together with its classifier table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityData {
    /// The entity.
    pub entity: EntityRef,
    /// Trial-balance lines.
    pub lines: Vec<TrialBalanceLine>,
    /// Classifier the lines were mapped against.
    #[serde(default)]
    pub classifier: GroupingClassifier,
}

impl EntityData {
    /// Mapped lines with their grouping code and classification, in ledger order.
    pub fn mapped_lines(
        &self,
    ) -> impl Iterator<Item = (&str, &TrialBalanceLine, Option<&Classification>)> {
        self.lines.iter().filter_map(|line| {
            line.mapped_code()
                .map(|code| (code, line, self.classifier.get(code)))
        })
    }
}
