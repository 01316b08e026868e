//! Inter-company elimination entries and the elimination applier.
//!
//! An inter-company balance inflates a debit-side grouping in one entity
//! and the mirror credit-side grouping in the counter-party. Applying an
//! elimination reduces both legs by the same amount.

use std::collections::BTreeMap;

use consolidator_shared::types::{EliminationId, YearAmounts};
use rust_decimal::Decimal;
use tracing::warn;

use super::aggregator::Aggregate;
use super::error::{ConsolidationError, EliminationDefect};
use super::types::{EliminationType, GroupingRef, InterCompanyElimination};
use super::warning::ConsolidationWarning;

impl InterCompanyElimination {
    /// Creates a validated elimination entry with a fresh ID.
    ///
    /// # Errors
    ///
    /// Returns `ConsolidationError::InvalidEliminationEntry` when the legs
    /// share a grouping code, a code is blank, or an amount is negative.
    pub fn new(
        description: impl Into<String>,
        elimination_type: EliminationType,
        debit: GroupingRef,
        credit: GroupingRef,
        amount_cy: Decimal,
        amount_py: Decimal,
    ) -> Result<Self, ConsolidationError> {
        let entry = Self {
            id: EliminationId::new(),
            description: description.into(),
            elimination_type,
            debit_grouping_code: debit.code.trim().to_string(),
            debit_grouping_name: debit.name,
            credit_grouping_code: credit.code.trim().to_string(),
            credit_grouping_name: credit.name,
            amount_cy,
            amount_py,
        };

        entry
            .check()
            .map_err(|defect| ConsolidationError::InvalidEliminationEntry {
                description: entry.description.clone(),
                defect,
            })?;

        Ok(entry)
    }

    /// Checks the entry rules.
    ///
    /// # Errors
    ///
    /// Returns the first rule the entry breaks.
    pub fn check(&self) -> Result<(), EliminationDefect> {
        if self.debit_grouping_code.trim().is_empty() || self.credit_grouping_code.trim().is_empty()
        {
            return Err(EliminationDefect::MissingGroupingCode);
        }
        if self.debit_grouping_code.trim() != self.debit_grouping_code
            || self.credit_grouping_code.trim() != self.credit_grouping_code
        {
            return Err(EliminationDefect::PaddedGroupingCode);
        }
        if self.debit_grouping_code == self.credit_grouping_code {
            return Err(EliminationDefect::SameGroupingCode);
        }
        if self.amount_cy < Decimal::ZERO || self.amount_py < Decimal::ZERO {
            return Err(EliminationDefect::NegativeAmount);
        }
        Ok(())
    }
}

/// Accumulated elimination amounts per grouping code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EliminationTotals {
    amounts: BTreeMap<String, YearAmounts>,
    /// Legs that could not be applied.
    pub warnings: Vec<ConsolidationWarning>,
}

impl EliminationTotals {
    /// Elimination amount for a grouping code; zero when none applies.
    #[must_use]
    pub fn amount_for(&self, grouping_code: &str) -> YearAmounts {
        self.amounts
            .get(grouping_code)
            .copied()
            .unwrap_or(YearAmounts::ZERO)
    }

    /// Grouping codes with at least one applied leg.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.amounts.keys().map(String::as_str)
    }
}

/// Nets eliminations against the aggregate.
///
/// Each entry adds its amounts to both the debit and the credit bucket.
/// Entries on the same code accumulate. A leg whose code no entity reported
/// is skipped with a warning rather than creating an empty row.
#[must_use]
pub fn apply_eliminations(
    aggregate: &Aggregate,
    eliminations: &[InterCompanyElimination],
) -> EliminationTotals {
    let mut totals = EliminationTotals::default();

    for entry in eliminations {
        let amount = entry.amounts();
        for code in [&entry.debit_grouping_code, &entry.credit_grouping_code] {
            if aggregate.contains(code) {
                *totals.amounts.entry(code.clone()).or_default() += amount;
            } else {
                warn!(
                    elimination_id = %entry.id,
                    grouping_code = %code,
                    "Elimination leg has no matching grouping, skipped"
                );
                totals
                    .warnings
                    .push(ConsolidationWarning::UnmatchedEliminationLeg {
                        elimination_id: entry.id,
                        grouping_code: code.clone(),
                    });
            }
        }
    }

    totals
}
