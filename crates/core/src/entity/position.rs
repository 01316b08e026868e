//! An entity's own net equity and net profit.
//!
//! Used both to value an equity-method investment and to measure the
//! non-controlling share of a subsidiary. Always in full entity terms,
//! before any ownership percentage is applied.

use consolidator_shared::types::YearAmounts;

use super::types::EntityData;
use crate::chart::{HeadRules, MajorHead};

/// Statement totals of a single entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityPosition {
    /// Sum of major head A lines.
    pub total_assets: YearAmounts,
    /// Sum of major head B lines (equity included).
    pub total_liabilities: YearAmounts,
    /// Sum of equity lines; `None` when the entity has none.
    pub equity: Option<YearAmounts>,
    /// Sum of income lines.
    pub revenue: YearAmounts,
    /// Sum of expense lines.
    pub expenses: YearAmounts,
}

impl EntityPosition {
    /// Totals an entity's classified, mapped lines.
    ///
    /// Lines whose grouping code is missing from the entity's own
    /// classifier cannot be placed and are ignored.
    #[must_use]
    pub fn of(data: &EntityData, rules: &HeadRules) -> Self {
        let mut position = Self::default();

        for (_, line, classification) in data.mapped_lines() {
            let Some(classification) = classification else {
                continue;
            };
            let amount = line.closing();

            match classification.major_head() {
                Some(MajorHead::Assets) => position.total_assets += amount,
                Some(MajorHead::EquityAndLiabilities) => {
                    position.total_liabilities += amount;
                    if rules.is_equity(classification) {
                        *position.equity.get_or_insert(YearAmounts::ZERO) += amount;
                    }
                }
                Some(MajorHead::ProfitAndLoss) => {
                    if rules.is_revenue(classification) {
                        position.revenue += amount;
                    } else {
                        position.expenses += amount;
                    }
                }
                None => {}
            }
        }

        position
    }

    /// Net equity: the equity lines, or assets minus liabilities when the
    /// entity reports no equity lines.
    #[must_use]
    pub fn net_equity(&self) -> YearAmounts {
        self.equity
            .unwrap_or(self.total_assets - self.total_liabilities)
    }

    /// Net profit for the year: income minus expenses.
    #[must_use]
    pub fn net_profit(&self) -> YearAmounts {
        self.revenue - self.expenses
    }
}
