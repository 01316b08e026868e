//! Consolidation data types.

use chrono::{DateTime, Utc};
use consolidator_shared::types::{EliminationId, EntityId, GroupId, YearAmounts};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ConsolidationError;
use super::warning::ConsolidationWarning;

/// How a subsidiary's trial balance is brought into the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsolidationMethod {
    /// 100% of every line; the non-controlling share is carved out as
    /// minority interest.
    Full,
    /// Ownership share of every line (joint ventures).
    Proportionate,
    /// Two synthetic lines only: investment and share of profit (associates).
    Equity,
}

impl ConsolidationMethod {
    /// Default method for a newly added subsidiary: control at 50% or more.
    #[must_use]
    pub fn for_ownership(ownership_percentage: Decimal) -> Self {
        if ownership_percentage >= Decimal::from(50) {
            Self::Full
        } else {
            Self::Equity
        }
    }
}

/// One subsidiary's participation terms within a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsidiaryConfig {
    /// Subsidiary entity.
    pub entity_id: EntityId,
    /// Display label stored with the group.
    pub entity_name: String,
    /// Parent's ownership, 0-100 inclusive.
    pub ownership_percentage: Decimal,
    /// True exactly when ownership is 100%.
    pub is_fully_owned: bool,
    /// Consolidation method.
    pub consolidation_method: ConsolidationMethod,
}

impl SubsidiaryConfig {
    /// Share held by owners other than the parent.
    #[must_use]
    pub fn minority_percentage(&self) -> Decimal {
        Decimal::ONE_HUNDRED - self.ownership_percentage
    }
}

/// Kind of inter-company balance an elimination removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EliminationType {
    /// Parent's investment against subsidiary share capital.
    Investment,
    /// Inter-company receivable against payable.
    ReceivablePayable,
    /// Inter-company sales against purchases.
    RevenueExpense,
    /// Inter-company dividend.
    Dividend,
    /// Anything else.
    Other,
}

/// A grouping code with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingRef {
    /// Grouping code.
    pub code: String,
    /// Grouping display name.
    pub name: String,
}

impl GroupingRef {
    /// Creates a new grouping reference.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// A dual-sided netting instruction. Immutable once created; replace it
/// to change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterCompanyElimination {
    /// Elimination ID.
    pub id: EliminationId,
    /// Free-text description.
    pub description: String,
    /// Elimination kind.
    pub elimination_type: EliminationType,
    /// Debit-side grouping code.
    pub debit_grouping_code: String,
    /// Debit-side grouping name.
    pub debit_grouping_name: String,
    /// Credit-side grouping code.
    pub credit_grouping_code: String,
    /// Credit-side grouping name.
    pub credit_grouping_name: String,
    /// Amount eliminated, current year.
    pub amount_cy: Decimal,
    /// Amount eliminated, prior year.
    pub amount_py: Decimal,
}

impl InterCompanyElimination {
    /// Amount as a CY/PY pair.
    #[must_use]
    pub fn amounts(&self) -> YearAmounts {
        YearAmounts::new(self.amount_cy, self.amount_py)
    }
}

/// One consolidation exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationGroup {
    /// Group ID.
    pub id: GroupId,
    /// Group name, e.g. "ABC Group CFS".
    pub name: String,
    /// Parent entity.
    pub parent_entity_id: EntityId,
    /// Parent display label stored with the group.
    pub parent_entity_name: String,
    /// Subsidiaries in configuration order.
    pub subsidiaries: Vec<SubsidiaryConfig>,
    /// Inter-company eliminations.
    pub eliminations: Vec<InterCompanyElimination>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// One entity's contribution to a grouping code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityContribution {
    /// Contributing entity.
    pub entity_id: EntityId,
    /// Entity label.
    pub entity_name: String,
    /// Contribution, current year.
    pub amount_cy: Decimal,
    /// Contribution, prior year.
    pub amount_py: Decimal,
}

/// One consolidated trial-balance row, keyed by grouping code.
///
/// `consolidated = closing - elimination` for both years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedTrialBalanceItem {
    /// Grouping code.
    pub grouping_code: String,
    /// Grouping display name.
    pub grouping_name: String,
    /// Minor head code.
    pub minor_head_code: String,
    /// Minor head display name.
    pub minor_head_name: String,
    /// Major head code.
    pub major_head_code: String,
    /// Major head display name.
    pub major_head_name: String,
    /// Aggregate before eliminations, current year.
    pub closing_cy: Decimal,
    /// Aggregate before eliminations, prior year.
    pub closing_py: Decimal,
    /// Amount netted out, current year.
    pub elimination_cy: Decimal,
    /// Amount netted out, prior year.
    pub elimination_py: Decimal,
    /// Post-elimination amount, current year.
    pub consolidated_cy: Decimal,
    /// Post-elimination amount, prior year.
    pub consolidated_py: Decimal,
    /// Per-entity contributions: parent first, then subsidiaries in
    /// configuration order.
    pub entity_breakdown: Vec<EntityContribution>,
    /// Data-quality signals for this row.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ConsolidationWarning>,
}

impl ConsolidatedTrialBalanceItem {
    /// Post-elimination amounts as a CY/PY pair.
    #[must_use]
    pub fn consolidated(&self) -> YearAmounts {
        YearAmounts::new(self.consolidated_cy, self.consolidated_py)
    }
}

/// Non-controlling share of one subsidiary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinorityInterest {
    /// Subsidiary entity.
    pub entity_id: EntityId,
    /// Entity label.
    pub entity_name: String,
    /// Parent's ownership.
    pub ownership_percentage: Decimal,
    /// 100 - ownership.
    pub minority_pct: Decimal,
    /// Minority share of net equity, current year.
    pub equity_cy: Decimal,
    /// Minority share of net equity, prior year.
    pub equity_py: Decimal,
    /// Minority share of net profit, current year.
    pub profit_cy: Decimal,
    /// Minority share of net profit, prior year.
    pub profit_py: Decimal,
}

/// Statement totals over the consolidated trial balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationSummary {
    /// Major head A.
    pub total_assets: YearAmounts,
    /// Major head B, equity included.
    pub total_liabilities: YearAmounts,
    /// Income-classified major head C.
    pub total_revenue: YearAmounts,
    /// Expense-classified major head C.
    pub total_expenses: YearAmounts,
    /// Revenue minus expenses.
    pub net_profit: YearAmounts,
}

/// Outcome of the assets = liabilities + equity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceCheck {
    /// Total assets minus total liabilities, current year.
    pub difference_cy: Decimal,
    /// Total assets minus total liabilities, prior year.
    pub difference_py: Decimal,
    /// Allowed absolute difference.
    pub tolerance: Decimal,
    /// Both years within tolerance.
    pub is_balanced: bool,
}

/// The complete consolidated statement for one group.
///
/// Derived and non-persistent: recomputed on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedData {
    /// Group ID.
    pub group_id: GroupId,
    /// Group name.
    pub group_name: String,
    /// One row per grouping code, ordered by code.
    pub consolidated_tb: Vec<ConsolidatedTrialBalanceItem>,
    /// Minority interest per partially-owned subsidiary.
    pub minority_interests: Vec<MinorityInterest>,
    /// Total assets, current year.
    pub total_assets_cy: Decimal,
    /// Total assets, prior year.
    pub total_assets_py: Decimal,
    /// Total equity and liabilities, current year.
    pub total_liabilities_cy: Decimal,
    /// Total equity and liabilities, prior year.
    pub total_liabilities_py: Decimal,
    /// Total income, current year.
    pub total_revenue_cy: Decimal,
    /// Total income, prior year.
    pub total_revenue_py: Decimal,
    /// Net profit, current year.
    pub net_profit_cy: Decimal,
    /// Net profit, prior year.
    pub net_profit_py: Decimal,
    /// Total minority interest in equity, current year.
    pub total_minority_interest_cy: Decimal,
    /// Total minority interest in equity, prior year.
    pub total_minority_interest_py: Decimal,
    /// Balance identity result.
    pub balance_check: BalanceCheck,
    /// Group-level data-quality signals.
    #[serde(default)]
    pub warnings: Vec<ConsolidationWarning>,
}

impl ConsolidatedData {
    /// Looks up a row by grouping code.
    #[must_use]
    pub fn item(&self, grouping_code: &str) -> Option<&ConsolidatedTrialBalanceItem> {
        self.consolidated_tb
            .binary_search_by(|row| row.grouping_code.as_str().cmp(grouping_code))
            .ok()
            .map(|idx| &self.consolidated_tb[idx])
    }

    /// Looks up the minority interest of a subsidiary.
    #[must_use]
    pub fn minority_interest(&self, entity_id: EntityId) -> Option<&MinorityInterest> {
        self.minority_interests
            .iter()
            .find(|mi| mi.entity_id == entity_id)
    }

    /// True when the balance identity holds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.balance_check.is_balanced
    }

    /// Asserts the balance identity.
    ///
    /// The figures stay available on failure; this only reports.
    ///
    /// # Errors
    ///
    /// Returns `ConsolidationError::UnbalancedResult` when total assets and
    /// total liabilities differ beyond tolerance in either year.
    pub fn validate(&self) -> Result<(), ConsolidationError> {
        if self.is_valid() {
            return Ok(());
        }
        Err(ConsolidationError::UnbalancedResult {
            difference_cy: self.balance_check.difference_cy,
            difference_py: self.balance_check.difference_py,
            tolerance: self.balance_check.tolerance,
        })
    }
}
