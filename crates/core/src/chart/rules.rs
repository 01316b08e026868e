//! Statement-role rules over minor heads.

use consolidator_shared::ConsolidationConfig;

use super::types::{Classification, MajorHead};

/// True when `minor_head` is `prefix` itself or a child of it.
///
/// `B.10` matches `B.10` and `B.10.5` but not `B.100`.
#[must_use]
pub fn head_matches(minor_head: &str, prefix: &str) -> bool {
    minor_head
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// Decides which classified lines are equity, income or expense.
#[derive(Debug, Clone)]
pub struct HeadRules {
    equity_minor_heads: Vec<String>,
    revenue_minor_heads: Vec<String>,
}

impl HeadRules {
    /// Creates rules from explicit minor-head prefixes.
    #[must_use]
    pub fn new(equity_minor_heads: Vec<String>, revenue_minor_heads: Vec<String>) -> Self {
        Self {
            equity_minor_heads,
            revenue_minor_heads,
        }
    }

    /// Creates rules from the consolidation configuration.
    #[must_use]
    pub fn from_config(config: &ConsolidationConfig) -> Self {
        Self::new(
            config.equity_minor_heads.clone(),
            config.revenue_minor_heads.clone(),
        )
    }

    /// Equity line: major head B under an equity minor head.
    #[must_use]
    pub fn is_equity(&self, classification: &Classification) -> bool {
        classification.major_head() == Some(MajorHead::EquityAndLiabilities)
            && Self::any_match(&classification.minor_head_code, &self.equity_minor_heads)
    }

    /// Income line: major head C under a revenue or other-income minor head.
    #[must_use]
    pub fn is_revenue(&self, classification: &Classification) -> bool {
        classification.major_head() == Some(MajorHead::ProfitAndLoss)
            && self.is_revenue_minor_head(&classification.minor_head_code)
    }

    /// Expense line: any other major head C line.
    #[must_use]
    pub fn is_expense(&self, classification: &Classification) -> bool {
        classification.major_head() == Some(MajorHead::ProfitAndLoss)
            && !self.is_revenue_minor_head(&classification.minor_head_code)
    }

    /// Minor head is one of the income heads.
    #[must_use]
    pub fn is_revenue_minor_head(&self, minor_head: &str) -> bool {
        Self::any_match(minor_head, &self.revenue_minor_heads)
    }

    fn any_match(minor_head: &str, prefixes: &[String]) -> bool {
        prefixes.iter().any(|p| head_matches(minor_head, p))
    }
}

impl Default for HeadRules {
    fn default() -> Self {
        Self::from_config(&ConsolidationConfig::default())
    }
}
