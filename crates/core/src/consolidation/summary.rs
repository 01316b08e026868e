//! Summary totalizer and balance check.

use consolidator_shared::types::YearAmounts;
use rust_decimal::Decimal;

use super::types::{BalanceCheck, ConsolidatedTrialBalanceItem, ConsolidationSummary};
use crate::chart::{HeadRules, MajorHead};

/// Rolls consolidated rows into statement totals.
///
/// Major head B includes equity, so assets equal liabilities when the
/// statement balances. Rows with an unknown major head are not totalled.
#[must_use]
pub fn summarize(rows: &[ConsolidatedTrialBalanceItem], rules: &HeadRules) -> ConsolidationSummary {
    let mut summary = ConsolidationSummary::default();

    for row in rows {
        let amount = row.consolidated();
        match MajorHead::from_code(&row.major_head_code) {
            Some(MajorHead::Assets) => summary.total_assets += amount,
            Some(MajorHead::EquityAndLiabilities) => summary.total_liabilities += amount,
            Some(MajorHead::ProfitAndLoss) => {
                if rules.is_revenue_minor_head(&row.minor_head_code) {
                    summary.total_revenue += amount;
                } else {
                    summary.total_expenses += amount;
                }
            }
            None => {}
        }
    }

    summary.net_profit = summary.total_revenue - summary.total_expenses;
    summary
}

/// Checks `total assets == total liabilities` for both years.
///
/// A difference whose absolute value does not exceed `tolerance` passes.
#[must_use]
pub fn check_balance(summary: &ConsolidationSummary, tolerance: Decimal) -> BalanceCheck {
    let difference = summary.total_assets - summary.total_liabilities;
    let tolerance = tolerance.abs();

    BalanceCheck {
        difference_cy: difference.cy,
        difference_py: difference.py,
        tolerance,
        is_balanced: within(difference, tolerance),
    }
}

fn within(difference: YearAmounts, tolerance: Decimal) -> bool {
    let abs = difference.abs();
    abs.cy <= tolerance && abs.py <= tolerance
}
