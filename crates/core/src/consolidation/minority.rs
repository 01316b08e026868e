//! Minority (non-controlling) interest.

use consolidator_shared::ConsolidationConfig;
use rust_decimal::Decimal;
use tracing::debug;

use super::aggregator::SubsidiaryInput;
use super::types::{ConsolidationMethod, MinorityInterest, SubsidiaryConfig};
use crate::chart::HeadRules;
use crate::entity::EntityPosition;

/// True when a subsidiary carries a minority interest.
///
/// Only partially-owned subsidiaries brought in line by line qualify:
/// always `full`, and `proportionate` when configured.
#[must_use]
pub fn carries_minority_interest(
    subsidiary: &SubsidiaryConfig,
    config: &ConsolidationConfig,
) -> bool {
    let method_qualifies = match subsidiary.consolidation_method {
        ConsolidationMethod::Full => true,
        ConsolidationMethod::Proportionate => config.proportionate_minority_interest,
        ConsolidationMethod::Equity => false,
    };
    method_qualifies && subsidiary.ownership_percentage < Decimal::ONE_HUNDRED
}

/// Computes the non-controlling share of equity and profit per subsidiary.
///
/// Measured on the subsidiary's own net equity and net profit, in full
/// entity terms, then scaled by `100 - ownership`.
#[must_use]
pub fn compute_minority_interests(
    subsidiaries: &[SubsidiaryInput<'_>],
    rules: &HeadRules,
    config: &ConsolidationConfig,
) -> Vec<MinorityInterest> {
    subsidiaries
        .iter()
        .filter(|s| carries_minority_interest(s.config, config))
        .map(|s| {
            let minority_pct = s.config.minority_percentage();
            let position = EntityPosition::of(s.data, rules);
            let equity = position.net_equity().percent_of(minority_pct);
            let profit = position.net_profit().percent_of(minority_pct);

            debug!(
                entity_id = %s.data.entity.id,
                %minority_pct,
                equity_cy = %equity.cy,
                "Minority interest computed"
            );

            MinorityInterest {
                entity_id: s.data.entity.id,
                entity_name: s.data.entity.name.clone(),
                ownership_percentage: s.config.ownership_percentage,
                minority_pct,
                equity_cy: equity.cy,
                equity_py: equity.py,
                profit_cy: profit.cy,
                profit_py: profit.py,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Classification, GroupingClassifier};
    use crate::entity::{EntityData, EntityRef, TrialBalanceLine};
    use consolidator_shared::types::EntityId;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn data() -> EntityData {
        let mut classifier = GroupingClassifier::new();
        let mut lines = Vec::new();
        for (code, minor, major, cy) in [
            ("A.120.01", "A.120", "A", dec!(160000)),
            ("B.10.01", "B.10", "B", dec!(100000)),
            ("B.20.01", "B.20", "B", dec!(25000)),
            ("B.80.01", "B.80", "B", dec!(35000)),
            ("C.10.01", "C.10", "C", dec!(50000)),
            ("C.60.01", "C.60", "C", dec!(30000)),
        ] {
            classifier.insert(
                code,
                Classification {
                    grouping_name: code.into(),
                    minor_head_code: minor.into(),
                    minor_head_name: String::new(),
                    major_head_code: major.into(),
                    major_head_name: String::new(),
                },
            );
            lines.push(TrialBalanceLine {
                ledger: code.into(),
                grouping_code: Some(code.into()),
                closing_cy: cy,
                closing_py: Decimal::ZERO,
                is_mapped: true,
                is_related_party: false,
            });
        }
        EntityData {
            entity: EntityRef::new(EntityId::new(), "Sub Pvt Ltd"),
            lines,
            classifier,
        }
    }

    fn config(pct: Decimal, method: ConsolidationMethod) -> SubsidiaryConfig {
        SubsidiaryConfig {
            entity_id: EntityId::new(),
            entity_name: "Sub".into(),
            ownership_percentage: pct,
            is_fully_owned: pct == Decimal::ONE_HUNDRED,
            consolidation_method: method,
        }
    }

    #[rstest]
    #[case(dec!(80), ConsolidationMethod::Full, false, true)]
    #[case(dec!(100), ConsolidationMethod::Full, false, false)]
    #[case(dec!(40), ConsolidationMethod::Proportionate, false, false)]
    #[case(dec!(40), ConsolidationMethod::Proportionate, true, true)]
    #[case(dec!(100), ConsolidationMethod::Proportionate, true, false)]
    #[case(dec!(30), ConsolidationMethod::Equity, true, false)]
    fn test_carries_minority_interest(
        #[case] pct: Decimal,
        #[case] method: ConsolidationMethod,
        #[case] proportionate_flag: bool,
        #[case] expected: bool,
    ) {
        let settings = ConsolidationConfig {
            proportionate_minority_interest: proportionate_flag,
            ..ConsolidationConfig::default()
        };
        assert_eq!(carries_minority_interest(&config(pct, method), &settings), expected);
    }

    #[test]
    fn test_minority_share_of_equity_and_profit() {
        let data = data();
        let sub = config(dec!(80), ConsolidationMethod::Full);
        let inputs = [SubsidiaryInput { config: &sub, data: &data }];

        let result = compute_minority_interests(
            &inputs,
            &HeadRules::default(),
            &ConsolidationConfig::default(),
        );

        assert_eq!(result.len(), 1);
        let mi = &result[0];
        assert_eq!(mi.minority_pct, dec!(20));
        assert_eq!(mi.equity_cy, dec!(25000));
        assert_eq!(mi.profit_cy, dec!(4000));
        assert_eq!(mi.entity_name, "Sub Pvt Ltd");
    }
}
