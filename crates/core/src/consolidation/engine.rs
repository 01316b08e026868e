//! Report generation.
//!
//! [`ConsolidationService`] is the pure pipeline over already-fetched data:
//! aggregate, apply eliminations, compute minority interest, totalize.
//! [`ConsolidationEngine`] wraps it with the entity fetches.

use std::time::Duration;

use consolidator_shared::ConsolidationConfig;
use consolidator_shared::types::{EntityId, YearAmounts};
use futures::future::join_all;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::aggregator::{Aggregate, SubsidiaryInput, aggregate};
use super::elimination::{EliminationTotals, apply_eliminations};
use super::error::ConsolidationError;
use super::minority::compute_minority_interests;
use super::summary::{check_balance, summarize};
use super::types::{
    ConsolidatedData, ConsolidatedTrialBalanceItem, ConsolidationGroup, SubsidiaryConfig,
};
use super::warning::ConsolidationWarning;
use crate::chart::HeadRules;
use crate::entity::{
    EntityData, EntityDataProvider, EntityNameCache, FetchError, fetch_with_timeout,
};

/// Consolidation pipeline over fetched entity data.
///
/// Stateless and deterministic: the same inputs always give the same output.
pub struct ConsolidationService;

impl ConsolidationService {
    /// Produces the consolidated statement for a group.
    ///
    /// `subsidiaries` must be in the group's configuration order; entities
    /// missing from it contribute nothing.
    #[must_use]
    pub fn consolidate(
        group: &ConsolidationGroup,
        parent: &EntityData,
        subsidiaries: &[SubsidiaryInput<'_>],
        config: &ConsolidationConfig,
    ) -> ConsolidatedData {
        let rules = HeadRules::from_config(config);

        let aggregate = aggregate(parent, subsidiaries, &rules, config);
        let eliminations = apply_eliminations(&aggregate, &group.eliminations);
        let consolidated_tb = Self::build_rows(&aggregate, &eliminations);
        let minority_interests = compute_minority_interests(subsidiaries, &rules, config);
        let summary = summarize(&consolidated_tb, &rules);
        let balance_check = check_balance(&summary, config.balance_tolerance);

        let minority_total: YearAmounts = minority_interests
            .iter()
            .map(|mi| YearAmounts::new(mi.equity_cy, mi.equity_py))
            .sum();

        ConsolidatedData {
            group_id: group.id,
            group_name: group.name.clone(),
            consolidated_tb,
            minority_interests,
            total_assets_cy: summary.total_assets.cy,
            total_assets_py: summary.total_assets.py,
            total_liabilities_cy: summary.total_liabilities.cy,
            total_liabilities_py: summary.total_liabilities.py,
            total_revenue_cy: summary.total_revenue.cy,
            total_revenue_py: summary.total_revenue.py,
            net_profit_cy: summary.net_profit.cy,
            net_profit_py: summary.net_profit.py,
            total_minority_interest_cy: minority_total.cy,
            total_minority_interest_py: minority_total.py,
            balance_check,
            warnings: eliminations.warnings,
        }
    }

    /// One row per aggregated grouping code, in code order.
    fn build_rows(
        aggregate: &Aggregate,
        eliminations: &EliminationTotals,
    ) -> Vec<ConsolidatedTrialBalanceItem> {
        aggregate
            .iter()
            .map(|(code, bucket)| {
                let closing = bucket.closing;
                let elimination = eliminations.amount_for(code);
                let consolidated = closing - elimination;

                let mut warnings = bucket.warnings.clone();
                if sign_reversed(closing.cy, elimination.cy, consolidated.cy)
                    || sign_reversed(closing.py, elimination.py, consolidated.py)
                {
                    warn!(grouping_code = code, "Elimination reversed the balance sign");
                    warnings.push(ConsolidationWarning::SignReversal {
                        grouping_code: code.to_string(),
                        closing,
                        consolidated,
                    });
                }

                let (grouping_name, minor_code, minor_name, major_code, major_name) =
                    match &bucket.classification {
                        Some(c) => (
                            c.grouping_name.clone(),
                            c.minor_head_code.clone(),
                            c.minor_head_name.clone(),
                            c.major_head_code.clone(),
                            c.major_head_name.clone(),
                        ),
                        None => (
                            code.to_string(),
                            String::new(),
                            String::new(),
                            String::new(),
                            String::new(),
                        ),
                    };

                ConsolidatedTrialBalanceItem {
                    grouping_code: code.to_string(),
                    grouping_name,
                    minor_head_code: minor_code,
                    minor_head_name: minor_name,
                    major_head_code: major_code,
                    major_head_name: major_name,
                    closing_cy: closing.cy,
                    closing_py: closing.py,
                    elimination_cy: elimination.cy,
                    elimination_py: elimination.py,
                    consolidated_cy: consolidated.cy,
                    consolidated_py: consolidated.py,
                    entity_breakdown: bucket.breakdown.clone(),
                    warnings,
                }
            })
            .collect()
    }
}

/// An elimination flipped the balance, or created one from nothing.
fn sign_reversed(closing: Decimal, elimination: Decimal, consolidated: Decimal) -> bool {
    if elimination.is_zero() || consolidated.is_zero() {
        return false;
    }
    closing.is_zero() || closing.is_sign_negative() != consolidated.is_sign_negative()
}

/// Generates consolidated statements, fetching entity data on demand.
///
/// Nothing is cached between generations except entity display names.
pub struct ConsolidationEngine<P> {
    provider: P,
    config: ConsolidationConfig,
    names: EntityNameCache,
}

impl<P: EntityDataProvider> ConsolidationEngine<P> {
    /// Creates an engine over a data provider.
    #[must_use]
    pub fn new(provider: P, config: ConsolidationConfig) -> Self {
        let names =
            EntityNameCache::with_config(config.name_cache_capacity, config.name_cache_ttl_secs);
        Self {
            provider,
            config,
            names,
        }
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &ConsolidationConfig {
        &self.config
    }

    /// Entity display-name cache.
    #[must_use]
    pub fn names(&self) -> &EntityNameCache {
        &self.names
    }

    fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.config.fetch_timeout_secs)
    }

    /// Fetches several entities concurrently, each under the fetch timeout.
    ///
    /// Results are in the order of `entity_ids`.
    pub async fn fetch_all(&self, entity_ids: &[EntityId]) -> Vec<Result<EntityData, FetchError>> {
        let timeout = self.fetch_timeout();
        let results = join_all(
            entity_ids
                .iter()
                .map(|id| fetch_with_timeout(&self.provider, *id, timeout)),
        )
        .await;

        for data in results.iter().flatten() {
            self.names.remember(&data.entity);
        }
        results
    }

    /// Generates the consolidated statement for a group.
    ///
    /// The parent and all subsidiaries are fetched concurrently. A
    /// subsidiary that cannot be fetched contributes zero and is reported
    /// as a warning. An unbalanced result is returned flagged, not as an
    /// error; see [`ConsolidatedData::validate`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidGroup` or `InvalidEliminationEntry` when the group
    /// breaks an invariant, and `MissingParentData` when the parent cannot
    /// be fetched.
    pub async fn generate(
        &self,
        group: &ConsolidationGroup,
    ) -> Result<ConsolidatedData, ConsolidationError> {
        group.validate()?;

        info!(
            group_id = %group.id,
            subsidiaries = group.subsidiaries.len(),
            eliminations = group.eliminations.len(),
            "Generating consolidation"
        );

        let timeout = self.fetch_timeout();
        let subsidiary_ids: Vec<EntityId> =
            group.subsidiaries.iter().map(|s| s.entity_id).collect();
        let (parent, subsidiaries) = tokio::join!(
            fetch_with_timeout(&self.provider, group.parent_entity_id, timeout),
            self.fetch_all(&subsidiary_ids),
        );

        let parent = parent.map_err(|err| ConsolidationError::MissingParentData {
            entity_id: group.parent_entity_id,
            reason: err.to_string(),
        })?;
        self.names.remember(&parent.entity);

        let mut warnings = Vec::new();
        let mut fetched: Vec<(&SubsidiaryConfig, EntityData)> =
            Vec::with_capacity(group.subsidiaries.len());

        for (config, result) in group.subsidiaries.iter().zip(subsidiaries) {
            match result {
                Ok(data) => {
                    debug!(entity_id = %config.entity_id, lines = data.lines.len(), "Subsidiary fetched");
                    fetched.push((config, data));
                }
                Err(err) => {
                    let entity_name = self.names.label(config.entity_id, &config.entity_name);
                    warn!(
                        entity_id = %config.entity_id,
                        entity_name = %entity_name,
                        error = %err,
                        "Subsidiary data unavailable, contributing zero"
                    );
                    warnings.push(ConsolidationWarning::MissingSubsidiaryData {
                        entity_id: config.entity_id,
                        entity_name,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let inputs: Vec<SubsidiaryInput<'_>> = fetched
            .iter()
            .map(|(config, data)| SubsidiaryInput {
                config: *config,
                data,
            })
            .collect();

        let mut data = ConsolidationService::consolidate(group, &parent, &inputs, &self.config);
        warnings.append(&mut data.warnings);
        data.warnings = warnings;

        if !data.is_valid() {
            warn!(
                group_id = %group.id,
                difference_cy = %data.balance_check.difference_cy,
                difference_py = %data.balance_check.difference_py,
                "Consolidated balance sheet does not balance"
            );
        }

        info!(
            group_id = %group.id,
            rows = data.consolidated_tb.len(),
            minority_interests = data.minority_interests.len(),
            warnings = data.warnings.len(),
            balanced = data.is_valid(),
            "Consolidation generated"
        );

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Classification, GroupingClassifier};
    use crate::consolidation::types::{EliminationType, GroupingRef, InterCompanyElimination};
    use crate::entity::{EntityRef, InMemoryEntityProvider, TrialBalanceLine};
    use async_trait::async_trait;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn entity(name: &str, lines: &[(&str, Decimal)]) -> EntityData {
        let mut classifier = GroupingClassifier::new();
        let mut tb = Vec::new();
        for (code, cy) in lines {
            let minor = code.rsplit_once('.').map(|(m, _)| m).unwrap_or_default();
            classifier.insert(
                *code,
                Classification {
                    grouping_name: format!("{code} name"),
                    minor_head_code: minor.into(),
                    minor_head_name: String::new(),
                    major_head_code: code[..1].to_string(),
                    major_head_name: String::new(),
                },
            );
            tb.push(TrialBalanceLine {
                ledger: (*code).to_string(),
                grouping_code: Some((*code).to_string()),
                closing_cy: *cy,
                closing_py: Decimal::ZERO,
                is_mapped: true,
                is_related_party: false,
            });
        }
        EntityData {
            entity: EntityRef::new(EntityId::new(), name),
            lines: tb,
            classifier,
        }
    }

    #[rstest]
    #[case(dec!(100), dec!(0), dec!(100), false)]
    #[case(dec!(100), dec!(40), dec!(60), false)]
    #[case(dec!(100), dec!(100), dec!(0), false)]
    #[case(dec!(100), dec!(150), dec!(-50), true)]
    #[case(dec!(0), dec!(20), dec!(-20), true)]
    #[case(dec!(-30), dec!(-50), dec!(20), true)]
    fn test_sign_reversed(
        #[case] closing: Decimal,
        #[case] elimination: Decimal,
        #[case] consolidated: Decimal,
        #[case] expected: bool,
    ) {
        assert_eq!(sign_reversed(closing, elimination, consolidated), expected);
    }

    #[test]
    fn test_over_elimination_flags_row() {
        let parent = entity("Parent", &[("A.110.01", dec!(100)), ("B.80.01", dec!(500))]);
        let mut group = ConsolidationGroup::new(parent.entity.clone());
        group
            .add_elimination(
                InterCompanyElimination::new(
                    "Too much",
                    EliminationType::ReceivablePayable,
                    GroupingRef::new("A.110.01", "Receivables"),
                    GroupingRef::new("B.80.01", "Payables"),
                    dec!(150),
                    Decimal::ZERO,
                )
                .unwrap(),
            )
            .unwrap();

        let data =
            ConsolidationService::consolidate(&group, &parent, &[], &ConsolidationConfig::default());
        let row = data.item("A.110.01").unwrap();

        assert_eq!(row.consolidated_cy, dec!(-50));
        assert_eq!(row.warnings.len(), 1);
        assert_eq!(row.warnings[0].kind(), "sign_reversal");
        assert!(data.item("B.80.01").unwrap().warnings.is_empty());
    }

    #[tokio::test]
    async fn test_missing_parent_is_fatal() {
        let parent = entity("Parent", &[("A.120.01", dec!(100))]);
        let group = ConsolidationGroup::new(parent.entity.clone());
        let engine = ConsolidationEngine::new(InMemoryEntityProvider::new(), ConsolidationConfig::default());

        let err = engine.generate(&group).await.unwrap_err();
        assert!(matches!(
            err,
            ConsolidationError::MissingParentData { entity_id, .. } if entity_id == group.parent_entity_id
        ));
    }

    #[tokio::test]
    async fn test_missing_subsidiary_contributes_zero_with_warning() {
        let parent = entity("Parent", &[("A.120.01", dec!(100)), ("B.10.01", dec!(100))]);
        let mut group = ConsolidationGroup::new(parent.entity.clone());
        let absent = EntityId::new();
        group
            .add_subsidiary(EntityRef::new(absent, "Stored Name"), dec!(80))
            .unwrap();

        let engine = ConsolidationEngine::new(
            InMemoryEntityProvider::new().with(parent),
            ConsolidationConfig::default(),
        );
        engine.names().remember(&EntityRef::new(absent, "Renamed Sub"));

        let data = engine.generate(&group).await.unwrap();

        assert_eq!(data.total_assets_cy, dec!(100));
        assert!(data.minority_interests.is_empty());
        assert_eq!(
            data.warnings,
            vec![ConsolidationWarning::MissingSubsidiaryData {
                entity_id: absent,
                entity_name: "Renamed Sub".into(),
                reason: FetchError::NotFound(absent).to_string(),
            }]
        );
    }

    struct StalledProvider {
        inner: InMemoryEntityProvider,
        stalled: EntityId,
    }

    #[async_trait]
    impl EntityDataProvider for StalledProvider {
        async fn fetch(&self, entity_id: EntityId) -> Result<EntityData, FetchError> {
            if entity_id == self.stalled {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            self.inner.fetch(entity_id).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_subsidiary_timeout_is_unavailable_not_zero() {
        let parent = entity("Parent", &[("A.120.01", dec!(100)), ("B.10.01", dec!(100))]);
        let slow = entity("Slow Sub", &[("A.120.01", dec!(50)), ("B.10.01", dec!(50))]);
        let mut group = ConsolidationGroup::new(parent.entity.clone());
        group.add_subsidiary(slow.entity.clone(), dec!(100)).unwrap();

        let provider = StalledProvider {
            stalled: slow.entity.id,
            inner: InMemoryEntityProvider::new().with(parent).with(slow),
        };
        let config = ConsolidationConfig {
            fetch_timeout_secs: 5,
            ..ConsolidationConfig::default()
        };
        let data = ConsolidationEngine::new(provider, config)
            .generate(&group)
            .await
            .unwrap();

        assert_eq!(data.total_assets_cy, dec!(100));
        assert_eq!(data.warnings.len(), 1);
        assert_eq!(data.warnings[0].kind(), "missing_subsidiary_data");
    }

    /// Serves one entity's request with data labelled as another entity.
    struct RelabellingProvider {
        inner: InMemoryEntityProvider,
        relabel: EntityId,
        label: EntityRef,
    }

    #[async_trait]
    impl EntityDataProvider for RelabellingProvider {
        async fn fetch(&self, entity_id: EntityId) -> Result<EntityData, FetchError> {
            let mut data = self.inner.fetch(entity_id).await?;
            if entity_id == self.relabel {
                data.entity = self.label.clone();
            }
            Ok(data)
        }
    }

    #[tokio::test]
    async fn test_subsidiary_data_for_wrong_entity_is_missing() {
        let parent = entity("Parent", &[("A.120.01", dec!(100)), ("B.10.01", dec!(100))]);
        let sub = entity("Sub", &[("A.120.01", dec!(50)), ("B.10.01", dec!(50))]);
        let mut group = ConsolidationGroup::new(parent.entity.clone());
        group.add_subsidiary(sub.entity.clone(), dec!(80)).unwrap();

        let provider = RelabellingProvider {
            relabel: sub.entity.id,
            label: parent.entity.clone(),
            inner: InMemoryEntityProvider::new().with(parent.clone()).with(sub.clone()),
        };
        let data = ConsolidationEngine::new(provider, ConsolidationConfig::default())
            .generate(&group)
            .await
            .unwrap();

        let cash = data.item("A.120.01").unwrap();
        assert_eq!(cash.closing_cy, dec!(100));
        assert_eq!(cash.entity_breakdown.len(), 1);
        assert_eq!(cash.entity_breakdown[0].entity_id, parent.entity.id);
        assert_eq!(cash.entity_breakdown[0].amount_cy, dec!(100));
        assert!(data.minority_interests.is_empty());
        assert_eq!(data.warnings.len(), 1);
        assert!(matches!(
            &data.warnings[0],
            ConsolidationWarning::MissingSubsidiaryData { entity_id, .. } if *entity_id == sub.entity.id
        ));
    }

    #[tokio::test]
    async fn test_parent_data_for_wrong_entity_is_fatal() {
        let parent = entity("Parent", &[("A.120.01", dec!(100)), ("B.10.01", dec!(100))]);
        let group = ConsolidationGroup::new(parent.entity.clone());

        let provider = RelabellingProvider {
            relabel: parent.entity.id,
            label: EntityRef::new(EntityId::new(), "Someone Else"),
            inner: InMemoryEntityProvider::new().with(parent.clone()),
        };
        let err = ConsolidationEngine::new(provider, ConsolidationConfig::default())
            .generate(&group)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ConsolidationError::MissingParentData { entity_id, .. } if entity_id == parent.entity.id
        ));
    }

    #[tokio::test]
    async fn test_invalid_group_rejected_before_fetching() {
        let parent = entity("Parent", &[("A.120.01", dec!(100))]);
        let mut group = ConsolidationGroup::new(parent.entity.clone());
        group.add_subsidiary(EntityRef::new(EntityId::new(), "Sub"), dec!(80)).unwrap();
        group.subsidiaries[0].is_fully_owned = true;

        let engine = ConsolidationEngine::new(
            InMemoryEntityProvider::new().with(parent),
            ConsolidationConfig::default(),
        );

        assert!(matches!(
            engine.generate(&group).await.unwrap_err(),
            ConsolidationError::InvalidGroup(_)
        ));
    }

    #[tokio::test]
    async fn test_unbalanced_result_is_returned_flagged() {
        let parent = entity("Parent", &[("A.120.01", dec!(100)), ("B.10.01", dec!(90))]);
        let group = ConsolidationGroup::new(parent.entity.clone());
        let engine = ConsolidationEngine::new(
            InMemoryEntityProvider::new().with(parent),
            ConsolidationConfig::default(),
        );

        let data = engine.generate(&group).await.unwrap();

        assert!(!data.is_valid());
        assert_eq!(data.balance_check.difference_cy, dec!(10));
        assert_eq!(
            data.validate().unwrap_err(),
            ConsolidationError::UnbalancedResult {
                difference_cy: dec!(10),
                difference_py: Decimal::ZERO,
                tolerance: dec!(1),
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_all_keeps_request_order() {
        let a = entity("A", &[]);
        let b = entity("B", &[]);
        let ids = [b.entity.id, EntityId::new(), a.entity.id];
        let engine = ConsolidationEngine::new(
            InMemoryEntityProvider::new().with(a).with(b),
            ConsolidationConfig::default(),
        );

        let results = engine.fetch_all(&ids).await;

        assert_eq!(results[0].as_ref().unwrap().entity.name, "B");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().entity.name, "A");
    }
}
