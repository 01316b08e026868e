//! Aggregator: folds every contributing entity into one amount per grouping code.
//!
//! Entities are folded parent first, then subsidiaries in configuration
//! order, which fixes the order of each row's entity breakdown.

use std::collections::BTreeMap;

use consolidator_shared::{ConsolidationConfig, SyntheticGrouping};
use consolidator_shared::types::YearAmounts;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::types::{ConsolidationMethod, EntityContribution, SubsidiaryConfig};
use super::warning::ConsolidationWarning;
use crate::chart::{Classification, HeadRules};
use crate::entity::{EntityData, EntityPosition, EntityRef};

/// A subsidiary's configuration paired with its fetched data.
#[derive(Debug, Clone, Copy)]
pub struct SubsidiaryInput<'a> {
    /// Participation terms.
    pub config: &'a SubsidiaryConfig,
    /// Fetched trial balance.
    pub data: &'a EntityData,
}

/// Pre-elimination state of one grouping code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateBucket {
    /// First known classification of the code.
    pub classification: Option<Classification>,
    /// Sum of all contributions.
    pub closing: YearAmounts,
    /// Per-entity contributions in fold order.
    pub breakdown: Vec<EntityContribution>,
    /// Classification problems seen while folding.
    pub warnings: Vec<ConsolidationWarning>,
}

impl AggregateBucket {
    fn push_warning(&mut self, warning: ConsolidationWarning) {
        if !self.warnings.contains(&warning) {
            warn!(?warning, "Grouping classification problem");
            self.warnings.push(warning);
        }
    }
}

/// Grouping code to aggregate bucket, ordered by code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    buckets: BTreeMap<String, AggregateBucket>,
}

impl Aggregate {
    /// Adds one contribution to a grouping code.
    ///
    /// Consecutive contributions from the same entity merge into one
    /// breakdown entry. `classification` is the producing entity's view of
    /// the code; `None` means that entity's classifier does not know it.
    pub fn post(
        &mut self,
        grouping_code: &str,
        classification: Option<&Classification>,
        entity: &EntityRef,
        amount: YearAmounts,
    ) {
        let bucket = self.buckets.entry(grouping_code.to_string()).or_default();

        if let Some(found) = classification {
            if let Some(expected) = &bucket.classification {
                if !expected.same_heads(found) {
                    let warning = ConsolidationWarning::ClassifierMismatch {
                        grouping_code: grouping_code.to_string(),
                        entity_id: entity.id,
                        expected: heads_label(expected),
                        found: heads_label(found),
                    };
                    bucket.push_warning(warning);
                }
            } else {
                bucket.classification = Some(found.clone());
            }
        } else {
            bucket.push_warning(ConsolidationWarning::UnclassifiedGrouping {
                grouping_code: grouping_code.to_string(),
                entity_id: entity.id,
            });
        }

        bucket.closing += amount;
        match bucket.breakdown.last_mut() {
            Some(last) if last.entity_id == entity.id => {
                last.amount_cy += amount.cy;
                last.amount_py += amount.py;
            }
            _ => bucket.breakdown.push(EntityContribution {
                entity_id: entity.id,
                entity_name: entity.name.clone(),
                amount_cy: amount.cy,
                amount_py: amount.py,
            }),
        }
    }

    /// True when some entity contributed to the code.
    #[must_use]
    pub fn contains(&self, grouping_code: &str) -> bool {
        self.buckets.contains_key(grouping_code)
    }

    /// Bucket for a grouping code.
    #[must_use]
    pub fn get(&self, grouping_code: &str) -> Option<&AggregateBucket> {
        self.buckets.get(grouping_code)
    }

    /// Buckets in grouping-code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AggregateBucket)> {
        self.buckets.iter().map(|(code, bucket)| (code.as_str(), bucket))
    }

    /// Number of grouping codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// True when no entity contributed anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Posts every mapped line of an entity, optionally scaled to a share.
    fn post_lines(&mut self, data: &EntityData, share: Option<Decimal>) {
        for (code, line, classification) in data.mapped_lines() {
            let amount = match share {
                Some(pct) => line.closing().percent_of(pct),
                None => line.closing(),
            };
            self.post(code, classification, &data.entity, amount);
        }
    }

    /// Posts the two equity-method lines for an associate.
    fn post_equity_method(
        &mut self,
        parent: &EntityData,
        subsidiary: SubsidiaryInput<'_>,
        rules: &HeadRules,
        config: &ConsolidationConfig,
    ) {
        let pct = subsidiary.config.ownership_percentage;
        let position = EntityPosition::of(subsidiary.data, rules);

        for (target, amount) in [
            (&config.associate_investment, position.net_equity()),
            (&config.associate_profit_share, position.net_profit()),
        ] {
            let classification = parent
                .classifier
                .get(&target.code)
                .cloned()
                .unwrap_or_else(|| synthetic_classification(target));
            self.post(
                &target.code,
                Some(&classification),
                &subsidiary.data.entity,
                amount.percent_of(pct),
            );
        }
    }

    fn drop_zero_contributions(&mut self) {
        for bucket in self.buckets.values_mut() {
            bucket
                .breakdown
                .retain(|c| !(c.amount_cy.is_zero() && c.amount_py.is_zero()));
        }
    }
}

/// Combines the parent and subsidiaries into one aggregate.
///
/// - parent and `full` subsidiaries: 100% of every mapped line
/// - `proportionate`: ownership share of every mapped line
/// - `equity`: share of net equity to the associate investment grouping and
///   share of net profit to the associate profit grouping, nothing else
///
/// A code that at least one entity referenced is kept even when it nets to
/// zero. Breakdown entries that net to zero in both years are dropped.
#[must_use]
pub fn aggregate(
    parent: &EntityData,
    subsidiaries: &[SubsidiaryInput<'_>],
    rules: &HeadRules,
    config: &ConsolidationConfig,
) -> Aggregate {
    let mut aggregate = Aggregate::default();

    debug!(entity_id = %parent.entity.id, lines = parent.lines.len(), "Folding parent");
    aggregate.post_lines(parent, None);

    for subsidiary in subsidiaries {
        let method = subsidiary.config.consolidation_method;
        debug!(
            entity_id = %subsidiary.data.entity.id,
            ?method,
            ownership = %subsidiary.config.ownership_percentage,
            "Folding subsidiary"
        );

        match method {
            ConsolidationMethod::Full => aggregate.post_lines(subsidiary.data, None),
            ConsolidationMethod::Proportionate => aggregate
                .post_lines(subsidiary.data, Some(subsidiary.config.ownership_percentage)),
            ConsolidationMethod::Equity => {
                aggregate.post_equity_method(parent, *subsidiary, rules, config);
            }
        }
    }

    aggregate.drop_zero_contributions();
    aggregate
}

fn heads_label(classification: &Classification) -> String {
    format!(
        "{}/{}",
        classification.major_head_code, classification.minor_head_code
    )
}

fn synthetic_classification(target: &SyntheticGrouping) -> Classification {
    Classification {
        grouping_name: target.name.clone(),
        minor_head_code: target.minor_head_code.clone(),
        minor_head_name: target.minor_head_name.clone(),
        major_head_code: target.major_head_code.clone(),
        major_head_name: target.major_head_name.clone(),
    }
}
