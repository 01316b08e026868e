//! Elimination suggestions from related-party ledgers.

use consolidator_shared::ConsolidationConfig;
use tracing::debug;

use super::types::{EliminationType, GroupingRef, InterCompanyElimination};
use crate::chart::{Classification, head_matches};
use crate::entity::{EntityData, EntityRef, TrialBalanceLine};

struct RelatedLine<'a> {
    entity: &'a EntityRef,
    code: &'a str,
    line: &'a TrialBalanceLine,
    classification: &'a Classification,
}

fn on_side(line: &RelatedLine<'_>, heads: &[String]) -> bool {
    heads
        .iter()
        .any(|head| head_matches(&line.classification.minor_head_code, head))
}

/// Proposes receivable/payable eliminations between entities.
///
/// A related-party receivable in one entity is paired with every
/// related-party payable in another entity whose absolute current-year
/// balance is equal and non-zero. Suggestions are for review only; the
/// caller decides which to add to a group.
#[must_use]
pub fn suggest_eliminations(
    entities: &[EntityData],
    config: &ConsolidationConfig,
) -> Vec<InterCompanyElimination> {
    let related: Vec<RelatedLine<'_>> = entities
        .iter()
        .flat_map(|data| {
            data.mapped_lines()
                .filter(|(_, line, _)| line.is_related_party)
                .filter_map(move |(code, line, classification)| {
                    Some(RelatedLine {
                        entity: &data.entity,
                        code,
                        line,
                        classification: classification?,
                    })
                })
        })
        .collect();

    let receivables: Vec<&RelatedLine<'_>> = related
        .iter()
        .filter(|l| on_side(l, &config.receivable_minor_heads))
        .collect();
    let payables: Vec<&RelatedLine<'_>> = related
        .iter()
        .filter(|l| on_side(l, &config.payable_minor_heads))
        .collect();

    let mut suggestions = Vec::new();
    for rec in &receivables {
        let amount = rec.line.closing().abs();
        if amount.cy.is_zero() {
            continue;
        }

        for pay in &payables {
            if rec.entity.id == pay.entity.id || pay.line.closing_cy.abs() != amount.cy {
                continue;
            }

            let suggestion = InterCompanyElimination::new(
                format!("Inter-company: {} ↔ {}", rec.entity.name, pay.entity.name),
                EliminationType::ReceivablePayable,
                GroupingRef::new(rec.code, rec.classification.grouping_name.clone()),
                GroupingRef::new(pay.code, pay.classification.grouping_name.clone()),
                amount.cy,
                amount.py,
            );
            match suggestion {
                Ok(entry) => suggestions.push(entry),
                Err(err) => debug!(error = %err, "Skipping suggestion"),
            }
        }
    }

    debug!(
        related_lines = related.len(),
        suggestions = suggestions.len(),
        "Elimination suggestions computed"
    );
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::GroupingClassifier;
    use consolidator_shared::types::EntityId;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn entity(name: &str, lines: &[(&str, &str, Decimal, bool)]) -> EntityData {
        let mut classifier = GroupingClassifier::new();
        let mut tb = Vec::new();
        for (code, minor, cy, related) in lines {
            classifier.insert(
                *code,
                Classification {
                    grouping_name: format!("{code} name"),
                    minor_head_code: (*minor).to_string(),
                    minor_head_name: String::new(),
                    major_head_code: minor[..1].to_string(),
                    major_head_name: String::new(),
                },
            );
            tb.push(TrialBalanceLine {
                ledger: format!("{name} {code}"),
                grouping_code: Some((*code).to_string()),
                closing_cy: *cy,
                closing_py: dec!(10),
                is_mapped: true,
                is_related_party: *related,
            });
        }
        EntityData {
            entity: EntityRef::new(EntityId::new(), name),
            lines: tb,
            classifier,
        }
    }

    #[test]
    fn test_matching_pair_across_entities() {
        let parent = entity("Parent", &[("A.110.01", "A.110", dec!(5000), true)]);
        let sub = entity("Sub", &[("B.80.01", "B.80", dec!(-5000), true)]);

        let suggestions = suggest_eliminations(&[parent, sub], &ConsolidationConfig::default());

        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        assert_eq!(s.description, "Inter-company: Parent ↔ Sub");
        assert_eq!(s.elimination_type, EliminationType::ReceivablePayable);
        assert_eq!(s.debit_grouping_code, "A.110.01");
        assert_eq!(s.debit_grouping_name, "A.110.01 name");
        assert_eq!(s.credit_grouping_code, "B.80.01");
        assert_eq!(s.amount_cy, dec!(5000));
        assert_eq!(s.amount_py, dec!(10));
    }

    #[test]
    fn test_no_suggestion_within_one_entity() {
        let parent = entity(
            "Parent",
            &[
                ("A.110.01", "A.110", dec!(5000), true),
                ("B.80.01", "B.80", dec!(5000), true),
            ],
        );
        assert!(suggest_eliminations(&[parent], &ConsolidationConfig::default()).is_empty());
    }

    #[test]
    fn test_requires_related_party_equal_and_non_zero() {
        let config = ConsolidationConfig::default();

        let unrelated = [
            entity("Parent", &[("A.110.01", "A.110", dec!(5000), false)]),
            entity("Sub", &[("B.80.01", "B.80", dec!(5000), true)]),
        ];
        assert!(suggest_eliminations(&unrelated, &config).is_empty());

        let unequal = [
            entity("Parent", &[("A.110.01", "A.110", dec!(5000), true)]),
            entity("Sub", &[("B.80.01", "B.80", dec!(4999), true)]),
        ];
        assert!(suggest_eliminations(&unequal, &config).is_empty());

        let zero = [
            entity("Parent", &[("A.110.01", "A.110", dec!(0), true)]),
            entity("Sub", &[("B.80.01", "B.80", dec!(0), true)]),
        ];
        assert!(suggest_eliminations(&zero, &config).is_empty());
    }

    #[test]
    fn test_every_matching_payable_is_suggested() {
        let parent = entity("Parent", &[("A.120.01", "A.120", dec!(800), true)]);
        let first = entity("First", &[("B.70.01", "B.70", dec!(800), true)]);
        let second = entity("Second", &[("B.80.02", "B.80", dec!(800), true)]);

        let suggestions =
            suggest_eliminations(&[parent, first, second], &ConsolidationConfig::default());
        let credits: Vec<&str> = suggestions
            .iter()
            .map(|s| s.credit_grouping_code.as_str())
            .collect();

        assert_eq!(credits, vec!["B.70.01", "B.80.02"]);
    }
}
