//! Consolidation group lifecycle.
//!
//! Every mutation re-checks the affected invariant and refreshes
//! `updated_at`. The engine itself only reads groups.

use std::collections::HashSet;

use chrono::Utc;
use consolidator_shared::types::{EliminationId, EntityId, GroupId};
use rust_decimal::Decimal;

use super::error::{ConsolidationError, GroupDefect};
use super::types::{
    ConsolidationGroup, ConsolidationMethod, InterCompanyElimination, SubsidiaryConfig,
};
use crate::entity::EntityRef;

/// Partial update of a subsidiary's terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubsidiaryUpdate {
    /// New ownership percentage.
    pub ownership_percentage: Option<Decimal>,
    /// New consolidation method.
    pub consolidation_method: Option<ConsolidationMethod>,
    /// New display label.
    pub entity_name: Option<String>,
}

impl SubsidiaryConfig {
    /// Creates subsidiary terms, defaulting the method from ownership.
    ///
    /// # Errors
    ///
    /// Returns `GroupDefect::OwnershipOutOfRange` outside 0-100.
    pub fn new(entity: EntityRef, ownership_percentage: Decimal) -> Result<Self, GroupDefect> {
        check_ownership(entity.id, ownership_percentage)?;
        Ok(Self {
            entity_id: entity.id,
            entity_name: entity.name,
            ownership_percentage,
            is_fully_owned: ownership_percentage == Decimal::ONE_HUNDRED,
            consolidation_method: ConsolidationMethod::for_ownership(ownership_percentage),
        })
    }

    /// Sets ownership and re-derives `is_fully_owned`.
    ///
    /// # Errors
    ///
    /// Returns `GroupDefect::OwnershipOutOfRange` outside 0-100.
    pub fn set_ownership(&mut self, ownership_percentage: Decimal) -> Result<(), GroupDefect> {
        check_ownership(self.entity_id, ownership_percentage)?;
        self.ownership_percentage = ownership_percentage;
        self.is_fully_owned = ownership_percentage == Decimal::ONE_HUNDRED;
        Ok(())
    }
}

fn check_ownership(entity_id: EntityId, ownership: Decimal) -> Result<(), GroupDefect> {
    if ownership < Decimal::ZERO || ownership > Decimal::ONE_HUNDRED {
        return Err(GroupDefect::OwnershipOutOfRange {
            entity_id,
            ownership,
        });
    }
    Ok(())
}

impl ConsolidationGroup {
    /// Starts a group for a parent entity.
    #[must_use]
    pub fn new(parent: EntityRef) -> Self {
        let now = Utc::now();
        Self {
            id: GroupId::new(),
            name: format!("{} Consolidated", parent.name),
            parent_entity_id: parent.id,
            parent_entity_name: parent.name,
            subsidiaries: Vec::new(),
            eliminations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Looks up a subsidiary.
    #[must_use]
    pub fn subsidiary(&self, entity_id: EntityId) -> Option<&SubsidiaryConfig> {
        self.subsidiaries.iter().find(|s| s.entity_id == entity_id)
    }

    /// Looks up an elimination.
    #[must_use]
    pub fn elimination(&self, id: EliminationId) -> Option<&InterCompanyElimination> {
        self.eliminations.iter().find(|e| e.id == id)
    }

    /// Adds a subsidiary. Method is `full` at 50% or more, else `equity`.
    ///
    /// # Errors
    ///
    /// Rejects the parent itself, a subsidiary already in the group, and
    /// ownership outside 0-100.
    pub fn add_subsidiary(
        &mut self,
        entity: EntityRef,
        ownership_percentage: Decimal,
    ) -> Result<&SubsidiaryConfig, ConsolidationError> {
        if entity.id == self.parent_entity_id {
            return Err(GroupDefect::ParentAsSubsidiary(entity.id).into());
        }
        if self.subsidiary(entity.id).is_some() {
            return Err(GroupDefect::DuplicateSubsidiary(entity.id).into());
        }

        let config = SubsidiaryConfig::new(entity, ownership_percentage)?;
        self.subsidiaries.push(config);
        self.touch();

        let idx = self.subsidiaries.len() - 1;
        Ok(&self.subsidiaries[idx])
    }

    /// Re-configures a subsidiary.
    ///
    /// # Errors
    ///
    /// Returns `SubsidiaryNotFound` for an unknown entity, or
    /// `InvalidGroup` for ownership outside 0-100. Nothing changes on error.
    pub fn update_subsidiary(
        &mut self,
        entity_id: EntityId,
        update: SubsidiaryUpdate,
    ) -> Result<&SubsidiaryConfig, ConsolidationError> {
        let idx = self
            .subsidiaries
            .iter()
            .position(|s| s.entity_id == entity_id)
            .ok_or(ConsolidationError::SubsidiaryNotFound(entity_id))?;

        let mut config = self.subsidiaries[idx].clone();
        if let Some(ownership) = update.ownership_percentage {
            config.set_ownership(ownership)?;
        }
        if let Some(method) = update.consolidation_method {
            config.consolidation_method = method;
        }
        if let Some(name) = update.entity_name {
            config.entity_name = name;
        }

        self.subsidiaries[idx] = config;
        self.touch();
        Ok(&self.subsidiaries[idx])
    }

    /// Removes a subsidiary.
    ///
    /// # Errors
    ///
    /// Returns `SubsidiaryNotFound` for an unknown entity.
    pub fn remove_subsidiary(
        &mut self,
        entity_id: EntityId,
    ) -> Result<SubsidiaryConfig, ConsolidationError> {
        let idx = self
            .subsidiaries
            .iter()
            .position(|s| s.entity_id == entity_id)
            .ok_or(ConsolidationError::SubsidiaryNotFound(entity_id))?;

        let removed = self.subsidiaries.remove(idx);
        self.touch();
        Ok(removed)
    }

    /// Adds an elimination entry.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEliminationEntry` when the entry breaks an entry
    /// rule, or `InvalidGroup` when its ID is already used.
    pub fn add_elimination(
        &mut self,
        elimination: InterCompanyElimination,
    ) -> Result<(), ConsolidationError> {
        check_entry(&elimination)?;
        if self.elimination(elimination.id).is_some() {
            return Err(GroupDefect::DuplicateElimination(elimination.id).into());
        }

        self.eliminations.push(elimination);
        self.touch();
        Ok(())
    }

    /// Replaces an elimination entry wholesale, keeping its ID and position.
    ///
    /// # Errors
    ///
    /// Returns `EliminationNotFound` for an unknown ID, or
    /// `InvalidEliminationEntry` when the replacement breaks an entry rule.
    pub fn replace_elimination(
        &mut self,
        id: EliminationId,
        mut replacement: InterCompanyElimination,
    ) -> Result<(), ConsolidationError> {
        let idx = self
            .eliminations
            .iter()
            .position(|e| e.id == id)
            .ok_or(ConsolidationError::EliminationNotFound(id))?;
        check_entry(&replacement)?;

        replacement.id = id;
        self.eliminations[idx] = replacement;
        self.touch();
        Ok(())
    }

    /// Removes an elimination entry.
    ///
    /// # Errors
    ///
    /// Returns `EliminationNotFound` for an unknown ID.
    pub fn remove_elimination(
        &mut self,
        id: EliminationId,
    ) -> Result<InterCompanyElimination, ConsolidationError> {
        let idx = self
            .eliminations
            .iter()
            .position(|e| e.id == id)
            .ok_or(ConsolidationError::EliminationNotFound(id))?;

        let removed = self.eliminations.remove(idx);
        self.touch();
        Ok(removed)
    }

    /// Renames the group.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    /// Re-checks every group invariant.
    ///
    /// Run on groups read back from storage or deserialized from input.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGroup` naming the first broken invariant.
    pub fn validate(&self) -> Result<(), ConsolidationError> {
        let mut seen = HashSet::with_capacity(self.subsidiaries.len());
        for sub in &self.subsidiaries {
            if sub.entity_id == self.parent_entity_id {
                return Err(GroupDefect::ParentAsSubsidiary(sub.entity_id).into());
            }
            if !seen.insert(sub.entity_id) {
                return Err(GroupDefect::DuplicateSubsidiary(sub.entity_id).into());
            }
            check_ownership(sub.entity_id, sub.ownership_percentage)?;
            if sub.is_fully_owned != (sub.ownership_percentage == Decimal::ONE_HUNDRED) {
                return Err(GroupDefect::FullyOwnedFlagMismatch(sub.entity_id).into());
            }
        }

        let mut ids = HashSet::with_capacity(self.eliminations.len());
        for entry in &self.eliminations {
            if !ids.insert(entry.id) {
                return Err(GroupDefect::DuplicateElimination(entry.id).into());
            }
            entry
                .check()
                .map_err(|defect| GroupDefect::InvalidElimination {
                    id: entry.id,
                    defect,
                })?;
        }

        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }
}

fn check_entry(entry: &InterCompanyElimination) -> Result<(), ConsolidationError> {
    entry
        .check()
        .map_err(|defect| ConsolidationError::InvalidEliminationEntry {
            description: entry.description.clone(),
            defect,
        })
}
