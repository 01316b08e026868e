//! Tenant-scoped storage for consolidation groups.

use async_trait::async_trait;
use consolidator_shared::types::{GroupId, TenantId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::error::ConsolidationError;
use super::types::ConsolidationGroup;

/// Keyed store for consolidation groups.
///
/// Every operation is scoped to a tenant. A group owned by another tenant
/// behaves exactly like a missing one.
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Stores a new group.
    ///
    /// # Errors
    ///
    /// Returns `GroupAlreadyExists` when the ID is taken, or `InvalidGroup`
    /// when the group breaks an invariant.
    async fn create(
        &self,
        tenant: TenantId,
        group: ConsolidationGroup,
    ) -> Result<(), ConsolidationError>;

    /// Loads a group.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` when the tenant has no such group.
    async fn get(
        &self,
        tenant: TenantId,
        id: GroupId,
    ) -> Result<ConsolidationGroup, ConsolidationError>;

    /// Lists the tenant's groups, oldest first.
    async fn list(&self, tenant: TenantId) -> Vec<ConsolidationGroup>;

    /// Replaces a stored group.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` when the tenant has no such group, or
    /// `InvalidGroup` when the group breaks an invariant.
    async fn update(
        &self,
        tenant: TenantId,
        group: ConsolidationGroup,
    ) -> Result<(), ConsolidationError>;

    /// Deletes a group and returns it.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` when the tenant has no such group.
    async fn delete(
        &self,
        tenant: TenantId,
        id: GroupId,
    ) -> Result<ConsolidationGroup, ConsolidationError>;
}

/// In-process [`GroupStore`] on a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryGroupStore {
    groups: DashMap<GroupId, (TenantId, ConsolidationGroup)>,
}

impl InMemoryGroupStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupStore for InMemoryGroupStore {
    async fn create(
        &self,
        tenant: TenantId,
        group: ConsolidationGroup,
    ) -> Result<(), ConsolidationError> {
        group.validate()?;
        match self.groups.entry(group.id) {
            Entry::Occupied(_) => Err(ConsolidationError::GroupAlreadyExists(group.id)),
            Entry::Vacant(slot) => {
                slot.insert((tenant, group));
                Ok(())
            }
        }
    }

    async fn get(
        &self,
        tenant: TenantId,
        id: GroupId,
    ) -> Result<ConsolidationGroup, ConsolidationError> {
        self.groups
            .get(&id)
            .filter(|stored| stored.0 == tenant)
            .map(|stored| stored.1.clone())
            .ok_or(ConsolidationError::GroupNotFound(id))
    }

    async fn list(&self, tenant: TenantId) -> Vec<ConsolidationGroup> {
        let mut groups: Vec<ConsolidationGroup> = self
            .groups
            .iter()
            .filter(|stored| stored.0 == tenant)
            .map(|stored| stored.1.clone())
            .collect();
        groups.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        groups
    }

    async fn update(
        &self,
        tenant: TenantId,
        group: ConsolidationGroup,
    ) -> Result<(), ConsolidationError> {
        group.validate()?;
        match self.groups.get_mut(&group.id) {
            Some(mut stored) if stored.0 == tenant => {
                stored.1 = group;
                Ok(())
            }
            _ => Err(ConsolidationError::GroupNotFound(group.id)),
        }
    }

    async fn delete(
        &self,
        tenant: TenantId,
        id: GroupId,
    ) -> Result<ConsolidationGroup, ConsolidationError> {
        self.groups
            .remove_if(&id, |_, stored| stored.0 == tenant)
            .map(|(_, (_, group))| group)
            .ok_or(ConsolidationError::GroupNotFound(id))
    }
}
