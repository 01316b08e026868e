//! Entity data provider boundary.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use consolidator_shared::types::EntityId;

use super::error::FetchError;
use super::types::EntityData;

/// Supplies an entity's mapped trial balance and classifier table.
///
/// One call per entity in a group. Implementations may be backed by a
/// database, a remote service or files; the engine only relies on this
/// contract.
#[async_trait]
pub trait EntityDataProvider: Send + Sync {
    /// Fetches the current data for one entity.
    async fn fetch(&self, entity_id: EntityId) -> Result<EntityData, FetchError>;
}

#[async_trait]
impl<P: EntityDataProvider + ?Sized> EntityDataProvider for Arc<P> {
    async fn fetch(&self, entity_id: EntityId) -> Result<EntityData, FetchError> {
        (**self).fetch(entity_id).await
    }
}

/// Fetches one entity, turning an elapsed timeout into `FetchError::Timeout`.
///
/// A timeout means the entity is unavailable. It is never read as a zero
/// contribution. Data labelled with another entity's ID is rejected as
/// unavailable.
pub async fn fetch_with_timeout<P: EntityDataProvider + ?Sized>(
    provider: &P,
    entity_id: EntityId,
    timeout: Duration,
) -> Result<EntityData, FetchError> {
    let data = match tokio::time::timeout(timeout, provider.fetch(entity_id)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(FetchError::Timeout {
                entity_id,
                after_secs: timeout.as_secs(),
            });
        }
    };

    if data.entity.id != entity_id {
        return Err(FetchError::unavailable(
            entity_id,
            format!("provider returned data for entity {}", data.entity.id),
        ));
    }
    Ok(data)
}

/// Provider over a fixed set of entity snapshots.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntityProvider {
    entities: HashMap<EntityId, EntityData>,
}

impl InMemoryEntityProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity snapshot, keyed by its entity ID.
    pub fn insert(&mut self, data: EntityData) {
        self.entities.insert(data.entity.id, data);
    }

    /// Builder-style `insert`.
    #[must_use]
    pub fn with(mut self, data: EntityData) -> Self {
        self.insert(data);
        self
    }
}

#[async_trait]
impl EntityDataProvider for InMemoryEntityProvider {
    async fn fetch(&self, entity_id: EntityId) -> Result<EntityData, FetchError> {
        self.entities
            .get(&entity_id)
            .cloned()
            .ok_or(FetchError::NotFound(entity_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::GroupingClassifier;
    use crate::entity::types::EntityRef;

    struct SlowProvider;

    #[async_trait]
    impl EntityDataProvider for SlowProvider {
        async fn fetch(&self, entity_id: EntityId) -> Result<EntityData, FetchError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(FetchError::NotFound(entity_id))
        }
    }

    fn snapshot(id: EntityId) -> EntityData {
        EntityData {
            entity: EntityRef::new(id, "Parent Ltd"),
            lines: vec![],
            classifier: GroupingClassifier::new(),
        }
    }

    #[tokio::test]
    async fn test_in_memory_fetch() {
        let id = EntityId::new();
        let provider = InMemoryEntityProvider::new().with(snapshot(id));

        let data = provider.fetch(id).await.unwrap();
        assert_eq!(data.entity.name, "Parent Ltd");

        let missing = EntityId::new();
        assert_eq!(
            provider.fetch(missing).await.unwrap_err(),
            FetchError::NotFound(missing)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_reported_as_error() {
        let id = EntityId::new();
        let result = fetch_with_timeout(&SlowProvider, id, Duration::from_secs(2)).await;

        assert_eq!(
            result.unwrap_err(),
            FetchError::Timeout {
                entity_id: id,
                after_secs: 2,
            }
        );
    }

    struct MislabelledProvider {
        returned: EntityId,
    }

    #[async_trait]
    impl EntityDataProvider for MislabelledProvider {
        async fn fetch(&self, _entity_id: EntityId) -> Result<EntityData, FetchError> {
            Ok(snapshot(self.returned))
        }
    }

    #[tokio::test]
    async fn test_mislabelled_data_is_unavailable() {
        let requested = EntityId::new();
        let other = EntityId::new();
        let provider = MislabelledProvider { returned: other };

        let err = fetch_with_timeout(&provider, requested, Duration::from_secs(1))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            FetchError::unavailable(requested, format!("provider returned data for entity {other}"))
        );
    }

    #[tokio::test]
    async fn test_arc_provider_delegates() {
        let id = EntityId::new();
        let provider: Arc<dyn EntityDataProvider> =
            Arc::new(InMemoryEntityProvider::new().with(snapshot(id)));

        assert!(fetch_with_timeout(&provider, id, Duration::from_secs(1)).await.is_ok());
    }
}
