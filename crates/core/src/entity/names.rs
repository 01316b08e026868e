//! Entity display-name cache using Moka.
//!
//! Groups store only a cached label per subsidiary, which goes stale when
//! an entity is renamed. Names seen in fetched data refresh this cache,
//! and labels for entities whose data could not be fetched are resolved
//! from it before falling back to the group's stored label.

use std::sync::Arc;
use std::time::Duration;

use consolidator_shared::types::EntityId;
use moka::sync::Cache;

use super::types::EntityRef;

/// Default cache capacity (number of entries).
const DEFAULT_CACHE_CAPACITY: u64 = 1_000;

/// Default time-to-live for cache entries (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// Read-through cache of entity display names keyed by entity ID.
#[derive(Clone)]
pub struct EntityNameCache {
    cache: Cache<EntityId, Arc<str>>,
}

impl EntityNameCache {
    /// Creates a cache with default settings.
    ///
    /// Default: 1000 entries max, 5 minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a cache with custom capacity and time-to-live.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Records the current name of a fetched entity.
    pub fn remember(&self, entity: &EntityRef) {
        self.cache.insert(entity.id, Arc::from(entity.name.as_str()));
    }

    /// Resolves a label for an entity, using `fallback` on a cache miss.
    #[must_use]
    pub fn label(&self, entity_id: EntityId, fallback: &str) -> String {
        self.cache
            .get(&entity_id)
            .map_or_else(|| fallback.to_string(), |name| name.to_string())
    }

    /// Drops a cached name.
    pub fn forget(&self, entity_id: EntityId) {
        self.cache.invalidate(&entity_id);
    }
}

impl Default for EntityNameCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EntityNameCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityNameCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}
