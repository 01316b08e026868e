//! Entity fetch error types.

use consolidator_shared::types::EntityId;
use thiserror::Error;

/// Errors returned by an entity data provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The provider has no data for this entity.
    #[error("No trial balance for entity {0}")]
    NotFound(EntityId),

    /// The fetch did not complete in time.
    #[error("Fetching entity {entity_id} timed out after {after_secs}s")]
    Timeout {
        /// Entity that was being fetched.
        entity_id: EntityId,
        /// Timeout that elapsed, in seconds.
        after_secs: u64,
    },

    /// The provider failed for another reason.
    #[error("Entity {entity_id} unavailable: {reason}")]
    Unavailable {
        /// Entity that was being fetched.
        entity_id: EntityId,
        /// Provider-supplied reason.
        reason: String,
    },
}

impl FetchError {
    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(entity_id: EntityId, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            entity_id,
            reason: reason.into(),
        }
    }
}
