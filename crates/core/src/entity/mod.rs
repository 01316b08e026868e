//! Contributing entities and the boundary that supplies their data.
//!
//! The engine never owns trial balances. It asks an [`EntityDataProvider`]
//! for each entity in a group and works on the returned snapshot.

pub mod error;
pub mod names;
pub mod position;
pub mod provider;
pub mod types;

pub use error::FetchError;
pub use names::EntityNameCache;
pub use position::EntityPosition;
pub use provider::{EntityDataProvider, InMemoryEntityProvider, fetch_with_timeout};
pub use types::{EntityData, EntityRef, TrialBalanceLine};
