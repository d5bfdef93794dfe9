//! Shared types for holospace: entity, observer and world identifiers plus locations.

mod types;

pub use types::{EntityId, Location, ObserverId, WorldId};
