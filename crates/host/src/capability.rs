use glam::DVec3;
use holospace_common::{EntityId, Location, ObserverId, WorldId};

/// Live view of a connected observer.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverHandle {
    pub id: ObserverId,
    pub world: WorldId,
    pub position: DVec3,
}

/// What the host needs to show one hologram line to an observer.
#[derive(Debug, Clone, Copy)]
pub struct LineView<'a> {
    pub entity: EntityId,
    pub text: &'a str,
    pub location: &'a Location,
}

/// Resolves world names to world handles.
pub trait WorldResolver {
    fn find_world(&self, name: &str) -> Option<WorldId>;
}

/// The connected population.
pub trait Population {
    /// Every observer currently online.
    fn online_observers(&self) -> Vec<ObserverId>;

    /// Live handle for an observer, or `None` when they are not online.
    fn observer(&self, id: ObserverId) -> Option<ObserverHandle>;
}

/// Per-observer entity visibility primitives (spawn/despawn/teleport packets).
pub trait EntityVisibility {
    fn spawn_line(&mut self, observer: ObserverId, line: LineView<'_>);

    fn despawn_line(&mut self, observer: ObserverId, entity: EntityId);

    fn push_position(&mut self, observer: ObserverId, entity: EntityId, location: &Location);
}

/// Everything a hologram consumes from the host engine.
pub trait Host: WorldResolver + Population + EntityVisibility {}

impl<T: WorldResolver + Population + EntityVisibility + ?Sized> Host for T {}
