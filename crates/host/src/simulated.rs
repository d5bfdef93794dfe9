use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use glam::DVec3;
use holospace_common::{EntityId, Location, ObserverId, WorldId};
use serde::{Deserialize, Serialize};

use crate::capability::{EntityVisibility, LineView, ObserverHandle, Population, WorldResolver};

/// A visibility primitive issued against the simulated host.
///
/// The log is what a real host would have put on the wire, so replaying it
/// reconstructs exactly what each observer is being shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostEvent {
    Spawned {
        observer: ObserverId,
        entity: EntityId,
        text: String,
        location: Location,
    },
    Despawned {
        observer: ObserverId,
        entity: EntityId,
    },
    PositionPushed {
        observer: ObserverId,
        entity: EntityId,
        location: Location,
    },
}

impl HostEvent {
    pub fn observer(&self) -> ObserverId {
        match self {
            Self::Spawned { observer, .. }
            | Self::Despawned { observer, .. }
            | Self::PositionPushed { observer, .. } => *observer,
        }
    }

    pub fn entity(&self) -> EntityId {
        match self {
            Self::Spawned { entity, .. }
            | Self::Despawned { entity, .. }
            | Self::PositionPushed { entity, .. } => *entity,
        }
    }
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawned {
                observer,
                entity,
                text,
                location,
            } => write!(f, "spawn   {entity} -> {observer} at {location} {text:?}"),
            Self::Despawned { observer, entity } => {
                write!(f, "despawn {entity} -> {observer}")
            }
            Self::PositionPushed {
                observer,
                entity,
                location,
            } => write!(f, "move    {entity} -> {observer} to {location}"),
        }
    }
}

/// In-memory host: a set of named worlds, a connected population, and an
/// append-only log of every visibility primitive it was asked to send.
///
/// Uses BTree collections so population enumeration is deterministic.
#[derive(Debug, Clone, Default)]
pub struct SimulatedHost {
    worlds: BTreeSet<String>,
    observers: BTreeMap<ObserverId, ObserverHandle>,
    event_log: Vec<HostEvent>,
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host that already knows the given worlds.
    pub fn with_worlds<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            worlds: names.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn add_world(&mut self, name: impl Into<String>) {
        self.worlds.insert(name.into());
    }

    /// Connect a new observer standing at `position` in `world`.
    pub fn connect(&mut self, world: &str, position: DVec3) -> ObserverId {
        let id = ObserverId::new();
        self.connect_with_id(id, world, position);
        id
    }

    /// Connect an observer with a known id (reconnects replace the old session).
    pub fn connect_with_id(&mut self, id: ObserverId, world: &str, position: DVec3) {
        tracing::debug!(observer = %id, world, "observer connected");
        self.observers.insert(
            id,
            ObserverHandle {
                id,
                world: WorldId::new(world),
                position,
            },
        );
    }

    /// Disconnect an observer. Returns their last handle if they were online.
    pub fn disconnect(&mut self, id: ObserverId) -> Option<ObserverHandle> {
        let handle = self.observers.remove(&id);
        if handle.is_some() {
            tracing::debug!(observer = %id, "observer disconnected");
        }
        handle
    }

    /// Relocate an online observer. Returns false if they are not online.
    pub fn move_observer(&mut self, id: ObserverId, world: &str, position: DVec3) -> bool {
        if let Some(handle) = self.observers.get_mut(&id) {
            handle.world = WorldId::new(world);
            handle.position = position;
            true
        } else {
            false
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[HostEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Replay the log and return every entity `observer` is currently shown,
    /// with the last location pushed for it.
    pub fn visible_to(&self, observer: ObserverId) -> BTreeMap<EntityId, Location> {
        let mut shown = BTreeMap::new();
        for event in self.event_log.iter().filter(|e| e.observer() == observer) {
            match event {
                HostEvent::Spawned {
                    entity, location, ..
                } => {
                    shown.insert(*entity, location.clone());
                }
                HostEvent::Despawned { entity, .. } => {
                    shown.remove(entity);
                }
                HostEvent::PositionPushed {
                    entity, location, ..
                } => {
                    if let Some(current) = shown.get_mut(entity) {
                        *current = location.clone();
                    }
                }
            }
        }
        shown
    }
}

impl WorldResolver for SimulatedHost {
    fn find_world(&self, name: &str) -> Option<WorldId> {
        self.worlds.get(name).map(|w| WorldId::new(w.as_str()))
    }
}

impl Population for SimulatedHost {
    fn online_observers(&self) -> Vec<ObserverId> {
        self.observers.keys().copied().collect()
    }

    fn observer(&self, id: ObserverId) -> Option<ObserverHandle> {
        self.observers.get(&id).cloned()
    }
}

impl EntityVisibility for SimulatedHost {
    fn spawn_line(&mut self, observer: ObserverId, line: LineView<'_>) {
        self.event_log.push(HostEvent::Spawned {
            observer,
            entity: line.entity,
            text: line.text.to_owned(),
            location: line.location.clone(),
        });
    }

    fn despawn_line(&mut self, observer: ObserverId, entity: EntityId) {
        self.event_log
            .push(HostEvent::Despawned { observer, entity });
    }

    fn push_position(&mut self, observer: ObserverId, entity: EntityId, location: &Location) {
        self.event_log.push(HostEvent::PositionPushed {
            observer,
            entity,
            location: location.clone(),
        });
    }
}
