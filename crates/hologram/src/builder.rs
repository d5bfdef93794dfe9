use glam::DVec3;
use holospace_common::Location;
use holospace_host::Host;
use uuid::Uuid;

use crate::config::HologramConfig;
use crate::error::HologramError;
use crate::hologram::Hologram;
use crate::registry::HologramRegistry;

/// Fresh `hologram-<uuid>` id for holograms created without one.
pub(crate) fn generated_id() -> String {
    format!("hologram-{}", Uuid::new_v4().simple())
}

/// Fluent constructor for a registered hologram.
///
/// ```ignore
/// let id = HologramBuilder::new()
///     .id("spawn")
///     .world("overworld")
///     .position(0.5, 80.0, 0.5)
///     .lines(["Welcome", "to the server"])
///     .build(&mut registry, &mut host, &config)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct HologramBuilder {
    id: Option<String>,
    world: Option<String>,
    position: DVec3,
    lines: Vec<String>,
}

impl HologramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier to register under. A random one is generated when unset.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn world(mut self, name: impl Into<String>) -> Self {
        self.world = Some(name.into());
        self
    }

    pub fn position(mut self, x: f64, y: f64, z: f64) -> Self {
        self.position = DVec3::new(x, y, z);
        self
    }

    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }

    pub fn lines<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(texts.into_iter().map(Into::into));
        self
    }

    /// Resolve the world, create the hologram with its lines and register it.
    /// Returns the id it was registered under.
    pub fn build<H: Host + ?Sized>(
        self,
        registry: &mut HologramRegistry,
        host: &mut H,
        config: &HologramConfig,
    ) -> Result<String, HologramError> {
        let world_name = self.world.ok_or(HologramError::MissingWorld)?;
        let world = host
            .find_world(&world_name)
            .ok_or(HologramError::UnknownWorld(world_name))?;
        let id = self.id.unwrap_or_else(generated_id);
        if registry.contains(&id) {
            return Err(HologramError::DuplicateId(id));
        }

        let mut hologram = Hologram::new(
            id.clone(),
            Location::new(world, self.position),
            config.line_gap,
        );
        hologram.add_lines(host, self.lines);
        registry.insert(hologram)?;
        tracing::debug!(hologram = %id, "hologram created");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holospace_common::WorldId;
    use holospace_host::SimulatedHost;

    #[test]
    fn builds_and_registers() {
        let mut host = SimulatedHost::with_worlds(["overworld"]);
        let mut registry = HologramRegistry::new();
        let id = HologramBuilder::new()
            .id("spawn")
            .world("overworld")
            .position(0.0, 10.0, 0.0)
            .line("A")
            .lines(["B", "C"])
            .build(&mut registry, &mut host, &HologramConfig::default())
            .unwrap();

        assert_eq!(id, "spawn");
        let h = registry.get("spawn").unwrap();
        assert_eq!(h.texts(), vec!["A", "B", "C"]);
        assert_eq!(h.location().world, WorldId::new("overworld"));
        assert_eq!(h.lines()[2].location().position.y, 9.5);
    }

    #[test]
    fn generates_distinct_ids() {
        let mut host = SimulatedHost::with_worlds(["overworld"]);
        let mut registry = HologramRegistry::new();
        let config = HologramConfig::default();
        let a = HologramBuilder::new()
            .world("overworld")
            .build(&mut registry, &mut host, &config)
            .unwrap();
        let b = HologramBuilder::new()
            .world("overworld")
            .build(&mut registry, &mut host, &config)
            .unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("hologram-"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn uses_configured_gap() {
        let mut host = SimulatedHost::with_worlds(["overworld"]);
        let mut registry = HologramRegistry::new();
        let config = HologramConfig {
            line_gap: 0.5,
            ..HologramConfig::default()
        };
        HologramBuilder::new()
            .id("wide")
            .world("overworld")
            .position(0.0, 3.0, 0.0)
            .lines(["a", "b"])
            .build(&mut registry, &mut host, &config)
            .unwrap();
        assert_eq!(registry.get("wide").unwrap().lines()[1].location().position.y, 2.5);
    }

    #[test]
    fn rejects_bad_input() {
        let mut host = SimulatedHost::with_worlds(["overworld"]);
        let mut registry = HologramRegistry::new();
        let config = HologramConfig::default();

        let err = HologramBuilder::new()
            .build(&mut registry, &mut host, &config)
            .unwrap_err();
        assert_eq!(err, HologramError::MissingWorld);

        let err = HologramBuilder::new()
            .world("the_end")
            .build(&mut registry, &mut host, &config)
            .unwrap_err();
        assert_eq!(err, HologramError::UnknownWorld("the_end".into()));

        HologramBuilder::new()
            .id("x")
            .world("overworld")
            .build(&mut registry, &mut host, &config)
            .unwrap();
        let err = HologramBuilder::new()
            .id("x")
            .world("overworld")
            .build(&mut registry, &mut host, &config)
            .unwrap_err();
        assert_eq!(err, HologramError::DuplicateId("x".into()));
        assert_eq!(registry.len(), 1);
    }
}
