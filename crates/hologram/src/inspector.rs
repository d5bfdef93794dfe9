use holospace_common::Location;

use crate::registry::HologramRegistry;

/// Read-only queries over the registry for debugging and tooling.
pub struct HologramInspector;

impl HologramInspector {
    /// Produce a summary of the registry.
    pub fn summary(registry: &HologramRegistry) -> RegistrySummary {
        RegistrySummary {
            holograms: registry.len(),
            lines: registry.iter().map(|h| h.line_count()).sum(),
            tracked_observers: registry.iter().map(|h| h.observers().len()).sum(),
        }
    }

    /// Describe a single hologram.
    pub fn inspect(registry: &HologramRegistry, id: &str) -> Option<HologramInfo> {
        registry.get(id).map(|h| HologramInfo {
            id: h.id().to_owned(),
            anchor: h.location().clone(),
            lines: h
                .lines()
                .iter()
                .map(|l| (l.location().position.y, l.text().to_owned()))
                .collect(),
            tracked_observers: h.observers().len(),
        })
    }

    /// List every hologram id, in id order.
    pub fn list(registry: &HologramRegistry) -> Vec<String> {
        registry.ids()
    }
}

/// Registry-wide counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySummary {
    pub holograms: usize,
    pub lines: usize,
    pub tracked_observers: usize,
}

impl std::fmt::Display for RegistrySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Holograms: count={} lines={} tracked_observers={}",
            self.holograms, self.lines, self.tracked_observers
        )
    }
}

/// Detailed view of one hologram: anchor plus `(y, text)` per line.
#[derive(Debug, Clone)]
pub struct HologramInfo {
    pub id: String,
    pub anchor: Location,
    pub lines: Vec<(f64, String)>,
    pub tracked_observers: usize,
}

impl std::fmt::Display for HologramInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Hologram [{}] at {} observers={}",
            self.id, self.anchor, self.tracked_observers
        )?;
        for (i, (y, text)) in self.lines.iter().enumerate() {
            writeln!(f, "  {i:>2} y={y:.2} {text}")?;
        }
        Ok(())
    }
}
