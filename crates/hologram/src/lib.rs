//! Holograms: floating stacks of text lines shown to nearby observers.
//!
//! # Invariants
//! - Line `i` sits `i * line_gap` below the anchor, in the anchor's column.
//! - All mutation happens on one authoritative thread. Other threads submit
//!   [`HologramCommand`]s through a [`CommandSender`]; the [`HologramService`]
//!   drains them in submission order.
//! - Spawns target tracked observers; `move_to` and deletion despawn for the
//!   whole online population.

mod builder;
mod config;
mod error;
mod hologram;
mod inspector;
mod line;
mod queue;
mod registry;
mod service;
mod tracker;

pub use builder::HologramBuilder;
pub use config::{ConfigError, DEFAULT_LINE_GAP, DEFAULT_VIEW_RADIUS, HologramConfig};
pub use error::HologramError;
pub use hologram::Hologram;
pub use inspector::{HologramInfo, HologramInspector, RegistrySummary};
pub use line::TextLine;
pub use queue::{CommandSender, HologramCommand, QueueError};
pub use registry::HologramRegistry;
pub use service::HologramService;
pub use tracker::{ProximityTracker, TrackerStats};

pub fn crate_info() -> &'static str {
    "holospace-hologram v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("hologram"));
    }
}
