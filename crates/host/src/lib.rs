//! Host engine seam: world lookup, the connected population, and per-observer
//! entity visibility primitives.
//!
//! # Invariants
//! - Every call happens on the authoritative simulation thread.
//! - An observer that cannot be resolved is skipped, never an error.

mod capability;
mod simulated;

pub use capability::{
    EntityVisibility, Host, LineView, ObserverHandle, Population, WorldResolver,
};
pub use simulated::{HostEvent, SimulatedHost};

pub fn crate_info() -> &'static str {
    "holospace-host v0.1.0"
}
