use holospace_common::ObserverId;
use holospace_host::{Host, ObserverHandle};

use crate::config::HologramConfig;
use crate::hologram::Hologram;
use crate::registry::HologramRegistry;

/// Outcome of one proximity pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerStats {
    pub holograms_scanned: usize,
    /// Observers that came into range and were shown a hologram.
    pub observers_shown: usize,
    /// Online observers that left range (or world) and had a hologram hidden.
    pub observers_hidden: usize,
    /// Tracked observers that went offline and were dropped silently.
    pub observers_purged: usize,
}

/// Keeps each hologram's observer set in line with who is actually nearby.
pub struct ProximityTracker {
    view_radius: u32,
    stats: TrackerStats,
}

impl ProximityTracker {
    pub fn new(view_radius: u32) -> Self {
        Self {
            view_radius,
            stats: TrackerStats::default(),
        }
    }

    pub fn from_config(config: &HologramConfig) -> Self {
        Self::new(config.view_radius)
    }

    pub fn view_radius(&self) -> u32 {
        self.view_radius
    }

    /// Statistics from the last pass.
    pub fn stats(&self) -> &TrackerStats {
        &self.stats
    }

    /// Evaluate every hologram against the online population.
    ///
    /// Observers in the hologram's world and within the view radius are shown
    /// it; tracked observers that no longer qualify are hidden, or forgotten
    /// without a despawn if they are offline.
    pub fn update<H: Host + ?Sized>(
        &mut self,
        registry: &mut HologramRegistry,
        host: &mut H,
    ) -> TrackerStats {
        let _span = tracing::info_span!("proximity_update").entered();

        let online: Vec<ObserverHandle> = host
            .online_observers()
            .into_iter()
            .filter_map(|id| host.observer(id))
            .collect();
        let mut stats = TrackerStats::default();

        for hologram in registry.iter_mut() {
            stats.holograms_scanned += 1;

            let tracked: Vec<ObserverId> = hologram.observers().iter().copied().collect();
            for id in tracked {
                match online.iter().find(|h| h.id == id) {
                    None => {
                        hologram.forget(id);
                        stats.observers_purged += 1;
                    }
                    Some(handle) if !self.sees(hologram, handle) => {
                        hologram.hide_from(host, id);
                        tracing::debug!(hologram = hologram.id(), observer = %id, "hologram hidden");
                        stats.observers_hidden += 1;
                    }
                    Some(_) => {}
                }
            }

            for handle in &online {
                if !hologram.is_tracking(handle.id) && self.sees(hologram, handle) {
                    hologram.show_to(host, handle.id);
                    tracing::debug!(hologram = hologram.id(), observer = %handle.id, "hologram shown");
                    stats.observers_shown += 1;
                }
            }
        }

        tracing::trace!(
            scanned = stats.holograms_scanned,
            shown = stats.observers_shown,
            hidden = stats.observers_hidden,
            purged = stats.observers_purged,
            "proximity update complete"
        );
        self.stats = stats.clone();
        stats
    }

    fn sees(&self, hologram: &Hologram, observer: &ObserverHandle) -> bool {
        observer.world == hologram.location().world
            && hologram.in_radius(observer, self.view_radius)
    }
}

impl Default for ProximityTracker {
    fn default() -> Self {
        Self::from_config(&HologramConfig::default())
    }
}
