use std::collections::BTreeMap;

use glam::DVec3;
use holospace_host::Host;

use crate::builder::generated_id;
use crate::error::HologramError;
use crate::hologram::Hologram;

/// Directory of live holograms, keyed by id.
///
/// Owned by whoever runs the authoritative thread (normally the
/// [`HologramService`](crate::HologramService)). BTreeMap keeps iteration in
/// id order.
#[derive(Debug, Default)]
pub struct HologramRegistry {
    holograms: BTreeMap<String, Hologram>,
}

impl HologramRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.holograms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holograms.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.holograms.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Hologram> {
        self.holograms.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Hologram> {
        self.holograms.get_mut(id)
    }

    /// Like [`get_mut`](Self::get_mut) but reports a missing id as an error.
    pub fn require_mut(&mut self, id: &str) -> Result<&mut Hologram, HologramError> {
        self.holograms
            .get_mut(id)
            .ok_or_else(|| HologramError::NotFound(id.to_owned()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hologram> {
        self.holograms.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Hologram> {
        self.holograms.values_mut()
    }

    pub fn ids(&self) -> Vec<String> {
        self.holograms.keys().cloned().collect()
    }

    /// Register a hologram. Ids are unique; a clash leaves the registry as is.
    pub fn insert(&mut self, hologram: Hologram) -> Result<(), HologramError> {
        if self.holograms.contains_key(hologram.id()) {
            return Err(HologramError::DuplicateId(hologram.id().to_owned()));
        }
        self.holograms.insert(hologram.id().to_owned(), hologram);
        Ok(())
    }

    /// Take a hologram out of the registry without touching the host.
    pub fn remove(&mut self, id: &str) -> Option<Hologram> {
        self.holograms.remove(id)
    }

    /// Delete a hologram: despawn its lines for everyone online and drop it.
    pub fn delete<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        id: &str,
    ) -> Result<(), HologramError> {
        let hologram = self
            .holograms
            .remove(id)
            .ok_or_else(|| HologramError::NotFound(id.to_owned()))?;
        hologram.despawn_everywhere(host);
        Ok(())
    }

    /// Copy `id` to a new hologram at the given location and register it.
    /// Without a `new_id` the copy gets a generated one.
    pub fn copy<H: Host + ?Sized>(
        &mut self,
        host: &H,
        id: &str,
        new_id: Option<&str>,
        world: &str,
        position: DVec3,
    ) -> Result<&Hologram, HologramError> {
        let new_id = new_id.map_or_else(generated_id, str::to_owned);
        if self.holograms.contains_key(&new_id) {
            return Err(HologramError::DuplicateId(new_id));
        }
        let source = self
            .holograms
            .get(id)
            .ok_or_else(|| HologramError::NotFound(id.to_owned()))?;
        let copy = source.copy(host, new_id.as_str(), world, position)?;
        tracing::debug!(from = id, to = %new_id, "hologram copied");
        Ok(self.holograms.entry(new_id).or_insert(copy))
    }

    /// Delete every hologram. Used at shutdown.
    pub fn clear<H: Host + ?Sized>(&mut self, host: &mut H) {
        for (_, hologram) in std::mem::take(&mut self.holograms) {
            hologram.despawn_everywhere(host);
        }
    }
}
