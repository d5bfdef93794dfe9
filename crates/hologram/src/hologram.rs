use std::collections::BTreeSet;

use glam::DVec3;
use holospace_common::{Location, ObserverId};
use holospace_host::{Host, ObserverHandle, Population};

use crate::error::HologramError;
use crate::line::TextLine;

/// A named stack of text lines anchored at a location.
///
/// The hologram owns its lines and the set of observers it believes are
/// currently shown those lines. Every method that touches host visibility
/// takes the host explicitly; the caller is the authoritative thread.
#[derive(Debug)]
pub struct Hologram {
    id: String,
    location: Location,
    line_gap: f64,
    lines: Vec<TextLine>,
    observers: BTreeSet<ObserverId>,
}

impl Hologram {
    /// Create an empty hologram. Nothing is spawned until lines are added and
    /// observers are tracked.
    pub fn new(id: impl Into<String>, location: Location, line_gap: f64) -> Self {
        Self {
            id: id.into(),
            location,
            line_gap,
            lines: Vec::new(),
            observers: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Anchor location; line 0 sits here.
    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn line_gap(&self) -> f64 {
        self.line_gap
    }

    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Line texts in stack order.
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(TextLine::text).collect()
    }

    /// Observers currently believed to see this hologram.
    pub fn observers(&self) -> &BTreeSet<ObserverId> {
        &self.observers
    }

    pub fn is_tracking(&self, observer: ObserverId) -> bool {
        self.observers.contains(&observer)
    }

    /// Canonical location of the line at `index`.
    pub fn line_location(&self, index: usize) -> Location {
        self.location.below(self.line_gap * index as f64)
    }

    /// Append a line below the current bottom line and show it to every
    /// tracked observer that is online.
    pub fn add_line<H: Host + ?Sized>(&mut self, host: &mut H, text: impl Into<String>) {
        let line = TextLine::new(self.line_location(self.lines.len()), text);
        for observer in self.online_observers(host) {
            host.spawn_line(observer, line.view());
        }
        tracing::debug!(
            hologram = %self.id,
            index = self.lines.len(),
            text = line.text(),
            "line added"
        );
        self.lines.push(line);
    }

    pub fn add_lines<H, I, S>(&mut self, host: &mut H, texts: I)
    where
        H: Host + ?Sized,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for text in texts {
            self.add_line(host, text);
        }
    }

    /// Replace the text of line `index`. Out-of-range indexes are ignored.
    ///
    /// Tracked observers get the line re-sent so the new text shows up.
    pub fn set_line<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        index: usize,
        text: impl Into<String>,
    ) {
        if index >= self.lines.len() {
            return;
        }
        let watchers = self.online_observers(host);
        let line = &mut self.lines[index];
        line.set_text(text.into());
        for observer in watchers {
            host.despawn_line(observer, line.entity());
            host.spawn_line(observer, line.view());
        }
        tracing::debug!(hologram = %self.id, index, "line text updated");
    }

    /// Remove line `index` and close the gap it leaves.
    pub fn remove_line<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        index: usize,
    ) -> Result<(), HologramError> {
        self.remove_lines(host, &[index])
    }

    /// Remove several lines at once.
    ///
    /// Indexes refer to the stack as it is before the call and duplicates
    /// collapse. Every index is checked first, so an out-of-range index
    /// leaves the hologram untouched. Lines below the first removed one move
    /// up to their new index's canonical offset.
    pub fn remove_lines<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        indexes: &[usize],
    ) -> Result<(), HologramError> {
        let len = self.lines.len();
        if let Some(&index) = indexes.iter().find(|&&i| i >= len) {
            return Err(HologramError::IndexOutOfBounds { index, len });
        }
        let doomed: BTreeSet<usize> = indexes.iter().copied().collect();
        let Some(&first) = doomed.first() else {
            return Ok(());
        };

        let watchers = self.online_observers(host);
        let mut kept = Vec::with_capacity(len - doomed.len());
        for (i, line) in std::mem::take(&mut self.lines).into_iter().enumerate() {
            if doomed.contains(&i) {
                for observer in &watchers {
                    host.despawn_line(*observer, line.entity());
                }
            } else {
                kept.push(line);
            }
        }
        self.lines = kept;

        for index in first..self.lines.len() {
            let location = self.line_location(index);
            let line = &mut self.lines[index];
            line.set_location(location);
            for observer in &watchers {
                host.push_position(*observer, line.entity(), line.location());
            }
        }

        tracing::debug!(
            hologram = %self.id,
            removed = doomed.len(),
            remaining = self.lines.len(),
            "lines removed"
        );
        Ok(())
    }

    /// Relocate the hologram without rebuilding its lines.
    ///
    /// Every line is despawned for the whole online population, the stack is
    /// re-anchored, and the tracked set is cleared. Nothing is re-spawned:
    /// the next proximity pass shows it again. Unknown worlds are ignored.
    pub fn move_to<H: Host + ?Sized>(&mut self, host: &mut H, world: &str, position: DVec3) {
        let Some(world) = host.find_world(world) else {
            return;
        };

        let everyone = host.online_observers();
        for line in &self.lines {
            for observer in &everyone {
                host.despawn_line(*observer, line.entity());
            }
        }

        self.location = Location::new(world, position);
        self.restack();
        self.observers.clear();
        tracing::debug!(hologram = %self.id, to = %self.location, "hologram moved");
    }

    /// Relocate the hologram and push the new line positions to every tracked
    /// observer, one batch per line. Unknown worlds are ignored.
    pub fn teleport<H: Host + ?Sized>(&mut self, host: &mut H, world: &str, position: DVec3) {
        let Some(world) = host.find_world(world) else {
            return;
        };

        self.location = Location::new(world, position);
        self.restack();

        let watchers = self.online_observers(host);
        for line in &self.lines {
            for observer in &watchers {
                host.push_position(*observer, line.entity(), line.location());
            }
        }
        tracing::debug!(
            hologram = %self.id,
            to = %self.location,
            observers = watchers.len(),
            "hologram teleported"
        );
    }

    /// Build an independent hologram with the same line texts at another
    /// location. The copy starts with no tracked observers and fresh line
    /// entities.
    pub fn copy<H: Host + ?Sized>(
        &self,
        host: &H,
        new_id: impl Into<String>,
        world: &str,
        position: DVec3,
    ) -> Result<Hologram, HologramError> {
        let world = host
            .find_world(world)
            .ok_or_else(|| HologramError::UnknownWorld(world.to_owned()))?;
        let mut copy = Hologram::new(new_id, Location::new(world, position), self.line_gap);
        for line in &self.lines {
            let location = copy.line_location(copy.lines.len());
            copy.lines.push(TextLine::new(location, line.text()));
        }
        Ok(copy)
    }

    /// Despawn every line for the whole online population and drop the
    /// hologram. Consuming `self` makes any later use a compile error.
    pub(crate) fn despawn_everywhere<H: Host + ?Sized>(self, host: &mut H) {
        let everyone = host.online_observers();
        for line in &self.lines {
            for observer in &everyone {
                host.despawn_line(*observer, line.entity());
            }
        }
        tracing::debug!(hologram = %self.id, lines = self.lines.len(), "hologram deleted");
    }

    /// Start tracking `observer` and spawn every line for them.
    /// Returns false if they were already tracked.
    pub fn show_to<H: Host + ?Sized>(&mut self, host: &mut H, observer: ObserverId) -> bool {
        if !self.observers.insert(observer) {
            return false;
        }
        for line in &self.lines {
            host.spawn_line(observer, line.view());
        }
        true
    }

    /// Stop tracking `observer` and despawn every line for them.
    /// Returns false if they were not tracked.
    pub fn hide_from<H: Host + ?Sized>(&mut self, host: &mut H, observer: ObserverId) -> bool {
        if !self.observers.remove(&observer) {
            return false;
        }
        for line in &self.lines {
            host.despawn_line(observer, line.entity());
        }
        true
    }

    /// Drop `observer` from the tracked set without sending anything, for
    /// observers that are no longer online.
    pub fn forget(&mut self, observer: ObserverId) -> bool {
        self.observers.remove(&observer)
    }

    /// Euclidean distance between the anchor and the observer.
    pub fn distance(&self, observer: &ObserverHandle) -> f64 {
        self.location.position.distance(observer.position)
    }

    /// Whether the observer is within `radius` of the anchor. Compares squared
    /// distances.
    pub fn in_radius(&self, observer: &ObserverHandle, radius: u32) -> bool {
        let radius = f64::from(radius);
        self.location.position.distance_squared(observer.position) <= radius * radius
    }

    fn restack(&mut self) {
        for index in 0..self.lines.len() {
            let location = self.line_location(index);
            self.lines[index].set_location(location);
        }
    }

    /// Tracked observers that still resolve to a live handle.
    fn online_observers<H: Population + ?Sized>(&self, host: &H) -> Vec<ObserverId> {
        self.observers
            .iter()
            .copied()
            .filter(|id| host.observer(*id).is_some())
            .collect()
    }
}
