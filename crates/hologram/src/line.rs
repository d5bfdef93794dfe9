use holospace_common::{EntityId, Location};
use holospace_host::LineView;

/// One line of a hologram: a text label backed by a host entity.
///
/// The entity id stays fixed for the line's lifetime so position updates and
/// despawns address the same representation that was spawned.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    entity: EntityId,
    location: Location,
    text: String,
}

impl TextLine {
    pub fn new(location: Location, text: impl Into<String>) -> Self {
        Self {
            entity: EntityId::new(),
            location,
            text: text.into(),
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.text = text;
    }

    pub(crate) fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    /// Borrowed view handed to the host when spawning this line.
    pub fn view(&self) -> LineView<'_> {
        LineView {
            entity: self.entity,
            text: &self.text,
            location: &self.location,
        }
    }
}
