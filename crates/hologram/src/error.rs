/// Errors surfaced to callers of hologram operations.
///
/// These describe bad input (an index or name the caller supplied), not host
/// faults, and are meant to be shown back to whoever issued the command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HologramError {
    #[error("cannot remove line {index}: it is out of the bounds of this hologram ({len} lines)")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("world {0:?} could not be found")]
    UnknownWorld(String),
    #[error("no world was given for the hologram")]
    MissingWorld,
    #[error("a hologram with id {0:?} already exists")]
    DuplicateId(String),
    #[error("hologram {0:?} not found")]
    NotFound(String),
    #[error("hologram service has shut down")]
    Stopped,
}
