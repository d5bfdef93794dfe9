use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};
use glam::DVec3;

/// A mutation marshaled onto the authoritative thread.
#[derive(Debug, Clone, PartialEq)]
pub enum HologramCommand {
    Create {
        id: String,
        world: String,
        position: DVec3,
        lines: Vec<String>,
    },
    AddLines {
        id: String,
        lines: Vec<String>,
    },
    SetLine {
        id: String,
        index: usize,
        text: String,
    },
    RemoveLines {
        id: String,
        indexes: Vec<usize>,
    },
    Move {
        id: String,
        world: String,
        position: DVec3,
    },
    Teleport {
        id: String,
        world: String,
        position: DVec3,
    },
    /// Copy a hologram. `new_id: None` lets the registry generate one.
    Copy {
        id: String,
        new_id: Option<String>,
        world: String,
        position: DVec3,
    },
    Delete {
        id: String,
    },
    /// Run one proximity pass over every hologram.
    Track,
    /// Tear down every hologram and stop the service loop.
    Shutdown,
}

/// Why a command could not be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("command queue is full")]
    Full,
    #[error("hologram service has stopped")]
    Disconnected,
}

/// Cloneable, `Send` handle for submitting commands from any thread.
///
/// Submission never blocks and never returns a result: the command runs
/// later, in submission order, on the thread that owns the service.
#[derive(Debug, Clone)]
pub struct CommandSender {
    sender: Sender<HologramCommand>,
}

impl CommandSender {
    pub fn submit(&self, command: HologramCommand) -> Result<(), QueueError> {
        self.sender.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => QueueError::Full,
            TrySendError::Disconnected(_) => QueueError::Disconnected,
        })
    }

    pub fn create<I, S>(
        &self,
        id: impl Into<String>,
        world: impl Into<String>,
        position: DVec3,
        lines: I,
    ) -> Result<(), QueueError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.submit(HologramCommand::Create {
            id: id.into(),
            world: world.into(),
            position,
            lines: lines.into_iter().map(Into::into).collect(),
        })
    }

    pub fn add_line(
        &self,
        id: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), QueueError> {
        self.submit(HologramCommand::AddLines {
            id: id.into(),
            lines: vec![text.into()],
        })
    }

    pub fn add_lines<I, S>(&self, id: impl Into<String>, texts: I) -> Result<(), QueueError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.submit(HologramCommand::AddLines {
            id: id.into(),
            lines: texts.into_iter().map(Into::into).collect(),
        })
    }

    pub fn set_line(
        &self,
        id: impl Into<String>,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), QueueError> {
        self.submit(HologramCommand::SetLine {
            id: id.into(),
            index,
            text: text.into(),
        })
    }

    pub fn remove_lines(
        &self,
        id: impl Into<String>,
        indexes: &[usize],
    ) -> Result<(), QueueError> {
        self.submit(HologramCommand::RemoveLines {
            id: id.into(),
            indexes: indexes.to_vec(),
        })
    }

    pub fn move_to(
        &self,
        id: impl Into<String>,
        world: impl Into<String>,
        position: DVec3,
    ) -> Result<(), QueueError> {
        self.submit(HologramCommand::Move {
            id: id.into(),
            world: world.into(),
            position,
        })
    }

    pub fn teleport(
        &self,
        id: impl Into<String>,
        world: impl Into<String>,
        position: DVec3,
    ) -> Result<(), QueueError> {
        self.submit(HologramCommand::Teleport {
            id: id.into(),
            world: world.into(),
            position,
        })
    }

    pub fn copy(
        &self,
        id: impl Into<String>,
        new_id: Option<&str>,
        world: impl Into<String>,
        position: DVec3,
    ) -> Result<(), QueueError> {
        self.submit(HologramCommand::Copy {
            id: id.into(),
            new_id: new_id.map(str::to_owned),
            world: world.into(),
            position,
        })
    }

    pub fn delete(&self, id: impl Into<String>) -> Result<(), QueueError> {
        self.submit(HologramCommand::Delete { id: id.into() })
    }

    pub fn track(&self) -> Result<(), QueueError> {
        self.submit(HologramCommand::Track)
    }

    pub fn shutdown(&self) -> Result<(), QueueError> {
        self.submit(HologramCommand::Shutdown)
    }
}

/// The single consuming end of the queue. Deliberately not `Clone`.
#[derive(Debug)]
pub(crate) struct CommandReceiver {
    receiver: Receiver<HologramCommand>,
}

impl CommandReceiver {
    /// Next queued command, if any, without blocking.
    pub(crate) fn try_next(&self) -> Option<HologramCommand> {
        self.receiver.try_recv().ok()
    }

    /// Block for the next command. `None` once every sender is gone.
    pub(crate) fn next(&self) -> Option<HologramCommand> {
        self.receiver.recv().ok()
    }

    pub(crate) fn pending(&self) -> usize {
        self.receiver.len()
    }
}

/// Create a command queue. `capacity` bounds it; `None` leaves it unbounded.
pub(crate) fn command_queue(capacity: Option<usize>) -> (CommandSender, CommandReceiver) {
    let (sender, receiver) = match capacity {
        Some(capacity) => bounded(capacity),
        None => unbounded(),
    };
    (CommandSender { sender }, CommandReceiver { receiver })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let (tx, rx) = command_queue(None);
        tx.add_line("a", "one").unwrap();
        tx.delete("a").unwrap();
        tx.track().unwrap();

        assert_eq!(rx.pending(), 3);
        assert!(matches!(rx.try_next(), Some(HologramCommand::AddLines { .. })));
        assert_eq!(rx.try_next(), Some(HologramCommand::Delete { id: "a".into() }));
        assert_eq!(rx.try_next(), Some(HologramCommand::Track));
        assert!(rx.try_next().is_none());
    }

    #[test]
    fn bounded_queue_reports_full() {
        let (tx, _rx) = command_queue(Some(1));
        tx.track().unwrap();
        assert_eq!(tx.track(), Err(QueueError::Full));
    }

    #[test]
    fn dropped_receiver_reports_disconnected() {
        let (tx, rx) = command_queue(None);
        drop(rx);
        assert_eq!(tx.shutdown(), Err(QueueError::Disconnected));
    }

    #[test]
    fn next_ends_when_senders_drop() {
        let (tx, rx) = command_queue(None);
        let producer = tx.clone();
        std::thread::spawn(move || producer.set_line("a", 0, "x").unwrap())
            .join()
            .unwrap();
        drop(tx);
        assert!(matches!(rx.next(), Some(HologramCommand::SetLine { index: 0, .. })));
        assert!(rx.next().is_none());
    }
}
