use holospace_host::Host;

use crate::builder::HologramBuilder;
use crate::config::{ConfigError, HologramConfig};
use crate::error::HologramError;
use crate::queue::{CommandReceiver, CommandSender, HologramCommand, command_queue};
use crate::registry::HologramRegistry;
use crate::tracker::{ProximityTracker, TrackerStats};

/// Owner of all hologram state, living on the authoritative thread.
///
/// The service holds the host handle, the registry and the tracker. Other
/// threads only ever hold [`CommandSender`]s; the service applies their
/// commands one at a time, in submission order, from [`run`](Self::run) or
/// [`run_pending`](Self::run_pending).
pub struct HologramService<H: Host> {
    host: H,
    registry: HologramRegistry,
    tracker: ProximityTracker,
    config: HologramConfig,
    commands: CommandReceiver,
    stopped: bool,
}

impl<H: Host> HologramService<H> {
    /// Create a service and the first sender for its queue. The config is
    /// validated first, whether it came from YAML or was built in code.
    pub fn new(host: H, config: HologramConfig) -> Result<(Self, CommandSender), ConfigError> {
        config.validate()?;
        let (sender, commands) = command_queue(config.queue_capacity);
        let service = Self {
            host,
            registry: HologramRegistry::new(),
            tracker: ProximityTracker::from_config(&config),
            config,
            commands,
            stopped: false,
        };
        Ok((service, sender))
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn registry(&self) -> &HologramRegistry {
        &self.registry
    }

    pub fn config(&self) -> &HologramConfig {
        &self.config
    }

    /// Statistics from the last proximity pass.
    pub fn tracker_stats(&self) -> &TrackerStats {
        self.tracker.stats()
    }

    /// Commands waiting in the queue.
    pub fn pending(&self) -> usize {
        self.commands.pending()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Apply a command immediately. This is the on-thread entry point and the
    /// only one that reports errors back to the caller.
    pub fn execute(&mut self, command: HologramCommand) -> Result<(), HologramError> {
        if self.stopped {
            return Err(HologramError::Stopped);
        }
        match command {
            HologramCommand::Create {
                id,
                world,
                position,
                lines,
            } => {
                HologramBuilder::new()
                    .id(id)
                    .world(world)
                    .position(position.x, position.y, position.z)
                    .lines(lines)
                    .build(&mut self.registry, &mut self.host, &self.config)?;
            }
            HologramCommand::AddLines { id, lines } => {
                self.registry
                    .require_mut(&id)?
                    .add_lines(&mut self.host, lines);
            }
            HologramCommand::SetLine { id, index, text } => {
                self.registry
                    .require_mut(&id)?
                    .set_line(&mut self.host, index, text);
            }
            HologramCommand::RemoveLines { id, indexes } => {
                self.registry
                    .require_mut(&id)?
                    .remove_lines(&mut self.host, &indexes)?;
            }
            HologramCommand::Move {
                id,
                world,
                position,
            } => {
                self.registry
                    .require_mut(&id)?
                    .move_to(&mut self.host, &world, position);
            }
            HologramCommand::Teleport {
                id,
                world,
                position,
            } => {
                self.registry
                    .require_mut(&id)?
                    .teleport(&mut self.host, &world, position);
            }
            HologramCommand::Copy {
                id,
                new_id,
                world,
                position,
            } => {
                self.registry
                    .copy(&self.host, &id, new_id.as_deref(), &world, position)?;
            }
            HologramCommand::Delete { id } => {
                self.registry.delete(&mut self.host, &id)?;
            }
            HologramCommand::Track => {
                self.tracker.update(&mut self.registry, &mut self.host);
            }
            HologramCommand::Shutdown => self.shutdown(),
        }
        Ok(())
    }

    /// Apply everything already queued without blocking. Returns how many
    /// commands were taken off the queue.
    pub fn run_pending(&mut self) -> usize {
        let _span = tracing::info_span!("drain_commands").entered();
        let mut applied = 0;
        while !self.stopped {
            let Some(command) = self.commands.try_next() else {
                break;
            };
            self.dispatch(command);
            applied += 1;
        }
        applied
    }

    /// Block on the queue until a `Shutdown` command arrives or every sender
    /// has been dropped. Either way all holograms are deleted on the way out.
    pub fn run(&mut self) {
        tracing::info!("hologram service running");
        while !self.stopped {
            match self.commands.next() {
                Some(command) => self.dispatch(command),
                None => self.shutdown(),
            }
        }
    }

    fn dispatch(&mut self, command: HologramCommand) {
        tracing::trace!(?command, "applying queued command");
        if let Err(err) = self.execute(command) {
            tracing::warn!(%err, "queued hologram command failed");
        }
    }

    fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        let holograms = self.registry.len();
        self.registry.clear(&mut self.host);
        self.stopped = true;
        tracing::info!(holograms, "hologram service stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::QueueError;
    use glam::DVec3;
    use holospace_host::{HostEvent, SimulatedHost};
    use std::thread;

    fn service() -> (HologramService<SimulatedHost>, CommandSender) {
        HologramService::new(
            SimulatedHost::with_worlds(["overworld", "nether"]),
            HologramConfig {
                view_radius: 16,
                ..HologramConfig::default()
            },
        )
        .unwrap()
    }

    fn create(service: &mut HologramService<SimulatedHost>) {
        service
            .execute(HologramCommand::Create {
                id: "spawn".into(),
                world: "overworld".into(),
                position: DVec3::new(0.0, 10.0, 0.0),
                lines: vec!["A".into(), "B".into(), "C".into()],
            })
            .unwrap();
    }

    #[test]
    fn execute_create_and_edit() {
        let (mut service, _tx) = service();
        create(&mut service);
        service
            .execute(HologramCommand::SetLine {
                id: "spawn".into(),
                index: 2,
                text: "see".into(),
            })
            .unwrap();
        service
            .execute(HologramCommand::RemoveLines {
                id: "spawn".into(),
                indexes: vec![1],
            })
            .unwrap();

        let h = service.registry().get("spawn").unwrap();
        assert_eq!(h.texts(), vec!["A", "see"]);
        assert_eq!(h.lines()[1].location().position.y, 9.75);
    }

    #[test]
    fn execute_surfaces_remove_errors() {
        let (mut service, _tx) = service();
        create(&mut service);
        let err = service
            .execute(HologramCommand::RemoveLines {
                id: "spawn".into(),
                indexes: vec![5],
            })
            .unwrap_err();
        assert_eq!(err, HologramError::IndexOutOfBounds { index: 5, len: 3 });
        assert_eq!(service.registry().get("spawn").unwrap().line_count(), 3);
    }

    #[test]
    fn execute_unknown_id() {
        let (mut service, _tx) = service();
        let err = service
            .execute(HologramCommand::Delete { id: "nope".into() })
            .unwrap_err();
        assert_eq!(err, HologramError::NotFound("nope".into()));
    }

    #[test]
    fn queued_commands_apply_in_order() {
        let (mut service, tx) = service();
        tx.create("spawn", "overworld", DVec3::new(0.0, 10.0, 0.0), ["A"])
            .unwrap();
        tx.add_line("spawn", "B").unwrap();
        tx.set_line("spawn", 1, "B2").unwrap();
        tx.add_lines("spawn", ["C", "D"]).unwrap();
        tx.remove_lines("spawn", &[0]).unwrap();

        assert_eq!(service.pending(), 5);
        assert_eq!(service.run_pending(), 5);
        assert_eq!(
            service.registry().get("spawn").unwrap().texts(),
            vec!["B2", "C", "D"]
        );
    }

    #[test]
    fn failed_queued_command_does_not_stop_the_queue() {
        let (mut service, tx) = service();
        create(&mut service);
        tx.remove_lines("spawn", &[9]).unwrap();
        tx.add_line("spawn", "D").unwrap();

        service.run_pending();
        assert_eq!(service.registry().get("spawn").unwrap().line_count(), 4);
    }

    #[test]
    fn producers_on_other_threads() {
        let (mut service, tx) = service();
        create(&mut service);

        let producers: Vec<_> = (0..4)
            .map(|n| {
                let tx = tx.clone();
                thread::spawn(move || {
                    for i in 0..10 {
                        tx.add_line("spawn", format!("{n}-{i}")).unwrap();
                    }
                })
            })
            .collect();
        for p in producers {
            p.join().unwrap();
        }

        service.run_pending();
        let h = service.registry().get("spawn").unwrap();
        assert_eq!(h.line_count(), 43);
        for (i, line) in h.lines().iter().enumerate() {
            assert_eq!(line.location().position.y, 10.0 - 0.25 * i as f64);
        }
        // Each producer's lines keep their relative order.
        for n in 0..4 {
            let mine: Vec<&str> = h
                .texts()
                .into_iter()
                .filter(|t| t.starts_with(&format!("{n}-")))
                .collect();
            let expected: Vec<String> = (0..10).map(|i| format!("{n}-{i}")).collect();
            assert_eq!(mine, expected);
        }
    }

    #[test]
    fn run_on_worker_thread_until_shutdown() {
        let (service, tx) = service();
        let worker = thread::spawn(move || {
            let mut service = service;
            service.run();
            service
        });

        tx.create("spawn", "overworld", DVec3::ZERO, ["hello"]).unwrap();
        tx.track().unwrap();
        tx.shutdown().unwrap();

        let service = worker.join().unwrap();
        assert!(service.is_stopped());
        assert!(service.registry().is_empty());
        drop(service);
        assert_eq!(tx.track(), Err(QueueError::Disconnected));
    }

    #[test]
    fn run_stops_when_senders_drop() {
        let (mut service, tx) = service();
        create(&mut service);
        let viewer = service.host_mut().connect("overworld", DVec3::ZERO);
        drop(tx);

        service.run();
        assert!(service.is_stopped());
        assert!(service.registry().is_empty());
        assert!(service.host().visible_to(viewer).is_empty());
    }

    #[test]
    fn track_command_spawns_for_nearby() {
        let (mut service, tx) = service();
        create(&mut service);
        let near = service.host_mut().connect("overworld", DVec3::new(3.0, 10.0, 0.0));
        tx.track().unwrap();
        service.run_pending();

        assert_eq!(service.tracker_stats().observers_shown, 1);
        assert_eq!(service.host().visible_to(near).len(), 3);

        tx.teleport("spawn", "overworld", DVec3::new(4.0, 12.0, 0.0)).unwrap();
        service.run_pending();
        let last = service.host().events().last().cloned();
        assert!(matches!(last, Some(HostEvent::PositionPushed { .. })));
    }

    #[test]
    fn commands_after_shutdown_are_rejected() {
        let (mut service, tx) = service();
        create(&mut service);
        tx.shutdown().unwrap();
        tx.add_line("spawn", "late").unwrap();

        assert_eq!(service.run_pending(), 1);
        assert_eq!(service.pending(), 1);
        assert_eq!(
            service.execute(HologramCommand::Track),
            Err(HologramError::Stopped)
        );
    }

    #[test]
    fn copy_and_move_through_queue() {
        let (mut service, tx) = service();
        create(&mut service);
        tx.copy("spawn", Some("spawn-nether"), "nether", DVec3::new(0.0, 70.0, 0.0))
            .unwrap();
        tx.move_to("spawn", "the_end", DVec3::ZERO).unwrap();
        service.run_pending();

        let registry = service.registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.get("spawn-nether").unwrap().texts(),
            vec!["A", "B", "C"]
        );
        assert_eq!(
            registry.get("spawn").unwrap().location().position,
            DVec3::new(0.0, 10.0, 0.0)
        );
    }

    #[test]
    fn new_rejects_zero_capacity_queue() {
        let config = HologramConfig {
            queue_capacity: Some(0),
            ..HologramConfig::default()
        };
        let err = HologramService::new(SimulatedHost::new(), config).err();
        assert!(matches!(err, Some(ConfigError::Invalid(_))));
    }

    #[test]
    fn new_rejects_non_positive_gap() {
        for line_gap in [-0.25, 0.0, f64::NAN] {
            let config = HologramConfig {
                line_gap,
                ..HologramConfig::default()
            };
            let err = HologramService::new(SimulatedHost::new(), config).err();
            assert!(matches!(err, Some(ConfigError::Invalid(_))), "gap {line_gap}");
        }
    }

    #[test]
    fn bounded_queue_accepts_work_up_to_capacity() {
        let config = HologramConfig {
            queue_capacity: Some(2),
            ..HologramConfig::default()
        };
        let (mut service, tx) =
            HologramService::new(SimulatedHost::with_worlds(["overworld"]), config).unwrap();
        assert_eq!(service.config().queue_capacity, Some(2));

        tx.create("spawn", "overworld", DVec3::new(0.0, 10.0, 0.0), ["A", "B"])
            .unwrap();
        tx.track().unwrap();
        assert_eq!(tx.track(), Err(QueueError::Full));

        assert_eq!(service.run_pending(), 2);
        let h = service.registry().get("spawn").unwrap();
        assert_eq!(h.line_gap(), 0.25);
        assert_eq!(h.lines()[1].location().position.y, 9.75);
    }
}
