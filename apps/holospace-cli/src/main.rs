use std::path::PathBuf;

use clap::{Parser, Subcommand};
use glam::DVec3;
use holospace_common::{Location, WorldId};
use holospace_hologram::{
    ConfigError, Hologram, HologramCommand, HologramConfig, HologramInspector, HologramService,
};
use holospace_host::SimulatedHost;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "holospace-cli", about = "CLI tool for holospace holograms")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, crate info and the default configuration
    Info,
    /// Print where each line of a stack would sit
    Stack {
        /// Number of lines in the stack
        #[arg(short, long, default_value = "4")]
        lines: usize,
        /// Anchor height
        #[arg(short, long, default_value = "64.0")]
        y: f64,
        /// Gap between lines (defaults to the configured gap)
        #[arg(short, long, allow_negative_numbers = true)]
        gap: Option<f64>,
    },
    /// Run a scripted session against a simulated host
    Demo {
        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print host events as JSON lines
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("holospace-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("host: {}", holospace_host::crate_info());
            println!("hologram: {}", holospace_hologram::crate_info());
            println!("default config: {:?}", HologramConfig::default());
        }
        Commands::Stack { lines, y, gap } => {
            let gap = stack_config(gap)?.line_gap;
            let preview = Hologram::new(
                "preview",
                Location::new(WorldId::new("preview"), DVec3::new(0.0, y, 0.0)),
                gap,
            );
            println!("Stack: lines={lines} anchor_y={y} gap={gap}");
            for i in 0..lines {
                println!("  {i:>2} y={:.2}", preview.line_location(i).position.y);
            }
        }
        Commands::Demo { config, json } => {
            let config = match config {
                Some(path) => HologramConfig::from_yaml_file(&path)?,
                None => HologramConfig::default(),
            };
            demo(config, json)?;
        }
    }

    Ok(())
}

/// Default config with an optional `--gap` override, validated like a loaded one.
fn stack_config(gap: Option<f64>) -> Result<HologramConfig, ConfigError> {
    let mut config = HologramConfig::default();
    if let Some(gap) = gap {
        config.line_gap = gap;
    }
    config.validate()?;
    Ok(config)
}

fn demo(config: HologramConfig, json: bool) -> anyhow::Result<()> {
    let mut host = SimulatedHost::with_worlds(["overworld", "nether"]);
    let radius = f64::from(config.view_radius);
    let alex = host.connect("overworld", DVec3::new(radius * 3.0, 64.0, 0.0));
    let sam = host.connect("nether", DVec3::new(2.0, 66.0, 2.0));
    let (mut service, sender) = HologramService::new(host, config)?;

    service.execute(HologramCommand::Create {
        id: "spawn".into(),
        world: "overworld".into(),
        position: DVec3::new(0.5, 80.0, 0.5),
        lines: vec!["Welcome".into(), "to holospace".into(), "enjoy".into()],
    })?;

    service.execute(HologramCommand::Track)?;
    println!("alex far away: {:?}", service.tracker_stats());
    service
        .host_mut()
        .move_observer(alex, "overworld", DVec3::new(4.0, 78.0, 4.0));
    service.execute(HologramCommand::Track)?;
    println!("alex walked in: {:?}", service.tracker_stats());

    service.execute(HologramCommand::SetLine {
        id: "spawn".into(),
        index: 2,
        text: "have fun".into(),
    })?;
    if let Err(err) = service.execute(HologramCommand::RemoveLines {
        id: "spawn".into(),
        indexes: vec![7],
    }) {
        println!("remove rejected: {err}");
    }
    service.execute(HologramCommand::RemoveLines {
        id: "spawn".into(),
        indexes: vec![1],
    })?;
    service.execute(HologramCommand::Teleport {
        id: "spawn".into(),
        world: "overworld".into(),
        position: DVec3::new(6.5, 81.0, 6.5),
    })?;

    let producer = sender.clone();
    let worker = std::thread::spawn(move || {
        producer.add_line("spawn", "queued from another thread")?;
        producer.copy("spawn", Some("spawn-nether"), "nether", DVec3::new(0.0, 70.0, 0.0))?;
        producer.track()
    });
    worker
        .join()
        .map_err(|_| anyhow::anyhow!("producer thread panicked"))??;
    let applied = service.run_pending();
    println!("applied {applied} queued commands");

    println!("{}", HologramInspector::summary(service.registry()));
    for id in HologramInspector::list(service.registry()) {
        if let Some(info) = HologramInspector::inspect(service.registry(), &id) {
            print!("{info}");
        }
    }
    println!(
        "sam sees {} lines in the nether",
        service.host().visible_to(sam).len()
    );

    service.execute(HologramCommand::Move {
        id: "spawn".into(),
        world: "nether".into(),
        position: DVec3::new(3.0, 66.0, 3.0),
    })?;
    service.execute(HologramCommand::Track)?;
    println!("after move: {:?}", service.tracker_stats());

    sender.delete("spawn-nether")?;
    sender.shutdown()?;
    service.run_pending();
    tracing::info!(stopped = service.is_stopped(), "demo finished");

    let host = service.into_host();
    println!("host events ({}):", host.events().len());
    for event in host.events() {
        if json {
            println!("{}", serde_json::to_string(event)?);
        } else {
            println!("  {event}");
        }
    }

    Ok(())
}
