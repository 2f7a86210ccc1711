use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wedge_ring::RingService;

mod config;
mod harness;

use config::{load_settings, Settings, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(about = "Headless driver for a ring of wedges")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long)]
    tick_ms: Option<u64>,
    #[arg(long)]
    max_wedges: Option<usize>,
    #[arg(long)]
    add_probability: Option<f64>,
    #[arg(long)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed a few wedges, let the random walk run, then print the final ring.
    Demo {
        #[arg(long, default_value_t = 3)]
        initial: usize,
        #[arg(long, default_value_t = 5_000)]
        duration_ms: u64,
    },
    /// Read commands (new, remove <id>, tap <pos>, clear, walk on|off, show,
    /// quit) from stdin.
    Repl,
}

impl Cli {
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(v) = self.tick_ms {
            settings.tick_interval_ms = v;
        }
        if let Some(v) = self.max_wedges {
            settings.max_wedges = v;
        }
        if let Some(v) = self.add_probability {
            settings.add_probability = v;
        }
        if let Some(v) = self.seed {
            settings.seed = Some(v);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config)
        .with_context(|| format!("failed to load settings from '{}'", cli.config.display()))?;
    cli.apply_overrides(&mut settings);
    let policy = settings.walk_policy()?;

    info!(
        tick_ms = settings.tick_interval_ms,
        max_wedges = settings.max_wedges,
        add_probability = settings.add_probability,
        seed = ?settings.seed,
        "wedges: starting"
    );

    let service = match settings.seed {
        Some(seed) => RingService::with_seed(policy, seed),
        None => RingService::new(policy),
    };

    match cli.command {
        Command::Demo {
            initial,
            duration_ms,
        } => harness::run_demo(service, initial, Duration::from_millis(duration_ms)).await,
        Command::Repl => harness::run_repl(service).await,
    }
}
