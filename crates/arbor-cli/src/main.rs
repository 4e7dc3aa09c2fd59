//! arbor CLI - drives the demo patrol tree.
//!
//! The binary is the external scheduler the runtime expects: it owns the loop,
//! decides when ticks happen, and feeds the blackboard with simulated sensor
//! input between ticks.

mod patrol;

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use arbor_bt::{Root, RootConfig, Status};

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Tick a demo patrol behavior tree at a fixed rate", version)]
struct Cli {
    /// YAML file with root settings (seed, trace)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the random composites, overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many ticks
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Ticks per second
    #[arg(long, default_value_t = 20.0)]
    hz: f64,

    /// Raise an alert every N ticks (0 disables)
    #[arg(long, default_value_t = 15)]
    alert_every: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    fmt().with_env_filter(filter).with_target(false).init();

    ensure!(
        cli.hz.is_finite() && cli.hz > 0.0,
        "--hz must be a positive number, got {}",
        cli.hz
    );
    let period = Duration::from_secs_f64(1.0 / cli.hz);

    let mut config = match &cli.config {
        Some(path) => RootConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => RootConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let mut root = Root::from_spec(patrol::tree(period * 10), config.clone())
        .context("building patrol tree")?;
    patrol::load_route(&mut root, patrol::WAYPOINTS).context("loading route")?;
    root.initialize().context("initializing patrol tree")?;
    info!(
        seed = config.seed,
        hz = cli.hz,
        nodes = root.len(),
        "patrol started"
    );

    let status = run(&mut root, &cli, period)?;

    info!(?status, ticks = root.ticks(), "patrol stopped");
    if let Some(log) = root.trace_log() {
        info!(
            events = log.events.len(),
            fast = log.with_tag("bt.tick.fast").count(),
            traversals = log.with_tag("bt.tick.traverse").count(),
            checks = log.with_tag("bt.check.fired").count(),
            "trace summary"
        );
    }
    Ok(())
}

/// Fixed-rate loop: one root tick per period until the tree settles or the
/// tick budget runs out.
fn run(root: &mut Root, cli: &Cli, period: Duration) -> Result<Status> {
    let mut status = root.status();
    for tick in 1..=cli.ticks {
        let started = Instant::now();

        if cli.alert_every > 0 && tick % cli.alert_every == 0 {
            root.set_value(patrol::ALERT, true);
            info!(tick, "alert raised");
        }

        status = root.tick().with_context(|| format!("tick {tick}"))?;
        if status.is_terminal() {
            break;
        }

        if let Some(rest) = period.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }
    Ok(status)
}
