//! nebula_field — interactive entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use gesture_flow::{FlowConfig, Viewport};
use nebula_field::app::{run, AppConfig};
use tracing_subscriber::EnvFilter;

/// Particle count used by `--quick`.
const QUICK_PARTICLES: usize = 20_000;

#[derive(Parser, Debug)]
#[command(name = "nebula_field", version, about = "Gesture-driven particle field")]
struct Cli {
    /// TOML file with gesture, camera and burst settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the compact camera presets regardless of window size
    #[arg(long)]
    compact: bool,

    /// Number of particles
    #[arg(long)]
    particles: Option<usize>,

    /// Fixed RNG seed for reproducible shapes and bursts
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 1280)]
    width: usize,

    #[arg(long, default_value_t = 800)]
    height: usize,

    /// Lighter field for slow machines
    #[arg(long)]
    quick: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nebula_field=info,gesture_flow=info")),
        )
        .init();

    let cli = Cli::parse();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Nebula Field — Gesture-Driven Particle Field        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("  Mode: Keyboard simulation  (1–5 poses, H hand, arrows move, Q quit)");
    println!();

    let mut flow = match &cli.config {
        Some(path) => FlowConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => FlowConfig::default(),
    };
    if cli.quick {
        println!("  Quick-start: {} particles\n", QUICK_PARTICLES);
        flow.particle_count = QUICK_PARTICLES;
    }
    if let Some(n) = cli.particles {
        flow.particle_count = n;
    }
    if cli.seed.is_some() {
        flow.seed = cli.seed;
    }

    let cfg = AppConfig {
        flow,
        width:    cli.width,
        height:   cli.height,
        viewport: cli.compact.then_some(Viewport::Compact),
    };

    println!("  Opening visualizer window…");
    println!();

    run(cfg)
}
