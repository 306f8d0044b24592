use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use doodlewalk::{run_headless, RunnerConfig, ShapeFile};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RON shape file with the drawn polygons (built-in demo when omitted)
    #[arg(long)]
    shapes: Option<PathBuf>,

    /// Config file (default: doodlewalk.ron in the working directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of simulation ticks to run
    #[arg(long)]
    ticks: Option<u64>,

    /// Random seed for colors, gait setup and adaptation
    #[arg(long)]
    seed: Option<u64>,

    /// Run physics on every N-th frame
    #[arg(long)]
    physics_every: Option<u32>,

    /// Log a progress line every N ticks (0 disables)
    #[arg(long)]
    report_every: Option<u64>,

    /// Write the built-in demo drawing to this path and exit
    #[arg(long)]
    write_demo: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Some(path) = args.write_demo {
        ShapeFile::demo().save(&path)?;
        log::info!("Wrote demo drawing to {}", path.display());
        return Ok(());
    }

    let mut config = RunnerConfig::load(args.config.as_deref()).context("Failed to load config")?;
    if let Some(ticks) = args.ticks {
        config.run.ticks = ticks;
    }
    if let Some(seed) = args.seed {
        config.run.seed = seed;
    }
    if let Some(physics_every) = args.physics_every {
        config.run.physics_every = physics_every;
    }
    if let Some(report_every) = args.report_every {
        config.run.report_every = report_every;
    }

    let shapes = match &args.shapes {
        Some(path) => ShapeFile::load(path)?,
        None => {
            log::info!("No shape file given, using the demo drawing");
            ShapeFile::demo()
        }
    };

    log::info!("Starting Doodlewalk");
    let summary = run_headless(&config, shapes)?;

    println!(
        "{} ticks, {} parts, distance {:+.1} px, ground contact on {} ticks, max stuck {}",
        summary.ticks,
        summary.parts,
        summary.distance(),
        summary.ticks_in_contact,
        summary.max_stuck
    );

    Ok(())
}
