//! Fixed-length headless run
//!
//! Mirrors the interactive frame loop: physics only advances every
//! `physics_every` frames while the pose is read back every frame.

use anyhow::{ensure, Result};
use doodlewalk_creature::{RapierEngine, Simulation};

use super::shapes::ShapeFile;
use crate::config::RunnerConfig;

/// Outcome of a headless run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub frames: u64,
    pub parts: usize,
    pub appendages: usize,
    pub start_x: f32,
    pub end_x: f32,
    /// Ticks with at least one part on the ground
    pub ticks_in_contact: u64,
    pub max_stuck: u32,
    pub separation_corrections: usize,
}

impl RunSummary {
    pub fn distance(&self) -> f32 {
        self.end_x - self.start_x
    }
}

pub fn run_headless(config: &RunnerConfig, shapes: ShapeFile) -> Result<RunSummary> {
    ensure!(config.run.physics_every > 0, "physics_every must be at least 1");

    let engine = RapierEngine::new(&config.engine);
    let mut sim = Simulation::new(engine, config.creature.clone(), config.run.seed);

    let baseline = shapes.baseline.unwrap_or(config.run.baseline);
    let creature = sim.spawn_drawing(shapes.shapes, baseline)?;

    let mut summary = RunSummary {
        parts: creature.parts.len(),
        appendages: creature.appendages.len(),
        ..Default::default()
    };
    summary.start_x = sim.main_position().map_or(baseline.x, |p| p.x);
    summary.end_x = summary.start_x;

    log::info!(
        "Running {} ticks: {} parts, {} appendages, seed {}, {} adaptation",
        config.run.ticks,
        summary.parts,
        summary.appendages,
        config.run.seed,
        sim.gait().strategy_name()
    );

    let physics_every = u64::from(config.run.physics_every);
    while summary.ticks < config.run.ticks {
        summary.frames += 1;
        let report = sim.frame(summary.frames % physics_every == 0);
        let pose = sim.render_data();

        let Some(report) = report else {
            continue;
        };
        summary.ticks = report.tick;
        if report.parts_in_contact > 0 {
            summary.ticks_in_contact += 1;
        }
        summary.separation_corrections += report.separation.repositioned;
        summary.max_stuck = summary.max_stuck.max(sim.gait().stuck_counter());

        if config.run.report_every > 0 && report.tick % config.run.report_every == 0 {
            let x = sim.main_position().map_or(summary.start_x, |p| p.x);
            log::info!(
                "tick {}: x={:.1} (moved {:+.1}), {} parts touching, stuck {}",
                report.tick,
                x,
                x - summary.start_x,
                report.parts_in_contact,
                sim.gait().stuck_counter()
            );
            log::debug!(
                "tick {}: {} connectors, {} pivots",
                report.tick,
                pose.connectors.len(),
                pose.pivots.len()
            );
        }
    }

    summary.end_x = sim.main_position().map_or(summary.start_x, |p| p.x);
    log::info!(
        "Finished after {} ticks / {} frames, distance {:+.1}",
        summary.ticks,
        summary.frames,
        summary.distance()
    );

    Ok(summary)
}
