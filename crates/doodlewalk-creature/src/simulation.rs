//! Simulation context: one engine, one creature, one gait controller
//!
//! A tick runs contact detection, the gait pass, separation correction and
//! one engine step, in that order. Skipped frames advance nothing.

use glam::Vec2;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::assembly::CreatureAssembler;
use crate::config::CreatureConfig;
use crate::contact::ContactTracker;
use crate::creature::Creature;
use crate::error::Result;
use crate::gait::{GaitController, GaitTick};
use crate::geometry::Polygon;
use crate::rng::seeded;
use crate::separation::{SeparationGuard, SeparationReport};
use crate::traits::PhysicsEngine;
use crate::CreatureRenderData;

/// What one simulation tick did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub parts_in_contact: usize,
    pub gait: GaitTick,
    pub separation: SeparationReport,
}

pub struct Simulation<E: PhysicsEngine> {
    engine: E,
    config: CreatureConfig,
    assembler: CreatureAssembler,
    contacts: ContactTracker,
    separation: SeparationGuard,
    creature: Creature,
    gait: GaitController,
    rng: Xoshiro256PlusPlus,
    seed: u64,
    ticks: u64,
}

impl<E: PhysicsEngine> Simulation<E> {
    pub fn new(engine: E, config: CreatureConfig, seed: u64) -> Self {
        let creature = Creature::empty();
        let mut rng = seeded(seed);
        let gait = GaitController::setup(&creature, &engine, &config.gait, &mut rng);

        Self {
            assembler: CreatureAssembler::new(config.assembly.clone()),
            contacts: ContactTracker::new(&config.contact),
            separation: SeparationGuard::new(&config.separation),
            engine,
            config,
            creature,
            gait,
            rng,
            seed,
            ticks: 0,
        }
    }

    /// Replace the current creature with one built from `polygons`
    pub fn spawn(&mut self, polygons: Vec<Polygon>, baseline: Vec2) -> &Creature {
        self.reset();
        self.creature = self
            .assembler
            .assemble(polygons, &mut self.engine, baseline, &mut self.rng);
        self.gait = GaitController::setup(&self.creature, &self.engine, &self.config.gait, &mut self.rng);
        &self.creature
    }

    /// Validate raw point lists, then spawn
    pub fn spawn_drawing(&mut self, shapes: Vec<Vec<Vec2>>, baseline: Vec2) -> Result<&Creature> {
        let polygons = Polygon::from_drawing(shapes)?;
        Ok(self.spawn(polygons, baseline))
    }

    pub fn tick(&mut self) -> TickReport {
        self.ticks += 1;
        let now = self.ticks as f32;

        let parts_in_contact = self.contacts.update(&mut self.creature, &self.engine, now);
        let gait = self.gait.tick(&mut self.creature, &mut self.engine, &mut self.rng);
        let separation = self.separation.correct(&self.creature, &mut self.engine);
        self.engine.step();

        TickReport {
            tick: self.ticks,
            parts_in_contact,
            gait,
            separation,
        }
    }

    /// Run a tick only when `update_physics` is set; otherwise the last pose stands
    pub fn frame(&mut self, update_physics: bool) -> Option<TickReport> {
        update_physics.then(|| self.tick())
    }

    /// Tear the creature down (joints first) and rewind the clock.
    /// The ground stays.
    pub fn reset(&mut self) {
        if !self.creature.is_empty() {
            log::info!("Simulation: removing creature after {} ticks", self.ticks);
        }
        self.creature.destroy(&mut self.engine);
        self.gait = GaitController::setup(&self.creature, &self.engine, &self.config.gait, &mut self.rng);
        self.ticks = 0;
    }

    pub fn render_data(&self) -> CreatureRenderData {
        self.creature.render_data(&self.engine)
    }

    pub fn main_position(&self) -> Option<Vec2> {
        self.creature
            .main_body()
            .and_then(|m| m.state(&self.engine))
            .map(|s| s.position)
    }

    pub fn creature(&self) -> &Creature {
        &self.creature
    }

    pub fn gait(&self) -> &GaitController {
        &self.gait
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn config(&self) -> &CreatureConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
