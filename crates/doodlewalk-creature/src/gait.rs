//! Oscillator-driven gait controller
//!
//! Every animated part is driven by one or more oscillators. Each tick the
//! controller evaluates forward progress, sums base sway, the walk cycle
//! (push-off while touching the ground in the positive half of the phase,
//! recovery otherwise), jitter and a forward bias into one force per
//! oscillator, and applies it through the engine. The adaptation strategy
//! then tunes the oscillators from the measured progress.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::adaptation::{AdaptationStrategy, FixedStrategy, HillClimbStrategy};
use crate::config::GaitConfig;
use crate::creature::Creature;
use crate::geometry::map_range;
use crate::rng::GaitRng;
use crate::traits::{BodyState, PhysicsEngine};
use crate::types::{Color, PartId};

const TINT_ALPHA: u8 = 150;

/// Parameters shared by every oscillator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseParams {
    pub frequency: f32,
    pub amplitude: f32,
    pub phase: f32,
    pub direction: Vec2,
    /// Accumulated random-walk drift added to `direction` every tick
    pub adaptation: Vec2,
    pub success_rate: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkCycle {
    pub speed: f32,
    pub strength: f32,
    pub phase_offset: f32,
    pub step_height: f32,
    pub push_force: f32,
}

/// What an oscillator adds on top of its base sway
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Modifier {
    None,
    WalkCycle(WalkCycle),
    /// Uniform noise bound added to both force components
    Jitter(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oscillator {
    pub target: PartId,
    pub base: BaseParams,
    pub modifier: Modifier,
}

impl Oscillator {
    pub fn walk_cycle(&self) -> Option<&WalkCycle> {
        match &self.modifier {
            Modifier::WalkCycle(cycle) => Some(cycle),
            _ => None,
        }
    }

    /// sin of the walk phase at `time`, for walk-cycle oscillators
    pub fn walk_phase(&self, time: f32) -> Option<f32> {
        self.walk_cycle()
            .map(|cycle| (time * cycle.speed + cycle.phase_offset).sin())
    }
}

/// Phase of a walk-cycle oscillator this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimbPhase {
    PushOff,
    Recovery,
}

/// What one controller tick did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GaitTick {
    /// Main body x delta, `None` on the first evaluated tick
    pub progress: Option<f32>,
    /// Force applied per oscillator, in oscillator order
    pub forces: Vec<(PartId, Vec2)>,
    pub updates_applied: usize,
}

#[derive(Debug)]
pub struct GaitController {
    config: GaitConfig,
    patterns: Vec<Oscillator>,
    time_step: f32,
    last_position: Option<f32>,
    strategy: Box<dyn AdaptationStrategy>,
}

impl GaitController {
    /// Build oscillators for `creature`; `config.adaptive` picks the strategy
    pub fn setup<E: PhysicsEngine + ?Sized>(
        creature: &Creature,
        engine: &E,
        config: &GaitConfig,
        rng: &mut dyn GaitRng,
    ) -> Self {
        let patterns = build_patterns(creature, engine, config, rng);
        let strategy: Box<dyn AdaptationStrategy> = if config.adaptive {
            Box::new(HillClimbStrategy::new(config))
        } else {
            Box::new(FixedStrategy)
        };
        log::info!(
            "Gait: {} oscillators for {} parts ({} adaptation)",
            patterns.len(),
            creature.parts.len(),
            strategy.name()
        );
        Self::with_patterns(patterns, config, strategy)
    }

    /// Controller over a fixed initial pattern set
    pub fn with_patterns(
        patterns: Vec<Oscillator>,
        config: &GaitConfig,
        strategy: Box<dyn AdaptationStrategy>,
    ) -> Self {
        Self {
            config: config.clone(),
            patterns,
            time_step: 0.0,
            last_position: None,
            strategy,
        }
    }

    pub fn patterns(&self) -> &[Oscillator] {
        &self.patterns
    }

    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    pub fn last_position(&self) -> Option<f32> {
        self.last_position
    }

    pub fn stuck_counter(&self) -> u32 {
        self.strategy.stuck_counter()
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Advance the clock, adapt, and push every oscillator's force into the
    /// engine. An empty creature is a no-op.
    pub fn tick<E: PhysicsEngine + ?Sized>(
        &mut self,
        creature: &mut Creature,
        engine: &mut E,
        rng: &mut dyn GaitRng,
    ) -> GaitTick {
        let Some(main) = creature.main_body().and_then(|m| m.state(&*engine)) else {
            return GaitTick::default();
        };

        self.time_step += self.config.simulation_speed;
        let (progress, updates_applied) = self.evaluate_progress(main.position.x, rng);

        // Walk phase of the first walk-cycle oscillator on each part
        let mut part_phase: Vec<Option<f32>> = vec![None; creature.parts.len()];
        for pattern in &self.patterns {
            if let (Some(slot), Some(phase)) = (
                part_phase.get_mut(pattern.target.0),
                pattern.walk_phase(self.time_step),
            ) {
                slot.get_or_insert(phase);
            }
        }

        let mut forces = Vec::with_capacity(self.patterns.len());
        for index in 0..self.patterns.len() {
            let target = self.patterns[index].target;
            let Some(state) = creature.part(target).and_then(|p| p.state(&*engine)) else {
                continue;
            };

            let force = self.pattern_force(index, creature, &state, &main, &part_phase, rng);
            if let Some(part) = creature.part(target) {
                part.apply_force(engine, force);
            }
            forces.push((target, force));

            self.adapt_direction(index, rng);
        }

        GaitTick {
            progress,
            forces,
            updates_applied,
        }
    }

    /// Compare the main body's x with the previous tick and let the strategy react
    fn evaluate_progress(&mut self, current_x: f32, rng: &mut dyn GaitRng) -> (Option<f32>, usize) {
        let Some(last) = self.last_position.replace(current_x) else {
            return (None, 0);
        };
        let progress = current_x - last;

        let updates = self.strategy.on_tick(progress, &self.patterns, rng);
        let mut applied = 0;
        for update in &updates {
            if let Some(pattern) = self.patterns.get_mut(update.index) {
                update.apply(&mut pattern.base);
                clamp_direction(&mut pattern.base.direction, &self.config);
                applied += 1;
            }
        }
        (Some(progress), applied)
    }

    fn pattern_force(
        &self,
        index: usize,
        creature: &mut Creature,
        state: &BodyState,
        main: &BodyState,
        part_phase: &[Option<f32>],
        rng: &mut dyn GaitRng,
    ) -> Vec2 {
        let pattern = &self.patterns[index];
        let base = &pattern.base;
        let t = self.time_step;
        let mass = state.mass.max(1e-3);
        let mass_scale = 1.0 / (1.0 + mass * self.config.mass_scale_coefficient);

        let angle = t * base.frequency + base.phase;
        let mut force = Vec2::new(
            angle.sin() * base.amplitude * base.direction.x * mass_scale,
            angle.cos() * base.amplitude * base.direction.y * mass_scale,
        );

        let side = creature.appendage_for(pattern.target).map(|a| a.is_left_side);

        match pattern.modifier {
            Modifier::WalkCycle(cycle) => {
                let contact_phase = (t * cycle.speed + cycle.phase_offset).sin();
                let in_contact = creature
                    .part(pattern.target)
                    .is_some_and(|p| p.is_in_contact);
                let phase = if in_contact && contact_phase > 0.0 {
                    LimbPhase::PushOff
                } else {
                    LimbPhase::Recovery
                };

                force += walk_force(&cycle, base.amplitude, mass, mass_scale, contact_phase, phase, side);

                if let Some(is_left) = side {
                    let ideal = if is_left {
                        -self.config.ideal_limb_offset
                    } else {
                        self.config.ideal_limb_offset
                    };
                    let deviation = (state.position.x - main.position.x) - ideal;
                    force.x -= self.config.centering_coefficient * base.amplitude * deviation;
                }

                if let Some(part) = creature.part_mut(pattern.target) {
                    if part.is_animating {
                        part.animation_color = Some(phase_tint(phase, contact_phase));
                    }
                }
            }
            Modifier::Jitter(bound) => {
                force.x += rng.range(-bound, bound);
                force.y += rng.range(-bound, bound);
            }
            Modifier::None => {}
        }

        let bias_factor = if side.is_some() {
            self.config.appendage_bias_factor
        } else {
            self.config.body_bias_factor
        };
        force.x += self.config.forward_bias * base.amplitude * bias_factor;

        // Same-side limbs swinging in step get damped to push towards alternation
        if let (Some(is_left), Some(own)) = (side, part_phase[pattern.target.0]) {
            if creature.appendages.len() > 1 {
                for other in &creature.appendages {
                    if other.part == pattern.target || other.is_left_side != is_left {
                        continue;
                    }
                    if let Some(other_phase) = part_phase.get(other.part.0).copied().flatten() {
                        if own * other_phase > 0.0 {
                            force *= self.config.sync_damping;
                        }
                    }
                }
            }
        }

        force
    }

    fn adapt_direction(&mut self, index: usize, rng: &mut dyn GaitRng) {
        let rate = self.config.learning_rate;
        let limit = self.config.max_adaptation;
        let base = &mut self.patterns[index].base;

        base.adaptation.x = (base.adaptation.x + rng.range(-rate, rate)).clamp(-limit, limit);
        base.adaptation.y = (base.adaptation.y + rng.range(-rate, rate)).clamp(-limit, limit);
        base.direction += base.adaptation;
        clamp_direction(&mut base.direction, &self.config);
    }
}

fn clamp_direction(direction: &mut Vec2, config: &GaitConfig) {
    direction.x = direction.x.clamp(config.direction_x_min, config.direction_x_max);
    direction.y = direction.y.clamp(config.direction_y_min, config.direction_y_max);
}

/// Walk-cycle contribution. `side` is `Some(is_left)` for appendages.
fn walk_force(
    cycle: &WalkCycle,
    amplitude: f32,
    mass: f32,
    mass_scale: f32,
    contact_phase: f32,
    phase: LimbPhase,
    side: Option<bool>,
) -> Vec2 {
    let mut force = Vec2::ZERO;

    match phase {
        LimbPhase::PushOff => {
            let strength = cycle.strength * amplitude * cycle.push_force * 1.5 * mass_scale;
            let outward = if side == Some(true) { -1.0 } else { 1.0 };

            force.x += strength * outward * (contact_phase * PI).sin() * 0.8;
            force.y -= strength * 0.2 * contact_phase.powi(2) * 0.7 / (mass * 2.0);

            // Grip at the start of the push
            if contact_phase < 0.3 {
                force.x -= strength * outward * 0.2 * (0.3 - contact_phase);
            }
        }
        LimbPhase::Recovery => {
            let lift = cycle.strength * amplitude * cycle.step_height * mass_scale * 1.2;
            let progress = (1.0 + contact_phase) / 2.0;

            force.y -= lift * 0.6 * (progress * PI).sin() * 0.6 / (1.0 + mass * 5.0);

            if let Some(is_left) = side {
                let inward = if is_left { 1.0 } else { -1.0 };
                if progress < 0.4 {
                    force.x += lift * 0.25 * inward * (0.4 - progress) * 2.5;
                } else {
                    let forward = (progress - 0.4) / 0.6;
                    force.x -= lift * 0.5 * inward * (forward * PI / 2.0).sin();
                }
            }
        }
    }

    force
}

fn phase_tint(phase: LimbPhase, contact_phase: f32) -> Color {
    let intensity = map_range(contact_phase.abs(), 0.0, 1.0, 100.0, 220.0).clamp(0.0, 255.0) as u8;
    match phase {
        LimbPhase::PushOff => [0, intensity, 0, TINT_ALPHA],
        LimbPhase::Recovery => [0, 0, intensity, TINT_ALPHA],
    }
}

/// Main-body sway, one walk-cycle oscillator per appendage, and optional
/// jitter oscillators.
fn build_patterns<E: PhysicsEngine + ?Sized>(
    creature: &Creature,
    engine: &E,
    config: &GaitConfig,
    rng: &mut dyn GaitRng,
) -> Vec<Oscillator> {
    let mut patterns = Vec::new();
    let Some(main) = creature.main_body() else {
        return patterns;
    };
    let main_y = main.state(engine).map_or(0.0, |s| s.position.y);

    patterns.push(Oscillator {
        target: PartId::MAIN,
        base: BaseParams {
            frequency: rng.range(0.01, 0.03),
            amplitude: rng.range(0.0003, 0.0008),
            phase: rng.range(0.0, TAU),
            direction: Vec2::new(rng.range(0.3, 0.8), rng.range(-0.3, -0.1)),
            adaptation: Vec2::ZERO,
            success_rate: 0.0,
        },
        modifier: Modifier::None,
    });

    for (is_left, side) in [(true, -1.0), (false, 1.0)] {
        let mut limbs: Vec<(PartId, f32)> = creature
            .appendages
            .iter()
            .filter(|a| a.is_left_side == is_left)
            .map(|a| {
                let y = creature
                    .part(a.part)
                    .and_then(|p| p.state(engine))
                    .map_or(main_y, |s| s.position.y);
                (a.part, (y - main_y).abs())
            })
            .collect();
        limbs.sort_by(|a, b| a.1.total_cmp(&b.1));

        let count = limbs.len() as f32;
        for (i, (part, _)) in limbs.into_iter().enumerate() {
            let phase_offset = if i % 2 == 0 { 0.0 } else { PI };
            let cycle = WalkCycle {
                speed: map_range(i as f32, 0.0, count, 0.12, 0.08) * 0.1,
                strength: map_range(i as f32, 0.0, count, 1.8, 0.8) * 0.2,
                phase_offset,
                step_height: rng.range(0.1, 0.3),
                push_force: rng.range(0.2, 0.5),
            };
            patterns.push(Oscillator {
                target: part,
                base: BaseParams {
                    frequency: rng.range(0.005, 0.01),
                    amplitude: rng.range(0.0001, 0.0003),
                    phase: rng.range(0.0, TAU) + phase_offset,
                    direction: Vec2::new(rng.range(0.05, 0.2) * side, rng.range(-0.1, 0.05)),
                    adaptation: Vec2::ZERO,
                    success_rate: 0.0,
                },
                modifier: Modifier::WalkCycle(cycle),
            });
        }
    }

    for part in creature.part_ids() {
        if rng.check_probability(config.jitter_probability) {
            patterns.push(Oscillator {
                target: part,
                base: BaseParams {
                    frequency: rng.range(0.02, 0.2),
                    amplitude: rng.range(0.0005, 0.0025),
                    phase: rng.range(0.0, TAU),
                    direction: Vec2::new(rng.range(-1.0, 1.0), rng.range(-1.0, 1.0)),
                    adaptation: Vec2::ZERO,
                    success_rate: 0.0,
                },
                modifier: Modifier::Jitter(rng.range(0.0001, 0.0005)),
            });
        }
    }

    patterns
}
