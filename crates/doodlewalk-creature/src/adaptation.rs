//! Online tuning of oscillator parameters
//!
//! The gait controller reports forward progress once per tick and applies
//! whatever parameter changes the strategy hands back. `HillClimbStrategy`
//! is a stochastic hill climber with a bounded memory of pattern sets that
//! were active while the creature moved forward.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;

use crate::config::GaitConfig;
use crate::gait::{BaseParams, Oscillator};
use crate::rng::GaitRng;

/// Replacement values for one oscillator. `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PatternUpdate {
    /// Index into the controller's pattern list
    pub index: usize,
    pub frequency: Option<f32>,
    pub amplitude: Option<f32>,
    pub phase: Option<f32>,
    pub direction: Option<Vec2>,
    pub success_rate: Option<f32>,
}

impl PatternUpdate {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    pub fn apply(&self, base: &mut BaseParams) {
        if let Some(frequency) = self.frequency {
            base.frequency = frequency;
        }
        if let Some(amplitude) = self.amplitude {
            base.amplitude = amplitude;
        }
        if let Some(phase) = self.phase {
            base.phase = phase;
        }
        if let Some(direction) = self.direction {
            base.direction = direction;
        }
        if let Some(success_rate) = self.success_rate {
            base.success_rate = success_rate;
        }
    }
}

/// Pluggable policy that turns progress into parameter changes
pub trait AdaptationStrategy: std::fmt::Debug {
    /// Called once per non-empty tick with the main body's x delta since
    /// the previous tick.
    fn on_tick(
        &mut self,
        progress: f32,
        patterns: &[Oscillator],
        rng: &mut dyn GaitRng,
    ) -> Vec<PatternUpdate>;

    /// Consecutive ticks without meaningful progress
    fn stuck_counter(&self) -> u32 {
        0
    }

    fn name(&self) -> &'static str;
}

/// Leaves every pattern as set up
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStrategy;

impl AdaptationStrategy for FixedStrategy {
    fn on_tick(&mut self, _: f32, _: &[Oscillator], _: &mut dyn GaitRng) -> Vec<PatternUpdate> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

#[derive(Debug, Clone)]
pub struct HillClimbStrategy {
    config: GaitConfig,
    stuck_counter: u32,
    history: VecDeque<Vec<BaseParams>>,
}

impl HillClimbStrategy {
    pub fn new(config: &GaitConfig) -> Self {
        Self {
            config: config.clone(),
            stuck_counter: 0,
            history: VecDeque::with_capacity(config.history_limit),
        }
    }

    /// Number of remembered successful pattern sets
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn remember(&mut self, patterns: &[Oscillator]) {
        if self.config.history_limit == 0 {
            return;
        }
        if self.history.len() >= self.config.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(patterns.iter().map(|p| p.base).collect());
    }

    fn reward(&mut self, patterns: &[Oscillator]) -> Vec<PatternUpdate> {
        self.remember(patterns);
        self.stuck_counter = 0;

        patterns
            .iter()
            .enumerate()
            .map(|(index, pattern)| {
                let base = &pattern.base;
                let mut update = PatternUpdate::new(index);
                update.success_rate = Some(base.success_rate + 0.1);
                if base.direction.x > 0.0 {
                    update.amplitude = Some(
                        (base.amplitude * self.config.amplitude_boost)
                            .min(self.config.max_amplitude),
                    );
                }
                update
            })
            .collect()
    }

    fn explore(&mut self, patterns: &[Oscillator], rng: &mut dyn GaitRng) -> Vec<PatternUpdate> {
        let mut next: Vec<BaseParams> = patterns.iter().map(|p| p.base).collect();
        let mut touched = vec![false; next.len()];

        for (base, touched) in next.iter_mut().zip(touched.iter_mut()) {
            if rng.check_probability(self.config.randomize_probability) {
                randomize(base, rng);
                *touched = true;
            }
        }
        // Being stuck must always change something
        if !next.is_empty() && !touched.iter().any(|t| *t) {
            let index = rng.index(next.len());
            randomize(&mut next[index], rng);
            touched[index] = true;
        }

        if !self.history.is_empty() {
            let pick = rng.index(self.history.len());
            let keep = self.config.blend_keep;
            for (base, remembered) in next.iter_mut().zip(&self.history[pick]) {
                base.frequency = keep * base.frequency + (1.0 - keep) * remembered.frequency;
                base.direction = keep * base.direction + (1.0 - keep) * remembered.direction;
            }
            touched.iter_mut().for_each(|t| *t = true);
        }

        log::debug!(
            "Gait: stuck, perturbed {} of {} patterns ({} remembered)",
            touched.iter().filter(|t| **t).count(),
            next.len(),
            self.history.len()
        );

        next.iter()
            .zip(&touched)
            .enumerate()
            .filter(|(_, (_, touched))| **touched)
            .map(|(index, (base, _))| PatternUpdate {
                index,
                frequency: Some(base.frequency),
                phase: Some(base.phase),
                direction: Some(base.direction),
                ..Default::default()
            })
            .collect()
    }
}

impl AdaptationStrategy for HillClimbStrategy {
    fn on_tick(
        &mut self,
        progress: f32,
        patterns: &[Oscillator],
        rng: &mut dyn GaitRng,
    ) -> Vec<PatternUpdate> {
        if progress > self.config.success_threshold {
            return self.reward(patterns);
        }
        if progress < self.config.stuck_threshold {
            self.stuck_counter += 1;
            if self.stuck_counter > self.config.stuck_limit {
                self.stuck_counter = 0;
                return self.explore(patterns, rng);
            }
        }
        Vec::new()
    }

    fn stuck_counter(&self) -> u32 {
        self.stuck_counter
    }

    fn name(&self) -> &'static str {
        "hill-climb"
    }
}

fn randomize(base: &mut BaseParams, rng: &mut dyn GaitRng) {
    base.phase = rng.range(0.0, TAU);
    base.frequency = rng.range(0.02, 0.2);
    base.direction.x += rng.range(-0.3, 0.3);
    base.direction.y += rng.range(-0.3, 0.3);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gait::Modifier;
    use crate::rng::seeded;
    use crate::types::PartId;

    fn pattern(direction_x: f32) -> Oscillator {
        Oscillator {
            target: PartId::MAIN,
            base: BaseParams {
                frequency: 0.01,
                amplitude: 0.001,
                phase: 0.5,
                direction: Vec2::new(direction_x, -0.2),
                adaptation: Vec2::ZERO,
                success_rate: 0.0,
            },
            modifier: Modifier::None,
        }
    }

    #[test]
    fn test_progress_keeps_counter_at_zero() {
        let mut strategy = HillClimbStrategy::new(&GaitConfig::default());
        let mut rng = seeded(1);
        let patterns = vec![pattern(0.5)];

        for _ in 0..300 {
            strategy.on_tick(1.0, &patterns, &mut rng);
            assert_eq!(strategy.stuck_counter(), 0);
        }
    }

    #[test]
    fn test_reward_boosts_forward_amplitude_only() {
        let mut strategy = HillClimbStrategy::new(&GaitConfig::default());
        let mut rng = seeded(2);
        let patterns = vec![pattern(0.5), pattern(-0.5)];

        let updates = strategy.on_tick(1.0, &patterns, &mut rng);
        assert_eq!(updates.len(), 2);
        assert!((updates[0].amplitude.unwrap() - 0.00105).abs() < 1e-9);
        assert_eq!(updates[1].amplitude, None);
        assert!((updates[1].success_rate.unwrap() - 0.1).abs() < 1e-6);
        assert_eq!(strategy.history_len(), 1);
    }

    #[test]
    fn test_amplitude_boost_capped() {
        let mut strategy = HillClimbStrategy::new(&GaitConfig::default());
        let mut rng = seeded(3);
        let mut patterns = vec![pattern(1.0)];
        patterns[0].base.amplitude = 0.0049;

        let updates = strategy.on_tick(2.0, &patterns, &mut rng);
        assert_eq!(updates[0].amplitude, Some(0.005));
    }

    #[test]
    fn test_history_is_bounded() {
        let config = GaitConfig {
            history_limit: 5,
            ..Default::default()
        };
        let mut strategy = HillClimbStrategy::new(&config);
        let mut rng = seeded(4);
        let patterns = vec![pattern(0.5)];
        for _ in 0..20 {
            strategy.on_tick(1.0, &patterns, &mut rng);
        }
        assert_eq!(strategy.history_len(), 5);
    }

    #[test]
    fn test_stuck_changes_phase_or_frequency() {
        let mut strategy = HillClimbStrategy::new(&GaitConfig::default());
        let patterns = vec![pattern(0.5), pattern(0.3), pattern(-0.1)];

        for seed in 0..20 {
            let mut rng = seeded(seed);
            let mut updates = Vec::new();
            for tick in 0..101 {
                updates = strategy.on_tick(0.0, &patterns, &mut rng);
                if tick < 100 {
                    assert!(updates.is_empty());
                }
            }
            assert_eq!(strategy.stuck_counter(), 0);

            let changed = updates.iter().any(|u| {
                let base = &patterns[u.index].base;
                u.phase.is_some_and(|p| p != base.phase)
                    || u.frequency.is_some_and(|f| f != base.frequency)
            });
            assert!(changed, "seed {seed} left every pattern untouched");
        }
    }

    #[test]
    fn test_middling_progress_neither_rewards_nor_counts() {
        let mut strategy = HillClimbStrategy::new(&GaitConfig::default());
        let mut rng = seeded(5);
        let patterns = vec![pattern(0.5)];

        strategy.on_tick(0.0, &patterns, &mut rng);
        assert_eq!(strategy.stuck_counter(), 1);
        assert!(strategy.on_tick(0.3, &patterns, &mut rng).is_empty());
        assert_eq!(strategy.stuck_counter(), 1);
    }

    #[test]
    fn test_blend_pulls_toward_remembered_frequency() {
        let config = GaitConfig {
            randomize_probability: 0.0,
            stuck_limit: 0,
            ..Default::default()
        };
        let mut strategy = HillClimbStrategy::new(&config);
        let mut rng = seeded(6);

        let mut good = vec![pattern(0.5), pattern(0.5)];
        good[0].base.frequency = 0.1;
        good[1].base.frequency = 0.1;
        strategy.on_tick(1.0, &good, &mut rng);

        let current = vec![pattern(0.5), pattern(0.5)];
        let updates = strategy.on_tick(0.0, &current, &mut rng);
        assert_eq!(updates.len(), 2);

        // One pattern was force-randomized before blending; the other
        // blends 0.01 and 0.1 at 70/30
        let blended: Vec<_> = updates
            .iter()
            .filter(|u| u.phase == Some(current[u.index].base.phase))
            .collect();
        assert_eq!(blended.len(), 1);
        assert!((blended[0].frequency.unwrap() - 0.037).abs() < 1e-6);
    }

    #[test]
    fn test_apply_sets_only_present_fields() {
        let mut base = pattern(0.5).base;
        let update = PatternUpdate {
            index: 0,
            phase: Some(1.0),
            ..Default::default()
        };
        update.apply(&mut base);
        assert_eq!(base.phase, 1.0);
        assert_eq!(base.frequency, 0.01);
    }

    #[test]
    fn test_fixed_strategy_never_updates() {
        let mut strategy = FixedStrategy;
        let mut rng = seeded(7);
        assert!(strategy.on_tick(0.0, &[pattern(0.5)], &mut rng).is_empty());
        assert_eq!(strategy.name(), "fixed");
    }
}
