//! Ground contact detection
//!
//! Contact is best-effort: a missing ground or a failed engine query is
//! logged and treated as "nothing touching" for that tick.

use crate::config::ContactConfig;
use crate::creature::Creature;
use crate::traits::PhysicsEngine;

#[derive(Debug, Clone)]
pub struct ContactTracker {
    decay_window: f32,
}

impl Default for ContactTracker {
    fn default() -> Self {
        Self::new(&ContactConfig::default())
    }
}

impl ContactTracker {
    pub fn new(config: &ContactConfig) -> Self {
        Self {
            decay_window: config.decay_window,
        }
    }

    pub fn decay_window(&self) -> f32 {
        self.decay_window
    }

    /// Refresh contact flags for every part. `now` is the tick counter.
    /// Returns the number of parts touching the ground.
    pub fn update<E: PhysicsEngine + ?Sized>(
        &self,
        creature: &mut Creature,
        engine: &E,
        now: f32,
    ) -> usize {
        for part in &mut creature.parts {
            part.is_in_contact = false;
        }

        let touching = self.ground_contacts(creature, engine);
        for &index in &touching {
            let part = &mut creature.parts[index];
            part.is_in_contact = true;
            part.is_animating = true;
            part.last_contact_time = Some(now);
        }

        for part in &mut creature.parts {
            if part.is_in_contact || !part.is_animating {
                continue;
            }
            let expired = part
                .last_contact_time
                .map_or(true, |last| now - last > self.decay_window);
            if expired {
                part.is_animating = false;
                part.animation_color = None;
            }
        }

        touching.len()
    }

    /// Indices of parts touching the ground, deduplicated
    fn ground_contacts<E: PhysicsEngine + ?Sized>(
        &self,
        creature: &Creature,
        engine: &E,
    ) -> Vec<usize> {
        if creature.is_empty() {
            return Vec::new();
        }
        let Some(ground) = engine.ground() else {
            log::trace!("Contact: no ground body, skipping");
            return Vec::new();
        };

        let pairs = match engine.query_collisions(&creature.body_handles()) {
            Ok(pairs) => pairs,
            Err(e) => {
                log::warn!("Contact: collision query failed: {}", e);
                return Vec::new();
            }
        };

        let mut touching: Vec<usize> = pairs
            .into_iter()
            .filter_map(|(a, b)| match (a == ground, b == ground) {
                (true, false) => Some(b),
                (false, true) => Some(a),
                _ => None,
            })
            .filter_map(|body| creature.part_for_body(body).map(|id| id.0))
            .collect();
        touching.sort_unstable();
        touching.dedup();
        touching
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::CreatureAssembler;
    use crate::geometry::Polygon;
    use crate::rng::seeded;
    use crate::test_support::MockEngine;
    use glam::Vec2;

    fn two_part_creature(engine: &mut MockEngine) -> Creature {
        let body = Polygon::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(40.0, 0.0),
                Vec2::new(40.0, 30.0),
                Vec2::new(0.0, 30.0),
            ],
            0,
        )
        .unwrap();
        let leg = Polygon::new(
            vec![Vec2::new(-5.0, 30.0), Vec2::new(-10.0, 50.0), Vec2::new(-2.0, 50.0)],
            1,
        )
        .unwrap();
        let mut rng = seeded(3);
        CreatureAssembler::default().assemble(vec![body, leg], engine, Vec2::new(200.0, 300.0), &mut rng)
    }

    #[test]
    fn test_marks_part_touching_ground() {
        let mut engine = MockEngine::new();
        let mut creature = two_part_creature(&mut engine);
        engine.touch_ground(creature.parts[1].body);

        let count = ContactTracker::default().update(&mut creature, &engine, 5.0);

        assert_eq!(count, 1);
        assert!(!creature.parts[0].is_in_contact);
        assert!(creature.parts[1].is_in_contact);
        assert!(creature.parts[1].is_animating);
        assert_eq!(creature.parts[1].last_contact_time, Some(5.0));
    }

    #[test]
    fn test_part_pairs_without_ground_ignored() {
        let mut engine = MockEngine::new();
        let mut creature = two_part_creature(&mut engine);
        engine.contacts.push((creature.parts[0].body, creature.parts[1].body));

        let count = ContactTracker::default().update(&mut creature, &engine, 1.0);
        assert_eq!(count, 0);
        assert!(creature.parts.iter().all(|p| !p.is_in_contact));
    }

    #[test]
    fn test_flags_reset_each_tick() {
        let mut engine = MockEngine::new();
        let mut creature = two_part_creature(&mut engine);
        let tracker = ContactTracker::default();

        engine.touch_ground(creature.parts[0].body);
        tracker.update(&mut creature, &engine, 1.0);
        assert!(creature.parts[0].is_in_contact);

        engine.contacts.clear();
        tracker.update(&mut creature, &engine, 2.0);
        assert!(!creature.parts[0].is_in_contact);
        assert!(creature.parts[0].is_animating);
    }

    #[test]
    fn test_animation_decays_after_window() {
        let mut engine = MockEngine::new();
        let mut creature = two_part_creature(&mut engine);
        let tracker = ContactTracker::default();

        engine.touch_ground(creature.parts[1].body);
        tracker.update(&mut creature, &engine, 10.0);
        creature.parts[1].animation_color = Some([0, 150, 0, 150]);
        engine.contacts.clear();

        tracker.update(&mut creature, &engine, 25.0);
        assert!(creature.parts[1].is_animating, "15 ticks is inside the window");

        tracker.update(&mut creature, &engine, 30.0);
        assert!(creature.parts[1].is_animating, "20 ticks is not past the window");

        tracker.update(&mut creature, &engine, 31.0);
        assert!(!creature.parts[1].is_animating);
        assert_eq!(creature.parts[1].animation_color, None);
    }

    #[test]
    fn test_query_failure_means_no_contacts() {
        let mut engine = MockEngine::new();
        let mut creature = two_part_creature(&mut engine);
        engine.touch_ground(creature.parts[1].body);
        engine.fail_queries = true;

        let count = ContactTracker::default().update(&mut creature, &engine, 1.0);
        assert_eq!(count, 0);
        assert!(!creature.parts[1].is_in_contact);
    }

    #[test]
    fn test_missing_ground_means_no_contacts() {
        let mut engine = MockEngine::without_ground();
        let mut creature = two_part_creature(&mut engine);
        let count = ContactTracker::default().update(&mut creature, &engine, 1.0);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_empty_creature_is_noop() {
        let engine = MockEngine::new();
        let mut creature = Creature::empty();
        assert_eq!(ContactTracker::default().update(&mut creature, &engine, 1.0), 0);
    }
}
