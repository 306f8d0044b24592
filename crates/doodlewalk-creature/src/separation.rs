//! Hard positional correction for stretched joints
//!
//! Soft joints can stretch under strong gait forces. After the gait pass,
//! every appendage whose attachment point has drifted further than the
//! tolerance from the body's is teleported back onto the tolerance circle.

use std::f32::consts::PI;

use crate::config::SeparationConfig;
use crate::creature::Creature;
use crate::geometry::rotate;
use crate::traits::PhysicsEngine;

/// Corrections made in one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeparationReport {
    pub repositioned: usize,
    pub angles_snapped: usize,
}

#[derive(Debug, Clone)]
pub struct SeparationGuard {
    tolerance: f32,
}

impl Default for SeparationGuard {
    fn default() -> Self {
        Self::new(&SeparationConfig::default())
    }
}

impl SeparationGuard {
    pub fn new(config: &SeparationConfig) -> Self {
        Self {
            tolerance: config.tolerance.max(0.0),
        }
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn correct<E: PhysicsEngine + ?Sized>(
        &self,
        creature: &Creature,
        engine: &mut E,
    ) -> SeparationReport {
        let mut report = SeparationReport::default();
        let Some(main) = creature.main_body().and_then(|m| m.state(&*engine)) else {
            return report;
        };

        for appendage in &creature.appendages {
            let Some(part) = creature.part(appendage.part) else {
                continue;
            };
            let Some(state) = part.state(&*engine) else {
                continue;
            };
            let connection = &appendage.connection;
            let (body_point, appendage_point) = connection.world_points(&main, &state);
            let gap = appendage_point.distance(body_point);
            if gap <= self.tolerance {
                continue;
            }

            // Only a detached appendage gets its orientation reset
            let mut angle = state.angle;
            if (state.angle - main.angle).abs() > PI {
                angle = main.angle;
                engine.set_body_angle(part.body, angle);
                report.angles_snapped += 1;
            }

            let local = rotate(connection.appendage_local_offset, angle);
            let offset = (state.position + local) - body_point;
            let length = offset.length();
            if length <= self.tolerance {
                continue;
            }

            let target = body_point + offset / length * self.tolerance;
            engine.set_body_position(part.body, target - local);
            report.repositioned += 1;

            log::trace!(
                "Separation: appendage {} gap {:.2} pulled to {:.2}",
                appendage.index,
                gap,
                self.tolerance
            );
        }

        report
    }
}
