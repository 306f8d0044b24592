//! Turning an unordered drawing into an articulated creature
//!
//! The largest polygon becomes the main body, every other polygon an
//! appendage pinned to it at the nearest vertex pair. Each appendage gets a
//! rigid primary joint plus two softer stabilizers so it can't spin about
//! the pin.

use glam::Vec2;

use crate::body_part::BodyPart;
use crate::config::{AssemblyConfig, MainBodySelection};
use crate::connection::ConnectionResolver;
use crate::creature::{Appendage, Creature, CreatureJoint, JointRole};
use crate::error::Result;
use crate::geometry::Polygon;
use crate::rng::{seeded, GaitRng};
use crate::traits::{ConstraintDesc, PhysicsEngine};
use crate::types::PartId;

#[derive(Debug, Clone, Default)]
pub struct CreatureAssembler {
    config: AssemblyConfig,
    resolver: ConnectionResolver,
}

impl CreatureAssembler {
    pub fn new(config: AssemblyConfig) -> Self {
        Self {
            config,
            resolver: ConnectionResolver,
        }
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    /// Index of the main-body polygon; ties keep the earliest drawn
    pub fn select_main_body(&self, polygons: &[Polygon]) -> Option<usize> {
        let score = |p: &Polygon| match self.config.main_body_selection {
            MainBodySelection::Area => p.area(),
            MainBodySelection::VertexCount => p.len() as f32,
        };

        let mut best: Option<(usize, f32)> = None;
        for (i, polygon) in polygons.iter().enumerate() {
            let s = score(polygon);
            if best.map_or(true, |(_, top)| s > top) {
                best = Some((i, s));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Build a creature with its main-body centroid at `baseline`.
    /// An empty drawing yields an empty creature.
    pub fn assemble<E: PhysicsEngine + ?Sized>(
        &self,
        polygons: Vec<Polygon>,
        engine: &mut E,
        baseline: Vec2,
        rng: &mut dyn GaitRng,
    ) -> Creature {
        let Some(main_index) = self.select_main_body(&polygons) else {
            log::debug!("Creature: empty drawing, nothing to assemble");
            return Creature::empty();
        };

        let mut polygons: Vec<Option<Polygon>> = polygons.into_iter().map(Some).collect();
        let Some(main_polygon) = polygons[main_index].take() else {
            return Creature::empty();
        };

        let main_centroid = main_polygon.centroid();
        let body_material = self.config.body_material(main_polygon.area());
        let main = BodyPart::spawn(main_polygon, baseline, &body_material, engine, rng);
        let main_body = main.body;

        let mut creature = Creature::empty();
        creature.parts.push(main);

        for polygon in polygons.into_iter().flatten() {
            let connection = self.resolver.resolve(&creature.parts[0].polygon, &polygon);
            let is_left_side = polygon.centroid().x < main_centroid.x;

            // Line the appendage's attachment vertex up with the body's
            let body_point = baseline + connection.body_local_offset;
            let position = body_point - connection.appendage_local_offset;

            let material = self.config.appendage_material(polygon.area());
            let part = BodyPart::spawn(polygon, position, &material, engine, rng);
            let part_body = part.body;

            let part_id = PartId(creature.parts.len());
            let appendage_index = creature.appendages.len();
            creature.parts.push(part);

            for (role, offset, stiffness) in self.joint_layout(connection.body_local_offset) {
                let local_body = connection.body_local_offset + offset;
                let local_appendage = connection.appendage_local_offset + offset;
                let handle = engine.create_constraint(&ConstraintDesc {
                    body_a: main_body,
                    body_b: part_body,
                    local_a: local_body,
                    local_b: local_appendage,
                    stiffness,
                    rest_length: 0.0,
                    damping: self.config.joint_damping,
                });
                creature.joints.push(CreatureJoint {
                    handle,
                    role,
                    appendage: appendage_index,
                    local_body,
                    local_appendage,
                });
            }

            creature.appendages.push(Appendage {
                part: part_id,
                is_left_side,
                index: appendage_index,
                connection,
            });

            log::debug!(
                "Creature: appendage {} on {} side, attach gap {:.1}",
                appendage_index,
                if is_left_side { "left" } else { "right" },
                connection.distance
            );
        }

        log::info!(
            "Creature: assembled {} parts ({} appendages, {} joints)",
            creature.parts.len(),
            creature.appendages.len(),
            creature.joints.len()
        );

        creature
    }

    /// Primary pin plus two stabilizers offset along each local axis
    fn joint_layout(&self, body_local: Vec2) -> [(JointRole, Vec2, f32); 3] {
        let s = self.config.stabilizer_offset;
        let inward = if body_local.x > 0.0 { -s } else { s };
        [
            (JointRole::Primary, Vec2::ZERO, self.config.primary_stiffness),
            (
                JointRole::Stabilizer,
                Vec2::new(inward, s),
                self.config.stabilizer_stiffness,
            ),
            (
                JointRole::Stabilizer,
                Vec2::new(0.0, -s),
                self.config.stabilizer_stiffness,
            ),
        ]
    }
}

/// Entry point for the drawing surface: validate raw point lists and build
/// a creature with default tuning.
pub fn build_creature<E: PhysicsEngine + ?Sized>(
    shapes: Vec<Vec<Vec2>>,
    engine: &mut E,
    baseline: Vec2,
) -> Result<Creature> {
    let polygons = Polygon::from_drawing(shapes)?;
    let mut rng = seeded(0);
    Ok(CreatureAssembler::default().assemble(polygons, engine, baseline, &mut rng))
}
