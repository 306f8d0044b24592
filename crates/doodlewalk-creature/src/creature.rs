//! Assembled creature: body parts, appendage metadata and joints
//!
//! Parts live in a flat arena indexed by `PartId`; the main body is always
//! part 0. Joints are engine handles kept only so teardown can remove them.

use glam::Vec2;

use crate::body_part::BodyPart;
use crate::connection::ConnectionPoint;
use crate::geometry::local_to_world;
use crate::traits::PhysicsEngine;
use crate::types::{BodyHandle, JointHandle, PartId};
use crate::{BodyPartRenderData, CreatureRenderData};

/// A limb attached to the main body
#[derive(Debug, Clone)]
pub struct Appendage {
    pub part: PartId,
    /// Fixed at assembly from the drawn centroids, never recomputed
    pub is_left_side: bool,
    /// Position among the appendages in drawing order
    pub index: usize,
    pub connection: ConnectionPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointRole {
    /// Zero-length rigid pin at the attachment point
    Primary,
    /// Softer offset joint resisting rotation about the pin
    Stabilizer,
}

#[derive(Debug, Clone, Copy)]
pub struct CreatureJoint {
    pub handle: JointHandle,
    pub role: JointRole,
    /// Index into `Creature::appendages`
    pub appendage: usize,
    pub local_body: Vec2,
    pub local_appendage: Vec2,
}

#[derive(Debug, Clone, Default)]
pub struct Creature {
    pub parts: Vec<BodyPart>,
    pub appendages: Vec<Appendage>,
    pub joints: Vec<CreatureJoint>,
}

impl Creature {
    /// Creature with no parts (assembled from an empty drawing)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn main_body(&self) -> Option<&BodyPart> {
        self.parts.first()
    }

    pub fn part(&self, id: PartId) -> Option<&BodyPart> {
        self.parts.get(id.0)
    }

    pub fn part_mut(&mut self, id: PartId) -> Option<&mut BodyPart> {
        self.parts.get_mut(id.0)
    }

    pub fn part_ids(&self) -> impl Iterator<Item = PartId> {
        (0..self.parts.len()).map(PartId)
    }

    pub fn body_handles(&self) -> Vec<BodyHandle> {
        self.parts.iter().map(|p| p.body).collect()
    }

    pub fn part_for_body(&self, body: BodyHandle) -> Option<PartId> {
        self.parts.iter().position(|p| p.body == body).map(PartId)
    }

    pub fn appendage_for(&self, part: PartId) -> Option<&Appendage> {
        self.appendages.iter().find(|a| a.part == part)
    }

    /// Remove every joint, then every body, from the engine.
    /// Joints go first so the engine never sees a constraint on a missing body.
    pub fn destroy<E: PhysicsEngine + ?Sized>(&mut self, engine: &mut E) {
        for joint in self.joints.drain(..) {
            engine.remove_constraint(joint.handle);
        }
        for part in self.parts.drain(..) {
            engine.remove_body(part.body);
        }
        self.appendages.clear();
    }

    /// Live world positions of each appendage's attachment pair
    pub fn connector_lines<E: PhysicsEngine + ?Sized>(&self, engine: &E) -> Vec<(Vec2, Vec2)> {
        let Some(main) = self.main_body().and_then(|m| m.state(engine)) else {
            return Vec::new();
        };
        self.appendages
            .iter()
            .filter_map(|appendage| {
                let state = self.part(appendage.part)?.state(engine)?;
                Some(appendage.connection.world_points(&main, &state))
            })
            .collect()
    }

    /// World positions of both anchors of every primary joint
    pub fn pivot_points<E: PhysicsEngine + ?Sized>(&self, engine: &E) -> Vec<(Vec2, Vec2)> {
        let Some(main) = self.main_body().and_then(|m| m.state(engine)) else {
            return Vec::new();
        };
        self.joints
            .iter()
            .filter(|j| j.role == JointRole::Primary)
            .filter_map(|joint| {
                let appendage = self.appendages.get(joint.appendage)?;
                let state = self.part(appendage.part)?.state(engine)?;
                Some((
                    local_to_world(main.position, main.angle, joint.local_body),
                    local_to_world(state.position, state.angle, joint.local_appendage),
                ))
            })
            .collect()
    }

    pub fn render_data<E: PhysicsEngine + ?Sized>(&self, engine: &E) -> CreatureRenderData {
        let body_parts = self
            .parts
            .iter()
            .filter_map(|part| {
                let state = part.state(engine)?;
                Some(BodyPartRenderData {
                    outline: part.world_outline(&state),
                    position: state.position,
                    rotation: state.angle,
                    velocity: state.velocity,
                    in_contact: part.is_in_contact,
                    color: part.display_color(),
                })
            })
            .collect();

        CreatureRenderData {
            body_parts,
            pivots: self.pivot_points(engine),
            connectors: self.connector_lines(engine),
        }
    }
}
