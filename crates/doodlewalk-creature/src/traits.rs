//! Physics engine access traits
//!
//! The creature code never integrates motion or resolves collisions itself.
//! These types define everything it needs from a rigid-body engine, so the
//! creature module stays decoupled from the engine implementation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{BodyHandle, JointHandle};

/// Surface and mass properties for a new body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    pub friction: f32,
    pub restitution: f32,
    pub density: f32,
    /// Linear damping ("air friction")
    pub air_friction: f32,
    /// Bodies sharing a group never collide with each other (they still hit the ground)
    pub collision_group: Option<u32>,
}

impl Default for MaterialProperties {
    fn default() -> Self {
        Self {
            friction: 0.5,
            restitution: 0.2,
            density: 0.01,
            air_friction: 0.01,
            collision_group: None,
        }
    }
}

/// Point-to-point constraint between two bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintDesc {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Anchor in body A's local frame
    pub local_a: Vec2,
    /// Anchor in body B's local frame
    pub local_b: Vec2,
    /// 0.0 (slack) to 1.0 (rigid)
    pub stiffness: f32,
    pub rest_length: f32,
    pub damping: f32,
}

/// Snapshot of a body's kinematic state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub angle: f32,
    pub velocity: Vec2,
    pub mass: f32,
    /// World-space center of mass; differs from `position` for hulls of concave outlines
    pub center_of_mass: Vec2,
}

/// Everything the creature core consumes from the physics engine
pub trait PhysicsEngine {
    /// Create an immovable box (the ground)
    fn create_static_body(
        &mut self,
        center: Vec2,
        half_extents: Vec2,
        material: &MaterialProperties,
    ) -> BodyHandle;

    /// Create a dynamic body from vertices given relative to `position`
    fn create_polygon_body(
        &mut self,
        local_vertices: &[Vec2],
        position: Vec2,
        material: &MaterialProperties,
    ) -> BodyHandle;

    fn create_constraint(&mut self, desc: &ConstraintDesc) -> JointHandle;

    /// Apply a force at a world-space point for the next step
    fn apply_force(&mut self, body: BodyHandle, world_point: Vec2, force: Vec2);

    /// Touching pairs among `bodies` plus the ground
    fn query_collisions(&self, bodies: &[BodyHandle]) -> Result<Vec<(BodyHandle, BodyHandle)>>;

    /// The static ground body, if one exists
    fn ground(&self) -> Option<BodyHandle>;

    fn remove_body(&mut self, body: BodyHandle);

    fn remove_constraint(&mut self, joint: JointHandle);

    fn body_state(&self, body: BodyHandle) -> Option<BodyState>;

    /// Teleport a body (hard positional correction, not a force)
    fn set_body_position(&mut self, body: BodyHandle, position: Vec2);

    fn set_body_angle(&mut self, body: BodyHandle, angle: f32);

    /// Advance the simulation by one fixed step
    fn step(&mut self);
}
