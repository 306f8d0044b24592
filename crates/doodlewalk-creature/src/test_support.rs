//! In-memory physics engine for unit tests
//!
//! Records every call and never integrates; tests move bodies by hand.

use glam::Vec2;

use crate::error::{CreatureError, Result};
use crate::geometry::Polygon;
use crate::traits::{BodyState, ConstraintDesc, MaterialProperties, PhysicsEngine};
use crate::types::{BodyHandle, JointHandle};

#[derive(Debug, Clone)]
pub struct MockBody {
    pub vertices: Vec<Vec2>,
    pub position: Vec2,
    pub angle: f32,
    pub velocity: Vec2,
    pub mass: f32,
    pub material: MaterialProperties,
    pub is_static: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Body(BodyHandle),
    Joint(JointHandle),
}

#[derive(Debug, Default)]
pub struct MockEngine {
    bodies: Vec<Option<MockBody>>,
    pub constraints: Vec<Option<ConstraintDesc>>,
    /// (body, world point, force) applied since the last step
    pub forces: Vec<(BodyHandle, Vec2, Vec2)>,
    /// Pairs reported by `query_collisions`
    pub contacts: Vec<(BodyHandle, BodyHandle)>,
    pub fail_queries: bool,
    pub removals: Vec<Removal>,
    pub steps: usize,
    ground: Option<BodyHandle>,
}

impl MockEngine {
    /// Engine with a ground box whose top surface is at y=375
    pub fn new() -> Self {
        let mut engine = Self::without_ground();
        let ground = engine.create_static_body(
            Vec2::new(400.0, 400.0),
            Vec2::new(5000.0, 25.0),
            &MaterialProperties::default(),
        );
        engine.ground = Some(ground);
        engine
    }

    pub fn without_ground() -> Self {
        Self::default()
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&MockBody> {
        self.bodies.get(handle.0).and_then(Option::as_ref)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut MockBody> {
        self.bodies.get_mut(handle.0).and_then(Option::as_mut)
    }

    pub fn live_bodies(&self) -> usize {
        self.bodies.iter().flatten().count()
    }

    pub fn live_constraints(&self) -> usize {
        self.constraints.iter().flatten().count()
    }

    pub fn forces_on(&self, handle: BodyHandle) -> Vec<(Vec2, Vec2)> {
        self.forces
            .iter()
            .filter(|(body, _, _)| *body == handle)
            .map(|(_, point, force)| (*point, *force))
            .collect()
    }

    pub fn touch_ground(&mut self, handle: BodyHandle) {
        if let Some(ground) = self.ground {
            self.contacts.push((ground, handle));
        }
    }

    fn push(&mut self, body: MockBody) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len());
        self.bodies.push(Some(body));
        handle
    }
}

impl PhysicsEngine for MockEngine {
    fn create_static_body(
        &mut self,
        center: Vec2,
        half_extents: Vec2,
        material: &MaterialProperties,
    ) -> BodyHandle {
        self.push(MockBody {
            vertices: vec![
                -half_extents,
                Vec2::new(half_extents.x, -half_extents.y),
                half_extents,
                Vec2::new(-half_extents.x, half_extents.y),
            ],
            position: center,
            angle: 0.0,
            velocity: Vec2::ZERO,
            mass: f32::INFINITY,
            material: *material,
            is_static: true,
        })
    }

    fn create_polygon_body(
        &mut self,
        local_vertices: &[Vec2],
        position: Vec2,
        material: &MaterialProperties,
    ) -> BodyHandle {
        let area = Polygon::new(local_vertices.to_vec(), 0)
            .map(|p| p.area())
            .unwrap_or(0.0);
        self.push(MockBody {
            vertices: local_vertices.to_vec(),
            position,
            angle: 0.0,
            velocity: Vec2::ZERO,
            mass: (area * material.density).max(1e-3),
            material: *material,
            is_static: false,
        })
    }

    fn create_constraint(&mut self, desc: &ConstraintDesc) -> JointHandle {
        let handle = JointHandle(self.constraints.len());
        self.constraints.push(Some(*desc));
        handle
    }

    fn apply_force(&mut self, body: BodyHandle, world_point: Vec2, force: Vec2) {
        self.forces.push((body, world_point, force));
    }

    fn query_collisions(&self, bodies: &[BodyHandle]) -> Result<Vec<(BodyHandle, BodyHandle)>> {
        if self.fail_queries {
            return Err(CreatureError::CollisionQuery("mock failure".to_string()));
        }
        let relevant = |h: &BodyHandle| bodies.contains(h) || Some(*h) == self.ground;
        Ok(self
            .contacts
            .iter()
            .copied()
            .filter(|(a, b)| relevant(a) && relevant(b))
            .collect())
    }

    fn ground(&self) -> Option<BodyHandle> {
        self.ground
    }

    fn remove_body(&mut self, body: BodyHandle) {
        if let Some(slot) = self.bodies.get_mut(body.0) {
            if slot.take().is_some() {
                self.removals.push(Removal::Body(body));
            }
        }
    }

    fn remove_constraint(&mut self, joint: JointHandle) {
        if let Some(slot) = self.constraints.get_mut(joint.0) {
            if slot.take().is_some() {
                self.removals.push(Removal::Joint(joint));
            }
        }
    }

    fn body_state(&self, body: BodyHandle) -> Option<BodyState> {
        self.body(body).map(|b| BodyState {
            position: b.position,
            angle: b.angle,
            velocity: b.velocity,
            mass: b.mass,
            center_of_mass: b.position,
        })
    }

    fn set_body_position(&mut self, body: BodyHandle, position: Vec2) {
        if let Some(b) = self.body_mut(body) {
            b.position = position;
        }
    }

    fn set_body_angle(&mut self, body: BodyHandle, angle: f32) {
        if let Some(b) = self.body_mut(body) {
            b.angle = angle;
        }
    }

    fn step(&mut self) {
        self.steps += 1;
        self.forces.clear();
    }
}
