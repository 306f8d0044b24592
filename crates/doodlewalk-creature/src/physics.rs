//! Rigid body physics backed by rapier2d
//!
//! `RapierEngine` owns the rapier sets and exposes them through the
//! `PhysicsEngine` trait using index handles. Coordinates are y-down screen
//! space, so gravity points towards +y.

use glam::Vec2;
use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{CreatureError, Result};
use crate::traits::{BodyState, ConstraintDesc, MaterialProperties, PhysicsEngine};
use crate::types::{BodyHandle, JointHandle};

/// Drawn-world air friction is a per-frame velocity loss at 60 FPS;
/// rapier damping is per second.
const AIR_FRICTION_RATE: f32 = 60.0;

/// Gravity the gait constants are tuned against, in px/ms^2. A gait force
/// of `mass * GAIT_GRAVITY` cancels gravity.
const GAIT_GRAVITY: f32 = 0.001;

/// Engine tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Gravity in pixels/s^2 (y-down)
    pub gravity: Vec2,
    /// Fixed integration step in seconds
    pub dt: f32,
    /// Multiplier from gait force units to engine force units.
    /// Defaults to `gravity.y / 0.001` so gait forces keep their tuned ratio
    /// to gravity whatever the gravity setting.
    pub force_scale: f32,
    /// Motor stiffness used for a soft constraint of stiffness 1.0
    pub spring_stiffness: f32,
    /// Damping coefficient used for a constraint of damping 1.0
    pub spring_damping: f32,
    pub ground_center: Vec2,
    pub ground_half_extents: Vec2,
    pub ground_friction: f32,
    pub ground_restitution: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let gravity = Vec2::new(0.0, 300.0);
        Self {
            gravity,
            dt: 1.0 / 120.0,
            force_scale: gravity.y / GAIT_GRAVITY,
            spring_stiffness: 2000.0,
            spring_damping: 50.0,
            ground_center: Vec2::new(400.0, 400.0),
            ground_half_extents: Vec2::new(5000.0, 25.0),
            ground_friction: 0.8,
            ground_restitution: 0.2,
        }
    }
}

impl EngineConfig {
    /// y coordinate of the ground's top surface
    pub fn ground_top(&self) -> f32 {
        self.ground_center.y - self.ground_half_extents.y
    }
}

/// Rapier handles behind one arena slot
#[derive(Debug, Clone, Copy)]
struct EngineBody {
    rigid_body: RigidBodyHandle,
    collider: ColliderHandle,
}

/// Manages the rapier2d physics world
pub struct RapierEngine {
    /// Rapier rigid body set
    rigid_body_set: RigidBodySet,

    /// Rapier collider set
    collider_set: ColliderSet,

    /// Physics pipeline
    pipeline: PhysicsPipeline,

    /// Integration parameters
    integration_parameters: IntegrationParameters,

    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,

    gravity: Vector<Real>,
    force_scale: f32,
    spring_stiffness: f32,
    spring_damping: f32,

    /// Body arena; removed bodies leave a `None` slot so handles stay unique
    bodies: Vec<Option<EngineBody>>,

    /// Joint arena
    joints: Vec<Option<ImpulseJointHandle>>,

    /// Reverse lookup used when resolving contact pairs
    owners: HashMap<RigidBodyHandle, BodyHandle>,

    ground: Option<BodyHandle>,
}

impl RapierEngine {
    /// Create a world with the static ground described by `config`
    pub fn new(config: &EngineConfig) -> Self {
        let mut engine = Self::empty(config);

        let material = MaterialProperties {
            friction: config.ground_friction,
            restitution: config.ground_restitution,
            ..Default::default()
        };
        let ground = engine.create_static_body(
            config.ground_center,
            config.ground_half_extents,
            &material,
        );
        engine.ground = Some(ground);

        log::debug!(
            "Physics: Created ground at y={} ({}x{} pixels)",
            config.ground_center.y,
            config.ground_half_extents.x * 2.0,
            config.ground_half_extents.y * 2.0
        );

        engine
    }

    /// Create a world without any ground
    pub fn empty(config: &EngineConfig) -> Self {
        let integration_parameters = IntegrationParameters {
            dt: config.dt,
            ..Default::default()
        };

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            pipeline: PhysicsPipeline::new(),
            integration_parameters,
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            gravity: vector![config.gravity.x, config.gravity.y],
            force_scale: config.force_scale,
            spring_stiffness: config.spring_stiffness,
            spring_damping: config.spring_damping,
            bodies: Vec::new(),
            joints: Vec::new(),
            owners: HashMap::new(),
            ground: None,
        }
    }

    /// Number of live bodies (ground included)
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Number of live constraints
    pub fn joint_count(&self) -> usize {
        self.impulse_joint_set.len()
    }

    fn entry(&self, body: BodyHandle) -> Option<EngineBody> {
        self.bodies.get(body.0).copied().flatten()
    }

    fn insert(&mut self, rigid_body: RigidBody, collider: Collider) -> BodyHandle {
        let rigid_body = self.rigid_body_set.insert(rigid_body);
        let collider =
            self.collider_set
                .insert_with_parent(collider, rigid_body, &mut self.rigid_body_set);

        let handle = BodyHandle(self.bodies.len());
        self.bodies.push(Some(EngineBody {
            rigid_body,
            collider,
        }));
        self.owners.insert(rigid_body, handle);
        handle
    }

    fn collider_owner(&self, collider: ColliderHandle) -> Option<BodyHandle> {
        let parent = self.collider_set.get(collider)?.parent()?;
        self.owners.get(&parent).copied()
    }
}

/// Collision filter: members of a group ignore each other
fn interaction_groups(group: Option<u32>) -> InteractionGroups {
    match group {
        Some(id) => {
            let membership = Group::from_bits_truncate(1 << (1 + id % 31));
            InteractionGroups::new(membership, Group::ALL ^ membership)
        }
        None => InteractionGroups::all(),
    }
}

impl PhysicsEngine for RapierEngine {
    fn create_static_body(
        &mut self,
        center: Vec2,
        half_extents: Vec2,
        material: &MaterialProperties,
    ) -> BodyHandle {
        let rigid_body = RigidBodyBuilder::fixed()
            .translation(vector![center.x, center.y])
            .build();
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .friction(material.friction)
            .restitution(material.restitution)
            .collision_groups(interaction_groups(material.collision_group))
            .build();

        self.insert(rigid_body, collider)
    }

    fn create_polygon_body(
        &mut self,
        local_vertices: &[Vec2],
        position: Vec2,
        material: &MaterialProperties,
    ) -> BodyHandle {
        let points: Vec<Point<Real>> = local_vertices.iter().map(|v| point![v.x, v.y]).collect();

        // Hand-drawn outlines may be concave; the hull keeps the collider solid
        let builder = ColliderBuilder::convex_hull(&points).unwrap_or_else(|| {
            let radius = local_vertices
                .iter()
                .map(|v| v.length())
                .fold(1.0_f32, f32::max);
            log::debug!(
                "Physics: Degenerate hull for {} vertices, using ball r={:.1}",
                local_vertices.len(),
                radius
            );
            ColliderBuilder::ball(radius)
        });

        let damping = material.air_friction * AIR_FRICTION_RATE;
        let rigid_body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y])
            .linear_damping(damping)
            .angular_damping(damping)
            .build();

        let collider = builder
            .density(material.density)
            .friction(material.friction)
            .restitution(material.restitution)
            .collision_groups(interaction_groups(material.collision_group))
            .build();

        let handle = self.insert(rigid_body, collider);

        log::debug!(
            "Physics: Created polygon body {} at ({:.1}, {:.1}), density={}",
            handle,
            position.x,
            position.y,
            material.density
        );

        handle
    }

    fn create_constraint(&mut self, desc: &ConstraintDesc) -> JointHandle {
        let handle = JointHandle(self.joints.len());

        let (Some(a), Some(b)) = (self.entry(desc.body_a), self.entry(desc.body_b)) else {
            log::warn!(
                "Physics: Constraint between {} and {} references a removed body",
                desc.body_a,
                desc.body_b
            );
            self.joints.push(None);
            return handle;
        };

        let anchor_a = point![desc.local_a.x, desc.local_a.y];
        let anchor_b = point![desc.local_b.x, desc.local_b.y];

        // A rigid zero-length constraint is a pin. Softer ones leave every
        // axis free and pull the anchors together with position motors on x and y.
        let joint = if desc.stiffness >= 1.0 && desc.rest_length <= f32::EPSILON {
            let pin = RevoluteJointBuilder::new()
                .local_anchor1(anchor_a)
                .local_anchor2(anchor_b)
                .build();
            self.impulse_joint_set
                .insert(a.rigid_body, b.rigid_body, pin, true)
        } else {
            let stiffness = desc.stiffness * self.spring_stiffness;
            let damping = desc.damping * self.spring_damping;
            let soft = GenericJointBuilder::new(JointAxesMask::empty())
                .local_anchor1(anchor_a)
                .local_anchor2(anchor_b)
                .motor_position(JointAxis::X, desc.rest_length, stiffness, damping)
                .motor_position(JointAxis::Y, 0.0, stiffness, damping)
                .build();
            self.impulse_joint_set
                .insert(a.rigid_body, b.rigid_body, soft, true)
        };

        self.joints.push(Some(joint));
        handle
    }

    fn apply_force(&mut self, body: BodyHandle, world_point: Vec2, force: Vec2) {
        let Some(entry) = self.entry(body) else {
            return;
        };
        if let Some(rb) = self.rigid_body_set.get_mut(entry.rigid_body) {
            let scaled = force * self.force_scale;
            rb.add_force_at_point(
                vector![scaled.x, scaled.y],
                point![world_point.x, world_point.y],
                true,
            );
        }
    }

    fn query_collisions(&self, bodies: &[BodyHandle]) -> Result<Vec<(BodyHandle, BodyHandle)>> {
        let mut pairs = Vec::new();

        for &body in bodies {
            let entry = self.entry(body).ok_or(CreatureError::MissingBody(body))?;

            for pair in self.narrow_phase.contact_pairs_with(entry.collider) {
                if !pair.has_any_active_contact {
                    continue;
                }
                let other_collider = if pair.collider1 == entry.collider {
                    pair.collider2
                } else {
                    pair.collider1
                };
                let Some(other) = self.collider_owner(other_collider) else {
                    continue;
                };
                if bodies.contains(&other) || Some(other) == self.ground {
                    pairs.push((body.min(other), body.max(other)));
                }
            }
        }

        pairs.sort();
        pairs.dedup();
        Ok(pairs)
    }

    fn ground(&self) -> Option<BodyHandle> {
        self.ground
    }

    fn remove_body(&mut self, body: BodyHandle) {
        let Some(entry) = self.bodies.get_mut(body.0).and_then(Option::take) else {
            return;
        };
        self.owners.remove(&entry.rigid_body);
        if self.ground == Some(body) {
            self.ground = None;
        }

        // Removing the rigid body also drops its collider and attached joints
        self.rigid_body_set.remove(
            entry.rigid_body,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    fn remove_constraint(&mut self, joint: JointHandle) {
        if let Some(handle) = self.joints.get_mut(joint.0).and_then(Option::take) {
            self.impulse_joint_set.remove(handle, true);
        }
    }

    fn body_state(&self, body: BodyHandle) -> Option<BodyState> {
        let rb = self.rigid_body_set.get(self.entry(body)?.rigid_body)?;
        let translation = rb.translation();
        let linvel = rb.linvel();
        let com = rb.center_of_mass();
        Some(BodyState {
            position: Vec2::new(translation.x, translation.y),
            angle: rb.rotation().angle(),
            velocity: Vec2::new(linvel.x, linvel.y),
            mass: rb.mass(),
            center_of_mass: Vec2::new(com.x, com.y),
        })
    }

    fn set_body_position(&mut self, body: BodyHandle, position: Vec2) {
        let Some(entry) = self.entry(body) else {
            return;
        };
        if let Some(rb) = self.rigid_body_set.get_mut(entry.rigid_body) {
            rb.set_translation(vector![position.x, position.y], true);
        }
    }

    fn set_body_angle(&mut self, body: BodyHandle, angle: f32) {
        let Some(entry) = self.entry(body) else {
            return;
        };
        if let Some(rb) = self.rigid_body_set.get_mut(entry.rigid_body) {
            rb.set_rotation(Rotation::new(angle), true);
        }
    }

    fn step(&mut self) {
        let physics_hooks = ();
        let event_handler = ();

        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &physics_hooks,
            &event_handler,
        );

        // Rapier keeps user forces until reset; gait forces are per tick
        for (_, rb) in self.rigid_body_set.iter_mut() {
            rb.reset_forces(false);
        }
    }
}
