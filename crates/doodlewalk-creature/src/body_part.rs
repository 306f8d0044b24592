//! One drawn polygon turned into a rigid body
//!
//! The physics body itself belongs to the engine; a `BodyPart` keeps the
//! handle plus the display and contact state the gait and renderer read.

use glam::Vec2;

use crate::geometry::{local_to_world, Polygon};
use crate::rng::GaitRng;
use crate::traits::{BodyState, MaterialProperties, PhysicsEngine};
use crate::types::{BodyHandle, Color};

/// Alpha used for body fill colors
const FILL_ALPHA: u8 = 200;

#[derive(Debug, Clone)]
pub struct BodyPart {
    /// Source points as drawn
    pub polygon: Polygon,
    /// Engine body (owned by the engine, referenced here)
    pub body: BodyHandle,
    /// Vertices relative to the polygon centroid (body-local outline)
    pub center_offset: Vec<Vec2>,
    /// Centroid of the drawn polygon in drawing space
    pub drawn_centroid: Vec2,
    pub color: Color,
    /// Gait-phase tint while animating
    pub animation_color: Option<Color>,
    pub is_in_contact: bool,
    pub is_animating: bool,
    /// Tick of the most recent ground contact
    pub last_contact_time: Option<f32>,
}

impl BodyPart {
    /// Create the engine body for `polygon` with its centroid at `position`
    pub fn spawn<E: PhysicsEngine + ?Sized>(
        polygon: Polygon,
        position: Vec2,
        material: &MaterialProperties,
        engine: &mut E,
        rng: &mut dyn GaitRng,
    ) -> Self {
        let drawn_centroid = polygon.centroid();
        let center_offset = polygon.centered();
        let body = engine.create_polygon_body(&center_offset, position, material);

        Self {
            polygon,
            body,
            center_offset,
            drawn_centroid,
            color: random_fill(rng),
            animation_color: None,
            is_in_contact: false,
            is_animating: false,
            last_contact_time: None,
        }
    }

    pub fn state<E: PhysicsEngine + ?Sized>(&self, engine: &E) -> Option<BodyState> {
        engine.body_state(self.body)
    }

    /// Apply a force at the body's center of mass, so it adds no torque
    pub fn apply_force<E: PhysicsEngine + ?Sized>(&self, engine: &mut E, force: Vec2) {
        if let Some(state) = engine.body_state(self.body) {
            engine.apply_force(self.body, state.center_of_mass, force);
        }
    }

    /// Current outline in world space
    pub fn world_outline(&self, state: &BodyState) -> Vec<Vec2> {
        self.center_offset
            .iter()
            .map(|v| local_to_world(state.position, state.angle, *v))
            .collect()
    }

    /// Color the renderer should use right now
    pub fn display_color(&self) -> Color {
        match self.animation_color {
            Some(tint) if self.is_animating => tint,
            _ => self.color,
        }
    }
}

fn random_fill(rng: &mut dyn GaitRng) -> Color {
    [
        rng.range(100.0, 200.0) as u8,
        rng.range(100.0, 200.0) as u8,
        rng.range(100.0, 200.0) as u8,
        FILL_ALPHA,
    ]
}
