//! Hand-drawn polygon creatures that learn to walk
//!
//! This crate implements:
//! - Assembly of drawn polygons into an articulated body (main body plus
//!   appendages pinned at their nearest vertices)
//! - Ground contact tracking with an animation decay window
//! - An oscillator gait controller with push-off/recovery walk cycles and
//!   stochastic hill-climbing adaptation
//! - A separation guard that keeps stretched joints visually attached
//! - A rapier2d backend behind the `PhysicsEngine` trait

pub mod adaptation;
pub mod assembly;
pub mod body_part;
pub mod config;
pub mod connection;
pub mod contact;
pub mod creature;
pub mod error;
pub mod gait;
pub mod geometry;
pub mod physics;
pub mod rng;
pub mod separation;
pub mod simulation;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_support;

use glam::Vec2;

// Re-export main types for convenience
pub use adaptation::{AdaptationStrategy, HillClimbStrategy, PatternUpdate};
pub use assembly::{build_creature, CreatureAssembler};
pub use body_part::BodyPart;
pub use config::{CreatureConfig, MainBodySelection};
pub use connection::{ConnectionPoint, ConnectionResolver};
pub use contact::ContactTracker;
pub use creature::{Appendage, Creature};
pub use error::{CreatureError, Result};
pub use gait::{GaitController, Modifier, Oscillator};
pub use geometry::Polygon;
pub use physics::{EngineConfig, RapierEngine};
pub use separation::SeparationGuard;
pub use simulation::{Simulation, TickReport};
pub use traits::{BodyState, MaterialProperties, PhysicsEngine};
pub use types::{BodyHandle, Color, JointHandle, PartId};

/// Render data for a single body part
#[derive(Debug, Clone)]
pub struct BodyPartRenderData {
    /// World-space outline
    pub outline: Vec<Vec2>,
    pub position: Vec2,
    pub rotation: f32,
    /// For a heading indicator
    pub velocity: Vec2,
    pub in_contact: bool,
    /// Animation tint while animating, fill color otherwise
    pub color: Color,
}

/// Render data for an entire creature
#[derive(Debug, Clone, Default)]
pub struct CreatureRenderData {
    pub body_parts: Vec<BodyPartRenderData>,
    /// Both anchors of every primary joint
    pub pivots: Vec<(Vec2, Vec2)>,
    /// Body and appendage attachment points per appendage
    pub connectors: Vec<(Vec2, Vec2)>,
}
