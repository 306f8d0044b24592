//! Error types for creature assembly and engine queries

use thiserror::Error;

use crate::types::BodyHandle;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CreatureError {
    #[error("Polygon {index} has {points} points, at least 3 are required")]
    InvalidPolygon { index: usize, points: usize },

    #[error("Polygon {index} contains a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },

    #[error("Physics body not found: {0}")]
    MissingBody(BodyHandle),

    #[error("Collision query failed: {0}")]
    CollisionQuery(String),
}

pub type Result<T> = std::result::Result<T, CreatureError>;
