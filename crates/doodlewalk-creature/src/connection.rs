//! Attachment points between the main body and an appendage
//!
//! The attachment is the closest vertex pair between the two drawn
//! polygons. Each side is also stored relative to its own polygon's
//! centroid, which is the body-local frame the engine uses, so joints stay
//! valid while both bodies move and rotate.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::{local_to_world, Polygon};
use crate::traits::BodyState;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPoint {
    /// Body vertex in drawing space
    pub body_point_world: Vec2,
    /// Appendage vertex in drawing space
    pub appendage_point_world: Vec2,
    /// Body vertex relative to the body centroid
    pub body_local_offset: Vec2,
    /// Appendage vertex relative to the appendage centroid
    pub appendage_local_offset: Vec2,
    pub distance: f32,
}

impl ConnectionPoint {
    /// Live world positions of both attachment points
    pub fn world_points(&self, body: &BodyState, appendage: &BodyState) -> (Vec2, Vec2) {
        (
            local_to_world(body.position, body.angle, self.body_local_offset),
            local_to_world(appendage.position, appendage.angle, self.appendage_local_offset),
        )
    }

    /// Current distance between the attachment points
    pub fn gap(&self, body: &BodyState, appendage: &BodyState) -> f32 {
        let (a, b) = self.world_points(body, appendage);
        a.distance(b)
    }
}

/// Nearest-vertex search between two polygons
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionResolver;

impl ConnectionResolver {
    /// Exhaustive O(n*m) search; drawn polygons are small enough for it.
    /// Ties keep the first pair found in drawing order.
    pub fn resolve(&self, body: &Polygon, appendage: &Polygon) -> ConnectionPoint {
        let mut best = (body.points()[0], appendage.points()[0]);
        let mut min_distance = f32::INFINITY;

        for &body_point in body.points() {
            for &appendage_point in appendage.points() {
                let distance = body_point.distance(appendage_point);
                if distance < min_distance {
                    min_distance = distance;
                    best = (body_point, appendage_point);
                }
            }
        }

        let (body_point, appendage_point) = best;
        ConnectionPoint {
            body_point_world: body_point,
            appendage_point_world: appendage_point,
            body_local_offset: body_point - body.centroid(),
            appendage_local_offset: appendage_point - appendage.centroid(),
            distance: min_distance,
        }
    }
}
