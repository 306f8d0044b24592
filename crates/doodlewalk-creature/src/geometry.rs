//! Polygon geometry for drawn shapes
//!
//! Points are `glam::Vec2` in y-down screen space, the same space the
//! drawing surface captures them in.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{CreatureError, Result};

/// Minimum number of vertices for a usable polygon
pub const MIN_POLYGON_POINTS: usize = 3;

/// Closed polygon in drawing order (the closing edge is implicit)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Vec2>,
}

impl Polygon {
    /// Validate and wrap a point list. `index` is only used for error reporting.
    pub fn new(points: Vec<Vec2>, index: usize) -> Result<Self> {
        if points.len() < MIN_POLYGON_POINTS {
            return Err(CreatureError::InvalidPolygon {
                index,
                points: points.len(),
            });
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(CreatureError::NonFiniteCoordinate { index });
        }
        Ok(Self { points })
    }

    /// Validate a whole drawing in order
    pub fn from_drawing(shapes: Vec<Vec<Vec2>>) -> Result<Vec<Polygon>> {
        shapes
            .into_iter()
            .enumerate()
            .map(|(index, points)| Polygon::new(points, index))
            .collect()
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Signed area via the shoelace formula (positive for counter-clockwise
    /// winding in y-up space, i.e. clockwise on screen)
    pub fn signed_area(&self) -> f32 {
        let n = self.points.len();
        let mut twice_area = 0.0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            twice_area += a.x * b.y - b.x * a.y;
        }
        twice_area * 0.5
    }

    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }

    /// Area centroid, falling back to the vertex mean for degenerate
    /// (zero-area) polygons
    pub fn centroid(&self) -> Vec2 {
        let n = self.points.len();
        let mut twice_area = 0.0;
        let mut weighted = Vec2::ZERO;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let cross = a.x * b.y - b.x * a.y;
            twice_area += cross;
            weighted += (a + b) * cross;
        }

        if twice_area.abs() < 1e-6 {
            return self.vertex_mean();
        }
        weighted / (3.0 * twice_area)
    }

    fn vertex_mean(&self) -> Vec2 {
        self.points.iter().copied().sum::<Vec2>() / self.points.len() as f32
    }

    /// Vertices relative to the centroid (the body-local frame)
    pub fn centered(&self) -> Vec<Vec2> {
        let c = self.centroid();
        self.points.iter().map(|p| *p - c).collect()
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        self.points.contains(&point)
    }
}

/// Rotate a body-local offset by `angle` radians
pub fn rotate(offset: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(offset)
}

/// Transform a body-local point into world space
pub fn local_to_world(position: Vec2, angle: f32, local: Vec2) -> Vec2 {
    position + rotate(local, angle)
}

/// Linear remap of `value` from [in_min, in_max] to [out_min, out_max]
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    if (in_max - in_min).abs() < f32::EPSILON {
        return out_min;
    }
    out_min + (value - in_min) / (in_max - in_min) * (out_max - out_min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn square(size: f32, origin: Vec2) -> Polygon {
        Polygon::new(
            vec![
                origin,
                origin + Vec2::new(size, 0.0),
                origin + Vec2::new(size, size),
                origin + Vec2::new(0.0, size),
            ],
            0,
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_short_polygon() {
        let err = Polygon::new(vec![Vec2::ZERO, Vec2::X], 4).unwrap_err();
        assert_eq!(err, CreatureError::InvalidPolygon { index: 4, points: 2 });
    }

    #[test]
    fn test_rejects_non_finite() {
        let err = Polygon::new(vec![Vec2::ZERO, Vec2::X, Vec2::new(f32::NAN, 1.0)], 1)
            .unwrap_err();
        assert_eq!(err, CreatureError::NonFiniteCoordinate { index: 1 });
    }

    #[test]
    fn test_from_drawing_reports_index() {
        let shapes = vec![
            vec![Vec2::ZERO, Vec2::X, Vec2::Y],
            vec![Vec2::ZERO],
        ];
        let err = Polygon::from_drawing(shapes).unwrap_err();
        assert_eq!(err, CreatureError::InvalidPolygon { index: 1, points: 1 });
    }

    #[test]
    fn test_area_is_winding_independent() {
        let poly = square(10.0, Vec2::ZERO);
        let mut reversed = poly.points().to_vec();
        reversed.reverse();
        let reversed = Polygon::new(reversed, 0).unwrap();

        assert!((poly.area() - 100.0).abs() < 1e-4);
        assert!((reversed.area() - 100.0).abs() < 1e-4);
        assert!((poly.signed_area() + reversed.signed_area()).abs() < 1e-4);
    }

    #[test]
    fn test_centroid_of_square() {
        let poly = square(10.0, Vec2::new(20.0, 30.0));
        let c = poly.centroid();
        assert!((c - Vec2::new(25.0, 35.0)).length() < 1e-4);
    }

    #[test]
    fn test_centroid_degenerate_falls_back_to_mean() {
        let line = Polygon::new(
            vec![Vec2::ZERO, Vec2::new(5.0, 0.0), Vec2::new(10.0, 0.0)],
            0,
        )
        .unwrap();
        assert!((line.centroid() - Vec2::new(5.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_centered_sums_to_zero_for_symmetric_shape() {
        let poly = square(4.0, Vec2::new(100.0, 100.0));
        let sum: Vec2 = poly.centered().into_iter().sum();
        assert!(sum.length() < 1e-3);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let rotated = rotate(Vec2::new(1.0, 0.0), PI / 2.0);
        assert!((rotated - Vec2::new(0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_map_range() {
        assert!((map_range(0.5, 0.0, 1.0, 100.0, 220.0) - 160.0).abs() < 1e-4);
        assert!((map_range(1.0, 0.0, 2.0, 0.12, 0.08) - 0.10).abs() < 1e-6);
        assert_eq!(map_range(3.0, 1.0, 1.0, 7.0, 9.0), 7.0);
    }
}
