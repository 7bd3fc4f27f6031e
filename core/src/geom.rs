//! Geometry kernel — point-to-segment projection.
//!
//! Pure functions, no state. Everything the collision engine knows
//! about geometry lives here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Result of projecting a point onto the infinite line through a segment.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    /// Perpendicular squared distance from the point to the line.
    pub sq_distance: f64,
    /// Scalar projection ratio: 0 at the segment start, 1 at the end.
    pub ratio: f64,
}

impl Projection {
    /// True when the projection lands on the segment and the point is
    /// within `radius` of it.
    pub fn is_hit(&self, radius: f64) -> bool {
        self.ratio >= 0.0 && self.ratio <= 1.0 && self.sq_distance <= radius * radius
    }
}

/// Project `point` onto the segment `start -> end`.
///
/// The segment must have nonzero length; a degenerate segment is a
/// programming error, not a recoverable condition.
pub fn project_point(start: Point2, end: Point2, point: Point2) -> Projection {
    debug_assert!(
        start != end,
        "project_point called with a zero-length segment"
    );
    let u_x = point.x - start.x;
    let u_y = point.y - start.y;
    let v_x = end.x - start.x;
    let v_y = end.y - start.y;
    let u_dot_v = u_x * v_x + u_y * v_y;
    let u_len2 = u_x * u_x + u_y * u_y;
    let v_len2 = v_x * v_x + v_y * v_y;

    Projection {
        sq_distance: u_len2 - (u_dot_v * u_dot_v) / v_len2,
        ratio: u_dot_v / v_len2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_onto_vertical_segment() {
        let p = project_point(
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.5),
            Point2::new(0.19, 1.0),
        );
        assert!((p.ratio - 1.0 / 1.5).abs() < 1e-9);
        assert!((p.sq_distance - 0.0361).abs() < 1e-9);
    }

    #[test]
    fn hit_requires_ratio_in_segment_range() {
        let p = project_point(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        );
        assert!(p.ratio > 1.0);
        assert!(!p.is_hit(0.5));
    }
}
