//! Separating-axis test for convex polygons.
//!
//! Not used by either resolver; actors collide through their bounding boxes.

use glam::DVec2;

use crate::debug::{DebugColor, DebugDraw};
use crate::math::{Line, Projection, Ray};

use super::collider::BoundingBox;

/// Convex polygon with consistently wound vertices, in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct SatPolygon {
    points: Vec<DVec2>,
}

impl SatPolygon {
    pub fn new(points: Vec<DVec2>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    /// Edges in winding order, closing back to the first vertex.
    pub fn sides(&self) -> Vec<Line> {
        let len = self.points.len();
        (0..len)
            .map(|i| Line::new(self.points[i], self.points[(i + 1) % len]))
            .collect()
    }

    /// Unit normal of every edge.
    pub fn axes(&self) -> Vec<DVec2> {
        self.sides().iter().map(Line::normal).collect()
    }

    /// Project every vertex onto `axis`.
    pub fn project(&self, axis: DVec2) -> Projection {
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        for p in &self.points {
            let d = p.dot(axis);
            min = min.min(d);
            max = max.max(d);
        }
        Projection::new(min, max)
    }

    /// Axis-aligned box around the polygon.
    pub fn bounds(&self) -> BoundingBox {
        let mut min = DVec2::splat(f64::MAX);
        let mut max = DVec2::splat(f64::MIN);
        for p in &self.points {
            min = min.min(*p);
            max = max.max(*p);
        }
        BoundingBox::new(min.x, min.y, max.x, max.y)
    }

    pub fn width(&self) -> f64 {
        self.bounds().width()
    }

    pub fn height(&self) -> f64 {
        self.bounds().height()
    }

    /// Point-in-polygon by casting a ray toward +x and counting crossings.
    pub fn contains(&self, p: DVec2) -> bool {
        let ray = Ray::new(p, DVec2::X);
        let crossings = self
            .sides()
            .iter()
            .filter(|side| ray.intersect(side).is_some())
            .count();
        crossings % 2 == 1
    }

    /// Minimum translation vector between two polygons.
    ///
    /// Tests every edge normal of both polygons and stops at the first
    /// separating axis. Among overlapping axes the smallest overlap wins;
    /// later axes replace earlier ones on ties.
    pub fn collides(&self, other: &SatPolygon) -> Option<DVec2> {
        let mut min_overlap = f64::MAX;
        let mut min_axis = None;

        for axis in self.axes().into_iter().chain(other.axes()) {
            let overlap = self.project(axis).overlap(&other.project(axis));
            if overlap == 0.0 {
                return None;
            }
            if overlap <= min_overlap {
                min_overlap = overlap;
                min_axis = Some(axis);
            }
        }

        min_axis.map(|axis| axis * min_overlap)
    }

    pub fn debug_draw(&self, ctx: &mut dyn DebugDraw) {
        for side in self.sides() {
            ctx.stroke_line(&side, DebugColor::YELLOW);
        }
    }
}
