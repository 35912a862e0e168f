//! Rays, line segments and 1D projections.

use glam::DVec2;

use super::vector::VectorExt;

/// A 2D ray used for point-in-polygon tests and intersection queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub pos: DVec2,
    /// Unit direction.
    pub dir: DVec2,
}

impl Ray {
    /// Create a ray. `dir` is normalized.
    pub fn new(pos: DVec2, dir: DVec2) -> Self {
        Self {
            pos,
            dir: dir.normalize_or_down(),
        }
    }

    /// Intersect with a line segment.
    ///
    /// Returns the ray time `t >= 0` of the hit when it lies on the segment.
    /// Parallel rays, zero-length segments and misses return `None`.
    pub fn intersect(&self, line: &Line) -> Option<f64> {
        let slope = line.slope_vector()?;
        let numerator = line.begin - self.pos;

        let divisor = self.dir.cross(slope);
        if divisor == 0.0 {
            return None;
        }

        let t = numerator.cross(slope) / divisor;
        if t < 0.0 {
            return None;
        }

        let u = numerator.cross(self.dir) / divisor / line.length();
        if (0.0..=1.0).contains(&u) {
            Some(t)
        } else {
            None
        }
    }

    /// Point along the ray at time `t`.
    #[inline]
    pub fn point_at(&self, t: f64) -> DVec2 {
        self.pos + self.dir * t
    }
}

/// A 2D line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub begin: DVec2,
    pub end: DVec2,
}

impl Line {
    pub fn new(begin: DVec2, end: DVec2) -> Self {
        Self { begin, end }
    }

    /// Unit direction from `begin` to `end`, `None` for a zero-length segment.
    pub fn slope_vector(&self) -> Option<DVec2> {
        let length = self.length();
        if length == 0.0 {
            None
        } else {
            Some(self.edge() / length)
        }
    }

    /// `end - begin`.
    #[inline]
    pub fn edge(&self) -> DVec2 {
        self.end - self.begin
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.begin.distance(self.end)
    }

    /// Unit normal of the segment.
    #[inline]
    pub fn normal(&self) -> DVec2 {
        self.edge().normal()
    }

    #[inline]
    pub fn midpoint(&self) -> DVec2 {
        (self.begin + self.end) * 0.5
    }
}

/// Extent of a shape projected onto an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub min: f64,
    pub max: f64,
}

impl Projection {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Strict overlap: touching projections do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Projection) -> bool {
        self.max > other.min && other.max > self.min
    }

    /// Length of the overlapping interval, 0 when disjoint.
    pub fn overlap(&self, other: &Projection) -> f64 {
        if !self.overlaps(other) {
            return 0.0;
        }
        if self.max > other.max {
            other.max - self.min
        } else {
            self.max - other.min
        }
    }
}
