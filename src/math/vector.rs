//! Vector operations the collision code needs on top of `glam::DVec2`.

use glam::DVec2;

/// Extra 2D operations used by the collision primitives.
///
/// The y axis points down (screen space), so `perpendicular` rotates a
/// clockwise-wound edge into its outward normal.
pub trait VectorExt {
    /// Perpendicular vector `(y, -x)`.
    fn perpendicular(self) -> DVec2;

    /// Unit-length perpendicular. A zero vector yields `(0, 1)`.
    fn normal(self) -> DVec2;

    /// 2D cross product (z component of the 3D cross product).
    fn cross(self, other: DVec2) -> f64;

    /// Rotate around `anchor` by `angle` radians.
    fn rotate_about(self, angle: f64, anchor: DVec2) -> DVec2;

    /// Unit vector, or `(0, 1)` for a zero vector.
    fn normalize_or_down(self) -> DVec2;
}

impl VectorExt for DVec2 {
    #[inline]
    fn perpendicular(self) -> DVec2 {
        DVec2::new(self.y, -self.x)
    }

    #[inline]
    fn normal(self) -> DVec2 {
        self.perpendicular().normalize_or_down()
    }

    #[inline]
    fn cross(self, other: DVec2) -> f64 {
        self.perp_dot(other)
    }

    #[inline]
    fn rotate_about(self, angle: f64, anchor: DVec2) -> DVec2 {
        let (sin, cos) = angle.sin_cos();
        let local = self - anchor;
        anchor + DVec2::new(local.x * cos - local.y * sin, local.x * sin + local.y * cos)
    }

    #[inline]
    fn normalize_or_down(self) -> DVec2 {
        let length = self.length();
        if length > 0.0 {
            self / length
        } else {
            DVec2::Y
        }
    }
}
