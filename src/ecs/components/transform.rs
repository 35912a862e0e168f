//! 2D transform component.

use glam::DVec2;

/// Local-to-world placement of an actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2d {
    pub position: DVec2,
    /// Radians, clockwise with y down.
    pub rotation: f64,
    pub scale: DVec2,
}

impl Default for Transform2d {
    fn default() -> Self {
        Self {
            position: DVec2::ZERO,
            rotation: 0.0,
            scale: DVec2::ONE,
        }
    }
}

impl Transform2d {
    pub fn from_position(position: DVec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn from_xy(x: f64, y: f64) -> Self {
        Self::from_position(DVec2::new(x, y))
    }

    #[must_use]
    pub fn with_scale(mut self, scale: DVec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn translate(&mut self, offset: DVec2) {
        self.position += offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_default() {
        let t = Transform2d::default();
        assert_eq!(t.position, DVec2::ZERO);
        assert_eq!(t.rotation, 0.0);
        assert_eq!(t.scale, DVec2::ONE);
    }

    #[test]
    fn test_transform_translate() {
        let mut t = Transform2d::from_xy(1.0, 2.0);
        t.translate(DVec2::new(-3.0, 0.5));
        assert_eq!(t.position, DVec2::new(-2.0, 2.5));
    }
}
