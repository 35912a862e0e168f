//! Debug drawing collaborator.
//!
//! The collision core never renders. Resolvers and primitives describe their
//! state to whatever 2D context implements [`DebugDraw`].

use crate::math::Line;
use crate::physics::collider::BoundingBox;

/// Linear RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugColor(pub [f32; 4]);

impl DebugColor {
    pub const WHITE: Self = Self([1.0, 1.0, 1.0, 1.0]);
    pub const GREEN: Self = Self([0.0, 1.0, 0.0, 1.0]);
    pub const YELLOW: Self = Self([1.0, 1.0, 0.0, 1.0]);
}

/// A 2D drawing context.
pub trait DebugDraw {
    /// Outline an axis-aligned rectangle.
    fn stroke_rect(&mut self, bounds: &BoundingBox, color: DebugColor);

    /// Draw a line segment.
    fn stroke_line(&mut self, _line: &Line, _color: DebugColor) {}
}

/// Records every draw call; useful for tests and headless tools.
#[derive(Debug, Default)]
pub struct DrawRecorder {
    pub rects: Vec<(BoundingBox, DebugColor)>,
    pub lines: Vec<(Line, DebugColor)>,
}

impl DebugDraw for DrawRecorder {
    fn stroke_rect(&mut self, bounds: &BoundingBox, color: DebugColor) {
        self.rects.push((*bounds, color));
    }

    fn stroke_line(&mut self, line: &Line, color: DebugColor) {
        self.lines.push((*line, color));
    }
}
