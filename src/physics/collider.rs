//! Axis-aligned bounding boxes and contact sides.

use std::cmp::Ordering;

use glam::DVec2;

use crate::debug::{DebugColor, DebugDraw};

use super::narrowphase::SatPolygon;

/// Axis-aligned bounding box in world space (y grows downward).
///
/// `left <= right` and `top <= bottom` are expected; width and height are
/// meaningless otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoundingBox {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Box with its top-left corner at `pos`.
    pub fn from_size(pos: DVec2, size: DVec2) -> Self {
        Self::new(pos.x, pos.y, pos.x + size.x, pos.y + size.y)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Perimeter, the cost metric of the dynamic tree.
    #[inline]
    pub fn perimeter(&self) -> f64 {
        2.0 * (self.width() + self.height())
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        DVec2::new(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }

    /// Corners clockwise from the top-left.
    pub fn points(&self) -> [DVec2; 4] {
        [
            DVec2::new(self.left, self.top),
            DVec2::new(self.right, self.top),
            DVec2::new(self.right, self.bottom),
            DVec2::new(self.left, self.bottom),
        ]
    }

    pub fn to_polygon(&self) -> SatPolygon {
        SatPolygon::new(self.points().to_vec())
    }

    #[must_use]
    pub fn translate(&self, offset: DVec2) -> Self {
        Self::new(
            self.left + offset.x,
            self.top + offset.y,
            self.right + offset.x,
            self.bottom + offset.y,
        )
    }

    /// Grow every side by `margin`.
    #[must_use]
    pub fn inflate(&self, margin: f64) -> Self {
        Self::new(
            self.left - margin,
            self.top - margin,
            self.right + margin,
            self.bottom + margin,
        )
    }

    /// Point containment, edges inclusive.
    #[inline]
    pub fn contains_point(&self, p: DVec2) -> bool {
        self.left <= p.x && self.top <= p.y && self.bottom >= p.y && self.right >= p.x
    }

    /// Whether `other` lies strictly inside this box.
    #[inline]
    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        self.left < other.left
            && self.top < other.top
            && other.bottom < self.bottom
            && other.right < self.right
    }

    /// Smallest box containing both.
    #[inline]
    #[must_use]
    pub fn combine(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Minimum translation vector that moves `self` out of `other`.
    ///
    /// The boxes collide when their union is strictly narrower and strictly
    /// shorter than the sum of their extents; boxes that only share an edge do
    /// not collide. The result is axis-aligned: the axis of smaller overlap
    /// wins, ties go to the y axis.
    ///
    /// On each axis `self` is pushed toward the side where its center lies.
    /// Equal centers are ordered by extent (the narrower box goes toward
    /// negative), then by the other axis. Swapping the boxes negates the result
    /// unless the boxes are identical.
    pub fn collides(&self, other: &BoundingBox) -> Option<DVec2> {
        let total = self.combine(other);
        if total.width() >= other.width() + self.width()
            || total.height() >= other.height() + self.height()
        {
            return None;
        }

        let order_x = axis_order(self.left, self.right, other.left, other.right);
        let order_y = axis_order(self.top, self.bottom, other.top, other.bottom);

        let overlap_x = match order_x.then(order_y) {
            Ordering::Less => other.left - self.right,
            _ => other.right - self.left,
        };
        let overlap_y = match order_y.then(order_x) {
            Ordering::Less => other.top - self.bottom,
            _ => other.bottom - self.top,
        };

        if overlap_x.abs() < overlap_y.abs() {
            Some(DVec2::new(overlap_x, 0.0))
        } else {
            Some(DVec2::new(0.0, overlap_y))
        }
    }

    pub fn debug_draw(&self, ctx: &mut dyn DebugDraw) {
        ctx.stroke_rect(self, DebugColor::YELLOW);
    }
}

/// Order two intervals on one axis by center, then by length.
fn axis_order(min_a: f64, max_a: f64, min_b: f64, max_b: f64) -> Ordering {
    (min_a + max_a)
        .total_cmp(&(min_b + max_b))
        .then((max_a - min_a).total_cmp(&(max_b - min_b)))
}

/// Face of an actor involved in a collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    #[default]
    None,
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    #[must_use]
    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::None => Side::None,
        }
    }

    /// Side hit, derived from the translation that separates the actor.
    ///
    /// A push toward -x means the actor's right face was hit.
    pub fn from_intersection(intersection: DVec2) -> Side {
        if intersection.x.abs() > intersection.y.abs() {
            if intersection.x < 0.0 {
                Side::Right
            } else {
                Side::Left
            }
        } else if intersection.y < 0.0 {
            Side::Bottom
        } else {
            Side::Top
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bb(left: f64, top: f64, right: f64, bottom: f64) -> BoundingBox {
        BoundingBox::new(left, top, right, bottom)
    }

    #[test]
    fn test_extents() {
        let b = bb(1.0, 2.0, 4.0, 8.0);
        assert_eq!(b.width(), 3.0);
        assert_eq!(b.height(), 6.0);
        assert_eq!(b.perimeter(), 18.0);
        assert_eq!(b.center(), DVec2::new(2.5, 5.0));
    }

    #[test]
    fn test_combine_is_commutative_associative_idempotent() {
        let a = bb(0.0, 0.0, 10.0, 10.0);
        let b = bb(5.0, -3.0, 15.0, 4.0);
        let c = bb(-7.0, 2.0, 1.0, 30.0);
        assert_eq!(a.combine(&b), b.combine(&a));
        assert_eq!(a.combine(&b).combine(&c), a.combine(&b.combine(&c)));
        assert_eq!(a.combine(&a), a);
        assert_eq!(a.combine(&b), bb(0.0, -3.0, 15.0, 10.0));
    }

    #[test]
    fn test_contains() {
        let outer = bb(0.0, 0.0, 10.0, 10.0);
        assert!(outer.contains_point(DVec2::new(0.0, 10.0)));
        assert!(!outer.contains_point(DVec2::new(-0.1, 5.0)));
        assert!(outer.contains_box(&bb(1.0, 1.0, 9.0, 9.0)));
        assert!(
            !outer.contains_box(&bb(0.0, 1.0, 9.0, 9.0)),
            "shared edge is not strict containment"
        );
    }

    #[test]
    fn test_collides_overlap_depth() {
        let a = bb(0.0, 0.0, 10.0, 10.0);
        let b = bb(5.0, 5.0, 15.0, 15.0);
        let mtv = a.collides(&b).expect("boxes overlap");
        assert_eq!(mtv, DVec2::new(0.0, -5.0));

        // Moving b away by the reversed vector separates the boxes.
        let moved = b.translate(-mtv);
        assert_eq!(a.collides(&moved), None);
        assert_eq!(moved.collides(&a), None);
    }

    #[test]
    fn test_collides_is_antisymmetric() {
        let cases = [
            (bb(0.0, 0.0, 10.0, 10.0), bb(5.0, 5.0, 15.0, 15.0)),
            (bb(0.0, 0.0, 10.0, 10.0), bb(8.0, 0.0, 18.0, 10.0)),
            (bb(0.0, 0.0, 10.0, 10.0), bb(2.0, 7.0, 6.0, 20.0)),
            (bb(0.0, 0.0, 10.0, 10.0), bb(20.0, 20.0, 30.0, 30.0)),
        ];
        for (a, b) in cases {
            match (a.collides(&b), b.collides(&a)) {
                (Some(ab), Some(ba)) => assert_eq!(ab, -ba, "{a:?} vs {b:?}"),
                (None, None) => {}
                other => panic!("asymmetric result {other:?} for {a:?} vs {b:?}"),
            }
        }
    }

    #[test]
    fn test_collides_shared_extent_is_antisymmetric() {
        let a = bb(0.0, 0.0, 10.0, 10.0);
        let tall = bb(0.0, -5.0, 10.0, 15.0);
        let ab = a.collides(&tall).expect("boxes overlap");
        let ba = tall.collides(&a).expect("boxes overlap");
        assert_eq!(ab, -ba);
        assert_eq!(ab, DVec2::new(-10.0, 0.0));

        let same_row = bb(4.0, 0.0, 14.0, 10.0);
        assert_eq!(a.collides(&same_row), Some(DVec2::new(-6.0, 0.0)));
        assert_eq!(same_row.collides(&a), Some(DVec2::new(6.0, 0.0)));
    }

    #[test]
    fn test_collides_contained_box_leaves_by_nearest_side() {
        let outer = bb(0.0, 0.0, 10.0, 10.0);
        let inner = bb(1.0, 3.0, 3.0, 6.0);
        assert_eq!(inner.collides(&outer), Some(DVec2::new(-3.0, 0.0)));
        assert_eq!(outer.collides(&inner), Some(DVec2::new(3.0, 0.0)));
    }

    #[test]
    fn test_collides_picks_smaller_axis() {
        let a = bb(0.0, 0.0, 10.0, 10.0);
        let b = bb(8.0, 0.0, 18.0, 10.0);
        assert_eq!(a.collides(&b), Some(DVec2::new(-2.0, 0.0)));
        assert_eq!(b.collides(&a), Some(DVec2::new(2.0, 0.0)));
    }

    #[test]
    fn test_touching_boxes_do_not_collide() {
        let a = bb(0.0, 0.0, 10.0, 10.0);
        assert_eq!(a.collides(&bb(10.0, 0.0, 20.0, 10.0)), None);
        assert_eq!(a.collides(&bb(0.0, 10.0, 10.0, 20.0)), None);
        assert_eq!(a.collides(&bb(10.0, 10.0, 20.0, 20.0)), None);
    }

    #[test]
    fn test_side_from_intersection() {
        assert_eq!(Side::from_intersection(DVec2::new(-2.0, 0.0)), Side::Right);
        assert_eq!(Side::from_intersection(DVec2::new(2.0, 0.0)), Side::Left);
        assert_eq!(Side::from_intersection(DVec2::new(0.0, -2.0)), Side::Bottom);
        assert_eq!(Side::from_intersection(DVec2::new(0.0, 2.0)), Side::Top);
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Top.opposite(), Side::Bottom);
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::None.opposite(), Side::None);
        assert_eq!(Side::Right.opposite().opposite(), Side::Right);
    }
}
