//! Candidate collisions between two actors.

use glam::DVec2;
use hecs::Entity;

use super::collider::{BoundingBox, Side};

/// Two overlapping actors and the translation that separates `left` from
/// `right`.
///
/// Equality ignores order: `(a, b) == (b, a)`.
#[derive(Debug, Clone, Copy)]
pub struct CollisionPair {
    pub left: Entity,
    pub right: Entity,
    /// Moves `left` out of `right`.
    pub intersect: DVec2,
    /// Face of `left` that was hit.
    pub side: Side,
}

impl CollisionPair {
    pub fn new(left: Entity, right: Entity, intersect: DVec2) -> Self {
        Self {
            left,
            right,
            intersect,
            side: Side::from_intersection(intersect),
        }
    }

    /// Pair for two actors whose bounds overlap, `None` otherwise.
    pub fn between(
        left: Entity,
        left_bounds: &BoundingBox,
        right: Entity,
        right_bounds: &BoundingBox,
    ) -> Option<Self> {
        left_bounds
            .collides(right_bounds)
            .map(|intersect| Self::new(left, right, intersect))
    }

    pub fn involves(&self, entity: Entity) -> bool {
        self.left == entity || self.right == entity
    }

    /// The other participant, if `entity` is one of the two.
    pub fn other(&self, entity: Entity) -> Option<Entity> {
        if self.left == entity {
            Some(self.right)
        } else if self.right == entity {
            Some(self.left)
        } else {
            None
        }
    }
}

impl PartialEq for CollisionPair {
    fn eq(&self, other: &Self) -> bool {
        (self.left == other.left && self.right == other.right)
            || (self.left == other.right && self.right == other.left)
    }
}

impl Eq for CollisionPair {}

/// Append `pair` unless an equal pair is already present.
pub fn push_unique(pairs: &mut Vec<CollisionPair>, pair: CollisionPair) -> bool {
    if pairs.contains(&pair) {
        return false;
    }
    pairs.push(pair);
    true
}
