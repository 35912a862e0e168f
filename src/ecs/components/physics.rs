//! Collision components for ECS entities.

use glam::DVec2;

use crate::physics::collider::BoundingBox;

use super::transform::Transform2d;

/// How an actor takes part in collision resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollisionType {
    /// Ignored by resolvers entirely.
    #[default]
    PreventCollision,
    /// Emits collision events but is never moved, and does not push others.
    Passive,
    /// Pushed out of non-passive actors; velocity clamped along the contact.
    Active,
    /// Like `Active`, but bounces off instead of stopping.
    Elastic,
    /// Emits events, pushes others, never moves.
    Fixed,
}

impl CollisionType {
    /// Whether resolution may translate an actor of this type.
    #[inline]
    pub fn is_movable(self) -> bool {
        matches!(self, CollisionType::Active | CollisionType::Elastic)
    }
}

/// Linear and angular motion, integrated with explicit Euler.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Motion {
    pub velocity: DVec2,
    pub acceleration: DVec2,
    pub angular_velocity: f64,
}

impl Motion {
    pub fn from_velocity(velocity: DVec2) -> Self {
        Self {
            velocity,
            ..Self::default()
        }
    }
}

/// Axis-aligned collision box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub size: DVec2,
    /// Fraction of the size that sits before the position on each axis.
    /// `(0, 0)` places the position at the top-left corner.
    pub anchor: DVec2,
    pub collision_type: CollisionType,
}

impl Collider {
    pub fn new(size: DVec2, collision_type: CollisionType) -> Self {
        Self {
            size,
            anchor: DVec2::ZERO,
            collision_type,
        }
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: DVec2) -> Self {
        self.anchor = anchor;
        self
    }

    /// World-space bounds under `transform`. Rotation is ignored.
    pub fn bounds(&self, transform: &Transform2d) -> BoundingBox {
        let extent = self.size * transform.scale;
        let top_left = transform.position - self.anchor * extent;
        BoundingBox::from_size(top_left, extent)
    }
}

impl Default for Collider {
    fn default() -> Self {
        Self::new(DVec2::splat(10.0), CollisionType::PreventCollision)
    }
}

/// Marks an actor for removal at the end of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Killed;

/// Named groups an actor belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollisionGroups(pub Vec<String>);

impl CollisionGroups {
    pub fn new<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(groups.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, group: &str) -> bool {
        self.0.iter().any(|g| g == group)
    }
}
