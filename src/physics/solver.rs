//! Arcade collision response.
//!
//! Resolving a pair emits a collision event on both actors, then applies
//! positional correction and a velocity response to whichever of them may
//! move. Nothing here conserves momentum.

use glam::DVec2;

use crate::ecs::components::physics::{Collider, CollisionType, Motion};
use crate::ecs::components::transform::Transform2d;
use crate::ecs::events::{self, CollisionEvent};

use super::collider::Side;
use super::contact::CollisionPair;

/// Resolve every pair in order.
pub fn resolve_pairs(world: &mut hecs::World, pairs: &[CollisionPair]) {
    for pair in pairs {
        resolve_pair(world, pair);
    }
}

/// Emit events for `pair` and push its actors apart.
///
/// `left` responds first; `right` then responds against `left`'s updated
/// velocity.
pub fn resolve_pair(world: &mut hecs::World, pair: &CollisionPair) {
    events::emit(
        world,
        CollisionEvent {
            actor: pair.left,
            other: Some(pair.right),
            side: pair.side,
            intersection: pair.intersect,
        },
    );
    events::emit(
        world,
        CollisionEvent {
            actor: pair.right,
            other: Some(pair.left),
            side: pair.side.opposite(),
            intersection: -pair.intersect,
        },
    );

    let (left, right) = match (
        BodyData::read(world, pair.left),
        BodyData::read(world, pair.right),
    ) {
        (Some(l), Some(r)) => (l, r),
        _ => return,
    };

    respond(world, pair.left, &left, &right, pair.side, pair.intersect);
    let Some(left) = BodyData::read(world, pair.left) else {
        return;
    };
    respond(
        world,
        pair.right,
        &right,
        &left,
        pair.side.opposite(),
        -pair.intersect,
    );
}

/// Snapshot of what the response needs from one actor.
#[derive(Debug, Clone, Copy)]
struct BodyData {
    collision_type: CollisionType,
    velocity: DVec2,
}

impl BodyData {
    fn read(world: &hecs::World, entity: hecs::Entity) -> Option<Self> {
        let collision_type = world.get::<&Collider>(entity).ok()?.collision_type;
        let velocity = world
            .get::<&Motion>(entity)
            .map_or(DVec2::ZERO, |m| m.velocity);
        Some(Self {
            collision_type,
            velocity,
        })
    }
}

fn respond(
    world: &mut hecs::World,
    entity: hecs::Entity,
    this: &BodyData,
    other: &BodyData,
    side: Side,
    intersect: DVec2,
) {
    if !this.collision_type.is_movable() || other.collision_type == CollisionType::Passive {
        return;
    }

    if let Ok(mut transform) = world.get::<&mut Transform2d>(entity) {
        transform.translate(intersect);
    }

    let Ok(mut motion) = world.get::<&mut Motion>(entity) else {
        return;
    };
    motion.velocity = if this.collision_type == CollisionType::Elastic {
        bounce(this.velocity, side)
    } else {
        clamp_velocity(this.velocity, other.velocity, intersect)
    };
}

/// Point the velocity component normal to `side` away from the contact.
pub(crate) fn bounce(velocity: DVec2, side: Side) -> DVec2 {
    let mut v = velocity;
    match side {
        Side::Left => v.x = v.x.abs(),
        Side::Right => v.x = -v.x.abs(),
        Side::Top => v.y = v.y.abs(),
        Side::Bottom => v.y = -v.y.abs(),
        Side::None => {}
    }
    v
}

/// Stop motion into the other actor along each axis the contact acts on,
/// keeping the slower of two velocities that point the same way.
fn clamp_velocity(mine: DVec2, theirs: DVec2, intersect: DVec2) -> DVec2 {
    let mut v = mine;
    if intersect.x != 0.0 {
        v.x = clamp_axis(mine.x, theirs.x);
    }
    if intersect.y != 0.0 {
        v.y = clamp_axis(mine.y, theirs.y);
    }
    v
}

fn clamp_axis(mine: f64, theirs: f64) -> f64 {
    if mine <= 0.0 && theirs <= 0.0 {
        mine.max(theirs)
    } else if mine >= 0.0 && theirs >= 0.0 {
        mine.min(theirs)
    } else {
        0.0
    }
}
