//! Actor motion integration.

use glam::DVec2;
use hecs::Entity;

use crate::ecs::components::physics::{Collider, Killed, Motion};
use crate::ecs::components::transform::Transform2d;

/// Explicit Euler step for the given actors: position from the current
/// velocity, then velocity from acceleration.
///
/// `gravity` is added to the acceleration of actors whose collision type lets
/// them move.
pub fn integrate_motion(world: &mut hecs::World, actors: &[Entity], dt: f64, gravity: DVec2) {
    for &entity in actors {
        let Ok((transform, motion, collider, killed)) = world
            .query_one_mut::<(&mut Transform2d, &mut Motion, Option<&Collider>, Option<&Killed>)>(
                entity,
            )
        else {
            continue;
        };
        if killed.is_some() {
            continue;
        }

        transform.position += motion.velocity * dt;
        transform.rotation += motion.angular_velocity * dt;

        let mut acceleration = motion.acceleration;
        if collider.map_or(false, |c| c.collision_type.is_movable()) {
            acceleration += gravity;
        }
        motion.velocity += acceleration * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::physics::CollisionType;

    #[test]
    fn test_position_uses_velocity_before_acceleration() {
        let mut world = hecs::World::new();
        let e = world.spawn((
            Transform2d::from_xy(0.0, 0.0),
            Motion {
                velocity: DVec2::new(10.0, 0.0),
                acceleration: DVec2::new(0.0, 4.0),
                angular_velocity: 1.0,
            },
        ));

        integrate_motion(&mut world, &[e], 0.5, DVec2::ZERO);

        let t = world.get::<&Transform2d>(e).unwrap();
        let m = world.get::<&Motion>(e).unwrap();
        assert_eq!(t.position, DVec2::new(5.0, 0.0));
        assert_eq!(t.rotation, 0.5);
        assert_eq!(m.velocity, DVec2::new(10.0, 2.0));
    }

    #[test]
    fn test_gravity_applies_to_movable_only() {
        let mut world = hecs::World::new();
        let ball = world.spawn((
            Transform2d::default(),
            Motion::default(),
            Collider::new(DVec2::splat(1.0), CollisionType::Active),
        ));
        let wall = world.spawn((
            Transform2d::default(),
            Motion::default(),
            Collider::new(DVec2::splat(1.0), CollisionType::Fixed),
        ));
        let gravity = DVec2::new(0.0, 10.0);

        integrate_motion(&mut world, &[ball, wall], 1.0, gravity);

        assert_eq!(world.get::<&Motion>(ball).unwrap().velocity, gravity);
        assert_eq!(world.get::<&Motion>(wall).unwrap().velocity, DVec2::ZERO);
    }

    #[test]
    fn test_killed_actors_do_not_move() {
        let mut world = hecs::World::new();
        let e = world.spawn((
            Transform2d::default(),
            Motion::from_velocity(DVec2::ONE),
            Killed,
        ));
        integrate_motion(&mut world, &[e], 1.0, DVec2::ZERO);
        assert_eq!(world.get::<&Transform2d>(e).unwrap().position, DVec2::ZERO);
    }
}
