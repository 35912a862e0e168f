//! hecs integration: the components an actor carries and its event queue.

pub mod components;
pub mod events;

pub mod prelude {
    pub use super::components::physics::{Collider, CollisionGroups, CollisionType, Killed, Motion};
    pub use super::components::transform::Transform2d;
    pub use super::events::{CollisionEvent, CollisionEvents};
}
