//! Collision events.
//!
//! An actor that carries a [`CollisionEvents`] component receives one
//! [`CollisionEvent`] per resolved contact. Actors without it are still
//! resolved; their events are dropped.

use glam::DVec2;
use hecs::Entity;

use crate::physics::collider::Side;

/// One side of a resolved contact, seen from `actor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub actor: Entity,
    /// `None` for static geometry such as a cell map.
    pub other: Option<Entity>,
    /// Face of `actor` that was hit.
    pub side: Side,
    /// Translation that separates `actor` from `other`.
    pub intersection: DVec2,
}

impl CollisionEvent {
    pub const NAME: &'static str = "collision";
}

/// Per-actor queue of this frame's collision events.
#[derive(Debug, Clone, Default)]
pub struct CollisionEvents {
    events: Vec<CollisionEvent>,
}

impl CollisionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: CollisionEvent) {
        self.events.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollisionEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Whether any event this frame involved `other`.
    pub fn collided_with(&self, other: Entity) -> bool {
        self.events.iter().any(|e| e.other == Some(other))
    }
}

/// Push `event` onto its actor's queue, if the actor has one.
pub fn emit(world: &hecs::World, event: CollisionEvent) {
    if let Ok(mut queue) = world.get::<&mut CollisionEvents>(event.actor) {
        queue.emit(event);
    }
}
