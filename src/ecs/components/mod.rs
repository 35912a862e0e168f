//! ECS components for 2D actors.

pub mod physics;
pub mod transform;
