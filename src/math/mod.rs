//! 2D vector math, rays, line segments and axis projections.

pub mod ray;
pub mod vector;

pub use ray::{Line, Projection, Ray};
pub use vector::VectorExt;

pub use glam::DVec2;
