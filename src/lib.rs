//! Rein 2D Collision Core
//!
//! Broadphase collision detection over a dynamic AABB tree and arcade-style
//! collision response for 2D actors stored in a hecs world.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **math** - Vector extensions, rays, segments and projections
//! 2. **physics** - AABB and SAT primitives, the dynamic tree, resolvers, response
//! 3. **ecs** - Actor components and collision event queues
//! 4. **scene** - Per-frame integration glue
//! 5. **debug** - Drawing-context collaborator for debug overlays
//! 6. **log** - Injected tracing dispatch

pub mod debug;
pub mod ecs;
pub mod log;
pub mod math;
pub mod physics;
pub mod scene;

// Re-export commonly used types
pub use debug::{DebugColor, DebugDraw, DrawRecorder};

pub use ecs::prelude::*;

pub use log::Logger;

pub use math::{Line, Projection, Ray, VectorExt};

pub use physics::{
    BoundingBox, CellMap, CollisionError, CollisionPair, CollisionResolver, CollisionStrategy,
    DynamicTree, DynamicTreeResolver, NaiveResolver, NodeId, PhysicsConfig, SatPolygon, Side,
    TreeConfig, TreeError, TreeNode,
};

pub use scene::{ActorBuilder, FrameReport, Scene};

pub use glam;
pub use hecs;
