//! 2D collision core: dynamic AABB tree broadphase and arcade collision response.
//!
//! # Architecture
//!
//! Every frame runs the same pipeline over the active actors:
//!
//! 1. Integrate motion (explicit Euler)
//! 2. Push movable actors out of static cell maps
//! 3. Refresh the resolver's broadphase state (`CollisionResolver::update`)
//! 4. Find overlapping pairs, deduplicated (`CollisionResolver::find_pairs`)
//! 5. Resolve each pair: emit events, correct positions, adjust velocities

pub mod broadphase;
pub mod cell_map;
pub mod collider;
pub mod contact;
pub mod error;
pub mod integrate;
pub mod narrowphase;
pub mod solver;
pub mod tree;

use glam::DVec2;

use crate::log::Logger;

pub use self::broadphase::{CollisionResolver, DynamicTreeResolver, NaiveResolver};
pub use self::cell_map::CellMap;
pub use self::collider::{BoundingBox, Side};
pub use self::contact::CollisionPair;
pub use self::error::{CollisionError, TreeError};
pub use self::narrowphase::SatPolygon;
pub use self::tree::{DynamicTree, NodeId, TreeConfig, TreeNode};

/// Broadphase strategy.
///
/// Separating-axis resolution of rotated polygons has no resolver; polygons
/// are available through [`SatPolygon`] only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollisionStrategy {
    /// Test every pair each frame.
    Naive,
    /// Prune pairs with a dynamic AABB tree.
    #[default]
    DynamicAabbTree,
}

impl CollisionStrategy {
    pub fn make_resolver(self, tree: TreeConfig, logger: Logger) -> Box<dyn CollisionResolver> {
        match self {
            CollisionStrategy::Naive => Box::new(NaiveResolver::new().with_logger(logger)),
            CollisionStrategy::DynamicAabbTree => {
                Box::new(DynamicTreeResolver::new(tree).with_logger(logger))
            }
        }
    }
}

/// Configuration for collision and motion.
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Default: [`CollisionStrategy::DynamicAabbTree`].
    pub strategy: CollisionStrategy,
    pub tree: TreeConfig,
    /// Added to the acceleration of active and elastic actors. Default: zero.
    pub gravity: DVec2,
    /// Fixed timestep for `Scene::step` in seconds. Default: 1/60.
    pub fixed_timestep: f64,
    /// Maximum number of sub-steps per `Scene::step`. Default: 4.
    pub max_substeps: u32,
    /// Maximum pushes out of each cell map per actor per frame. Default: 3.
    pub cell_map_passes: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            strategy: CollisionStrategy::default(),
            tree: TreeConfig::default(),
            gravity: DVec2::ZERO,
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 4,
            cell_map_passes: 3,
        }
    }
}
