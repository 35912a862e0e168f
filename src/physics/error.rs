//! Collision error types.

use thiserror::Error;

use super::tree::{ChildSide, NodeId};

/// Broken dynamic tree invariant. Any of these means the tree can no longer
/// answer spatial queries correctly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("tree node {0:?} does not exist")]
    InvalidNode(NodeId),

    #[error("internal node {node:?} is missing its {side:?} child")]
    MissingChild { node: NodeId, side: ChildSide },

    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("leaf {0:?} is not the root and has no parent")]
    Detached(NodeId),

    #[error("tree corrupt at node {node:?}: {reason}")]
    Corrupt { node: NodeId, reason: &'static str },
}

/// Errors surfaced by resolvers and the scene.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollisionError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("entity {0:?} does not exist")]
    NoSuchEntity(hecs::Entity),
}
