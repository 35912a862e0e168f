//! Dynamic bounding volume tree.
//!
//! A binary tree of fattened AABBs over actors, stored in an arena of nodes.
//! Leaves carry an actor's fattened bounds; every internal node has exactly two
//! children and bounds equal to the union of theirs. Insertion picks a sibling
//! with a perimeter cost heuristic, and every insert or remove walks back up to
//! the root, rotating on height imbalance and refitting bounds and heights.
//!
//! Parent links are arena indices, never owning references.

use std::collections::HashMap;

use glam::DVec2;
use hecs::Entity;

use crate::debug::{DebugColor, DebugDraw};
use crate::log::Logger;

use super::collider::BoundingBox;
use super::error::TreeError;

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Which child slot of an internal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildSide {
    Left,
    Right,
}

/// A node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub parent: Option<NodeId>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    /// Fattened actor bounds for leaves, union of children otherwise.
    pub bounds: BoundingBox,
    /// 0 for leaves, `1 + max(child heights)` otherwise.
    pub height: i32,
    /// Owning actor, leaves only.
    pub entity: Option<Entity>,
}

impl TreeNode {
    fn leaf(entity: Entity, bounds: BoundingBox) -> Self {
        Self {
            parent: None,
            left: None,
            right: None,
            bounds,
            height: 0,
            entity: Some(entity),
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Margins used when fattening leaf bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeConfig {
    /// Margin added on every side when an actor is first registered. Default: 2.
    pub registration_padding: f64,
    /// Margin added on every side when a moved actor is reinserted. Default: 5.
    pub bounds_padding: f64,
    /// Bounds are stretched by `velocity * velocity_multiplier` in the
    /// direction of motion on reinsertion. Default: 2.
    pub velocity_multiplier: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            registration_padding: 2.0,
            bounds_padding: 5.0,
            velocity_multiplier: 2.0,
        }
    }
}

/// Incremental AABB tree keyed by actor.
#[derive(Debug, Default)]
pub struct DynamicTree {
    nodes: Vec<Option<TreeNode>>,
    free: Vec<usize>,
    root: Option<NodeId>,
    leaves: HashMap<Entity, NodeId>,
    config: TreeConfig,
    logger: Logger,
}

impl DynamicTree {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Track an actor. Its leaf gets `bounds` padded by the registration margin.
    ///
    /// Registering an actor twice leaves the tree untouched and returns
    /// `Ok(false)`.
    pub fn register(&mut self, entity: Entity, bounds: BoundingBox) -> Result<bool, TreeError> {
        let logger = self.logger.clone();
        logger.in_scope(|| self.register_leaf(entity, bounds))
    }

    /// Refresh an actor's leaf after it moved.
    ///
    /// Returns `Ok(false)` while `bounds` stays strictly inside the stored
    /// fattened bounds, or when the actor is not registered. Otherwise the leaf
    /// is reinserted with bounds padded on every side and stretched along
    /// `velocity`, and `Ok(true)` is returned.
    pub fn update(
        &mut self,
        entity: Entity,
        bounds: BoundingBox,
        velocity: DVec2,
    ) -> Result<bool, TreeError> {
        let logger = self.logger.clone();
        logger.in_scope(|| self.refresh_leaf(entity, bounds, velocity))
    }

    /// Stop tracking an actor. Returns `Ok(false)` if it was not registered.
    pub fn unregister(&mut self, entity: Entity) -> Result<bool, TreeError> {
        let logger = self.logger.clone();
        logger.in_scope(|| self.unregister_leaf(entity))
    }

    /// Visit every registered actor other than `entity` whose leaf overlaps
    /// `bounds`, pruning subtrees that do not overlap.
    ///
    /// Stops and returns `true` as soon as `callback` returns `true`.
    pub fn query<F>(&self, entity: Entity, bounds: &BoundingBox, mut callback: F) -> bool
    where
        F: FnMut(Entity) -> bool,
    {
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if node.bounds.collides(bounds).is_none() {
                continue;
            }
            if node.is_leaf() {
                if let Some(other) = node.entity {
                    if other != entity && callback(other) {
                        return true;
                    }
                }
            } else {
                // Right first so the left subtree is visited first.
                stack.extend(node.right);
                stack.extend(node.left);
            }
        }
        false
    }

    /// Height of the root, 0 when empty.
    pub fn height(&self) -> i32 {
        self.root
            .and_then(|root| self.node(root))
            .map_or(0, |node| node.height)
    }

    /// Number of registered actors.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.leaves.contains_key(&entity)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Stored (fattened) bounds of an actor's leaf.
    pub fn leaf_bounds(&self, entity: Entity) -> Option<BoundingBox> {
        let leaf = *self.leaves.get(&entity)?;
        self.node(leaf).map(|node| node.bounds)
    }

    /// All nodes in pre-order, left subtree first.
    pub fn nodes(&self) -> Vec<&TreeNode> {
        let mut out = Vec::with_capacity(self.nodes.len() - self.free.len());
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.node(id) {
                out.push(node);
                stack.extend(node.right);
                stack.extend(node.left);
            }
        }
        out
    }

    /// Check every structural invariant, returning the first violation.
    pub fn validate(&self) -> Result<(), TreeError> {
        let Some(root) = self.root else {
            return match self.leaves.values().next() {
                Some(&leaf) => Err(TreeError::Corrupt {
                    node: leaf,
                    reason: "registered leaf unreachable from empty tree",
                }),
                None => Ok(()),
            };
        };
        if self.slot(root)?.parent.is_some() {
            return Err(TreeError::Corrupt {
                node: root,
                reason: "root has a parent",
            });
        }

        let mut leaf_count = 0;
        let mut visited = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            visited += 1;
            if visited > self.nodes.len() {
                return Err(TreeError::Corrupt {
                    node: id,
                    reason: "cycle detected",
                });
            }

            let node = self.slot(id)?;
            if node.is_leaf() {
                let Some(entity) = node.entity else {
                    return Err(TreeError::Corrupt {
                        node: id,
                        reason: "leaf without actor",
                    });
                };
                if node.height != 0 {
                    return Err(TreeError::Corrupt {
                        node: id,
                        reason: "leaf height is not 0",
                    });
                }
                if self.leaves.get(&entity) != Some(&id) {
                    return Err(TreeError::Corrupt {
                        node: id,
                        reason: "leaf missing from actor map",
                    });
                }
                leaf_count += 1;
                continue;
            }

            if node.entity.is_some() {
                return Err(TreeError::Corrupt {
                    node: id,
                    reason: "internal node holds an actor",
                });
            }
            let (left, right) = self.children(id)?;
            for child in [left, right] {
                if self.slot(child)?.parent != Some(id) {
                    return Err(TreeError::Corrupt {
                        node: child,
                        reason: "child does not point back at its parent",
                    });
                }
            }
            let (left_bounds, left_height) = self.extent(left)?;
            let (right_bounds, right_height) = self.extent(right)?;
            if node.height != 1 + left_height.max(right_height) {
                return Err(TreeError::Corrupt {
                    node: id,
                    reason: "height is not 1 + max(child heights)",
                });
            }
            if node.bounds != left_bounds.combine(&right_bounds) {
                return Err(TreeError::Corrupt {
                    node: id,
                    reason: "bounds are not the union of child bounds",
                });
            }
            stack.push(left);
            stack.push(right);
        }

        if leaf_count != self.leaves.len() {
            return Err(TreeError::Corrupt {
                node: root,
                reason: "leaf count differs from actor map",
            });
        }
        Ok(())
    }

    /// Outline leaves in green and internal nodes in white.
    pub fn debug_draw(&self, ctx: &mut dyn DebugDraw) {
        for node in self.nodes() {
            let color = if node.is_leaf() {
                DebugColor::GREEN
            } else {
                DebugColor::WHITE
            };
            ctx.stroke_rect(&node.bounds, color);
        }
    }

    /// Rotate the taller child of `node` up when the child heights differ by
    /// more than one. Returns the root of the (possibly new) subtree.
    pub fn balance(&mut self, node: NodeId) -> Result<NodeId, TreeError> {
        let a = node;
        let (is_leaf, height, a_parent) = {
            let n = self.slot(a)?;
            (n.is_leaf(), n.height, n.parent)
        };
        if is_leaf || height < 2 {
            return Ok(a);
        }

        let (b, c) = self.children(a)?;
        let balance = self.slot(c)?.height - self.slot(b)?.height;

        if balance > 1 {
            let (f, g) = self.children(c)?;

            {
                let top = self.slot_mut(c)?;
                top.left = Some(a);
                top.parent = a_parent;
            }
            self.slot_mut(a)?.parent = Some(c);
            self.reattach(a_parent, a, c)?;

            let (keep, demote) = if self.slot(f)?.height > self.slot(g)?.height {
                (f, g)
            } else {
                (g, f)
            };
            self.slot_mut(c)?.right = Some(keep);
            self.slot_mut(a)?.right = Some(demote);
            self.slot_mut(demote)?.parent = Some(a);

            self.refit(a)?;
            self.refit(c)?;
            tracing::trace!(pivot = ?a, promoted = ?c, "rotated right child up");
            return Ok(c);
        }

        if balance < -1 {
            let (d, e) = self.children(b)?;

            {
                let top = self.slot_mut(b)?;
                top.left = Some(a);
                top.parent = a_parent;
            }
            self.slot_mut(a)?.parent = Some(b);
            self.reattach(a_parent, a, b)?;

            let (keep, demote) = if self.slot(d)?.height > self.slot(e)?.height {
                (d, e)
            } else {
                (e, d)
            };
            self.slot_mut(b)?.right = Some(keep);
            self.slot_mut(a)?.left = Some(demote);
            self.slot_mut(demote)?.parent = Some(a);

            self.refit(a)?;
            self.refit(b)?;
            tracing::trace!(pivot = ?a, promoted = ?b, "rotated left child up");
            return Ok(b);
        }

        Ok(a)
    }

    fn register_leaf(&mut self, entity: Entity, bounds: BoundingBox) -> Result<bool, TreeError> {
        if self.leaves.contains_key(&entity) {
            tracing::warn!(?entity, "actor already registered in dynamic tree");
            return Ok(false);
        }

        let fat = bounds.inflate(self.config.registration_padding);
        let leaf = self.alloc(TreeNode::leaf(entity, fat));
        self.leaves.insert(entity, leaf);
        self.insert(leaf)?;
        tracing::debug!(?entity, height = self.height(), "registered actor");
        Ok(true)
    }

    fn refresh_leaf(
        &mut self,
        entity: Entity,
        bounds: BoundingBox,
        velocity: DVec2,
    ) -> Result<bool, TreeError> {
        let Some(&leaf) = self.leaves.get(&entity) else {
            return Ok(false);
        };
        if self.slot(leaf)?.bounds.contains_box(&bounds) {
            return Ok(false);
        }

        self.remove(leaf)?;
        let fat = self.fatten(bounds, velocity);
        self.slot_mut(leaf)?.bounds = fat;
        self.insert(leaf)?;
        tracing::trace!(?entity, "reinserted moved actor");
        Ok(true)
    }

    fn unregister_leaf(&mut self, entity: Entity) -> Result<bool, TreeError> {
        let Some(leaf) = self.leaves.remove(&entity) else {
            return Ok(false);
        };
        self.remove(leaf)?;
        self.release(leaf);
        tracing::debug!(?entity, height = self.height(), "unregistered actor");
        Ok(true)
    }

    fn insert(&mut self, leaf: NodeId) -> Result<(), TreeError> {
        let Some(root) = self.root else {
            self.slot_mut(leaf)?.parent = None;
            self.root = Some(leaf);
            return Ok(());
        };

        let leaf_bounds = self.slot(leaf)?.bounds;
        let mut current = root;
        loop {
            let node = self.slot(current)?;
            if node.is_leaf() {
                break;
            }
            let bounds = node.bounds;
            let (left, right) = self.children(current)?;

            let area = bounds.perimeter();
            let combined_area = bounds.combine(&leaf_bounds).perimeter();

            // Cost of making a new parent for this node and the leaf.
            let cost = 2.0 * combined_area;
            // Minimum cost of pushing the leaf further down.
            let inheritance_cost = 2.0 * (combined_area - area);

            let left_cost = self.descend_cost(left, &leaf_bounds)? + inheritance_cost;
            let right_cost = self.descend_cost(right, &leaf_bounds)? + inheritance_cost;

            if cost < left_cost && cost < right_cost {
                break;
            }
            current = if left_cost < right_cost { left } else { right };
        }

        let (sibling_parent, sibling_bounds, sibling_height) = {
            let sibling = self.slot(current)?;
            (sibling.parent, sibling.bounds, sibling.height)
        };
        let new_parent = self.alloc(TreeNode {
            parent: sibling_parent,
            left: Some(current),
            right: Some(leaf),
            bounds: leaf_bounds.combine(&sibling_bounds),
            height: sibling_height + 1,
            entity: None,
        });
        self.reattach(sibling_parent, current, new_parent)?;
        self.slot_mut(current)?.parent = Some(new_parent);
        self.slot_mut(leaf)?.parent = Some(new_parent);

        self.refit_from(Some(new_parent))
    }

    fn remove(&mut self, leaf: NodeId) -> Result<(), TreeError> {
        if self.root == Some(leaf) {
            self.root = None;
            self.slot_mut(leaf)?.parent = None;
            return Ok(());
        }

        let parent = self.slot(leaf)?.parent.ok_or(TreeError::Detached(leaf))?;
        let grand_parent = self.slot(parent)?.parent;
        let (left, right) = self.children(parent)?;
        let sibling = if left == leaf {
            right
        } else if right == leaf {
            left
        } else {
            return Err(TreeError::NotAChild {
                parent,
                child: leaf,
            });
        };

        self.slot_mut(leaf)?.parent = None;
        self.reattach(grand_parent, parent, sibling)?;
        self.slot_mut(sibling)?.parent = grand_parent;
        self.release(parent);

        self.refit_from(grand_parent)
    }

    /// Cost of pushing a leaf with `leaf_bounds` into `child`'s subtree,
    /// excluding the inherited cost.
    fn descend_cost(&self, child: NodeId, leaf_bounds: &BoundingBox) -> Result<f64, TreeError> {
        let node = self.slot(child)?;
        let combined = leaf_bounds.combine(&node.bounds).perimeter();
        Ok(if node.is_leaf() {
            combined
        } else {
            combined - node.bounds.perimeter()
        })
    }

    /// Walk from `start` to the root, balancing and refitting each ancestor.
    fn refit_from(&mut self, start: Option<NodeId>) -> Result<(), TreeError> {
        let mut cursor = start;
        while let Some(id) = cursor {
            let id = self.balance(id)?;
            self.refit(id)?;
            cursor = self.slot(id)?.parent;
        }
        Ok(())
    }

    /// Recompute an internal node's bounds and height from its children.
    fn refit(&mut self, id: NodeId) -> Result<(), TreeError> {
        let (left, right) = self.children(id)?;
        let (left_bounds, left_height) = self.extent(left)?;
        let (right_bounds, right_height) = self.extent(right)?;
        let node = self.slot_mut(id)?;
        node.bounds = left_bounds.combine(&right_bounds);
        node.height = 1 + left_height.max(right_height);
        Ok(())
    }

    /// Point `parent`'s link to `old` at `new`, or make `new` the root.
    fn reattach(
        &mut self,
        parent: Option<NodeId>,
        old: NodeId,
        new: NodeId,
    ) -> Result<(), TreeError> {
        let Some(parent) = parent else {
            self.root = Some(new);
            return Ok(());
        };
        let node = self.slot_mut(parent)?;
        if node.left == Some(old) {
            node.left = Some(new);
        } else if node.right == Some(old) {
            node.right = Some(new);
        } else {
            return Err(TreeError::NotAChild { parent, child: old });
        }
        Ok(())
    }

    fn children(&self, id: NodeId) -> Result<(NodeId, NodeId), TreeError> {
        let node = self.slot(id)?;
        let left = node.left.ok_or(TreeError::MissingChild {
            node: id,
            side: ChildSide::Left,
        })?;
        let right = node.right.ok_or(TreeError::MissingChild {
            node: id,
            side: ChildSide::Right,
        })?;
        Ok((left, right))
    }

    fn extent(&self, id: NodeId) -> Result<(BoundingBox, i32), TreeError> {
        let node = self.slot(id)?;
        Ok((node.bounds, node.height))
    }

    fn fatten(&self, bounds: BoundingBox, velocity: DVec2) -> BoundingBox {
        let mut fat = bounds.inflate(self.config.bounds_padding);
        let predicted = velocity * self.config.velocity_multiplier;
        if predicted.x < 0.0 {
            fat.left += predicted.x;
        } else {
            fat.right += predicted.x;
        }
        if predicted.y < 0.0 {
            fat.top += predicted.y;
        } else {
            fat.bottom += predicted.y;
        }
        fat
    }

    fn slot(&self, id: NodeId) -> Result<&TreeNode, TreeError> {
        self.node(id).ok_or(TreeError::InvalidNode(id))
    }

    fn slot_mut(&mut self, id: NodeId) -> Result<&mut TreeNode, TreeError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(TreeError::InvalidNode(id))
    }

    fn alloc(&mut self, node: TreeNode) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        if let Some(slot) = self.nodes.get_mut(id.0) {
            if slot.take().is_some() {
                self.free.push(id.0);
            }
        }
    }
}
