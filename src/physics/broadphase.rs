//! Collision resolvers: find overlapping actor pairs and resolve them.

use hecs::Entity;

use crate::debug::DebugDraw;
use crate::ecs::components::physics::{Collider, CollisionType, Killed, Motion};
use crate::ecs::components::transform::Transform2d;
use crate::log::Logger;

use super::collider::BoundingBox;
use super::contact::{push_unique, CollisionPair};
use super::error::CollisionError;
use super::solver::resolve_pairs;
use super::tree::{DynamicTree, TreeConfig};
use super::CollisionStrategy;

/// A broadphase strategy plus the shared resolution step.
pub trait CollisionResolver {
    fn strategy(&self) -> CollisionStrategy;

    /// Start tracking an actor that joined the active set.
    fn register(&mut self, world: &hecs::World, entity: Entity) -> Result<(), CollisionError>;

    /// Stop tracking an actor. Unknown actors are ignored.
    fn remove(&mut self, entity: Entity) -> Result<(), CollisionError>;

    /// Refresh persistent broadphase state after movement. Returns how many
    /// actors needed restructuring.
    fn update(&mut self, world: &hecs::World, entities: &[Entity]) -> Result<usize, CollisionError>;

    /// Every colliding pair among `entities`, deduplicated, without resolving.
    fn find_pairs(&self, world: &hecs::World, entities: &[Entity]) -> Vec<CollisionPair>;

    fn debug_draw(&self, ctx: &mut dyn DebugDraw);

    /// Find and resolve this frame's collisions.
    fn evaluate(&mut self, world: &mut hecs::World, entities: &[Entity]) -> Vec<CollisionPair> {
        let pairs = self.find_pairs(world, entities);
        resolve_pairs(world, &pairs);
        pairs
    }
}

/// Current world bounds of an actor with a transform and collider.
pub fn actor_bounds(world: &hecs::World, entity: Entity) -> Option<BoundingBox> {
    let collider = world.get::<&Collider>(entity).ok()?;
    let transform = world.get::<&Transform2d>(entity).ok()?;
    Some(collider.bounds(&transform))
}

/// Alive, with a collider that takes part in collisions.
pub fn is_collidable(world: &hecs::World, entity: Entity) -> bool {
    if world.get::<&Killed>(entity).is_ok() {
        return false;
    }
    world
        .get::<&Collider>(entity)
        .map_or(false, |c| c.collision_type != CollisionType::PreventCollision)
}

/// Pairwise O(n^2) test of every collidable actor. Keeps no state.
#[derive(Debug, Default)]
pub struct NaiveResolver {
    logger: Logger,
}

impl NaiveResolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }
}

impl CollisionResolver for NaiveResolver {
    fn strategy(&self) -> CollisionStrategy {
        CollisionStrategy::Naive
    }

    fn register(&mut self, world: &hecs::World, entity: Entity) -> Result<(), CollisionError> {
        if !world.contains(entity) {
            return Err(CollisionError::NoSuchEntity(entity));
        }
        Ok(())
    }

    fn remove(&mut self, _entity: Entity) -> Result<(), CollisionError> {
        Ok(())
    }

    fn update(&mut self, _world: &hecs::World, _entities: &[Entity]) -> Result<usize, CollisionError> {
        Ok(0)
    }

    fn find_pairs(&self, world: &hecs::World, entities: &[Entity]) -> Vec<CollisionPair> {
        self.logger.in_scope(|| {
            let candidates: Vec<(Entity, BoundingBox)> = entities
                .iter()
                .copied()
                .filter(|&e| is_collidable(world, e))
                .filter_map(|e| actor_bounds(world, e).map(|b| (e, b)))
                .collect();

            let mut pairs = Vec::new();
            for i in 0..candidates.len() {
                for j in (i + 1)..candidates.len() {
                    let (a, a_bounds) = &candidates[i];
                    let (b, b_bounds) = &candidates[j];
                    if let Some(pair) = CollisionPair::between(*a, a_bounds, *b, b_bounds) {
                        push_unique(&mut pairs, pair);
                    }
                }
            }

            tracing::debug!(
                actors = candidates.len(),
                pairs = pairs.len(),
                "naive broadphase"
            );
            pairs
        })
    }

    fn debug_draw(&self, _ctx: &mut dyn DebugDraw) {}
}

/// Broadphase through a [`DynamicTree`] of fattened actor bounds.
#[derive(Debug, Default)]
pub struct DynamicTreeResolver {
    tree: DynamicTree,
    logger: Logger,
}

impl DynamicTreeResolver {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            tree: DynamicTree::new(config),
            logger: Logger::default(),
        }
    }

    #[must_use]
    pub fn with_logger(self, logger: Logger) -> Self {
        Self {
            tree: self.tree.with_logger(logger.clone()),
            logger,
        }
    }

    pub fn tree(&self) -> &DynamicTree {
        &self.tree
    }
}

impl CollisionResolver for DynamicTreeResolver {
    fn strategy(&self) -> CollisionStrategy {
        CollisionStrategy::DynamicAabbTree
    }

    fn register(&mut self, world: &hecs::World, entity: Entity) -> Result<(), CollisionError> {
        if !world.contains(entity) {
            return Err(CollisionError::NoSuchEntity(entity));
        }
        let Some(bounds) = actor_bounds(world, entity) else {
            self.logger
                .in_scope(|| tracing::debug!(?entity, "actor has no collider, not registered"));
            return Ok(());
        };
        self.tree.register(entity, bounds)?;
        Ok(())
    }

    fn remove(&mut self, entity: Entity) -> Result<(), CollisionError> {
        self.tree.unregister(entity)?;
        Ok(())
    }

    fn update(&mut self, world: &hecs::World, entities: &[Entity]) -> Result<usize, CollisionError> {
        let mut updated = 0;
        for &entity in entities {
            let Some(bounds) = actor_bounds(world, entity) else {
                continue;
            };
            let velocity = world
                .get::<&Motion>(entity)
                .map_or(glam::DVec2::ZERO, |m| m.velocity);
            if self.tree.update(entity, bounds, velocity)? {
                updated += 1;
            }
        }
        Ok(updated)
    }

    fn find_pairs(&self, world: &hecs::World, entities: &[Entity]) -> Vec<CollisionPair> {
        self.logger.in_scope(|| {
            let mut pairs = Vec::new();
            for &entity in entities {
                if !is_collidable(world, entity) {
                    continue;
                }
                let Some(bounds) = actor_bounds(world, entity) else {
                    continue;
                };

                // Never accept a candidate so the query visits every overlap.
                self.tree.query(entity, &bounds, |other| {
                    if !is_collidable(world, other) {
                        return false;
                    }
                    if let Some(other_bounds) = actor_bounds(world, other) {
                        if let Some(pair) =
                            CollisionPair::between(entity, &bounds, other, &other_bounds)
                        {
                            push_unique(&mut pairs, pair);
                        }
                    }
                    false
                });
            }

            tracing::debug!(
                actors = entities.len(),
                pairs = pairs.len(),
                height = self.tree.height(),
                "tree broadphase"
            );
            pairs
        })
    }

    fn debug_draw(&self, ctx: &mut dyn DebugDraw) {
        self.tree.debug_draw(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::DrawRecorder;
    use crate::ecs::events::CollisionEvents;
    use glam::DVec2;

    fn spawn_box(world: &mut hecs::World, x: f64, y: f64, collision_type: CollisionType) -> Entity {
        world.spawn((
            Transform2d::from_xy(x, y),
            Motion::default(),
            Collider::new(DVec2::splat(10.0), collision_type),
            CollisionEvents::new(),
        ))
    }

    fn resolvers() -> Vec<Box<dyn CollisionResolver>> {
        vec![
            Box::new(NaiveResolver::new()),
            Box::new(DynamicTreeResolver::new(TreeConfig::default())),
        ]
    }

    fn register_all(
        resolver: &mut dyn CollisionResolver,
        world: &hecs::World,
        entities: &[Entity],
    ) {
        for &e in entities {
            resolver.register(world, e).unwrap();
        }
    }

    fn sorted_pairs(pairs: &[CollisionPair]) -> Vec<(Entity, Entity)> {
        let mut out: Vec<_> = pairs
            .iter()
            .map(|p| (p.left.min(p.right), p.left.max(p.right)))
            .collect();
        out.sort();
        out
    }

    #[test]
    fn test_three_overlapping_actors_give_three_pairs() {
        for mut resolver in resolvers() {
            let mut world = hecs::World::new();
            let actors = vec![
                spawn_box(&mut world, 0.0, 0.0, CollisionType::Fixed),
                spawn_box(&mut world, 3.0, 3.0, CollisionType::Fixed),
                spawn_box(&mut world, 6.0, 1.0, CollisionType::Fixed),
            ];
            register_all(resolver.as_mut(), &world, &actors);

            let pairs = resolver.evaluate(&mut world, &actors);
            assert_eq!(
                pairs.len(),
                3,
                "{:?} should dedup to 3 pairs",
                resolver.strategy()
            );
            for &a in &actors {
                assert_eq!(world.get::<&CollisionEvents>(a).unwrap().len(), 2);
            }
        }
    }

    #[test]
    fn test_resolvers_agree() {
        let mut world = hecs::World::new();
        let actors = vec![
            spawn_box(&mut world, 0.0, 0.0, CollisionType::Active),
            spawn_box(&mut world, 5.0, 0.0, CollisionType::Fixed),
            spawn_box(&mut world, 40.0, 40.0, CollisionType::Active),
            spawn_box(&mut world, 45.0, 48.0, CollisionType::Elastic),
            spawn_box(&mut world, 100.0, 0.0, CollisionType::Passive),
        ];

        let mut naive = NaiveResolver::new();
        let mut tree = DynamicTreeResolver::new(TreeConfig::default());
        register_all(&mut naive, &world, &actors);
        register_all(&mut tree, &world, &actors);

        let a = naive.find_pairs(&world, &actors);
        let b = tree.find_pairs(&world, &actors);
        assert_eq!(sorted_pairs(&a), sorted_pairs(&b));
        assert_eq!(a.len(), 2);
        assert_eq!(naive.update(&world, &actors).unwrap(), 0);
    }

    #[test]
    fn test_prevent_collision_and_killed_are_skipped() {
        for mut resolver in resolvers() {
            let mut world = hecs::World::new();
            let a = spawn_box(&mut world, 0.0, 0.0, CollisionType::Active);
            let ghost = spawn_box(&mut world, 2.0, 0.0, CollisionType::PreventCollision);
            let dead = spawn_box(&mut world, 4.0, 0.0, CollisionType::Fixed);
            world.insert_one(dead, Killed).unwrap();
            let actors = vec![a, ghost, dead];
            register_all(resolver.as_mut(), &world, &actors);

            assert!(resolver.find_pairs(&world, &actors).is_empty());
        }
    }

    #[test]
    fn test_tree_update_counts_restructures() {
        let mut world = hecs::World::new();
        let a = spawn_box(&mut world, 0.0, 0.0, CollisionType::Active);
        let b = spawn_box(&mut world, 50.0, 0.0, CollisionType::Active);
        let mut resolver = DynamicTreeResolver::new(TreeConfig::default());
        register_all(&mut resolver, &world, &[a, b]);

        world.get::<&mut Transform2d>(a).unwrap().position.x = 1.0;
        assert_eq!(resolver.update(&world, &[a, b]).unwrap(), 0);

        world.get::<&mut Transform2d>(a).unwrap().position.x = 30.0;
        assert_eq!(resolver.update(&world, &[a, b]).unwrap(), 1);
        resolver.tree().validate().unwrap();
    }

    #[test]
    fn test_register_despawned_is_error() {
        let mut world = hecs::World::new();
        let a = spawn_box(&mut world, 0.0, 0.0, CollisionType::Active);
        world.despawn(a).unwrap();
        for mut resolver in resolvers() {
            assert_eq!(
                resolver.register(&world, a),
                Err(CollisionError::NoSuchEntity(a))
            );
        }
    }

    #[test]
    fn test_remove_untracks() {
        let mut world = hecs::World::new();
        let a = spawn_box(&mut world, 0.0, 0.0, CollisionType::Active);
        let b = spawn_box(&mut world, 5.0, 0.0, CollisionType::Active);
        let mut resolver = DynamicTreeResolver::new(TreeConfig::default());
        register_all(&mut resolver, &world, &[a, b]);

        resolver.remove(b).unwrap();
        resolver.remove(b).unwrap();
        assert!(!resolver.tree().contains(b));
        assert!(resolver.find_pairs(&world, &[a, b]).is_empty());
    }

    #[test]
    fn test_debug_draw() {
        let mut world = hecs::World::new();
        let actors = vec![
            spawn_box(&mut world, 0.0, 0.0, CollisionType::Active),
            spawn_box(&mut world, 50.0, 0.0, CollisionType::Active),
        ];
        let mut naive = NaiveResolver::new();
        let mut tree = DynamicTreeResolver::new(TreeConfig::default());
        register_all(&mut naive, &world, &actors);
        register_all(&mut tree, &world, &actors);

        let mut recorder = DrawRecorder::default();
        naive.debug_draw(&mut recorder);
        assert!(recorder.rects.is_empty());
        tree.debug_draw(&mut recorder);
        assert_eq!(recorder.rects.len(), 3);
    }
}
