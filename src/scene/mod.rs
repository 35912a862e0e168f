//! Per-frame integration glue.
//!
//! A [`Scene`] owns the entity world, the ordered list of active actors, the
//! chosen collision resolver and any static cell maps, and drives them through
//! one frame at a time.

use glam::DVec2;
use hecs::Entity;

use crate::debug::DebugDraw;
use crate::ecs::components::physics::{Collider, CollisionGroups, CollisionType, Killed, Motion};
use crate::ecs::components::transform::Transform2d;
use crate::ecs::events::{CollisionEvent, CollisionEvents};
use crate::log::Logger;
use crate::physics::broadphase::{actor_bounds, CollisionResolver};
use crate::physics::cell_map::{resolve_cell_maps, CellMap};
use crate::physics::contact::CollisionPair;
use crate::physics::error::CollisionError;
use crate::physics::integrate::integrate_motion;
use crate::physics::{CollisionStrategy, PhysicsConfig};

/// Components for a new actor.
#[derive(Debug, Clone)]
pub struct ActorBuilder {
    transform: Transform2d,
    motion: Motion,
    collider: Collider,
    groups: Option<CollisionGroups>,
}

impl ActorBuilder {
    /// Actor with its top-left corner at `(x, y)`, `Active` by default.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            transform: Transform2d::from_xy(x, y),
            motion: Motion::default(),
            collider: Collider::new(DVec2::new(width, height), CollisionType::Active),
            groups: None,
        }
    }

    pub fn collision_type(mut self, collision_type: CollisionType) -> Self {
        self.collider.collision_type = collision_type;
        self
    }

    pub fn velocity(mut self, velocity: DVec2) -> Self {
        self.motion.velocity = velocity;
        self
    }

    pub fn acceleration(mut self, acceleration: DVec2) -> Self {
        self.motion.acceleration = acceleration;
        self
    }

    pub fn anchor(mut self, anchor: DVec2) -> Self {
        self.collider.anchor = anchor;
        self
    }

    pub fn scale(mut self, scale: DVec2) -> Self {
        self.transform.scale = scale;
        self
    }

    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = Some(CollisionGroups::new(groups));
        self
    }

    fn spawn(self, world: &mut hecs::World) -> Entity {
        let mut builder = hecs::EntityBuilder::new();
        builder.add(self.transform);
        builder.add(self.motion);
        builder.add(self.collider);
        builder.add(CollisionEvents::new());
        if let Some(groups) = self.groups {
            builder.add(groups);
        }
        world.spawn(builder.build())
    }
}

/// What one frame did.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Actors whose broadphase state had to be rebuilt.
    pub tree_updates: usize,
    /// Pushes out of cell maps.
    pub cell_contacts: usize,
    /// Actor pairs resolved this frame.
    pub pairs: Vec<CollisionPair>,
    /// Killed actors swept at the end of the frame.
    pub removed: usize,
}

/// A world of actors stepped frame by frame.
pub struct Scene {
    world: hecs::World,
    actors: Vec<Entity>,
    resolver: Box<dyn CollisionResolver>,
    cell_maps: Vec<CellMap>,
    config: PhysicsConfig,
    accumulator: f64,
    logger: Logger,
}

impl Scene {
    pub fn new(config: PhysicsConfig) -> Self {
        Self::with_logger(config, Logger::ambient())
    }

    pub fn with_logger(config: PhysicsConfig, logger: Logger) -> Self {
        let resolver = config.strategy.make_resolver(config.tree, logger.clone());
        Self {
            world: hecs::World::new(),
            actors: Vec::new(),
            resolver,
            cell_maps: Vec::new(),
            config,
            accumulator: 0.0,
            logger,
        }
    }

    pub fn world(&self) -> &hecs::World {
        &self.world
    }

    /// Direct component access. Moving an actor here is picked up by the next
    /// frame's resolver update.
    pub fn world_mut(&mut self) -> &mut hecs::World {
        &mut self.world
    }

    /// Active actors in update order.
    pub fn actors(&self) -> &[Entity] {
        &self.actors
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn strategy(&self) -> CollisionStrategy {
        self.resolver.strategy()
    }

    /// Spawn an actor and register it with the resolver. On failure nothing
    /// is left in the world.
    pub fn spawn(&mut self, actor: ActorBuilder) -> Result<Entity, CollisionError> {
        let entity = actor.spawn(&mut self.world);
        if let Err(err) = self.resolver.register(&self.world, entity) {
            let _ = self.world.despawn(entity);
            return Err(err);
        }
        self.actors.push(entity);
        Ok(entity)
    }

    /// Mark an actor killed. It stops colliding now and is removed at the end
    /// of the next frame.
    pub fn kill(&mut self, entity: Entity) -> Result<(), CollisionError> {
        self.world
            .insert_one(entity, Killed)
            .map_err(|_| CollisionError::NoSuchEntity(entity))
    }

    /// Unregister and despawn an actor immediately.
    pub fn remove(&mut self, entity: Entity) -> Result<(), CollisionError> {
        self.resolver.remove(entity)?;
        self.actors.retain(|&e| e != entity);
        self.world
            .despawn(entity)
            .map_err(|_| CollisionError::NoSuchEntity(entity))
    }

    pub fn add_cell_map(&mut self, map: CellMap) {
        self.cell_maps.push(map);
    }

    pub fn cell_maps(&self) -> &[CellMap] {
        &self.cell_maps
    }

    /// Switch broadphase strategy, registering every live actor with the new
    /// resolver.
    pub fn set_strategy(&mut self, strategy: CollisionStrategy) -> Result<(), CollisionError> {
        if strategy == self.resolver.strategy() {
            return Ok(());
        }
        let mut resolver = strategy.make_resolver(self.config.tree, self.logger.clone());
        for &entity in &self.actors {
            if self.world.contains(entity) {
                resolver.register(&self.world, entity)?;
            }
        }
        self.resolver = resolver;
        self.config.strategy = strategy;
        self.logger
            .in_scope(|| tracing::debug!(?strategy, "switched collision strategy"));
        Ok(())
    }

    /// Advance one frame of `dt` seconds.
    pub fn update(&mut self, dt: f64) -> Result<FrameReport, CollisionError> {
        let logger = self.logger.clone();
        logger.in_scope(|| self.run_frame(dt))
    }

    fn run_frame(&mut self, dt: f64) -> Result<FrameReport, CollisionError> {
        for (_, events) in self.world.query_mut::<&mut CollisionEvents>() {
            events.clear();
        }

        integrate_motion(&mut self.world, &self.actors, dt, self.config.gravity);
        let cell_contacts = resolve_cell_maps(
            &mut self.world,
            &self.actors,
            &self.cell_maps,
            self.config.cell_map_passes,
        );

        let tree_updates = self.resolver.update(&self.world, &self.actors)?;
        let pairs = self.resolver.evaluate(&mut self.world, &self.actors);
        let removed = self.sweep_killed()?;

        tracing::debug!(
            actors = self.actors.len(),
            tree_updates,
            cell_contacts,
            pairs = pairs.len(),
            removed,
            "frame"
        );
        Ok(FrameReport {
            tree_updates,
            cell_contacts,
            pairs,
            removed,
        })
    }

    /// Advance by `delta_time` seconds in fixed timesteps. Returns the number
    /// of frames run.
    pub fn step(&mut self, delta_time: f64) -> Result<u32, CollisionError> {
        self.accumulator += delta_time;

        let mut substeps = 0u32;
        while self.accumulator >= self.config.fixed_timestep && substeps < self.config.max_substeps
        {
            self.update(self.config.fixed_timestep)?;
            self.accumulator -= self.config.fixed_timestep;
            substeps += 1;
        }

        // Drop the backlog instead of falling further behind
        if self.accumulator > self.config.fixed_timestep * self.config.max_substeps as f64 {
            self.accumulator = 0.0;
        }
        Ok(substeps)
    }

    /// This frame's collision events on `entity`.
    pub fn events(&self, entity: Entity) -> Vec<CollisionEvent> {
        self.world
            .get::<&CollisionEvents>(entity)
            .map(|events| events.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Actors in `group` that collided with `entity` this frame.
    pub fn collisions_with_group(&self, entity: Entity, group: &str) -> Vec<Entity> {
        let mut hits = Vec::new();
        for event in self.events(entity) {
            let Some(other) = event.other else {
                continue;
            };
            let in_group = self
                .world
                .get::<&CollisionGroups>(other)
                .map_or(false, |groups| groups.contains(group));
            if in_group && !hits.contains(&other) {
                hits.push(other);
            }
        }
        hits
    }

    pub fn debug_draw(&self, ctx: &mut dyn DebugDraw) {
        for map in &self.cell_maps {
            map.debug_draw(ctx);
        }
        self.resolver.debug_draw(ctx);
        for &entity in &self.actors {
            if let Some(bounds) = actor_bounds(&self.world, entity) {
                bounds.debug_draw(ctx);
            }
        }
    }

    fn sweep_killed(&mut self) -> Result<usize, CollisionError> {
        let killed: Vec<Entity> = self
            .actors
            .iter()
            .copied()
            .filter(|&e| self.world.get::<&Killed>(e).is_ok())
            .collect();
        for &entity in &killed {
            self.resolver.remove(entity)?;
            if self.world.despawn(entity).is_err() {
                tracing::warn!(?entity, "killed actor already despawned");
            }
        }
        self.actors.retain(|e| !killed.contains(e));
        Ok(killed.len())
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("actors", &self.actors.len())
            .field("strategy", &self.resolver.strategy())
            .field("cell_maps", &self.cell_maps.len())
            .field("config", &self.config)
            .finish()
    }
}
