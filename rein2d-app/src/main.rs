//! Headless collision sandbox.
//!
//! Bounces a handful of elastic boxes around a walled arena with a tile floor,
//! drops an active crate onto it and logs what collides. Set `RUST_LOG=debug`
//! to see per-frame resolver output.

use anyhow::Context;
use glam::DVec2;
use rein2d::{
    ActorBuilder, CellMap, CollisionEvent, CollisionStrategy, CollisionType, DrawRecorder,
    PhysicsConfig, Scene,
};

const ARENA: f64 = 320.0;
const CELL: f64 = 16.0;
const SECONDS: u32 = 10;

fn build_scene(strategy: CollisionStrategy) -> anyhow::Result<(Scene, hecs::Entity)> {
    let mut scene = Scene::new(PhysicsConfig {
        strategy,
        ..PhysicsConfig::default()
    });

    // Walls
    let thickness = 16.0;
    let walls = [
        (-thickness, -thickness, ARENA + 2.0 * thickness, thickness),
        (-thickness, 0.0, thickness, ARENA),
        (ARENA, 0.0, thickness, ARENA),
    ];
    for (x, y, w, h) in walls {
        scene
            .spawn(
                ActorBuilder::new(x, y, w, h)
                    .collision_type(CollisionType::Fixed)
                    .groups(["wall"]),
            )
            .context("spawning wall")?;
    }

    // Tile floor along the bottom row
    let cells = (ARENA / CELL) as usize;
    let mut floor = CellMap::new(DVec2::ZERO, CELL, CELL, cells, cells);
    for col in 0..cells {
        floor.set_solid(col, cells - 1, true);
    }
    scene.add_cell_map(floor);

    // Bouncers
    for i in 0..8 {
        let angle = i as f64 * std::f64::consts::TAU / 8.0;
        scene
            .spawn(
                ActorBuilder::new(140.0 + 40.0 * angle.cos(), 120.0 + 40.0 * angle.sin(), 12.0, 12.0)
                    .collision_type(CollisionType::Elastic)
                    .velocity(DVec2::from_angle(angle) * 90.0)
                    .groups(["ball"]),
            )
            .context("spawning ball")?;
    }

    // Crate falling at constant speed
    let falling = scene
        .spawn(
            ActorBuilder::new(ARENA / 2.0, 8.0, 24.0, 24.0)
                .anchor(DVec2::new(0.5, 0.0))
                .velocity(DVec2::new(0.0, 45.0)),
        )
        .context("spawning crate")?;

    Ok((scene, falling))
}

fn run(strategy: CollisionStrategy) -> anyhow::Result<()> {
    let (mut scene, falling) = build_scene(strategy)?;
    let dt = scene.config().fixed_timestep;
    let frames = (SECONDS as f64 / dt).round() as u32;

    let mut total_pairs = 0;
    let mut total_updates = 0;
    for frame in 0..frames {
        let report = scene.update(dt)?;
        total_pairs += report.pairs.len();
        total_updates += report.tree_updates;

        for hit in scene.collisions_with_group(falling, "ball") {
            log::info!("frame {frame}: {} crate -> ball {hit:?}", CollisionEvent::NAME);
        }
        for event in scene.events(falling) {
            if event.other.is_none() {
                log::debug!(
                    "frame {frame}: {} crate -> floor on {:?}",
                    CollisionEvent::NAME,
                    event.side
                );
            }
        }
    }

    let mut overlay = DrawRecorder::default();
    scene.debug_draw(&mut overlay);
    log::info!(
        "{strategy:?}: {frames} frames, {total_pairs} pairs, {total_updates} tree updates, {} overlay rects",
        overlay.rects.len()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    run(CollisionStrategy::DynamicAabbTree)?;
    run(CollisionStrategy::Naive)
}
