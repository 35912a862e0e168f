//! Scene builders shared by the collision benchmarks.

use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rein2d::{ActorBuilder, CollisionStrategy, CollisionType, PhysicsConfig, Scene};

/// `n` moving 16x16 boxes scattered over a square whose side grows with
/// `sqrt(n)`, so density stays roughly constant.
pub fn setup_scattered_scene(n: usize, strategy: CollisionStrategy) -> anyhow::Result<Scene> {
    let mut scene = Scene::new(PhysicsConfig {
        strategy,
        ..PhysicsConfig::default()
    });
    let side = (n as f64).sqrt() * 48.0;
    // Fixed seed so every run benches the same layout.
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for i in 0..n {
        let collision_type = if i % 5 == 0 {
            CollisionType::Fixed
        } else {
            CollisionType::Elastic
        };
        let velocity = DVec2::new(rng.gen_range(-60.0..60.0), rng.gen_range(-60.0..60.0));
        scene.spawn(
            ActorBuilder::new(rng.gen_range(0.0..side), rng.gen_range(0.0..side), 16.0, 16.0)
                .collision_type(collision_type)
                .velocity(velocity),
        )?;
    }
    Ok(scene)
}

/// `n` static boxes on a grid with gaps, none touching.
pub fn setup_sparse_scene(n: usize, strategy: CollisionStrategy) -> anyhow::Result<Scene> {
    let mut scene = Scene::new(PhysicsConfig {
        strategy,
        ..PhysicsConfig::default()
    });
    let cols = (n as f64).sqrt().ceil() as usize;
    for i in 0..n {
        let x = (i % cols) as f64 * 32.0;
        let y = (i / cols) as f64 * 32.0;
        scene.spawn(
            ActorBuilder::new(x, y, 16.0, 16.0).collision_type(CollisionType::Passive),
        )?;
    }
    Ok(scene)
}
