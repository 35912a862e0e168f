use glam::DVec2;
use proptest::prelude::*;
use rein2d::hecs::{Entity, World};
use rein2d::{
    BoundingBox, Collider, CollisionResolver, CollisionType, DynamicTree, DynamicTreeResolver,
    NaiveResolver, Transform2d, TreeConfig,
};

#[derive(Debug, Clone)]
enum Op {
    Register { slot: usize, x: f64, y: f64 },
    Move { slot: usize, dx: f64, dy: f64, vx: f64, vy: f64 },
    Remove { slot: usize },
}

const SLOTS: usize = 24;

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..SLOTS, -500.0..500.0f64, -500.0..500.0f64)
            .prop_map(|(slot, x, y)| Op::Register { slot, x, y }),
        4 => (0..SLOTS, -40.0..40.0f64, -40.0..40.0f64, -20.0..20.0f64, -20.0..20.0f64)
            .prop_map(|(slot, dx, dy, vx, vy)| Op::Move { slot, dx, dy, vx, vy }),
        1 => (0..SLOTS).prop_map(|slot| Op::Remove { slot }),
    ]
}

fn square(pos: DVec2) -> BoundingBox {
    BoundingBox::from_size(pos, DVec2::splat(10.0))
}

proptest! {
    #[test]
    fn tree_invariants_hold_after_random_operations(ops in prop::collection::vec(op(), 1..200)) {
        let world = World::new();
        let entities: Vec<Entity> = (0..SLOTS).map(|_| world.reserve_entity()).collect();
        let mut positions: Vec<Option<DVec2>> = vec![None; SLOTS];
        let mut tree = DynamicTree::new(TreeConfig::default());

        for op in ops {
            match op {
                Op::Register { slot, x, y } => {
                    let fresh = tree.register(entities[slot], square(DVec2::new(x, y))).unwrap();
                    prop_assert_eq!(fresh, positions[slot].is_none());
                    if fresh {
                        positions[slot] = Some(DVec2::new(x, y));
                    }
                }
                Op::Move { slot, dx, dy, vx, vy } => {
                    let Some(pos) = positions[slot].as_mut() else {
                        prop_assert!(!tree.update(entities[slot], square(DVec2::ZERO), DVec2::ZERO).unwrap());
                        continue;
                    };
                    *pos += DVec2::new(dx, dy);
                    let bounds = square(*pos);
                    tree.update(entities[slot], bounds, DVec2::new(vx, vy)).unwrap();
                    let leaf = tree.leaf_bounds(entities[slot]).unwrap();
                    prop_assert!(leaf.contains_box(&bounds), "leaf {:?} must contain {:?}", leaf, bounds);
                }
                Op::Remove { slot } => {
                    let removed = tree.unregister(entities[slot]).unwrap();
                    prop_assert_eq!(removed, positions[slot].is_some());
                    positions[slot] = None;
                }
            }
            prop_assert!(tree.validate().is_ok(), "{:?}", tree.validate());
            prop_assert_eq!(tree.len(), positions.iter().flatten().count());
        }

        for e in &entities {
            tree.unregister(*e).unwrap();
        }
        prop_assert_eq!(tree.height(), 0);
        prop_assert!(tree.root().is_none());
    }

    #[test]
    fn query_finds_the_overlapping_partner(
        n in 2usize..60,
        p_index in 0usize..60,
        offset in (1.0..9.0f64, 1.0..9.0f64),
    ) {
        let world = World::new();
        let mut tree = DynamicTree::new(TreeConfig::default());
        let cols = 8;
        let grid: Vec<(Entity, BoundingBox)> = (0..n)
            .map(|i| {
                let pos = DVec2::new((i % cols) as f64 * 40.0, (i / cols) as f64 * 40.0);
                (world.reserve_entity(), square(pos))
            })
            .collect();
        for (e, b) in &grid {
            tree.register(*e, *b).unwrap();
        }

        let (p, p_bounds) = grid[p_index % n];
        let q = world.reserve_entity();
        let q_pos = DVec2::new(p_bounds.left + offset.0, p_bounds.top + offset.1);
        tree.register(q, square(q_pos)).unwrap();

        let mut seen = Vec::new();
        tree.query(p, &p_bounds, |other| {
            seen.push(other);
            false
        });
        prop_assert!(seen.contains(&q));
        prop_assert!(!seen.contains(&p));
    }

    #[test]
    fn naive_and_tree_resolvers_agree(
        boxes in prop::collection::vec((0.0..120.0f64, 0.0..120.0f64, 4.0..30.0f64, 4.0..30.0f64), 1..16),
        moves in prop::collection::vec((-15.0..15.0f64, -15.0..15.0f64), 16),
    ) {
        let mut world = World::new();
        let mut actors = Vec::new();
        for (i, (x, y, w, h)) in boxes.iter().enumerate() {
            let collision_type = if i % 3 == 0 { CollisionType::Fixed } else { CollisionType::Passive };
            let collider = Collider::new(DVec2::new(*w, *h), collision_type);
            actors.push(world.spawn((Transform2d::from_xy(*x, *y), collider)));
        }

        let mut naive = NaiveResolver::new();
        let mut tree = DynamicTreeResolver::new(TreeConfig::default());
        for &e in &actors {
            naive.register(&world, e).unwrap();
            tree.register(&world, e).unwrap();
        }

        for round in 0..2 {
            let mut a: Vec<(Entity, Entity)> = naive
                .find_pairs(&world, &actors)
                .iter()
                .map(|p| (p.left.min(p.right), p.left.max(p.right)))
                .collect();
            let mut b: Vec<(Entity, Entity)> = tree
                .find_pairs(&world, &actors)
                .iter()
                .map(|p| (p.left.min(p.right), p.left.max(p.right)))
                .collect();
            a.sort();
            b.sort();
            prop_assert_eq!(&a, &b, "round {}", round);

            for (e, (dx, dy)) in actors.iter().zip(&moves) {
                world.get::<&mut Transform2d>(*e).unwrap().position += DVec2::new(*dx, *dy);
            }
            tree.update(&world, &actors).unwrap();
            prop_assert!(tree.tree().validate().is_ok());
        }
    }
}
