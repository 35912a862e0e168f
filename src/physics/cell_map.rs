//! Static tile geometry.
//!
//! A cell map is a grid of equally sized cells, some of them solid. Actors
//! are pushed out of solid cells separately from actor-actor resolution, by
//! sampling the grid under their bounds.

use glam::DVec2;
use hecs::Entity;

use crate::debug::{DebugColor, DebugDraw};
use crate::ecs::components::physics::{Collider, CollisionType, Motion};
use crate::ecs::components::transform::Transform2d;
use crate::ecs::events::{self, CollisionEvent};

use super::broadphase::{actor_bounds, is_collidable};
use super::collider::{BoundingBox, Side};
use super::solver::bounce;

/// Grid of solid and empty cells, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct CellMap {
    pub origin: DVec2,
    pub cell_width: f64,
    pub cell_height: f64,
    pub rows: usize,
    pub cols: usize,
    solid: Vec<bool>,
}

impl CellMap {
    pub fn new(origin: DVec2, cell_width: f64, cell_height: f64, rows: usize, cols: usize) -> Self {
        Self {
            origin,
            cell_width,
            cell_height,
            rows,
            cols,
            solid: vec![false; rows * cols],
        }
    }

    fn index(&self, col: usize, row: usize) -> Option<usize> {
        (col < self.cols && row < self.rows).then(|| row * self.cols + col)
    }

    /// Mark a cell solid or empty. Returns false when out of range.
    pub fn set_solid(&mut self, col: usize, row: usize, solid: bool) -> bool {
        match self.index(col, row) {
            Some(i) => {
                self.solid[i] = solid;
                true
            }
            None => false,
        }
    }

    pub fn is_solid(&self, col: usize, row: usize) -> bool {
        self.index(col, row).map_or(false, |i| self.solid[i])
    }

    pub fn cell_bounds(&self, col: usize, row: usize) -> Option<BoundingBox> {
        self.index(col, row)?;
        let pos = self.origin
            + DVec2::new(col as f64 * self.cell_width, row as f64 * self.cell_height);
        Some(BoundingBox::from_size(
            pos,
            DVec2::new(self.cell_width, self.cell_height),
        ))
    }

    /// `(col, row)` of the cell under `point`.
    pub fn cell_at_point(&self, point: DVec2) -> Option<(usize, usize)> {
        let local = point - self.origin;
        let col = (local.x / self.cell_width).floor();
        let row = (local.y / self.cell_height).floor();
        if !(col >= 0.0 && row >= 0.0) || col >= self.cols as f64 || row >= self.rows as f64 {
            return None;
        }
        Some((col as usize, row as usize))
    }

    /// Translation pushing `bounds` out of the solid cells it overlaps.
    ///
    /// Only overlaps that point away from the cell count; the result keeps,
    /// per axis, the largest of them.
    pub fn collides(&self, bounds: &BoundingBox) -> Option<DVec2> {
        if !(bounds.width().is_finite() && bounds.height().is_finite()) {
            return None;
        }
        let step_x = (bounds.width() / 2.0)
            .min(self.cell_width / 2.0)
            .max(1.0);
        let step_y = (bounds.height() / 2.0)
            .min(self.cell_height / 2.0)
            .max(1.0);
        let center = bounds.center();

        let mut result: Option<DVec2> = None;
        let mut x = bounds.left;
        while x <= bounds.right {
            let mut y = bounds.top;
            while y <= bounds.bottom {
                if let Some((col, row)) = self.cell_at_point(DVec2::new(x, y)) {
                    if let Some(overlap) = self.solid_overlap(col, row, bounds, center) {
                        result = Some(match result {
                            None => overlap,
                            Some(acc) => merge(acc, overlap),
                        });
                    }
                }
                y += step_y;
            }
            x += step_x;
        }
        result
    }

    fn solid_overlap(
        &self,
        col: usize,
        row: usize,
        bounds: &BoundingBox,
        center: DVec2,
    ) -> Option<DVec2> {
        if !self.is_solid(col, row) {
            return None;
        }
        let cell = self.cell_bounds(col, row)?;
        let overlap = bounds.collides(&cell)?;
        (overlap.dot(center - cell.center()) > 0.0).then_some(overlap)
    }

    pub fn debug_draw(&self, ctx: &mut dyn DebugDraw) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                if !self.is_solid(col, row) {
                    continue;
                }
                if let Some(cell) = self.cell_bounds(col, row) {
                    ctx.stroke_rect(&cell, DebugColor::WHITE);
                }
            }
        }
    }
}

fn merge(acc: DVec2, next: DVec2) -> DVec2 {
    DVec2::new(
        if acc.x.abs() < next.x.abs() { next.x } else { acc.x },
        if acc.y.abs() < next.y.abs() { next.y } else { acc.y },
    )
}

/// Push movable actors out of every map, up to `passes` times per map.
///
/// Each push emits a collision event with no `other`. Elastic actors bounce
/// at most once per call. Returns the number of pushes.
pub fn resolve_cell_maps(
    world: &mut hecs::World,
    actors: &[Entity],
    maps: &[CellMap],
    passes: u32,
) -> usize {
    let mut contacts = 0;
    for &entity in actors {
        if !is_collidable(world, entity) {
            continue;
        }
        let Ok(collision_type) = world.get::<&Collider>(entity).map(|c| c.collision_type) else {
            continue;
        };
        if !collision_type.is_movable() {
            continue;
        }

        let mut bounced = false;
        for map in maps {
            for _ in 0..passes {
                let Some(bounds) = actor_bounds(world, entity) else {
                    break;
                };
                let Some(intersect) = map.collides(&bounds) else {
                    break;
                };
                let side = Side::from_intersection(intersect);
                events::emit(
                    world,
                    CollisionEvent {
                        actor: entity,
                        other: None,
                        side,
                        intersection: intersect,
                    },
                );

                if let Ok(mut transform) = world.get::<&mut Transform2d>(entity) {
                    transform.translate(intersect);
                }
                if collision_type == CollisionType::Elastic && !bounced {
                    if let Ok(mut motion) = world.get::<&mut Motion>(entity) {
                        motion.velocity = bounce(motion.velocity, side);
                    }
                    bounced = true;
                }
                contacts += 1;
            }
        }
    }
    if contacts > 0 {
        tracing::trace!(contacts, "resolved cell map contacts");
    }
    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::events::CollisionEvents;

    /// 10x10 map of 10-unit cells with a solid floor on the last row.
    fn floor_map() -> CellMap {
        let mut map = CellMap::new(DVec2::ZERO, 10.0, 10.0, 10, 10);
        for col in 0..10 {
            map.set_solid(col, 9, true);
        }
        map
    }

    #[test]
    fn test_cell_lookup() {
        let map = floor_map();
        assert_eq!(map.cell_at_point(DVec2::new(15.0, 95.0)), Some((1, 9)));
        assert_eq!(map.cell_at_point(DVec2::new(-1.0, 5.0)), None);
        assert_eq!(map.cell_at_point(DVec2::new(5.0, 100.0)), None);
        assert_eq!(
            map.cell_bounds(1, 9),
            Some(BoundingBox::new(10.0, 90.0, 20.0, 100.0))
        );
        assert!(map.is_solid(3, 9));
        assert!(!map.is_solid(3, 8));
        assert!(!map.is_solid(30, 9));
    }

    #[test]
    fn test_collides_pushes_up_out_of_floor() {
        let map = floor_map();
        let actor = BoundingBox::new(21.0, 83.0, 29.0, 93.0);
        assert_eq!(map.collides(&actor), Some(DVec2::new(0.0, -3.0)));

        let above = BoundingBox::new(22.0, 70.0, 32.0, 80.0);
        assert_eq!(map.collides(&above), None);
    }

    #[test]
    fn test_merge_keeps_largest_component() {
        assert_eq!(
            merge(DVec2::new(-1.0, 0.0), DVec2::new(0.5, -4.0)),
            DVec2::new(-1.0, -4.0)
        );
    }

    #[test]
    fn test_resolve_cell_maps_moves_and_emits() {
        let mut world = hecs::World::new();
        let ball = world.spawn((
            Transform2d::from_xy(21.0, 83.0),
            Motion::from_velocity(DVec2::new(1.0, 4.0)),
            Collider::new(DVec2::new(8.0, 10.0), CollisionType::Elastic),
            CollisionEvents::new(),
        ));
        let wall = world.spawn((
            Transform2d::from_xy(52.0, 85.0),
            Collider::new(DVec2::splat(10.0), CollisionType::Fixed),
            CollisionEvents::new(),
        ));

        let contacts = resolve_cell_maps(&mut world, &[ball, wall], &[floor_map()], 3);
        assert_eq!(contacts, 1);

        assert_eq!(
            world.get::<&Transform2d>(ball).unwrap().position,
            DVec2::new(21.0, 80.0)
        );
        assert_eq!(
            world.get::<&Motion>(ball).unwrap().velocity,
            DVec2::new(1.0, -4.0)
        );
        let events = world.get::<&CollisionEvents>(ball).unwrap();
        let event = events.iter().next().unwrap();
        assert_eq!(event.other, None);
        assert_eq!(event.side, Side::Bottom);
        assert!(world.get::<&CollisionEvents>(wall).unwrap().is_empty());
    }
}
