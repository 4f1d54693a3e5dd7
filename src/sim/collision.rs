//! Grenade motion and contact detection
//!
//! The grenade is a circle the size of a tile. It bounces off the side walls,
//! and stops when it reaches the ceiling or overlaps any occupied tile.

use glam::Vec2;

use super::grid::{Grid, TileCoord};
use super::state::Grenade;
use crate::deg_to_rad;

/// What stopped the grenade this step, if anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Still in flight
    None,
    /// Reached the top of the play field
    Ceiling,
    /// Overlaps this tile
    Tile(TileCoord),
}

impl Contact {
    /// True if the grenade should snap into the grid
    #[inline]
    pub fn is_hit(self) -> bool {
        self != Contact::None
    }
}

/// Check if two circles overlap (touching does not count)
#[inline]
pub fn circle_intersection(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance(b) < radius_a + radius_b
}

/// Move the grenade by one timestep and report contact.
///
/// Position is the grenade's top-left corner, like tile coordinates. Walls
/// reflect the angle about the vertical axis and clamp the grenade inside.
pub fn advance_grenade(grenade: &mut Grenade, grid: &Grid, row_offset: usize, dt: f32) -> Contact {
    let level = &grid.level;
    let angle = deg_to_rad(grenade.angle);

    // Screen y grows downward, so upward motion decreases y
    grenade.pos.x += dt * grenade.speed * angle.cos();
    grenade.pos.y -= dt * grenade.speed * angle.sin();

    // Side walls
    let left = level.origin.x;
    let right = level.origin.x + level.width;
    if grenade.pos.x <= left {
        grenade.angle = 180.0 - grenade.angle;
        grenade.pos.x = left;
    } else if grenade.pos.x + level.tile_width >= right {
        grenade.angle = 180.0 - grenade.angle;
        grenade.pos.x = right - level.tile_width;
    }

    // Ceiling
    if grenade.pos.y <= level.origin.y {
        grenade.pos.y = level.origin.y;
        return Contact::Ceiling;
    }

    // First overlapping tile in column-major order wins, not the nearest
    let center = grenade.pos + level.half_tile();
    grid.iter()
        .filter(|tile| !tile.kind.is_empty())
        .find(|tile| {
            let tile_center = grid.tile_center(tile.column, tile.row, row_offset);
            circle_intersection(center, level.radius, tile_center, level.radius)
        })
        .map_or(Contact::None, |tile| Contact::Tile(tile.coord()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::grid::{Level, TileKind};
    use proptest::prelude::*;

    fn grid() -> Grid {
        Grid::new(Level::from_settings(&Settings::default()))
    }

    fn grenade(pos: Vec2, angle: f32) -> Grenade {
        Grenade {
            pos,
            angle,
            speed: 1000.0,
            color: 0,
            visible: true,
        }
    }

    #[test]
    fn test_circle_intersection_strict() {
        let a = Vec2::new(0.0, 0.0);
        assert!(circle_intersection(a, 20.0, Vec2::new(39.9, 0.0), 20.0));
        // Exactly tangent does not count
        assert!(!circle_intersection(a, 20.0, Vec2::new(40.0, 0.0), 20.0));
        assert!(!circle_intersection(a, 20.0, Vec2::new(30.0, 30.0), 20.0));
    }

    #[test]
    fn test_moves_up_and_right() {
        let grid = grid();
        let mut g = grenade(Vec2::new(200.0, 400.0), 45.0);
        let contact = advance_grenade(&mut g, &grid, 0, 0.01);
        assert_eq!(contact, Contact::None);
        let step = 10.0 * std::f32::consts::FRAC_1_SQRT_2;
        assert!((g.pos.x - (200.0 + step)).abs() < 0.01);
        assert!((g.pos.y - (400.0 - step)).abs() < 0.01);
    }

    #[test]
    fn test_left_wall_reflects() {
        let grid = grid();
        let mut g = grenade(Vec2::new(2.0, 300.0), 150.0);
        advance_grenade(&mut g, &grid, 0, 0.01);
        assert_eq!(g.pos.x, 0.0);
        assert!((g.angle - 30.0).abs() < 0.001);
    }

    #[test]
    fn test_right_wall_tests_far_edge() {
        let grid = grid();
        let right = grid.level.width;
        let mut g = grenade(Vec2::new(right - 42.0, 300.0), 30.0);
        advance_grenade(&mut g, &grid, 0, 0.01);
        assert_eq!(g.pos.x, right - 40.0);
        assert!((g.angle - 150.0).abs() < 0.001);
    }

    #[test]
    fn test_ceiling_contact_clamps() {
        let grid = grid();
        let mut g = grenade(Vec2::new(100.0, 3.0), 90.0);
        assert_eq!(advance_grenade(&mut g, &grid, 0, 0.01), Contact::Ceiling);
        assert_eq!(g.pos.y, 0.0);
    }

    #[test]
    fn test_tile_contact() {
        let mut grid = grid();
        grid.set_kind(TileCoord::new(5, 3), TileKind::Color(2));
        let below = grid.tile_coordinate(5, 3, 0) + Vec2::new(0.0, 45.0);
        let mut g = grenade(below, 90.0);
        assert_eq!(
            advance_grenade(&mut g, &grid, 0, 0.01),
            Contact::Tile(TileCoord::new(5, 3))
        );
    }

    #[test]
    fn test_first_hit_in_scan_order_wins() {
        let mut grid = grid();
        // Two tiles the grenade overlaps at once; column 4 comes first in scan order
        grid.set_kind(TileCoord::new(4, 2), TileKind::Color(0));
        grid.set_kind(TileCoord::new(5, 2), TileKind::Color(1));
        let between = (grid.tile_coordinate(4, 2, 0) + grid.tile_coordinate(5, 2, 0)) / 2.0
            + Vec2::new(0.0, 20.0);
        let mut g = grenade(between, 90.0);
        assert_eq!(
            advance_grenade(&mut g, &grid, 0, 0.0),
            Contact::Tile(TileCoord::new(4, 2))
        );
    }

    #[test]
    fn test_blocked_tiles_collide() {
        let mut grid = grid();
        grid.set_kind(TileCoord::new(2, 4), TileKind::Blocked);
        let mut g = grenade(grid.tile_coordinate(2, 4, 0) + Vec2::new(0.0, 30.0), 90.0);
        assert!(advance_grenade(&mut g, &grid, 0, 0.0).is_hit());
    }

    proptest! {
        #[test]
        fn prop_circle_intersection_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            ra in 0.0f32..100.0, rb in 0.0f32..100.0,
        ) {
            let a = Vec2::new(ax, ay);
            let b = Vec2::new(bx, by);
            prop_assert_eq!(
                circle_intersection(a, ra, b, rb),
                circle_intersection(b, rb, a, ra)
            );
        }
    }
}
