//! Staggered tile grid and its coordinate math
//!
//! Tiles are stored column-major (`tiles[column][row]`). Every other row is
//! shifted right by half a tile width, which gives each tile six neighbors.
//! Which rows are shifted depends on `row_offset`, toggled each time a new
//! row is pushed in from the top.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Neighbor offsets `(dcolumn, drow)` for unshifted rows
const EVEN_ROW_NEIGHBORS: [(i32, i32); 6] = [(1, 0), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1)];
/// Neighbor offsets `(dcolumn, drow)` for shifted rows
const ODD_ROW_NEIGHBORS: [(i32, i32); 6] = [(1, 0), (1, 1), (0, 1), (-1, 0), (0, -1), (1, -1)];

/// What occupies a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Empty,
    /// Indestructible ceiling tile (never matches, never falls)
    Blocked,
    /// Colored tile, index into the palette
    Color(u8),
}

impl TileKind {
    #[inline]
    pub fn is_empty(self) -> bool {
        self == TileKind::Empty
    }

    /// Palette index if this is a colored tile
    #[inline]
    pub fn color(self) -> Option<u8> {
        match self {
            TileKind::Color(c) => Some(c),
            _ => None,
        }
    }
}

/// Grid cell address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub column: usize,
    pub row: usize,
}

impl TileCoord {
    pub const fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }
}

/// A single grid cell plus its animation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub column: usize,
    pub row: usize,
    pub kind: TileKind,
    /// Part of the cluster currently being cleared
    pub removed: bool,
    /// Visited by the current flood fill
    #[serde(skip)]
    pub processed: bool,
    /// Fade (1 = opaque), driven while the tile is removed
    pub alpha: f32,
    /// Vertical drop offset in pixels
    pub shift: f32,
    /// Drop speed in pixels/s
    pub velocity: f32,
}

impl Tile {
    pub fn new(column: usize, row: usize) -> Self {
        Self {
            column,
            row,
            kind: TileKind::Empty,
            removed: false,
            processed: false,
            alpha: 1.0,
            shift: 0.0,
            velocity: 0.0,
        }
    }

    #[inline]
    pub fn coord(&self) -> TileCoord {
        TileCoord::new(self.column, self.row)
    }

    /// Finalize removal: the cell becomes empty with neutral animation state
    pub fn clear(&mut self) {
        self.kind = TileKind::Empty;
        self.removed = false;
        self.alpha = 1.0;
        self.shift = 0.0;
        self.velocity = 0.0;
    }
}

/// Pixel geometry of the play field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub origin: Vec2,
    pub columns: usize,
    pub rows: usize,
    pub tile_width: f32,
    pub tile_height: f32,
    pub row_height: f32,
    pub radius: f32,
    /// Play field width including the half-tile stagger
    pub width: f32,
    /// Play field height from the top row to the bottom of the last row
    pub height: f32,
}

impl Level {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            origin: Vec2::new(settings.origin_x, settings.origin_y),
            columns: settings.columns,
            rows: settings.rows,
            tile_width: settings.tile_width,
            tile_height: settings.tile_height,
            row_height: settings.row_height,
            radius: settings.radius,
            width: settings.columns as f32 * settings.tile_width + settings.tile_width / 2.0,
            height: (settings.rows.saturating_sub(1)) as f32 * settings.row_height
                + settings.tile_height,
        }
    }

    /// Offset from a tile's top-left corner to its center
    #[inline]
    pub fn half_tile(&self) -> Vec2 {
        Vec2::new(self.tile_width / 2.0, self.tile_height / 2.0)
    }
}

/// True if the row is drawn shifted right by half a tile
#[inline]
pub fn is_shifted_row(row: i64, row_offset: usize) -> bool {
    (row + row_offset as i64).rem_euclid(2) == 1
}

/// The tile matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub level: Level,
    tiles: Vec<Vec<Tile>>,
}

impl Grid {
    /// Create an all-empty grid
    pub fn new(level: Level) -> Self {
        let tiles = (0..level.columns)
            .map(|column| (0..level.rows).map(|row| Tile::new(column, row)).collect())
            .collect();
        Self { level, tiles }
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.level.columns
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.level.rows
    }

    /// Tile at a coordinate known to be in bounds
    #[inline]
    pub fn tile(&self, coord: TileCoord) -> &Tile {
        &self.tiles[coord.column][coord.row]
    }

    #[inline]
    pub fn tile_mut(&mut self, coord: TileCoord) -> &mut Tile {
        &mut self.tiles[coord.column][coord.row]
    }

    /// Tile at a possibly out-of-range coordinate
    pub fn get(&self, column: i64, row: i64) -> Option<&Tile> {
        if column < 0 || row < 0 {
            return None;
        }
        self.tiles.get(column as usize)?.get(row as usize)
    }

    #[inline]
    pub fn kind(&self, coord: TileCoord) -> TileKind {
        self.tile(coord).kind
    }

    pub fn set_kind(&mut self, coord: TileCoord, kind: TileKind) {
        self.tile_mut(coord).kind = kind;
    }

    /// All tiles, column-major, row ascending
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut().flatten()
    }

    /// Top-left pixel position of a tile
    pub fn tile_coordinate(&self, column: usize, row: usize, row_offset: usize) -> Vec2 {
        let level = &self.level;
        let mut x = level.origin.x + column as f32 * level.tile_width;
        if is_shifted_row(row as i64, row_offset) {
            x += level.tile_width / 2.0;
        }
        let y = level.origin.y + row as f32 * level.row_height;
        Vec2::new(x, y)
    }

    /// Center pixel position of a tile
    #[inline]
    pub fn tile_center(&self, column: usize, row: usize, row_offset: usize) -> Vec2 {
        self.tile_coordinate(column, row, row_offset) + self.level.half_tile()
    }

    /// Grid cell under a pixel position; may be out of bounds
    pub fn grid_position(&self, pos: Vec2, row_offset: usize) -> (i64, i64) {
        let level = &self.level;
        let row = ((pos.y - level.origin.y) / level.row_height).floor() as i64;
        let x_offset = if is_shifted_row(row, row_offset) {
            level.tile_width / 2.0
        } else {
            0.0
        };
        let column = ((pos.x - x_offset - level.origin.x) / level.tile_width).floor() as i64;
        (column, row)
    }

    /// Clamp a possibly out-of-range cell into the grid
    pub fn clamp_position(&self, (column, row): (i64, i64)) -> TileCoord {
        TileCoord::new(
            column.clamp(0, self.columns() as i64 - 1) as usize,
            row.clamp(0, self.rows() as i64 - 1) as usize,
        )
    }

    /// In-bounds neighbors of a cell (up to six)
    pub fn neighbors(&self, coord: TileCoord, row_offset: usize) -> Vec<TileCoord> {
        let offsets = if is_shifted_row(coord.row as i64, row_offset) {
            &ODD_ROW_NEIGHBORS
        } else {
            &EVEN_ROW_NEIGHBORS
        };
        offsets
            .iter()
            .filter_map(|&(dc, dr)| {
                let column = coord.column as i64 + dc as i64;
                let row = coord.row as i64 + dr as i64;
                self.get(column, row).map(Tile::coord)
            })
            .collect()
    }

    /// Colors still on the grid, in column-major discovery order
    pub fn existing_colors(&self) -> Vec<u8> {
        let mut seen = [false; 256];
        let mut colors = Vec::new();
        for color in self.iter().filter_map(|t| t.kind.color()) {
            if !seen[color as usize] {
                seen[color as usize] = true;
                colors.push(color);
            }
        }
        colors
    }

    /// Uniform pick among the colors still on the grid, or 0 if none are left
    pub fn random_existing_color<R: Rng>(&self, rng: &mut R) -> u8 {
        let colors = self.existing_colors();
        if colors.is_empty() {
            0
        } else {
            colors[rng.random_range(0..colors.len())]
        }
    }

    /// Clear the flood-fill visited flag on every tile
    pub fn reset_processed(&mut self) {
        for tile in self.iter_mut() {
            tile.processed = false;
        }
    }

    /// Clear the pending-removal flag on every tile
    pub fn reset_removed(&mut self) {
        for tile in self.iter_mut() {
            tile.removed = false;
        }
    }

    /// Empty every cell and reset animation state
    pub fn clear(&mut self) {
        for tile in self.iter_mut() {
            tile.clear();
            tile.processed = false;
        }
    }

    /// Any tile (colored or blocked) sitting in the bottom row
    pub fn bottom_row_occupied(&self) -> bool {
        let bottom = self.rows() - 1;
        self.tiles.iter().any(|column| !column[bottom].kind.is_empty())
    }

    /// Any colored tile left anywhere
    pub fn has_colored_tiles(&self) -> bool {
        self.iter().any(|t| t.kind.color().is_some())
    }

    /// Move every column down by one row, dropping the bottom row.
    ///
    /// The top row is left empty for the caller to fill.
    pub fn push_rows_down(&mut self) {
        for column in &mut self.tiles {
            for row in (1..column.len()).rev() {
                column[row].kind = column[row - 1].kind;
            }
            column[0].kind = TileKind::Empty;
        }
    }
}
