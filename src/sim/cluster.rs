//! Flood-fill cluster search over the tile grid
//!
//! Both searches use the per-tile `processed` flag as the visited set. The
//! grid is borrowed mutably for the duration of a search, so traversals can
//! never interleave.

use super::grid::{Grid, TileCoord, TileKind};

/// Flood-fill options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterQuery {
    /// Only accept tiles with the start tile's kind
    pub match_kind: bool,
    /// Clear every `processed` flag before starting
    pub reset_processed: bool,
    /// Ignore tiles flagged for removal
    pub skip_removed: bool,
}

impl ClusterQuery {
    /// Same-color match search
    pub const MATCH: Self = Self {
        match_kind: true,
        reset_processed: true,
        skip_removed: false,
    };

    /// Connectivity search chained inside a larger pass
    pub const CONNECTED: Self = Self {
        match_kind: false,
        reset_processed: false,
        skip_removed: true,
    };
}

/// Collect the group of tiles connected to `start`.
///
/// The start tile must not be empty. Tiles come back in discovery order.
/// Every visited neighbor is marked `processed` as soon as it is queued, so
/// no tile is queued twice in one traversal.
pub fn find_cluster(
    grid: &mut Grid,
    start: TileCoord,
    query: ClusterQuery,
    row_offset: usize,
) -> Vec<TileCoord> {
    if query.reset_processed {
        grid.reset_processed();
    }

    let target = grid.kind(start);
    grid.tile_mut(start).processed = true;

    let mut to_process = vec![start];
    let mut found = Vec::new();

    while let Some(coord) = to_process.pop() {
        let tile = grid.tile(coord);
        if tile.kind.is_empty() {
            continue;
        }
        if query.skip_removed && tile.removed {
            continue;
        }
        if query.match_kind && tile.kind != target {
            continue;
        }

        found.push(coord);

        for neighbor in grid.neighbors(coord, row_offset) {
            let tile = grid.tile_mut(neighbor);
            if !tile.processed {
                tile.processed = true;
                to_process.push(neighbor);
            }
        }
    }

    found
}

/// Find every connected group of tiles with no path to the top row.
///
/// Groups flood through blocked tiles (they hold up whatever touches them)
/// but only colored tiles are returned, since blocked tiles never fall.
/// Tiles flagged `removed` are treated as already gone.
pub fn find_floating_clusters(grid: &mut Grid, row_offset: usize) -> Vec<Vec<TileCoord>> {
    grid.reset_processed();

    let mut clusters = Vec::new();

    for column in 0..grid.columns() {
        for row in 0..grid.rows() {
            let coord = TileCoord::new(column, row);
            let tile = grid.tile(coord);
            if tile.processed || tile.kind.is_empty() {
                continue;
            }

            let group = find_cluster(grid, coord, ClusterQuery::CONNECTED, row_offset);
            if group.is_empty() || group.iter().any(|c| c.row == 0) {
                continue;
            }

            let falling: Vec<TileCoord> = group
                .into_iter()
                .filter(|&c| matches!(grid.kind(c), TileKind::Color(_)))
                .collect();
            if !falling.is_empty() {
                clusters.push(falling);
            }
        }
    }

    if !clusters.is_empty() {
        log::debug!(
            "Found {} floating clusters ({} tiles)",
            clusters.len(),
            clusters.iter().map(Vec::len).sum::<usize>()
        );
    }

    clusters
}
