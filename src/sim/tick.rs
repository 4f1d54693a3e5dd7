//! Per-tick state machine
//!
//! Ready -> ShootGrenade -> (snap) -> RemoveCluster -> Ready, with rows
//! pushed in from the top every few shots (or seconds) until a tile lands in
//! the bottom row.

use rand::Rng;

use super::cluster::{ClusterQuery, find_cluster, find_floating_clusters};
use super::collision::advance_grenade;
use super::grid::{TileCoord, TileKind};
use super::state::{GamePhase, GameState, RemovalStage};
use crate::clamp_aim_angle;
use crate::settings::{NewRowFill, RowAdvance};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// New launcher aim in degrees (clamped to the firing arc)
    pub aim_angle: Option<f32>,
    /// Fire the loaded grenade (only honoured in `Ready`)
    pub shoot: bool,
    /// Start over (only honoured in `GameOver`)
    pub new_game: bool,
}

/// Convert a frame delta in milliseconds to simulation seconds
#[inline]
pub fn dt_from_millis(millis: f64) -> f32 {
    (millis / 1000.0) as f32
}

/// Advance the game state by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;

    if let Some(angle) = input.aim_angle {
        state.launcher.angle = clamp_aim_angle(angle);
    }

    match state.phase {
        GamePhase::Initial => new_game(state),

        GamePhase::Ready => {
            if let RowAdvance::Timer { seconds } = state.settings.row_advance {
                state.row_timer += dt;
                if state.row_timer >= seconds {
                    state.row_timer -= seconds;
                    insert_row(state);
                    if check_game_over(state) {
                        return;
                    }
                }
            }

            if input.shoot {
                shoot(state);
            }
        }

        GamePhase::ShootGrenade => {
            if matches!(state.settings.row_advance, RowAdvance::Timer { .. }) {
                state.row_timer += dt;
            }

            let contact = advance_grenade(&mut state.grenade, &state.grid, state.row_offset, dt);
            if contact.is_hit() {
                log::debug!("Grenade contact: {:?}", contact);
                snap_grenade(state);
            }
        }

        GamePhase::RemoveCluster(stage) => remove_cluster(state, stage, dt),

        GamePhase::GameOver => {
            if input.new_game {
                new_game(state);
            }
        }
    }
}

/// Reset everything and generate a fresh level
pub fn new_game(state: &mut GameState) {
    state.grid.clear();
    state.row_offset = 0;
    state.shots_since_row = 0;
    state.row_timer = 0.0;
    state.cluster.clear();
    state.floating_clusters.clear();

    generate_level(state);
    log::info!(
        "New game: {}x{} grid, {} colors, seed {}",
        state.grid.columns(),
        state.grid.rows(),
        state.settings.palette_size,
        state.seed
    );

    // Load the launcher and fill the preview
    next_grenade(state);
    next_grenade(state);
    state.set_phase(GamePhase::Ready);
}

/// Fill the upper half of the grid with runs of two same-colored tiles
pub fn generate_level(state: &mut GameState) {
    let palette = state.settings.palette_size;
    let columns = state.grid.columns();
    let filled_rows = state.grid.rows() / 2;

    for row in 0..filled_rows {
        let mut color = state.rng.random_range(0..palette);
        let mut run = 0;
        for column in 0..columns {
            if run >= 2 {
                let mut next = state.rng.random_range(0..palette);
                // Never repeat the previous run's color
                if next == color {
                    next = (next + 1) % palette;
                }
                color = next;
                run = 0;
            }
            run += 1;
            state
                .grid
                .set_kind(TileCoord::new(column, row), TileKind::Color(color));
        }
    }
}

/// Fire the loaded grenade from the launcher
pub fn shoot(state: &mut GameState) {
    let grenade = &mut state.grenade;
    grenade.pos = state.launcher.pos;
    grenade.angle = state.launcher.angle;
    grenade.speed = state.settings.grenade_speed;
    grenade.color = state.launcher.color;
    grenade.visible = true;
    state.set_phase(GamePhase::ShootGrenade);
}

/// Move the queued color into the launcher and queue a new one.
///
/// A queued color that left the grid since it was picked is re-rolled.
pub fn next_grenade(state: &mut GameState) {
    let colors = state.grid.existing_colors();
    if !colors.is_empty() && !colors.contains(&state.launcher.next_color) {
        state.launcher.next_color = state.random_existing_color();
    }

    state.launcher.color = state.launcher.next_color;
    state.grenade.color = state.launcher.color;
    state.grenade.pos = state.launcher.pos;
    state.grenade.visible = true;
    state.launcher.next_color = state.random_existing_color();
}

/// End the run if anything reached the bottom row
pub fn check_game_over(state: &mut GameState) -> bool {
    if !state.grid.bottom_row_occupied() {
        return false;
    }
    log::info!("Game over: tiles reached the bottom row");
    next_grenade(state);
    state.set_phase(GamePhase::GameOver);
    true
}

/// Push every column down one row and fill the new top row
pub fn insert_row(state: &mut GameState) {
    state.grid.push_rows_down();
    for column in 0..state.grid.columns() {
        let kind = match state.settings.new_row_fill {
            NewRowFill::RandomColors => TileKind::Color(state.random_existing_color()),
            NewRowFill::Blocked => TileKind::Blocked,
        };
        state.grid.set_kind(TileCoord::new(column, 0), kind);
    }
    state.row_offset = (state.row_offset + 1) % 2;
    log::info!("Inserted row (row offset now {})", state.row_offset);
}

/// Turn the grenade into a grid tile and decide what happens next
pub fn snap_grenade(state: &mut GameState) {
    let center = state.grenade_center();
    let raw = state.grid.grid_position(center, state.row_offset);
    let mut target = state.grid.clamp_position(raw);

    // Occupied cell: slide down the column to the first free one
    let placed = if state.grid.kind(target).is_empty() {
        true
    } else {
        let column = target.column;
        let free_row = (target.row + 1..state.grid.rows())
            .find(|&row| state.grid.kind(TileCoord::new(column, row)).is_empty());
        if let Some(row) = free_row {
            target.row = row;
        }
        free_row.is_some()
    };

    if placed {
        state.grenade.visible = false;
        state.grid.tile_mut(target).clear();
        state
            .grid
            .set_kind(target, TileKind::Color(state.grenade.color));
        log::debug!(
            "Snapped color {} into ({}, {})",
            state.grenade.color,
            target.column,
            target.row
        );

        if check_game_over(state) {
            return;
        }

        let cluster = find_cluster(&mut state.grid, target, ClusterQuery::MATCH, state.row_offset);
        if cluster.len() >= state.settings.min_cluster_size {
            log::debug!("Matched cluster of {}", cluster.len());
            state.cluster = cluster;
            state.set_phase(GamePhase::RemoveCluster(RemovalStage::Marking));
            return;
        }
    } else {
        log::warn!(
            "No free cell in column {}, shot absorbed",
            target.column
        );
    }

    if let RowAdvance::Turns { shots } = state.settings.row_advance {
        state.shots_since_row += 1;
        if state.shots_since_row >= shots {
            state.shots_since_row = 0;
            insert_row(state);
            if check_game_over(state) {
                return;
            }
        }
    }

    next_grenade(state);
    state.set_phase(GamePhase::Ready);
}

/// Pop the matched cluster and drop whatever it was holding up
fn remove_cluster(state: &mut GameState, stage: RemovalStage, dt: f32) {
    if stage == RemovalStage::Marking {
        state.grid.reset_removed();
        for &coord in &state.cluster {
            state.grid.tile_mut(coord).removed = true;
        }

        state.floating_clusters = find_floating_clusters(&mut state.grid, state.row_offset);
        let drop_speed = state.settings.drop_speed;
        for &coord in state.floating_clusters.iter().flatten() {
            let tile = state.grid.tile_mut(coord);
            tile.shift = 0.0;
            tile.velocity = drop_speed;
        }

        state.set_phase(GamePhase::RemoveCluster(RemovalStage::Animating));
    }

    let settings = &state.settings;
    let level = &state.grid.level;
    let floor = (level.rows - 1) as f32 * level.row_height + level.tile_height;
    let row_height = level.row_height;
    let mut tiles_left = false;

    for &coord in &state.cluster {
        let tile = state.grid.tile_mut(coord);
        if tile.kind.is_empty() {
            continue;
        }
        tiles_left = true;

        tile.alpha = (tile.alpha - dt * settings.pop_fade_rate).max(0.0);
        if tile.alpha == 0.0 {
            tile.clear();
        }
    }

    for &coord in state.floating_clusters.iter().flatten() {
        let tile = state.grid.tile_mut(coord);
        if tile.kind.is_empty() {
            continue;
        }
        tiles_left = true;

        tile.velocity += dt * settings.drop_acceleration;
        tile.shift += dt * tile.velocity;
        tile.alpha = (tile.alpha - dt * settings.drop_fade_rate).max(0.0);

        // Faded out, or fell past the bottom of the field
        if tile.alpha == 0.0 || tile.row as f32 * row_height + tile.shift > floor {
            tile.clear();
        }
    }

    if tiles_left {
        return;
    }

    state.cluster.clear();
    state.floating_clusters.clear();
    next_grenade(state);

    if state.grid.has_colored_tiles() {
        state.set_phase(GamePhase::Ready);
    } else {
        log::info!("Game over: grid cleared");
        state.set_phase(GamePhase::GameOver);
    }
}
