//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Stable column-major iteration order
//! - No rendering or platform dependencies

pub mod cluster;
pub mod collision;
pub mod grid;
pub mod state;
pub mod tick;

pub use cluster::{ClusterQuery, find_cluster, find_floating_clusters};
pub use collision::{Contact, advance_grenade, circle_intersection};
pub use grid::{Grid, Level, Tile, TileCoord, TileKind};
pub use state::{GamePhase, GameState, Grenade, Launcher, RemovalStage};
pub use tick::{TickInput, dt_from_millis, new_game, snap_grenade, tick};
