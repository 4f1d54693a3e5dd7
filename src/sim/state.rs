//! Game state and core simulation types
//!
//! The state machine owns everything mutable: the grid, the grenade in
//! flight, the launcher queue and the row-advance counters.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::{Grid, Level, TileCoord};
use crate::consts::AIM_START_DEGREES;
use crate::settings::{Settings, SettingsError};

/// Progress through a cluster removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalStage {
    /// Flag the matched cluster and find what falls with it
    Marking,
    /// Fade matched tiles and drop floating ones until none are left
    Animating,
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Session created, level not generated yet
    Initial,
    /// Waiting for the shoot command
    Ready,
    /// Grenade in flight
    ShootGrenade,
    /// Matched and floating tiles animating out
    RemoveCluster(RemovalStage),
    /// Run ended, waiting for a new game
    GameOver,
}

/// The grenade in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grenade {
    /// Top-left corner in pixels
    pub pos: Vec2,
    /// Degrees, 0 = right, counter-clockwise
    pub angle: f32,
    /// Pixels per second
    pub speed: f32,
    pub color: u8,
    pub visible: bool,
}

/// The launcher at the bottom of the field and its color queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Launcher {
    /// Top-left corner in pixels
    pub pos: Vec2,
    /// Aim in degrees
    pub angle: f32,
    /// Color loaded for the next shot
    pub color: u8,
    /// Preview position of the queued color
    pub next_pos: Vec2,
    /// Color after that
    pub next_color: u8,
}

impl Launcher {
    /// Centered under the field, with the preview two tiles to its left
    pub fn new(level: &Level) -> Self {
        let pos = Vec2::new(
            level.origin.x + level.width / 2.0 - level.tile_width / 2.0,
            level.origin.y + level.height,
        );
        Self {
            pos,
            angle: AIM_START_DEGREES,
            color: 0,
            next_pos: pos - Vec2::new(2.0 * level.tile_width, 0.0),
            next_color: 0,
        }
    }

    /// Launcher center in pixels
    pub fn center(&self, level: &Level) -> Vec2 {
        self.pos + level.half_tile()
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub settings: Settings,
    pub phase: GamePhase,
    pub grid: Grid,
    pub grenade: Grenade,
    pub launcher: Launcher,
    /// Row parity toggle, flipped on every row insertion
    pub row_offset: usize,
    /// Shots resolved without a match since the last inserted row
    pub shots_since_row: u32,
    /// Seconds of play since the last inserted row (timer mode)
    pub row_timer: f32,
    /// Matched cluster being removed
    pub cluster: Vec<TileCoord>,
    /// Unsupported groups dropping with it
    pub floating_clusters: Vec<Vec<TileCoord>>,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create a session in the `Initial` phase with an empty grid.
    ///
    /// The level is generated on the first tick. Settings are validated
    /// here so the simulation never runs on a degenerate grid or palette.
    pub fn new(settings: Settings, seed: u64) -> Result<Self, SettingsError> {
        settings.validate()?;

        let level = Level::from_settings(&settings);
        let launcher = Launcher::new(&level);
        let grenade = Grenade {
            pos: launcher.pos,
            angle: launcher.angle,
            speed: settings.grenade_speed,
            color: 0,
            visible: false,
        };
        Ok(Self {
            seed,
            phase: GamePhase::Initial,
            grid: Grid::new(level),
            grenade,
            launcher,
            row_offset: 0,
            shots_since_row: 0,
            row_timer: 0.0,
            cluster: Vec::new(),
            floating_clusters: Vec::new(),
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
            settings,
        })
    }

    /// Switch to a new phase
    pub fn set_phase(&mut self, phase: GamePhase) {
        if phase != self.phase {
            log::debug!("Phase {:?} -> {:?}", self.phase, phase);
        }
        self.phase = phase;
    }

    /// Pick a color still on the grid (0 if the grid is empty)
    pub fn random_existing_color(&mut self) -> u8 {
        self.grid.random_existing_color(&mut self.rng)
    }

    /// Grenade center in pixels
    pub fn grenade_center(&self) -> Vec2 {
        self.grenade.pos + self.grid.level.half_tile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_initial_and_empty() {
        let state = GameState::new(Settings::default(), 1).unwrap();
        assert_eq!(state.phase, GamePhase::Initial);
        assert!(state.grid.iter().all(|t| t.kind.is_empty()));
        assert!(!state.grenade.visible);
        assert_eq!(state.row_offset, 0);
    }

    #[test]
    fn test_new_state_rejects_invalid_settings() {
        let mut settings = Settings::default();
        settings.palette_size = 0;
        assert!(matches!(
            GameState::new(settings, 1),
            Err(SettingsError::Invalid(_))
        ));

        let mut settings = Settings::default();
        settings.columns = 0;
        assert!(matches!(
            GameState::new(settings, 1),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn test_launcher_centered_below_field() {
        let level = Level::from_settings(&Settings::default());
        let launcher = Launcher::new(&level);
        assert_eq!(launcher.pos, Vec2::new(290.0, 482.0));
        assert_eq!(launcher.center(&level), Vec2::new(310.0, 502.0));
        assert_eq!(launcher.next_pos, Vec2::new(210.0, 482.0));
        assert_eq!(launcher.angle, 90.0);
    }
}
