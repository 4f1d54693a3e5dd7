//! Level geometry and tuning
//!
//! Loaded from an optional JSON file; every field falls back to the
//! built-in default so partial files work.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors from loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// When a new row is pushed in from the top
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RowAdvance {
    /// After this many shots that did not clear a cluster
    Turns { shots: u32 },
    /// Every `seconds` of play
    Timer { seconds: f32 },
}

impl Default for RowAdvance {
    fn default() -> Self {
        RowAdvance::Turns {
            shots: SHOTS_PER_ROW,
        }
    }
}

/// What the inserted top row is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NewRowFill {
    /// A random color still present on the grid, per cell
    #[default]
    RandomColors,
    /// Indestructible ceiling tiles
    Blocked,
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Grid ===
    pub columns: usize,
    pub rows: usize,

    // === Geometry (pixels) ===
    pub origin_x: f32,
    pub origin_y: f32,
    pub tile_width: f32,
    pub tile_height: f32,
    pub row_height: f32,
    pub radius: f32,

    // === Colors ===
    pub palette_size: u8,

    // === Motion ===
    pub grenade_speed: f32,
    pub drop_speed: f32,
    pub drop_acceleration: f32,
    pub pop_fade_rate: f32,
    pub drop_fade_rate: f32,

    // === Rules ===
    pub min_cluster_size: usize,
    pub row_advance: RowAdvance,
    pub new_row_fill: NewRowFill,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            columns: COLUMNS,
            rows: ROWS,

            origin_x: 0.0,
            origin_y: 0.0,
            tile_width: TILE_WIDTH,
            tile_height: TILE_HEIGHT,
            row_height: ROW_HEIGHT,
            radius: TILE_RADIUS,

            palette_size: PALETTE_SIZE,

            grenade_speed: GRENADE_SPEED,
            drop_speed: DROP_SPEED,
            drop_acceleration: DROP_ACCELERATION,
            pop_fade_rate: POP_FADE_RATE,
            drop_fade_rate: DROP_FADE_RATE,

            min_cluster_size: MIN_CLUSTER_SIZE,
            row_advance: RowAdvance::default(),
            new_row_fill: NewRowFill::default(),
        }
    }
}

impl Settings {
    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a JSON settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!(
                    "Using default settings ({}): {}",
                    path.as_ref().display(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.columns == 0 || self.rows < 2 {
            return Err(SettingsError::Invalid(format!(
                "grid must be at least 1x2, got {}x{}",
                self.columns, self.rows
            )));
        }
        let positive = [
            ("tile_width", self.tile_width),
            ("tile_height", self.tile_height),
            ("row_height", self.row_height),
            ("radius", self.radius),
            ("grenade_speed", self.grenade_speed),
            ("pop_fade_rate", self.pop_fade_rate),
            ("drop_fade_rate", self.drop_fade_rate),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SettingsError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(self.origin_x.is_finite() && self.origin_y.is_finite()) {
            return Err(SettingsError::Invalid(format!(
                "origin must be finite, got ({}, {})",
                self.origin_x, self.origin_y
            )));
        }
        let unsigned = [
            ("drop_speed", self.drop_speed),
            ("drop_acceleration", self.drop_acceleration),
        ];
        for (name, value) in unsigned {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SettingsError::Invalid(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        if self.palette_size == 0 {
            return Err(SettingsError::Invalid("palette_size must be at least 1".into()));
        }
        if self.min_cluster_size == 0 {
            return Err(SettingsError::Invalid(
                "min_cluster_size must be at least 1".into(),
            ));
        }
        match self.row_advance {
            RowAdvance::Turns { shots } if shots == 0 => Err(SettingsError::Invalid(
                "row_advance shots must be at least 1".into(),
            )),
            RowAdvance::Timer { seconds } if !(seconds.is_finite() && seconds > 0.0) => Err(
                SettingsError::Invalid(format!("row_advance seconds must be positive, got {seconds}")),
            ),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "columns": 8, "palette_size": 4 }"#).unwrap();
        assert_eq!(settings.columns, 8);
        assert_eq!(settings.palette_size, 4);
        assert_eq!(settings.rows, ROWS);
        assert_eq!(settings.row_advance, RowAdvance::Turns { shots: SHOTS_PER_ROW });
    }

    #[test]
    fn test_timer_mode_from_json() {
        let settings =
            Settings::from_json(r#"{ "row_advance": { "Timer": { "seconds": 10.0 } } }"#).unwrap();
        assert_eq!(settings.row_advance, RowAdvance::Timer { seconds: 10.0 });
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let err = Settings::from_json(r#"{ "columns": 0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));

        let err = Settings::from_json(r#"{ "row_advance": { "Turns": { "shots": 0 } } }"#)
            .unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));

        let err = Settings::from_json(r#"{ "pop_fade_rate": 0.0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));

        let mut settings = Settings::default();
        settings.palette_size = 0;
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));

        let err = Settings::from_json("not json").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = Settings::default();
        settings.new_row_fill = NewRowFill::Blocked;
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load_or_default("/nonexistent/grenade-grid.json");
        assert_eq!(settings, Settings::default());
    }
}
