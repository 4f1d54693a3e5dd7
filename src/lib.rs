//! Grenade Grid - a hex-grid match-cluster shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, clusters, projectile, turn state)
//! - `settings`: Data-driven level geometry and tuning

pub mod settings;
pub mod sim;

pub use settings::{NewRowFill, RowAdvance, Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz keeps the grenade under a quarter tile per step)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Grid dimensions
    pub const COLUMNS: usize = 15;
    pub const ROWS: usize = 14;

    /// Tile geometry (pixels)
    pub const TILE_WIDTH: f32 = 40.0;
    pub const TILE_HEIGHT: f32 = 40.0;
    pub const ROW_HEIGHT: f32 = 34.0;
    pub const TILE_RADIUS: f32 = 20.0;

    /// Number of grenade colors
    pub const PALETTE_SIZE: u8 = 6;

    /// Grenade speed (pixels/s)
    pub const GRENADE_SPEED: f32 = 1000.0;
    /// Initial fall speed of unsupported tiles (pixels/s)
    pub const DROP_SPEED: f32 = 900.0;
    /// Fall acceleration (pixels/s²)
    pub const DROP_ACCELERATION: f32 = 700.0;
    /// Alpha lost per second while a matched tile pops
    pub const POP_FADE_RATE: f32 = 15.0;
    /// Alpha lost per second while an unsupported tile falls
    pub const DROP_FADE_RATE: f32 = 8.0;

    /// Smallest same-colored group that gets cleared
    pub const MIN_CLUSTER_SIZE: usize = 3;
    /// Shots without a match before a new row is pushed in
    pub const SHOTS_PER_ROW: u32 = 5;

    /// Launcher aim limits (degrees)
    pub const AIM_MIN_DEGREES: f32 = 8.0;
    pub const AIM_MAX_DEGREES: f32 = 172.0;
    /// Launcher starts pointing straight up
    pub const AIM_START_DEGREES: f32 = 90.0;
}

/// Convert degrees to radians
#[inline]
pub fn deg_to_rad(angle: f32) -> f32 {
    angle.to_radians()
}

/// Convert radians to degrees
#[inline]
pub fn rad_to_deg(angle: f32) -> f32 {
    angle.to_degrees()
}

/// Clamp an aim angle in [0, 360) degrees into the launcher's firing arc.
///
/// Angles pointing into the left half (90°..270°) stick to the left limit,
/// everything else (right half and straight down) sticks to the right limit.
/// Non-finite input resets the aim to straight up.
pub fn clamp_aim_angle(angle: f32) -> f32 {
    use consts::{AIM_MAX_DEGREES, AIM_MIN_DEGREES, AIM_START_DEGREES};

    if !angle.is_finite() {
        AIM_START_DEGREES
    } else if angle > 90.0 && angle < 270.0 {
        angle.min(AIM_MAX_DEGREES)
    } else if angle < AIM_MIN_DEGREES || angle >= 270.0 {
        AIM_MIN_DEGREES
    } else {
        angle
    }
}

/// Aim angle (degrees, 0 = right, counter-clockwise) from the launcher center
/// toward a pointer position in screen space (y grows downward).
pub fn aim_angle_towards(from: Vec2, to: Vec2) -> f32 {
    let mut angle = rad_to_deg((from.y - to.y).atan2(to.x - from.x));
    if angle < 0.0 {
        angle += 360.0;
    }
    clamp_aim_angle(angle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aim_straight_up() {
        let angle = aim_angle_towards(Vec2::new(100.0, 500.0), Vec2::new(100.0, 100.0));
        assert!((angle - 90.0).abs() < 0.001);
    }

    #[test]
    fn test_aim_clamps_both_sides() {
        // Pointer slightly below the launcher on the right
        let right = aim_angle_towards(Vec2::new(100.0, 500.0), Vec2::new(300.0, 510.0));
        assert_eq!(right, consts::AIM_MIN_DEGREES);

        // Pointer level with the launcher on the left
        let left = aim_angle_towards(Vec2::new(100.0, 500.0), Vec2::new(0.0, 500.0));
        assert_eq!(left, consts::AIM_MAX_DEGREES);
    }

    #[test]
    fn test_clamp_keeps_valid_angles() {
        assert_eq!(clamp_aim_angle(45.0), 45.0);
        assert_eq!(clamp_aim_angle(135.0), 135.0);
        assert_eq!(clamp_aim_angle(300.0), consts::AIM_MIN_DEGREES);
        assert_eq!(clamp_aim_angle(200.0), consts::AIM_MAX_DEGREES);
    }

    #[test]
    fn test_clamp_non_finite_aims_straight_up() {
        assert_eq!(clamp_aim_angle(f32::NAN), consts::AIM_START_DEGREES);
        assert_eq!(clamp_aim_angle(f32::INFINITY), consts::AIM_START_DEGREES);
        assert_eq!(clamp_aim_angle(f32::NEG_INFINITY), consts::AIM_START_DEGREES);

        let angle = aim_angle_towards(Vec2::new(100.0, 500.0), Vec2::new(f32::NAN, 100.0));
        assert_eq!(angle, consts::AIM_START_DEGREES);
    }
}
