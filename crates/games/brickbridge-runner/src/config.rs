use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::pickups::PickupColor;

/// Environment variable naming the TOML tuning file.
pub const CONFIG_ENV_VAR: &str = "BRICKBRIDGE_RUNNER_CONFIG";
/// Path used when the environment variable is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/runner.toml";

/// Player movement and support-probe tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Horizontal speed (units/s).
    pub move_speed: f32,
    /// Downward acceleration while unsupported (units/s^2).
    pub gravity: f32,
    pub player_radius: f32,
    /// Vertical velocity below which an unsupported player counts as falling.
    pub falling_velocity: f32,
    /// Height below which the session is over.
    pub game_over_y: f32,
    /// How far above the player the support probe starts.
    pub probe_lift: f32,
    pub probe_length: f32,
    /// Upper bound on a single frame's delta (seconds).
    pub max_frame_dt: f32,
    /// Squared intent magnitude above which the player counts as moving.
    pub move_epsilon: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            move_speed: 6.0,
            gravity: 20.0,
            player_radius: 0.3,
            falling_velocity: -2.0,
            game_over_y: -5.0,
            probe_lift: 2.0,
            probe_length: 5.0,
            max_frame_dt: 0.1,
            move_epsilon: 1e-4,
        }
    }
}

/// Bridge tile placement tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Grid spacing that tile z-positions snap to.
    pub spacing: f32,
    /// Tile depth along the corridor.
    pub length: f32,
    pub y_offset: f32,
    pub tile_height: f32,
    /// Inset from the corridor half-width for the wall thickness.
    pub wall_margin: f32,
    /// Slack before the start edge that still counts as over the gap.
    pub gap_start_tolerance: f32,
    /// Slack past the far edge that still counts as over the gap.
    pub gap_end_tolerance: f32,
    /// Only place tiles while the build key is held.
    pub require_build_key: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            spacing: 1.1,
            length: 1.2,
            y_offset: 0.9,
            tile_height: 0.2,
            wall_margin: 0.2,
            gap_start_tolerance: 0.05,
            gap_end_tolerance: 0.001,
            require_build_key: false,
        }
    }
}

/// Collectible population and capture tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupConfig {
    pub count: u32,
    pub diameter: f32,
    /// Height above the start platform's center.
    pub spawn_height: f32,
    /// Distance from the platform edge kept free of pickups.
    pub edge_margin: f32,
    pub capture_radius_sq: f32,
    /// The only color that adds to the inventory.
    pub collectible: PickupColor,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            count: 45,
            diameter: 0.4,
            spawn_height: 0.7,
            edge_margin: 1.0,
            capture_radius_sq: 1.0,
            collectible: PickupColor::Red,
        }
    }
}

/// Scene dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub platform_size: f32,
    pub platform_height: f32,
    pub gap_length: f32,
    pub corridor_half_width: f32,
    /// Deck height of the corridor (top of the platforms).
    pub corridor_y: f32,
    pub rail_half_width: f32,
    pub wall_height: f32,
    pub wall_thickness: f32,
    /// Fixed height of the camera's look-at target.
    pub camera_height: f32,
    pub spawn_z: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            platform_size: 12.0,
            platform_height: 1.0,
            gap_length: 12.0,
            corridor_half_width: 1.1,
            corridor_y: 1.0,
            rail_half_width: 0.06,
            wall_height: 0.5,
            wall_thickness: 0.2,
            camera_height: 1.0,
            spawn_z: -2.0,
        }
    }
}

/// Top-level runner configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub physics: PhysicsConfig,
    pub bridge: BridgeConfig,
    pub pickups: PickupConfig,
    pub level: LevelConfig,
    /// Latch a win when the player stands on the far platform.
    pub win_detection: bool,
}

/// Why a config file was rejected.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "read failed: {e}"),
            Self::Parse(m) => write!(f, "parse failed: {m}"),
            Self::Invalid(m) => write!(f, "invalid value: {m}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl RunnerConfig {
    /// Load from the file named by `BRICKBRIDGE_RUNNER_CONFIG` (or the default path).
    /// Falls back to defaults if the file is missing or unusable.
    pub fn load() -> Self {
        let path =
            std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load from `path`, falling back to defaults on any error.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::read(path) {
            Ok(cfg) => cfg,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                RunnerConfig::default()
            },
            Err(e) => {
                tracing::warn!("Failed to load {}: {e}, using defaults", path.display());
                RunnerConfig::default()
            },
        }
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: RunnerConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the simulation cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("bridge.spacing", self.bridge.spacing),
            ("level.platform_size", self.level.platform_size),
            ("level.corridor_half_width", self.level.corridor_half_width),
            ("physics.player_radius", self.physics.player_radius),
            ("physics.probe_length", self.physics.probe_length),
            ("physics.max_frame_dt", self.physics.max_frame_dt),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be > 0, got {value}")));
            }
        }
        if self.level.gap_length < 0.0 || !self.level.gap_length.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "level.gap_length must be >= 0, got {}",
                self.level.gap_length
            )));
        }
        let radius_sq = self.pickups.capture_radius_sq;
        if !(radius_sq.is_finite() && radius_sq >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "pickups.capture_radius_sq must be >= 0, got {radius_sq}"
            )));
        }
        Ok(())
    }
}
