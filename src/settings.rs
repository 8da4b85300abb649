//! Startup configuration
//!
//! Loaded once before the engine starts; nothing here changes at runtime.
//! Every field has a default, so a JSON file only needs the keys it overrides.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Collision broad phase used by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BroadPhase {
    /// All pairs with a bounding-box prefilter
    #[default]
    BoundingBox,
    /// Uniform spatial grid
    Grid,
}

impl BroadPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BroadPhase::BoundingBox => "bounding_box",
            BroadPhase::Grid => "grid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bounding_box" | "bbox" | "brute" => Some(BroadPhase::BoundingBox),
            "grid" => Some(BroadPhase::Grid),
            _ => None,
        }
    }
}

/// Configuration problems
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {e}"),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Plane ===
    pub width: f32,
    pub height: f32,

    // === Population ===
    /// Generated body count is drawn uniformly from min_bodies..=max_bodies
    pub min_bodies: usize,
    pub max_bodies: usize,
    pub player_radius: f32,

    // === Time scale ===
    pub default_time_scale: f32,
    pub min_time_scale: f32,
    pub max_time_scale: f32,

    // === Rules ===
    pub thrust_divisor: f32,
    pub negligible_area: f64,
    pub broad_phase: BroadPhase,

    // === Engine ===
    /// Pause between engine ticks
    pub tick_interval_ms: u64,
    /// Fixed RNG seed; fresh entropy when unset
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: PLANE_WIDTH,
            height: PLANE_HEIGHT,

            min_bodies: MIN_BODIES,
            max_bodies: MAX_BODIES,
            player_radius: PLAYER_RADIUS,

            default_time_scale: DEFAULT_TIME_SCALE,
            min_time_scale: MIN_TIME_SCALE,
            max_time_scale: MAX_TIME_SCALE,

            thrust_divisor: THRUST_DIVISOR,
            negligible_area: NEGLIGIBLE_AREA,
            broad_phase: BroadPhase::BoundingBox,

            tick_interval_ms: TICK_INTERVAL_MS,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Read a JSON config file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| -> Result<(), ConfigError> { Err(ConfigError::Invalid(msg)) };

        if !(self.width > 0.0 && self.height > 0.0) {
            return invalid(format!(
                "plane must have positive size, got {}x{}",
                self.width, self.height
            ));
        }
        if self.min_bodies > self.max_bodies {
            return invalid(format!(
                "min_bodies ({}) exceeds max_bodies ({})",
                self.min_bodies, self.max_bodies
            ));
        }
        if self.player_radius < 0.0 {
            return invalid(format!(
                "player_radius must not be negative, got {}",
                self.player_radius
            ));
        }
        if !(self.min_time_scale > 0.0 && self.min_time_scale <= self.max_time_scale) {
            return invalid(format!(
                "time scale bounds [{}, {}] are not a positive range",
                self.min_time_scale, self.max_time_scale
            ));
        }
        if !(self.min_time_scale..=self.max_time_scale).contains(&self.default_time_scale) {
            return invalid(format!(
                "default_time_scale {} outside [{}, {}]",
                self.default_time_scale, self.min_time_scale, self.max_time_scale
            ));
        }
        if !(self.thrust_divisor > 0.0) {
            return invalid(format!(
                "thrust_divisor must be positive, got {}",
                self.thrust_divisor
            ));
        }
        Ok(())
    }
}
