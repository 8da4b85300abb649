//! Planet Drift - bodies drifting on a torus, eating each other
//!
//! Core modules:
//! - `sim`: Simulation core (bodies, collisions, absorption, world stepping)
//! - `engine`: Dedicated engine thread and the snapshot/command boundary
//! - `snapshot`: Read-only view handed to presentation code
//! - `settings`: Startup configuration

pub mod engine;
pub mod settings;
pub mod sim;
pub mod snapshot;

pub use engine::{ControlCommand, EngineError, EngineHandle};
pub use settings::{BroadPhase, ConfigError, SimConfig};
pub use snapshot::{BodySnapshot, Threat, WorldSnapshot};

use glam::Vec2;

/// Location on the toroidal plane, bounds [0, width) x [0, height)
pub type Position = Vec2;

/// Offset / velocity
pub type Vector = Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Plane dimensions
    pub const PLANE_WIDTH: f32 = 1920.0;
    pub const PLANE_HEIGHT: f32 = 1080.0;

    /// Generated population bounds (inclusive)
    pub const MIN_BODIES: usize = 1500;
    pub const MAX_BODIES: usize = 1500;

    /// Player body starts centered with this radius and no velocity
    pub const PLAYER_RADIUS: f32 = 10.0;

    /// Time scale defaults and clamp range
    pub const DEFAULT_TIME_SCALE: f32 = 0.01;
    pub const MIN_TIME_SCALE: f32 = 0.001;
    pub const MAX_TIME_SCALE: f32 = 10.0;

    /// Cursor offset is divided by this before being subtracted from player velocity
    pub const THRUST_DIVISOR: f32 = 50.0;

    /// Bodies below this area are swallowed whole
    pub const NEGLIGIBLE_AREA: f64 = 0.1;

    /// Full merge keeps 19/20 of the absorber's velocity
    pub const MERGE_DAMPING: f32 = 19.0 / 20.0;

    /// Pause between engine ticks (ms)
    pub const TICK_INTERVAL_MS: u64 = 2;

    /// Generated body ranges
    pub const GEN_SPEED: f32 = 10.0;
    pub const GEN_RADIUS_MIN: f32 = 3.0;
    pub const GEN_RADIUS_MAX: f32 = 23.0;
    pub const GEN_MASS_MAX: f32 = 10.0;

    /// Length of the aiming indicator drawn from the player
    pub const THRUST_PREVIEW_LENGTH: f32 = 50.0;
}

/// Euclidean distance between two positions
#[inline]
pub fn distance(a: Position, b: Position) -> f32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    (dx * dx + dy * dy).sqrt()
}

/// Area of a circle with the given radius
#[inline]
pub fn circle_area(radius: f32) -> f64 {
    let r = radius as f64;
    std::f64::consts::PI * r * r
}

/// Signed angle of a vector, asin(y / |v|), in [-π/2, π/2]
///
/// This is not a full bearing: vectors pointing left and right with the same
/// y share an angle. Returns `None` for the zero vector.
pub fn vector_angle(v: Vector) -> Option<f32> {
    let (x, y) = (v.x as f64, v.y as f64);
    let length = (x * x + y * y).sqrt();
    if length == 0.0 || !length.is_finite() {
        return None;
    }
    Some((y / length).clamp(-1.0, 1.0).asin() as f32)
}

/// Build a vector of `length` whose y component is `length * sin(angle)`
///
/// x is always non-negative, so quadrant information is lost. Only meant for
/// display; `vector_from_angle(vector_angle(v), |v|)` does not give back `v`
/// when `v.x < 0`.
pub fn vector_from_angle(angle: f32, length: f32) -> Vector {
    let length = length as f64;
    let y = length * (angle as f64).sin();
    let x = (length * length - y * y).max(0.0).sqrt();
    Vec2::new(x as f32, y as f32)
}

/// Convert radians to degrees
#[inline]
pub fn radians_to_degrees(angle: f32) -> f32 {
    angle * 360.0 / std::f32::consts::TAU
}

/// Wrap a coordinate into [0, extent)
///
/// Negative excursions come back in from the far edge: -5 on a 100 wide plane
/// lands at 95.
#[inline]
pub fn wrap_coordinate(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if wrapped >= extent { 0.0 } else { wrapped }
}
