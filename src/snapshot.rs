//! Read-only view of the simulation for presentation code
//!
//! A snapshot is built by the engine after a complete tick and never changes,
//! so readers always see a consistent population.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::THRUST_PREVIEW_LENGTH;
use crate::sim::{Body, BodyId, Simulation};
use crate::{Position, Vector, circle_area, vector_angle, vector_from_angle};

/// One body as seen by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub pos: Position,
    pub vel: Vector,
    pub mass: f32,
    pub radius: f32,
}

impl BodySnapshot {
    #[inline]
    pub fn area(&self) -> f64 {
        circle_area(self.radius)
    }
}

impl From<&Body> for BodySnapshot {
    fn from(body: &Body) -> Self {
        Self {
            id: body.id,
            pos: body.pos,
            vel: body.vel,
            mass: body.mass,
            radius: body.radius,
        }
    }
}

/// How dangerous a body is to the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threat {
    /// The player itself
    Player,
    /// Less than half the player's area
    Smaller,
    /// Smaller than the player but more than half its area; intensity 0..=1
    /// grows as the body approaches the player's size
    Comparable(f32),
    /// At least as large as the player (or there is no player)
    Bigger,
}

/// Complete post-tick state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Ticks since the last world reset
    pub tick: u64,
    pub width: f32,
    pub height: f32,
    pub bodies: Vec<BodySnapshot>,
    /// Player body, `None` once absorbed
    pub player: Option<BodyId>,
    pub time_scale: f32,
    pub default_time_scale: f32,
}

impl WorldSnapshot {
    pub fn capture(sim: &Simulation) -> Self {
        let world = sim.world();
        Self {
            tick: sim.ticks(),
            width: world.width,
            height: world.height,
            bodies: world.bodies.iter().map(BodySnapshot::from).collect(),
            player: world.player_id(),
            time_scale: sim.time_scale().value(),
            default_time_scale: sim.time_scale().default_value(),
        }
    }

    pub fn player(&self) -> Option<&BodySnapshot> {
        let id = self.player?;
        self.bodies.iter().find(|b| b.id == id)
    }

    /// Game over: the player body is gone
    pub fn is_game_over(&self) -> bool {
        self.player().is_none()
    }

    /// Time scale relative to the default, in percent
    pub fn time_scale_percent(&self) -> f32 {
        if self.default_time_scale > 0.0 {
            self.time_scale / self.default_time_scale * 100.0
        } else {
            0.0
        }
    }

    /// Classify `body` relative to the player by area
    pub fn classify(&self, body: &BodySnapshot) -> Threat {
        let Some(player) = self.player() else {
            return Threat::Bigger;
        };
        if body.id == player.id {
            return Threat::Player;
        }
        let player_area = player.area();
        if body.area() >= player_area || player_area <= 0.0 {
            return Threat::Bigger;
        }
        let ratio = body.area() / player_area;
        if ratio > 0.5 {
            Threat::Comparable(((ratio - 0.5) * 2.0) as f32)
        } else {
            Threat::Smaller
        }
    }

    /// Pretty JSON dump for offline inspection
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Aiming indicator: offset from the player pointing away from `cursor`
    ///
    /// Built through the angle round trip, so it always points into the right
    /// half-plane. `None` without a player or when the cursor is on it.
    pub fn thrust_preview(&self, cursor: Vec2) -> Option<Vector> {
        let player = self.player()?;
        let angle = vector_angle(player.pos - cursor)?;
        Some(vector_from_angle(angle, THRUST_PREVIEW_LENGTH))
    }
}
