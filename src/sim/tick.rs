//! Simulation stepping and the control operations
//!
//! [`Simulation`] is single-threaded: the engine thread owns one and is the
//! only caller of [`Simulation::tick`] and the control methods.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::absorb::resolve_collisions;
use super::collision::{find_collisions, find_collisions_grid, suggested_cell_size};
use super::generate::populate;
use super::world::World;
use crate::settings::{BroadPhase, ConfigError, SimConfig};

/// Position integration multiplier, clamped to a configured range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    value: f32,
    default: f32,
    min: f32,
    max: f32,
}

impl TimeScale {
    pub fn new(default: f32, min: f32, max: f32) -> Self {
        Self {
            value: default.clamp(min, max),
            default,
            min,
            max,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(
            config.default_time_scale,
            config.min_time_scale,
            config.max_time_scale,
        )
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[inline]
    pub fn default_value(&self) -> f32 {
        self.default
    }

    /// Scale by `1 + delta / 10` (one mouse-wheel notch is `delta = ±1`)
    pub fn adjust(&mut self, delta: f32) {
        self.value = (self.value * (1.0 + delta / 10.0)).clamp(self.min, self.max);
    }

    pub fn reset(&mut self) {
        self.value = self.default;
    }
}

/// Summary of one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Overlapping pairs found
    pub collisions: usize,
    /// Full merges (each removes one body)
    pub merges: usize,
    /// Partial absorptions
    pub partials: usize,
    /// Bodies removed this tick
    pub removed: usize,
    /// The player body was absorbed this tick
    pub player_absorbed: bool,
}

/// World plus everything needed to step it
pub struct Simulation {
    config: SimConfig,
    world: World,
    time_scale: TimeScale,
    rng: Pcg32,
    /// Ticks since the last reset
    ticks: u64,
}

impl Simulation {
    /// Create a simulation with a freshly generated world
    ///
    /// The config is validated first; generation needs a non-empty plane.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        log::info!("Simulation seed: {seed}");
        Ok(Self::with_rng(config, Pcg32::seed_from_u64(seed)))
    }

    fn with_rng(config: SimConfig, mut rng: Pcg32) -> Self {
        let mut world = World::new(config.width, config.height);
        populate(&mut world, &config, &mut rng);
        Self {
            time_scale: TimeScale::from_config(&config),
            config,
            world,
            rng,
            ticks: 0,
        }
    }

    /// Wrap an existing world (scripted scenarios)
    pub fn from_world(config: SimConfig, world: World) -> Self {
        let seed = config.seed.unwrap_or(0);
        Self {
            time_scale: TimeScale::from_config(&config),
            config,
            world,
            rng: Pcg32::seed_from_u64(seed),
            ticks: 0,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn time_scale(&self) -> &TimeScale {
        &self.time_scale
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance one tick: detect, resolve, remove, integrate
    pub fn tick(&mut self) -> TickReport {
        let pairs = match self.config.broad_phase {
            BroadPhase::BoundingBox => find_collisions(&self.world.bodies),
            BroadPhase::Grid => {
                let cell = suggested_cell_size(&self.world.bodies);
                find_collisions_grid(&self.world.bodies, cell)
            }
        };

        let resolution = resolve_collisions(
            &mut self.world.bodies,
            &pairs,
            self.config.negligible_area,
        );

        let had_player = self.world.player_id().is_some();
        let removed = self.world.remove_indices(&resolution.removed);
        let player_absorbed = had_player && self.world.player_id().is_none();

        self.world.integrate(self.time_scale.value());
        self.ticks += 1;

        if player_absorbed {
            log::info!("Player absorbed after {} ticks", self.ticks);
        }

        let report = TickReport {
            collisions: pairs.len(),
            merges: resolution.merges,
            partials: resolution.partials,
            removed: removed.len(),
            player_absorbed,
        };
        if report.collisions > 0 {
            log::debug!(
                "tick {}: {} collisions, {} merges, {} partial, {} bodies left",
                self.ticks,
                report.collisions,
                report.merges,
                report.partials,
                self.world.len()
            );
        }
        report
    }

    /// Push the player away from `target`
    ///
    /// Subtracts `(target - player) / thrust_divisor` from the player's
    /// velocity. Returns false when there is no player.
    pub fn apply_thrust(&mut self, target: Vec2) -> bool {
        let divisor = self.config.thrust_divisor;
        match self.world.player_mut() {
            Some(player) => {
                let delta = target - player.pos;
                player.vel -= delta / divisor;
                true
            }
            None => {
                log::warn!("Thrust ignored, no player body");
                false
            }
        }
    }

    /// Multiply the time scale by `1 + delta / 10`, clamped
    pub fn set_time_scale(&mut self, delta: f32) {
        self.time_scale.adjust(delta);
    }

    pub fn reset_time_scale(&mut self) {
        self.time_scale.reset();
    }

    /// Regenerate the whole population and restore the default time scale
    pub fn reset_world(&mut self) {
        self.time_scale.reset();
        populate(&mut self.world, &self.config, &mut self.rng);
        self.ticks = 0;
    }
}
