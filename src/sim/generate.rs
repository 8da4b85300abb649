//! Random initial populations

use glam::Vec2;
use rand::Rng;

use super::body::Body;
use super::world::World;
use crate::consts::{GEN_MASS_MAX, GEN_RADIUS_MAX, GEN_RADIUS_MIN, GEN_SPEED};
use crate::settings::SimConfig;

/// Number of bodies to generate, uniform over `min..=max`
pub fn population_size<R: Rng>(rng: &mut R, min: usize, max: usize) -> usize {
    if min >= max {
        return min;
    }
    rng.random_range(min..=max)
}

/// Fill `world` with a random population followed by the player
///
/// Any existing bodies are discarded. Generated bodies get a uniform position
/// on the plane, velocity components in [-10, 10], radius in [3, 23) and mass
/// in [0, 10). The player is appended last, centred and at rest.
pub fn populate<R: Rng>(world: &mut World, config: &SimConfig, rng: &mut R) {
    let count = population_size(rng, config.min_bodies, config.max_bodies);

    let mut bodies = Vec::with_capacity(count + 1);
    for _ in 0..count {
        let id = world.next_body_id();
        let pos = Vec2::new(
            rng.random_range(0.0..world.width),
            rng.random_range(0.0..world.height),
        );
        let mut body = Body::new(id, pos, rng.random_range(GEN_RADIUS_MIN..GEN_RADIUS_MAX));
        body.vel = Vec2::new(
            rng.random_range(-GEN_SPEED..=GEN_SPEED),
            rng.random_range(-GEN_SPEED..=GEN_SPEED),
        );
        body.mass = rng.random_range(0.0..GEN_MASS_MAX);
        bodies.push(body);
    }

    world.replace(bodies, None);
    world.spawn_player(config.player_radius);

    log::info!(
        "Generated {} bodies on a {}x{} plane",
        count,
        world.width,
        world.height
    );
}
