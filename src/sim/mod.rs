//! Simulation core
//!
//! Everything that decides what happens to the bodies lives here:
//! - Bodies and their absorption operations
//! - Collision detection and the absorption policy
//! - World stepping with toroidal wraparound
//! - Population generation
//!
//! No threads, no rendering. The engine module drives this from its own thread.

pub mod absorb;
pub mod body;
pub mod collision;
pub mod generate;
pub mod tick;
pub mod world;

pub use absorb::{Resolution, resolve_collisions};
pub use body::{Body, BodyId, TooSmall};
pub use collision::{CollisionPair, find_collisions, find_collisions_grid, suggested_cell_size};
pub use generate::{populate, population_size};
pub use tick::{Simulation, TickReport, TimeScale};
pub use world::World;
