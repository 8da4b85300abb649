//! Live population and the player designation

use glam::Vec2;

use super::body::{Body, BodyId};
use crate::wrap_coordinate;

/// The toroidal plane and every body currently alive on it
#[derive(Debug, Clone)]
pub struct World {
    pub width: f32,
    pub height: f32,
    /// Live bodies in insertion order
    pub bodies: Vec<Body>,
    /// Player body, `None` once it has been absorbed
    player: Option<BodyId>,
    /// Next body ID
    next_id: u32,
}

impl World {
    /// Create an empty world
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            bodies: Vec::new(),
            player: None,
            next_id: 1,
        }
    }

    /// Allocate a new body ID
    pub fn next_body_id(&mut self) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a body at rest and return its handle
    pub fn spawn(&mut self, pos: Vec2, radius: f32) -> BodyId {
        let id = self.next_body_id();
        self.bodies.push(Body::new(id, pos, radius));
        id
    }

    /// Add the player body at the centre of the plane
    pub fn spawn_player(&mut self, radius: f32) -> BodyId {
        let id = self.spawn(Vec2::new(self.width / 2.0, self.height / 2.0), radius);
        self.player = Some(id);
        id
    }

    pub fn player_id(&self) -> Option<BodyId> {
        self.player
    }

    pub fn player(&self) -> Option<&Body> {
        let id = self.player?;
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn player_mut(&mut self) -> Option<&mut Body> {
        let id = self.player?;
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Drop the bodies at the given indices in one pass
    ///
    /// Survivors keep their relative order. Clears the player designation if
    /// the player was among them. Returns the removed IDs.
    pub fn remove_indices(&mut self, indices: &[usize]) -> Vec<BodyId> {
        if indices.is_empty() {
            return Vec::new();
        }

        let mut doomed = vec![false; self.bodies.len()];
        for &i in indices {
            if let Some(flag) = doomed.get_mut(i) {
                *flag = true;
            }
        }

        let mut removed = Vec::with_capacity(indices.len());
        let mut index = 0;
        self.bodies.retain(|body| {
            let keep = !doomed[index];
            index += 1;
            if !keep {
                removed.push(body.id);
            }
            keep
        });

        if let Some(player) = self.player {
            if removed.contains(&player) {
                self.player = None;
            }
        }

        removed
    }

    /// Advance every body by `vel * time_scale` and wrap onto the torus
    pub fn integrate(&mut self, time_scale: f32) {
        let (width, height) = (self.width, self.height);
        for body in &mut self.bodies {
            let next = body.pos + body.vel * time_scale;
            body.pos = Vec2::new(wrap_coordinate(next.x, width), wrap_coordinate(next.y, height));
        }
    }

    /// Swap in a freshly generated population, resetting the player designation
    pub fn replace(&mut self, bodies: Vec<Body>, player: Option<BodyId>) {
        self.bodies = bodies;
        self.player = player;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_spawn_assigns_increasing_ids() {
        let mut world = World::new(100.0, 100.0);
        let a = world.spawn(Vec2::new(1.0, 1.0), 2.0);
        let b = world.spawn(Vec2::new(5.0, 5.0), 2.0);
        assert!(a < b);
        assert_eq!(world.len(), 2);
        assert_eq!(world.get(b).unwrap().pos, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_player_spawns_centered_at_rest() {
        let mut world = World::new(200.0, 100.0);
        let id = world.spawn_player(10.0);
        let player = world.player().unwrap();
        assert_eq!(player.id, id);
        assert_eq!(player.pos, Vec2::new(100.0, 50.0));
        assert_eq!(player.vel, Vec2::ZERO);
        assert_eq!(player.radius, 10.0);
    }

    #[test]
    fn test_remove_keeps_survivor_order() {
        let mut world = World::new(100.0, 100.0);
        let ids: Vec<BodyId> = (0..6).map(|i| world.spawn(Vec2::new(i as f32, 0.0), 1.0)).collect();

        let removed = world.remove_indices(&[4, 1, 1, 5]);

        assert_eq!(removed, vec![ids[1], ids[4], ids[5]]);
        let left: Vec<BodyId> = world.bodies.iter().map(|b| b.id).collect();
        assert_eq!(left, vec![ids[0], ids[2], ids[3]]);
    }

    #[test]
    fn test_removing_player_clears_designation() {
        let mut world = World::new(100.0, 100.0);
        world.spawn(Vec2::new(1.0, 1.0), 1.0);
        world.spawn_player(5.0);
        assert!(world.player().is_some());

        world.remove_indices(&[1]);

        assert_eq!(world.player_id(), None);
        assert!(world.player().is_none());
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_integrate_wraps_both_edges() {
        let mut world = World::new(100.0, 50.0);
        let right = world.spawn(Vec2::new(99.0, 10.0), 1.0);
        let top = world.spawn(Vec2::new(10.0, 1.0), 1.0);
        world.bodies[0].vel = Vec2::new(300.0, 0.0);
        world.bodies[1].vel = Vec2::new(0.0, -300.0);

        world.integrate(0.01);

        assert!((world.get(right).unwrap().pos.x - 2.0).abs() < 1e-4);
        // Leaving through the top re-enters at the bottom, not reflected
        assert!((world.get(top).unwrap().pos.y - 48.0).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn prop_integration_stays_on_plane(
            x in 0.0f32..1920.0,
            y in 0.0f32..1080.0,
            vx in -1.0e5f32..1.0e5,
            vy in -1.0e5f32..1.0e5,
            scale in 0.001f32..10.0,
        ) {
            let mut world = World::new(1920.0, 1080.0);
            world.spawn(Vec2::new(x, y), 1.0);
            world.bodies[0].vel = Vec2::new(vx, vy);
            world.integrate(scale);
            let pos = world.bodies[0].pos;
            prop_assert!((0.0..1920.0).contains(&pos.x));
            prop_assert!((0.0..1080.0).contains(&pos.y));
        }
    }
}
