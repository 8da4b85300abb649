//! Planet entity and the per-body absorption operations

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MERGE_DAMPING;
use crate::{Position, Vector, circle_area, distance};

/// Stable handle for a body, allocated by the world in increasing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Returned by [`Body::partial_absorb`] when the bite would swallow the smaller body
///
/// Not an error: the caller switches to [`Body::merge`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooSmall;

impl fmt::Display for TooSmall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("cannot partially absorb body, overlap exceeds its radius")
    }
}

impl std::error::Error for TooSmall {}

/// A circular body ("planet")
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub pos: Position,
    pub vel: Vector,
    pub mass: f32,
    /// Never negative; may reach 0 just before the body is removed
    pub radius: f32,
}

impl Body {
    pub fn new(id: BodyId, pos: Position, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            mass: 0.0,
            radius: radius.max(0.0),
        }
    }

    #[inline]
    pub fn area(&self) -> f64 {
        circle_area(self.radius)
    }

    #[inline]
    pub fn distance(&self, other: &Body) -> f32 {
        distance(self.pos, other.pos)
    }

    /// Whether the two circles touch or overlap
    #[inline]
    pub fn overlaps(&self, other: &Body) -> bool {
        self.distance(other) <= self.radius + other.radius
    }

    /// Reverse velocity in place (debug helper, not part of absorption)
    pub fn bounce(&mut self) {
        self.vel = -self.vel;
    }

    /// Swallow `other` entirely
    ///
    /// Total area is conserved, mass adds up and the absorber loses 5% of its
    /// velocity. `other` is left untouched; removing it is the caller's job.
    pub fn merge(&mut self, other: &Body) {
        let combined = self.area() + other.area();
        self.radius = (combined / std::f64::consts::PI).sqrt() as f32;
        self.mass += other.mass;
        self.vel *= MERGE_DAMPING;
    }

    /// Take one bite out of an overlapping smaller body
    ///
    /// Grows `self` by the positive root `x` of
    /// `x² + d·x + (o²/2 - r·o) = 0` (d = centre distance, o = overlap depth,
    /// r = other's radius) and shrinks `other` by `o - x`. Area is not
    /// conserved here; only [`Body::merge`] conserves it.
    ///
    /// Called on pairs the detector reported, so `d <= r1 + r2` unless an
    /// earlier bite in the same tick shrank one of them. The overlap depth is
    /// taken as an absolute value either way.
    pub fn partial_absorb(&mut self, other: &mut Body) -> Result<(), TooSmall> {
        let distance = self.distance(other) as f64;
        let raw_overlap = (self.radius + other.radius) as f64 - distance;
        if raw_overlap < 0.0 {
            // An earlier bite this tick pulled the pair apart
            log::debug!(
                "partial absorb on separated bodies {} and {} (gap {:.4})",
                self.id,
                other.id,
                -raw_overlap
            );
        }
        let overlap = raw_overlap.abs();
        let other_radius = other.radius as f64;

        if other_radius < overlap {
            return Err(TooSmall);
        }

        let g = overlap * overlap / 2.0 - other_radius * overlap;
        let discriminant = (distance * distance - 4.0 * g).sqrt();
        let x1 = (-distance + discriminant) / 2.0;
        let x2 = (-distance - discriminant) / 2.0;

        let x = if x1 > 0.0 {
            x1
        } else if x2 > 0.0 {
            x2
        } else {
            0.0
        };

        self.radius += x as f32;
        other.radius = (other.radius + (x - overlap) as f32).max(0.0);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn body(id: u32, x: f32, y: f32, r: f32) -> Body {
        Body::new(BodyId(id), Vec2::new(x, y), r)
    }

    #[test]
    fn test_bounce_reverses_velocity() {
        let mut b = body(1, 0.0, 0.0, 5.0);
        b.vel = Vec2::new(3.0, -2.0);
        b.bounce();
        assert_eq!(b.vel, Vec2::new(-3.0, 2.0));
    }

    #[test]
    fn test_merge_conserves_area_and_damps() {
        let mut a = body(1, 0.0, 0.0, 10.0);
        a.vel = Vec2::new(20.0, -40.0);
        a.mass = 2.0;
        let mut b = body(2, 5.0, 0.0, 10.0);
        b.mass = 3.0;

        let before = a.area() + b.area();
        a.merge(&b);

        assert!((a.area() - before).abs() < 1e-3);
        assert!((a.radius - (200.0_f32).sqrt()).abs() < 1e-4);
        assert!((a.mass - 5.0).abs() < 1e-6);
        assert!((a.vel.x - 19.0).abs() < 1e-5);
        assert!((a.vel.y + 38.0).abs() < 1e-5);
    }

    #[test]
    fn test_partial_absorb_too_small_when_fully_overlapping() {
        // overlap = 20 - 5 = 15 > 10
        let mut a = body(1, 0.0, 0.0, 10.0);
        let mut b = body(2, 5.0, 0.0, 10.0);
        assert_eq!(a.partial_absorb(&mut b), Err(TooSmall));
        assert_eq!(a.radius, 10.0);
        assert_eq!(b.radius, 10.0);
    }

    #[test]
    fn test_partial_absorb_takes_a_bite() {
        // overlap = 20 - 19 = 1 <= 10
        let mut a = body(1, 0.0, 0.0, 10.0);
        let mut b = body(2, 19.0, 0.0, 10.0);
        assert!(a.partial_absorb(&mut b).is_ok());
        assert!(a.radius > 10.0);
        assert!(b.radius < 10.0);
    }

    #[test]
    fn test_partial_absorb_root_selection() {
        // d = 19, o = 1, r = 10: g = 0.5 - 10 = -9.5
        // x1 = (-19 + sqrt(361 + 38)) / 2
        let mut a = body(1, 0.0, 0.0, 10.0);
        let mut b = body(2, 19.0, 0.0, 10.0);
        a.partial_absorb(&mut b).unwrap();
        let x1 = (-19.0 + (399.0_f64).sqrt()) / 2.0;
        assert!((a.radius as f64 - (10.0 + x1)).abs() < 1e-4);
        assert!((b.radius as f64 - (10.0 + x1 - 1.0)).abs() < 1e-4);
    }

    #[test]
    fn test_partial_absorb_stationary_pair_only_shrinks() {
        // Held in place the bites get smaller each tick; the victim never grows
        let mut big = body(1, 0.0, 0.0, 12.0);
        let mut small = body(2, 17.0, 0.0, 8.0);
        let mut last = small.radius;
        for _ in 0..200 {
            if big.partial_absorb(&mut small).is_err() {
                break;
            }
            assert!(small.radius <= last);
            assert!(small.radius >= 0.0);
            last = small.radius;
        }
        assert!(small.radius < 8.0);
    }

    #[test]
    fn test_partial_absorb_converges_to_too_small() {
        // Victim drifting into the absorber, as it does between ticks
        let mut big = body(1, 0.0, 0.0, 12.0);
        let mut small = body(2, 19.0, 0.0, 8.0);
        let mut last = small.radius;
        for _ in 0..100 {
            match big.partial_absorb(&mut small) {
                Ok(()) => {
                    assert!(small.radius <= last);
                    last = small.radius;
                    small.pos.x -= 0.5;
                }
                Err(TooSmall) => return,
            }
        }
        panic!("partial absorption never finished");
    }

    proptest! {
        #[test]
        fn prop_merge_conserves_area(r1 in 0.0f32..200.0, r2 in 0.0f32..200.0) {
            let mut a = body(1, 0.0, 0.0, r1);
            let b = body(2, 0.0, 0.0, r2);
            let expected = a.area() + b.area();
            a.merge(&b);
            prop_assert!((a.area() - expected).abs() <= expected * 1e-5 + 1e-6);
        }

        #[test]
        fn prop_partial_absorb_never_grows_the_victim(
            r_big in 5.0f32..50.0,
            ratio in 0.1f32..1.0,
            depth in 0.01f32..1.0,
        ) {
            let r_small = r_big * ratio;
            let d = (r_big + r_small) * (1.0 - depth * 0.5);
            let mut big = body(1, 0.0, 0.0, r_big);
            let mut small = body(2, d, 0.0, r_small);
            let before = small.radius;
            if big.partial_absorb(&mut small).is_ok() {
                prop_assert!(small.radius <= before);
                prop_assert!(small.radius >= 0.0);
            }
        }
    }
}
