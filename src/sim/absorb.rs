//! Absorption policy applied to one tick's collision pairs

use super::body::{Body, TooSmall};
use super::collision::CollisionPair;

/// What the resolver did this tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Indices of absorbed bodies, in the order they were consumed
    pub removed: Vec<usize>,
    /// Full merges performed
    pub merges: usize,
    /// Successful partial absorptions
    pub partials: usize,
}

/// Borrow two distinct bodies mutably
fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    debug_assert_ne!(i, j);
    if i < j {
        let (head, tail) = bodies.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = bodies.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

/// Resolve collisions in report order
///
/// For each pair the larger body by area absorbs the smaller one; on equal
/// areas the later body in the population wins. A body consumed earlier in
/// the same tick is skipped for the rest of the tick. Absorbed bodies are not
/// removed here; the caller drops every index in [`Resolution::removed`].
pub fn resolve_collisions(
    bodies: &mut [Body],
    pairs: &[CollisionPair],
    negligible_area: f64,
) -> Resolution {
    let mut consumed = vec![false; bodies.len()];
    let mut resolution = Resolution::default();

    for &(i, j) in pairs {
        if consumed[i] || consumed[j] {
            continue;
        }

        let (absorber, absorbed) = if bodies[i].area() > bodies[j].area() {
            (i, j)
        } else {
            (j, i)
        };

        let (big, small) = pair_mut(bodies, absorber, absorbed);

        let swallow = small.area() < negligible_area
            || matches!(big.partial_absorb(small), Err(TooSmall));

        if swallow {
            big.merge(small);
            consumed[absorbed] = true;
            resolution.removed.push(absorbed);
            resolution.merges += 1;
            log::trace!("{} absorbed {}", big.id, small.id);
        } else {
            resolution.partials += 1;
        }
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::NEGLIGIBLE_AREA;
    use crate::sim::body::BodyId;
    use crate::sim::collision::find_collisions;
    use glam::Vec2;

    fn body(id: u32, x: f32, y: f32, r: f32) -> Body {
        Body::new(BodyId(id), Vec2::new(x, y), r)
    }

    #[test]
    fn test_full_overlap_merges() {
        let mut bodies = vec![body(1, 0.0, 0.0, 10.0), body(2, 5.0, 0.0, 10.0)];
        let total = bodies[0].area() + bodies[1].area();
        let pairs = find_collisions(&bodies);

        let res = resolve_collisions(&mut bodies, &pairs, NEGLIGIBLE_AREA);

        // Equal areas: later body absorbs
        assert_eq!(res.removed, vec![0]);
        assert_eq!(res.merges, 1);
        assert_eq!(res.partials, 0);
        assert!((bodies[1].area() - total).abs() < 1e-3);
        assert!((bodies[1].radius - (200.0_f32).sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_shallow_overlap_partially_absorbs() {
        let mut bodies = vec![body(1, 0.0, 0.0, 10.0), body(2, 19.0, 0.0, 10.0)];
        let pairs = find_collisions(&bodies);

        let res = resolve_collisions(&mut bodies, &pairs, NEGLIGIBLE_AREA);

        assert!(res.removed.is_empty());
        assert_eq!(res.partials, 1);
        assert!(bodies[1].radius > 10.0);
        assert!(bodies[0].radius < 10.0);
    }

    #[test]
    fn test_negligible_body_swallowed_whole() {
        // Area of radius 0.1 is ~0.031, below the threshold, despite a shallow overlap
        let mut bodies = vec![body(1, 0.0, 0.0, 10.0), body(2, 10.05, 0.0, 0.1)];
        let pairs = find_collisions(&bodies);

        let res = resolve_collisions(&mut bodies, &pairs, NEGLIGIBLE_AREA);

        assert_eq!(res.removed, vec![1]);
        assert_eq!(res.merges, 1);
    }

    #[test]
    fn test_consumed_body_not_merged_twice() {
        // Tiny body sits inside two big ones; only the first pair eats it
        let mut bodies = vec![
            body(1, 0.0, 0.0, 10.0),
            body(2, 2.0, 0.0, 0.1),
            body(3, 4.0, 0.0, 12.0),
        ];
        let pairs = vec![(0, 1), (1, 2)];
        let radius_before = bodies[2].radius;

        let res = resolve_collisions(&mut bodies, &pairs, NEGLIGIBLE_AREA);

        assert_eq!(res.removed, vec![1]);
        assert_eq!(res.merges, 1);
        assert_eq!(bodies[2].radius, radius_before);
    }

    #[test]
    fn test_absorber_picked_by_area_not_order() {
        let mut bodies = vec![body(1, 0.0, 0.0, 20.0), body(2, 3.0, 0.0, 5.0)];
        let pairs = find_collisions(&bodies);

        let res = resolve_collisions(&mut bodies, &pairs, NEGLIGIBLE_AREA);

        assert_eq!(res.removed, vec![1]);
        assert!(bodies[0].radius > 20.0);
    }

    #[test]
    fn test_earlier_bite_separates_later_pair() {
        let mut bodies = vec![
            body(1, 0.0, 0.0, 20.0),
            body(2, 29.0, 0.0, 10.0),
            body(3, 48.9, 0.0, 10.0),
        ];
        let pairs = vec![(0, 1), (1, 2)];

        // The first bite alone leaves the second pair apart
        let mut first_only = bodies.clone();
        resolve_collisions(&mut first_only, &pairs[..1], NEGLIGIBLE_AREA);
        let bitten = first_only[1].radius;
        assert!(!first_only[1].overlaps(&first_only[2]));

        let res = resolve_collisions(&mut bodies, &pairs, NEGLIGIBLE_AREA);

        // The separated pair still takes a bite by the gap, nothing is removed
        assert!(res.removed.is_empty());
        assert_eq!(res.partials, 2);
        assert!(bodies[1].radius < bitten);
        assert!(bodies[0].radius > 20.0);
        assert!(bodies[2].radius > 10.0);
        for b in &bodies {
            assert!(b.radius.is_finite());
            assert!(b.radius >= 0.0);
        }
    }
}
