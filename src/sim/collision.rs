//! Collision detection between bodies
//!
//! Pairs are reported as index pairs `(i, j)` with `i < j` into the slice that
//! was searched, ordered by `i` then `j`. Both detectors report the same set
//! in the same order for any input, so the resolver behaves identically
//! whichever one is configured.
//!
//! Overlap is tested in plain plane coordinates: bodies touching across the
//! wrap seam do not collide.

use std::collections::HashMap;

use super::body::Body;

/// Index pair of two overlapping bodies, `0 < 1`
pub type CollisionPair = (usize, usize);

/// Axis-aligned bounding box of a body
#[inline]
fn bounds(body: &Body) -> (f32, f32, f32, f32) {
    (
        body.pos.x - body.radius,
        body.pos.x + body.radius,
        body.pos.y - body.radius,
        body.pos.y + body.radius,
    )
}

/// Cheap rejection: true when the bounding boxes cannot touch
#[inline]
fn boxes_separated(a: &Body, b: &Body) -> bool {
    let (left1, right1, top1, bottom1) = bounds(a);
    let (left2, right2, top2, bottom2) = bounds(b);
    right1 < left2 || left1 > right2 || bottom1 < top2 || top1 > bottom2
}

/// Exact narrow-phase check, prefiltered by bounding boxes
#[inline]
fn colliding(a: &Body, b: &Body) -> bool {
    !boxes_separated(a, b) && a.overlaps(b)
}

/// Find every overlapping pair by checking all pairs
pub fn find_collisions(bodies: &[Body]) -> Vec<CollisionPair> {
    let mut pairs = Vec::new();
    for (i, a) in bodies.iter().enumerate() {
        for (offset, b) in bodies[i + 1..].iter().enumerate() {
            if colliding(a, b) {
                pairs.push((i, i + 1 + offset));
            }
        }
    }
    pairs
}

/// Uniform grid broad phase
///
/// Each body is inserted into every cell its bounding box covers; candidate
/// pairs share at least one cell. Pairs are deduplicated and sorted so the
/// output matches [`find_collisions`] exactly.
pub fn find_collisions_grid(bodies: &[Body], cell_size: f32) -> Vec<CollisionPair> {
    if bodies.len() < 2 {
        return Vec::new();
    }
    if !(cell_size.is_finite() && cell_size > 0.0) {
        return find_collisions(bodies);
    }

    let cell_of = |v: f32| (v / cell_size).floor() as i64;

    let mut cells: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, body) in bodies.iter().enumerate() {
        let (left, right, top, bottom) = bounds(body);
        for cx in cell_of(left)..=cell_of(right) {
            for cy in cell_of(top)..=cell_of(bottom) {
                cells.entry((cx, cy)).or_default().push(i);
            }
        }
    }

    let mut pairs = Vec::new();
    for members in cells.values() {
        for (k, &i) in members.iter().enumerate() {
            for &j in &members[k + 1..] {
                // Members were pushed in index order, so i < j
                if colliding(&bodies[i], &bodies[j]) {
                    pairs.push((i, j));
                }
            }
        }
    }

    pairs.sort_unstable();
    pairs.dedup();
    pairs
}

/// Grid cell size suited to a population: twice the largest radius
pub fn suggested_cell_size(bodies: &[Body]) -> f32 {
    let max_radius = bodies.iter().map(|b| b.radius).fold(0.0_f32, f32::max);
    (max_radius * 2.0).max(1.0)
}
