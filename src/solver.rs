//! Geometric constraint relaxation for the ragdoll.
//!
//! Everything here is a pure function over [`Point`] values. The soft constraint
//! keeps a limb within half of its reach from the body segment it hangs from; the
//! rigid link keeps the two torso circles an exact distance apart.
//!
//! Coincident points are a normal transient state (for example right after a snap),
//! so every function treats a zero distance as "nothing to do" instead of dividing
//! by it.

use crate::types::Point;

/// Separation error below which the rigid link is considered satisfied.
///
/// Makes a second [`maintain_fixed_distance`] call an exact no-op despite float
/// rounding in the first.
pub const LINK_TOLERANCE: f32 = 1e-3;

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f32 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Fraction of the parent→child vector by which the constraint is exceeded.
///
/// Returns `None` when the child is already within `max_distance / 2` or the two
/// points coincide.
fn excess_factor(child: Point, parent: Point, max_distance: f32) -> Option<f32> {
    let dist = distance(child, parent);
    let half = max_distance / 2.0;
    if dist <= half || dist == 0.0 {
        return None;
    }
    Some((dist - half) / dist)
}

/// Moves `parent` toward `child` by the amount the child overshoots the reach.
///
/// Used while a limb is dragged: the body yields to the hand or foot. Returns the
/// new parent position; unchanged when the child is within `max_distance / 2`.
pub fn pull_parent_toward_child(child: Point, parent: Point, max_distance: f32) -> Point {
    match excess_factor(child, parent, max_distance) {
        Some(factor) => parent + (child - parent) * factor,
        None => parent,
    }
}

/// Moves `child` toward `parent` until it is exactly `max_distance / 2` away.
///
/// Returns the new child position; unchanged when already within reach.
pub fn pull_child_toward_parent(child: Point, parent: Point, max_distance: f32) -> Point {
    match excess_factor(child, parent, max_distance) {
        Some(factor) => parent + (child - parent) * (1.0 - factor),
        None => child,
    }
}

/// Places `a` and `b` symmetrically about their midpoint so they are exactly
/// `target` apart.
///
/// The direction a→b is preserved. Coincident points have no direction and are
/// returned unchanged.
pub fn maintain_fixed_distance(a: Point, b: Point, target: f32) -> (Point, Point) {
    let current = distance(a, b);
    if current == 0.0 || (current - target).abs() <= LINK_TOLERANCE {
        return (a, b);
    }

    let half_span = (b - a) * (target / current / 2.0);
    let midpoint = (a + b) * 0.5;
    (midpoint - half_span, midpoint + half_span)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_distance() {
        assert_close(distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 5.0);
        assert_eq!(distance(Point::new(7.0, 7.0), Point::new(7.0, 7.0)), 0.0);
    }

    #[test]
    fn test_pulls_are_noops_within_reach() {
        let parent = Point::new(100.0, 100.0);
        let cases = [
            Point::new(100.0, 100.0),
            Point::new(150.0, 100.0),
            Point::new(160.0, 180.0),
            Point::new(100.0, 0.0),
        ];
        for child in cases {
            assert_eq!(pull_parent_toward_child(child, parent, 200.0), parent);
            assert_eq!(pull_child_toward_parent(child, parent, 200.0), child);
        }
    }

    #[test]
    fn test_pull_child_lands_on_half_reach() {
        let parent = Point::new(300.0, 410.0);
        let cases = [
            Point::new(600.0, 410.0),
            Point::new(0.0, 0.0),
            Point::new(301.0, 900.0),
            Point::new(420.0, 300.0),
        ];
        for child in cases {
            let new_child = pull_child_toward_parent(child, parent, 200.0);
            assert_close(distance(new_child, parent), 100.0);
        }
    }

    #[test]
    fn test_pull_child_keeps_direction() {
        let parent = Point::new(0.0, 0.0);
        let new_child = pull_child_toward_parent(Point::new(0.0, 250.0), parent, 200.0);
        assert_close(new_child.x, 0.0);
        assert_close(new_child.y, 100.0);
    }

    #[test]
    fn test_pull_parent_moves_by_excess() {
        let child = Point::new(250.0, 0.0);
        let parent = Point::new(0.0, 0.0);
        let new_parent = pull_parent_toward_child(child, parent, 200.0);
        // Excess over the 100 unit half-reach is 150
        assert_close(new_parent.x, 150.0);
        assert_close(new_parent.y, 0.0);
        assert_close(distance(child, new_parent), 100.0);
    }

    #[test]
    fn test_zero_reach_with_coincident_points_is_noop() {
        let p = Point::new(5.0, 5.0);
        assert_eq!(pull_parent_toward_child(p, p, 0.0), p);
        assert_eq!(pull_child_toward_parent(p, p, 0.0), p);
        assert_eq!(pull_child_toward_parent(p, p, -10.0), p);
    }

    #[test]
    fn test_maintain_fixed_distance_stretches_and_shrinks() {
        let (a, b) = maintain_fixed_distance(Point::new(300.0, 400.0), Point::new(300.0, 440.0), 80.0);
        assert_close(distance(a, b), 80.0);
        assert_close(a.y, 380.0);
        assert_close(b.y, 460.0);

        let (a, b) = maintain_fixed_distance(Point::new(0.0, 0.0), Point::new(300.0, 400.0), 80.0);
        assert_close(distance(a, b), 80.0);
        // Midpoint is preserved
        assert_close((a.x + b.x) / 2.0, 150.0);
        assert_close((a.y + b.y) / 2.0, 200.0);
    }

    #[test]
    fn test_maintain_fixed_distance_coincident_points_unchanged() {
        let p = Point::new(42.0, 17.0);
        assert_eq!(maintain_fixed_distance(p, p, 80.0), (p, p));
    }

    #[test]
    fn test_maintain_fixed_distance_is_idempotent() {
        let cases = [
            (Point::new(12.0, 900.0), Point::new(590.0, 3.0)),
            (Point::new(300.0, 410.0), Point::new(301.0, 412.0)),
            (Point::new(-5.0, 5.0), Point::new(5.0, -5.0)),
        ];
        for (a, b) in cases {
            let once = maintain_fixed_distance(a, b, 80.0);
            let twice = maintain_fixed_distance(once.0, once.1, 80.0);
            assert_eq!(once, twice);
        }
    }
}
