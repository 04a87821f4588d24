//! Scalar and point-wise cubic Bézier math shared by the flattener, the
//! contour measure, and the stroke extruder.

use super::vec2::Vec2;

/// The Bézier unit-circle approximation constant used by `add_oval`:
/// the distance from an axis point to its control point, as a fraction of
/// the radius, such that four cubics approximate a full circle.
pub const UNIT_CIRCLE_CONTROL_FACTOR: f32 = 0.5519150244935105707435627;

/// Evaluates a scalar cubic Bézier at `t`.
#[inline]
pub fn cubic_at(t: f32, a: f32, b: f32, c: f32, d: f32) -> f32 {
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    let t2 = t * t;
    a * mt2 * mt + 3.0 * b * mt2 * t + 3.0 * c * mt * t2 + d * t2 * t
}

/// Evaluates a point-wise cubic Bézier at `t`.
pub fn cubic_point_at(t: f32, p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Vec2 {
    Vec2::new(
        cubic_at(t, p0.x, p1.x, p2.x, p3.x),
        cubic_at(t, p0.y, p1.y, p2.y, p3.y),
    )
}

/// Derivative (tangent direction, not normalized) of a cubic Bézier at `t`.
pub fn cubic_tangent_at(t: f32, p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Vec2 {
    let mt = 1.0 - t;
    let d0 = (p1 - p0) * (3.0 * mt * mt);
    let d1 = (p2 - p1) * (6.0 * mt * t);
    let d2 = (p3 - p2) * (3.0 * t * t);
    let tangent = d0 + d1 + d2;
    if tangent.length_squared() > f32::EPSILON {
        tangent
    } else {
        // Degenerate derivative at a cusp/endpoint: fall back to the chord.
        p3 - p0
    }
}

/// De Casteljau split of the cubic `(from, ctrl0, ctrl1, to)` at `t`, filling
/// `hull` with the six intermediate control points of the two resulting
/// sub-cubics in the order:
/// `[from, ab, abbc, to_left=abbc_cd, bc, cd]` is not how Skia/Rive lay it
/// out; we instead follow `computeHull`'s documented contract directly:
/// `hull[0..3]` are the left sub-cubic's interior control points
/// (`ab`, `ab_bc`, the split point) and `hull[3..6]` are the right
/// sub-cubic's interior control points (the split point, `bc_cd`, `cd`).
pub fn compute_hull(from: Vec2, ctrl0: Vec2, ctrl1: Vec2, to: Vec2, t: f32, hull: &mut [Vec2; 6]) {
    let ab = from.lerp(ctrl0, t);
    let bc = ctrl0.lerp(ctrl1, t);
    let cd = ctrl1.lerp(to, t);
    let ab_bc = ab.lerp(bc, t);
    let bc_cd = bc.lerp(cd, t);
    let split = ab_bc.lerp(bc_cd, t);

    hull[0] = ab;
    hull[1] = ab_bc;
    hull[2] = split;
    hull[3] = split;
    hull[4] = bc_cd;
    hull[5] = cd;
}

/// Decides whether a cubic needs further subdivision before it can be safely
/// flattened to a line, by comparing the control points against the chord at
/// t=1/3 and t=2/3.
pub fn should_split_cubic(from: Vec2, ctrl0: Vec2, ctrl1: Vec2, to: Vec2, threshold: f32) -> bool {
    // Points the chord would pass through at t=1/3 and t=2/3 if the cubic
    // were a straight line.
    let chord_third = from.lerp(to, 1.0 / 3.0);
    let chord_two_thirds = from.lerp(to, 2.0 / 3.0);

    ctrl0.distance_squared(chord_third) > threshold * threshold
        || ctrl1.distance_squared(chord_two_thirds) > threshold * threshold
}

/// Evaluates a scalar quadratic Bézier at `t`.
#[inline]
pub fn quad_at(t: f32, a: f32, b: f32, c: f32) -> f32 {
    let mt = 1.0 - t;
    mt * mt * a + 2.0 * mt * t * b + t * t * c
}

pub fn quad_point_at(t: f32, p0: Vec2, p1: Vec2, p2: Vec2) -> Vec2 {
    Vec2::new(quad_at(t, p0.x, p1.x, p2.x), quad_at(t, p0.y, p1.y, p2.y))
}

pub fn quad_tangent_at(t: f32, p0: Vec2, p1: Vec2, p2: Vec2) -> Vec2 {
    let mt = 1.0 - t;
    let tangent = (p1 - p0) * (2.0 * mt) + (p2 - p1) * (2.0 * t);
    if tangent.length_squared() > f32::EPSILON {
        tangent
    } else {
        p2 - p0
    }
}

/// Splits a quadratic at `t`, returning `(left_ctrl, split, right_ctrl)`.
pub fn split_quad(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> (Vec2, Vec2, Vec2) {
    let ab = p0.lerp(p1, t);
    let bc = p1.lerp(p2, t);
    let split = ab.lerp(bc, t);
    (ab, split, bc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_at_endpoints_matches_controls() {
        assert_eq!(cubic_at(0.0, 0.0, 1.0, 2.0, 3.0), 0.0);
        assert_eq!(cubic_at(1.0, 0.0, 1.0, 2.0, 3.0), 3.0);
    }

    #[test]
    fn compute_hull_split_point_lies_on_curve() {
        let from = Vec2::new(0.0, 0.0);
        let c0 = Vec2::new(0.0, 100.0);
        let c1 = Vec2::new(100.0, 100.0);
        let to = Vec2::new(100.0, 0.0);
        let mut hull = [Vec2::ZERO; 6];
        compute_hull(from, c0, c1, to, 0.5, &mut hull);
        let on_curve = cubic_point_at(0.5, from, c0, c1, to);
        assert!(hull[2].distance(on_curve) < 1e-4);
        assert_eq!(hull[2], hull[3]);
    }

    #[test]
    fn straight_line_cubic_should_not_split() {
        let from = Vec2::new(0.0, 0.0);
        let to = Vec2::new(30.0, 0.0);
        let c0 = from.lerp(to, 1.0 / 3.0);
        let c1 = from.lerp(to, 2.0 / 3.0);
        assert!(!should_split_cubic(from, c0, c1, to, 0.5));
    }

    #[test]
    fn bulging_cubic_should_split() {
        let from = Vec2::new(0.0, 0.0);
        let to = Vec2::new(30.0, 0.0);
        let c0 = Vec2::new(10.0, 50.0);
        let c1 = Vec2::new(20.0, 50.0);
        assert!(should_split_cubic(from, c0, c1, to, 0.5));
    }
}
