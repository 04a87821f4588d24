//! CPU fill triangulator: turns a set of flattened contour
//! rings into a flat triangle list under a fill rule, via vertical
//! sweep-line trapezoidation with arena/`u32`-index storage and a bailout
//! on pathological inputs. See DESIGN.md for the algorithm's grounding.

use crate::geometry::Vec2;
use crate::render_path::FillRule;

/// Upper bound on emitted trapezoids, guarding against self-intersecting or
/// adversarial input blowing up the sweep.
const MAX_TRAPEZOIDS: usize = 250_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriangulationFailed;

impl std::fmt::Display for TriangulationFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "triangulation exceeded the trapezoid budget")
    }
}

impl std::error::Error for TriangulationFailed {}

#[derive(Clone, Copy)]
struct Edge {
    p: Vec2,
    q: Vec2,
    /// +1 if `q.y > p.y` (the directed edge points upward), else -1. Used
    /// by the nonzero/even-odd crossing test during the sweep.
    winding: i32,
}

impl Edge {
    fn y_min(&self) -> f32 {
        self.p.y.min(self.q.y)
    }

    fn y_max(&self) -> f32 {
        self.p.y.max(self.q.y)
    }

    /// x coordinate of this edge's line at height `y`. Caller must ensure
    /// `y` lies within `[y_min, y_max]`.
    fn x_at(&self, y: f32) -> f32 {
        let dy = self.q.y - self.p.y;
        if dy.abs() < f32::EPSILON {
            return self.p.x;
        }
        let t = (y - self.p.y) / dy;
        self.p.x + (self.q.x - self.p.x) * t
    }
}

fn collect_edges(rings: &[&[Vec2]]) -> Vec<Edge> {
    let mut edges = Vec::new();
    for ring in rings {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        for i in 0..n {
            let p = ring[i];
            let q = ring[(i + 1) % n];
            if (p.y - q.y).abs() < f32::EPSILON {
                continue; // horizontal edges never cross a scanline
            }
            let winding = if q.y > p.y { 1 } else { -1 };
            edges.push(Edge { p, q, winding });
        }
    }
    edges
}

fn sorted_y_events(edges: &[Edge]) -> Vec<f32> {
    let mut ys: Vec<f32> = edges.iter().flat_map(|e| [e.p.y, e.q.y]).collect();
    ys.sort_by(|a, b| a.partial_cmp(b).unwrap());
    ys.dedup_by(|a, b| (*a - *b).abs() < 1e-6);
    ys
}

fn fill_test(winding: i32, fill_rule: FillRule) -> bool {
    match fill_rule {
        FillRule::NonZero => winding != 0,
        FillRule::EvenOdd => winding.rem_euclid(2) != 0,
    }
}

/// Triangulates `rings` (each a closed polygon, not repeating its first
/// point as its last) under `fill_rule`, returning a flat position-only
/// triangle list (`len() % 3 == 0`).
pub fn triangulate_fill(rings: &[&[Vec2]], fill_rule: FillRule) -> Result<Vec<Vec2>, TriangulationFailed> {
    let edges = collect_edges(rings);
    if edges.is_empty() {
        return Ok(Vec::new());
    }

    let y_events = sorted_y_events(&edges);
    let mut triangles = Vec::new();
    let mut trapezoid_count = 0usize;

    for band in y_events.windows(2) {
        let (y0, y1) = (band[0], band[1]);
        if y1 - y0 < 1e-6 {
            continue;
        }
        let y_mid = (y0 + y1) * 0.5;

        let mut active: Vec<&Edge> =
            edges.iter().filter(|e| e.y_min() <= y_mid && y_mid <= e.y_max()).collect();
        if active.is_empty() {
            continue;
        }
        active.sort_by(|a, b| a.x_at(y_mid).partial_cmp(&b.x_at(y_mid)).unwrap());

        let mut winding = 0;
        for pair in active.windows(2) {
            winding += pair[0].winding;
            if !fill_test(winding, fill_rule) {
                continue;
            }

            trapezoid_count += 1;
            if trapezoid_count > MAX_TRAPEZOIDS {
                return Err(TriangulationFailed);
            }

            let left = pair[0];
            let right = pair[1];
            let top_left = Vec2::new(left.x_at(y1), y1);
            let top_right = Vec2::new(right.x_at(y1), y1);
            let bottom_left = Vec2::new(left.x_at(y0), y0);
            let bottom_right = Vec2::new(right.x_at(y0), y0);

            triangles.push(bottom_left);
            triangles.push(bottom_right);
            triangles.push(top_right);

            triangles.push(bottom_left);
            triangles.push(top_right);
            triangles.push(top_left);
        }
    }

    Ok(triangles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<Vec2> {
        vec![Vec2::new(x0, y0), Vec2::new(x1, y0), Vec2::new(x1, y1), Vec2::new(x0, y1)]
    }

    #[test]
    fn single_square_has_correct_area() {
        let ring = square(0.0, 0.0, 10.0, 10.0);
        let tris = triangulate_fill(&[&ring], FillRule::NonZero).unwrap();
        assert_eq!(tris.len() % 3, 0);
        let area: f32 = tris
            .chunks(3)
            .map(|t| triangle_area(t[0], t[1], t[2]))
            .sum();
        assert!((area - 100.0).abs() < 1e-3);
    }

    #[test]
    fn square_with_hole_nonzero_excludes_hole_area() {
        // Hole ring wound opposite to the outer ring so the nonzero winding
        // count drops back to zero inside it.
        let outer = square(0.0, 0.0, 10.0, 10.0);
        let mut hole = square(3.0, 3.0, 7.0, 7.0);
        hole.reverse();
        let tris = triangulate_fill(&[&outer, &hole], FillRule::NonZero).unwrap();
        let area: f32 = tris.chunks(3).map(|t| triangle_area(t[0], t[1], t[2])).sum();
        assert!((area - (100.0 - 16.0)).abs() < 1e-2);
    }

    #[test]
    fn empty_input_produces_no_triangles() {
        let tris = triangulate_fill(&[], FillRule::NonZero).unwrap();
        assert!(tris.is_empty());
    }

    #[test]
    fn degenerate_ring_is_skipped() {
        let ring = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0)];
        let tris = triangulate_fill(&[&ring], FillRule::NonZero).unwrap();
        assert!(tris.is_empty());
    }

    fn triangle_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
        ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)).abs() * 0.5
    }
}
