//! Contour segmentation: flattens a [`RawPath`] into line-segment contours
//! under a tolerance. Implements the iterative flattening contract; see
//! DESIGN.md for the algorithm's grounding.

use crate::geometry::{compute_hull, should_split_cubic, Aabb, Mat2D, PathVerb, RawPath, Vec2};

/// Default flattening tolerance in user-space units.
pub const DEFAULT_TOLERANCE: f32 = 0.5;

/// A flattened polyline derived from a `RawPath`. Reserved sentinel slots
/// 0..3 at the head of the vertex list are rewritten with the bounds corners
/// after the walk, letting downstream code trivially draw the contour's AABB
///.
#[derive(Clone, Debug, Default)]
pub struct SegmentedContour {
    vertices: Vec<Vec2>,
    bounds: Aabb,
    /// Offsets into `vertices()` (post-sentinel, i.e. relative to
    /// `vertices()[4..]`) where each of the source path's sub-paths begins.
    /// A `RawPath` with holes or multiple disjoint sub-paths flattens into
    /// one combined vertex buffer; this lets the triangulator split it back
    /// into per-ring polygons.
    sub_path_starts: Vec<usize>,
}

impl SegmentedContour {
    /// Reuses this contour's backing storage for a new flattening pass
    /// instead of reallocating.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.bounds = Aabb::EMPTY;
        self.sub_path_starts.clear();
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Yields each sub-path's flattened vertex ring (sentinel slots already
    /// excluded), in source order.
    pub fn rings(&self) -> impl Iterator<Item = &[Vec2]> {
        let body = &self.vertices[4..];
        (0..self.sub_path_starts.len()).map(move |i| {
            let start = self.sub_path_starts[i];
            let end = self.sub_path_starts.get(i + 1).copied().unwrap_or(body.len());
            &body[start..end]
        })
    }

    /// Flattens `path` under `tolerance`, scaled by `matrix`'s worst-case
    /// scale factor so on-screen flatness is preserved regardless of zoom.
    pub fn build(&mut self, path: &RawPath, tolerance: f32, matrix: &Mat2D) {
        self.reset();

        let scale = matrix.max_scale_factor().max(f32::EPSILON);
        let threshold = (tolerance / scale).max(1e-6);

        // Reserve the four sentinel slots; overwritten with bounds corners below.
        for _ in 0..4 {
            self.vertices.push(Vec2::ZERO);
        }

        let mut pen_down = false;
        let mut move_point = Vec2::ZERO;
        let mut current = Vec2::ZERO;

        let mut emit = |contour: &mut Self, p: Vec2| {
            contour.vertices.push(p);
            contour.bounds.add_point(p);
        };

        for (verb, pts) in path.iter() {
            match verb {
                PathVerb::Move => {
                    pen_down = false;
                    move_point = pts[0];
                    current = move_point;
                }
                PathVerb::Line => {
                    let end = pts[1];
                    if !pen_down {
                        self.sub_path_starts.push(self.vertices.len() - 4);
                        emit(self, move_point);
                        pen_down = true;
                    }
                    emit(self, end);
                    current = end;
                }
                PathVerb::Quad => {
                    let p0 = pts[0];
                    let p1 = pts[1];
                    let p2 = pts[2];
                    if !pen_down {
                        self.sub_path_starts.push(self.vertices.len() - 4);
                        emit(self, move_point);
                        pen_down = true;
                    }
                    flatten_quad(self, p0, p1, p2, threshold, &mut emit);
                    current = p2;
                }
                PathVerb::Cubic => {
                    let p0 = pts[0];
                    let p1 = pts[1];
                    let p2 = pts[2];
                    let p3 = pts[3];
                    if !pen_down {
                        self.sub_path_starts.push(self.vertices.len() - 4);
                        emit(self, move_point);
                        pen_down = true;
                    }
                    flatten_cubic(self, p0, p1, p2, p3, threshold, 0, &mut emit);
                    current = p3;
                }
                PathVerb::Close => {
                    if pen_down {
                        emit(self, move_point);
                        pen_down = false;
                    }
                    current = move_point;
                }
            }
        }
        let _ = current;

        let corners = self.bounds.corners();
        for i in 0..4 {
            self.vertices[i] = corners[i];
        }
    }
}

fn flatten_quad(
    contour: &mut SegmentedContour,
    p0: Vec2,
    p1: Vec2,
    p2: Vec2,
    threshold: f32,
    emit: &mut impl FnMut(&mut SegmentedContour, Vec2),
) {
    // Quads are flattened with the same chord-deviation idea as cubics but
    // evaluated directly since a quad has a single control point: compare
    // the control point against the midpoint chord.
    let chord_mid = p0.lerp(p2, 0.5);
    if p1.distance_squared(chord_mid) > threshold * threshold {
        let ab = p0.lerp(p1, 0.5);
        let bc = p1.lerp(p2, 0.5);
        let mid = ab.lerp(bc, 0.5);
        flatten_quad(contour, p0, ab, mid, threshold, emit);
        flatten_quad(contour, mid, bc, p2, threshold, emit);
    } else if p0.distance_squared(p2) > threshold * threshold {
        emit(contour, p2);
    } else {
        emit(contour, p2);
    }
}

fn flatten_cubic(
    contour: &mut SegmentedContour,
    p0: Vec2,
    p1: Vec2,
    p2: Vec2,
    p3: Vec2,
    threshold: f32,
    depth: u32,
    emit: &mut impl FnMut(&mut SegmentedContour, Vec2),
) {
    const MAX_DEPTH: u32 = 24;
    if depth < MAX_DEPTH && should_split_cubic(p0, p1, p2, p3, threshold) {
        let mut hull = [Vec2::ZERO; 6];
        compute_hull(p0, p1, p2, p3, 0.5, &mut hull);
        flatten_cubic(contour, p0, hull[0], hull[1], hull[2], threshold, depth + 1, emit);
        flatten_cubic(contour, hull[3], hull[4], hull[5], p3, threshold, depth + 1, emit);
    } else if p0.distance_squared(p3) > threshold * threshold {
        emit(contour, p3);
    } else {
        emit(contour, p3);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PathDirection;

    #[test]
    fn segmented_contour_lies_within_outset_bounds() {
        let mut path = RawPath::new();
        path.add_oval(&Aabb::from_ltrb(0.0, 0.0, 100.0, 100.0), PathDirection::Cw);
        let path_bounds = path.bounds();

        let mut contour = SegmentedContour::default();
        contour.build(&path, DEFAULT_TOLERANCE, &Mat2D::IDENTITY);

        let outset = path_bounds.outset(DEFAULT_TOLERANCE, DEFAULT_TOLERANCE);
        // Skip the four sentinel slots, which are bounds corners by construction.
        for &v in &contour.vertices()[4..] {
            assert!(outset.contains_point(v), "{:?} not within {:?}", v, outset);
        }
    }

    #[test]
    fn sentinel_slots_are_bounds_corners() {
        let mut path = RawPath::new();
        path.add_rect(&Aabb::from_ltrb(0.0, 0.0, 10.0, 20.0), PathDirection::Cw);
        let mut contour = SegmentedContour::default();
        contour.build(&path, DEFAULT_TOLERANCE, &Mat2D::IDENTITY);
        assert_eq!(&contour.vertices()[0..4], &contour.bounds().corners());
    }

    #[test]
    fn tolerance_scales_with_matrix_zoom() {
        let mut path = RawPath::new();
        path.add_oval(&Aabb::from_ltrb(0.0, 0.0, 100.0, 100.0), PathDirection::Cw);

        let mut low_zoom = SegmentedContour::default();
        low_zoom.build(&path, DEFAULT_TOLERANCE, &Mat2D::IDENTITY);

        let mut high_zoom = SegmentedContour::default();
        high_zoom.build(&path, DEFAULT_TOLERANCE, &Mat2D::from_scale(10.0, 10.0));

        // More zoom means the same user-space tolerance must flatten tighter,
        // so the high-zoom contour should not have fewer vertices.
        assert!(high_zoom.vertices().len() >= low_zoom.vertices().len());
    }
}
