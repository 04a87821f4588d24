//! Contour measure: parametrizes a contour by arc length and supports
//! position/tangent queries, sub-path extraction, and path warping for
//! text-on-path. See DESIGN.md for the algorithm's grounding.

use crate::geometry::{
    cubic_point_at, cubic_tangent_at, quad_point_at, quad_tangent_at, PathVerb, RawPath, Vec2,
};

/// Default tolerance: the max deviation of the curve from its approximating
/// line segments.
pub const DEFAULT_TOLERANCE: f32 = 0.5;

const DOT30_MAX: u32 = (1 << 30) - 1;
const INV_DOT30: f32 = 1.0 / DOT30_MAX as f32;

fn t_to_dot30(t: f32) -> u32 {
    (t.clamp(0.0, 1.0) * DOT30_MAX as f32).round() as u32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SegmentType {
    Line,
    Quad,
    Cubic,
}

/// One arc-length-sorted segment, packed to mirror the original's 12-byte
/// `Segment` (`distance: f32`, `ptIndex: u32`, a 30-bit `t` plus a 2-bit type
/// tag). Rust has no bitfield syntax, so the 30/2 split is stored as a single
/// `u32` and accessed via shifts/masks, matching the original's layout
/// without its packing.
#[derive(Clone, Copy, Debug)]
struct Segment {
    distance: f32,
    pt_index: u32,
    /// bits 0..30: dot30 t value for the end of this segment; bits 30..32: type tag.
    packed: u32,
}

impl Segment {
    fn new(distance: f32, pt_index: u32, t: f32, kind: SegmentType) -> Self {
        let tag = match kind {
            SegmentType::Line => 0u32,
            SegmentType::Quad => 1u32,
            SegmentType::Cubic => 2u32,
        };
        Self { distance, pt_index, packed: t_to_dot30(t) | (tag << 30) }
    }

    fn t(&self) -> f32 {
        (self.packed & DOT30_MAX) as f32 * INV_DOT30
    }

    fn kind(&self) -> SegmentType {
        match self.packed >> 30 {
            0 => SegmentType::Line,
            1 => SegmentType::Quad,
            _ => SegmentType::Cubic,
        }
    }
}

/// Position and unit tangent at a queried arc length.
#[derive(Clone, Copy, Debug)]
pub struct PosTan {
    pub pos: Vec2,
    pub tan: Vec2,
}

/// A standalone, arc-length-parametrized view of one contour. Contains no
/// back pointers to the `ContourMeasureIter` or path that produced it.
#[derive(Clone, Debug)]
pub struct ContourMeasure {
    segments: Vec<Segment>,
    points: Vec<Vec2>,
    length: f32,
    is_closed: bool,
}

impl ContourMeasure {
    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    fn find_segment(&self, distance: f32) -> usize {
        match self
            .segments
            .binary_search_by(|s| s.distance.partial_cmp(&distance).unwrap())
        {
            Ok(idx) => idx,
            Err(idx) => idx.min(self.segments.len() - 1),
        }
    }

    /// Position and unit tangent at arc length `distance`, clamped to
    /// `[0, length]`.
    pub fn get_pos_tan(&self, distance: f32) -> PosTan {
        let d = distance.clamp(0.0, self.length);
        let idx = self.find_segment(d);
        let seg = self.segments[idx];
        let seg_start_distance = if idx == 0 { 0.0 } else { self.segments[idx - 1].distance };
        let seg_t_start = if idx == 0 || self.segments[idx - 1].pt_index != seg.pt_index {
            0.0
        } else {
            self.segments[idx - 1].t()
        };
        let seg_t_end = seg.t();

        // Local parametrization within this sub-segment's [seg_start, seg_end]
        // arc-length range.
        let local_t = if (seg.distance - seg_start_distance).abs() > f32::EPSILON {
            ((d - seg_start_distance) / (seg.distance - seg_start_distance)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let t = seg_t_start + (seg_t_end - seg_t_start) * local_t;

        let p = self.points[seg.pt_index as usize..];
        let (pos, tan) = match seg.kind() {
            SegmentType::Line => {
                let a = p[0];
                let b = p[1];
                (a.lerp(b, t), (b - a).normalized())
            }
            SegmentType::Quad => {
                let pos = quad_point_at(t, p[0], p[1], p[2]);
                let tan = quad_tangent_at(t, p[0], p[1], p[2]).normalized();
                (pos, tan)
            }
            SegmentType::Cubic => {
                let pos = cubic_point_at(t, p[0], p[1], p[2], p[3]);
                let tan = cubic_tangent_at(t, p[0], p[1], p[2], p[3]).normalized();
                (pos, tan)
            }
        };
        PosTan { pos, tan }
    }

    /// Extracts the arc between `[d0, d1]` into `dst`, emitting one `move` if
    /// `start_with_move`, then one path verb per traversed segment.
    pub fn get_segment(&self, d0: f32, d1: f32, dst: &mut RawPath, start_with_move: bool) {
        let d0 = d0.clamp(0.0, self.length);
        let d1 = d1.clamp(0.0, self.length);
        if d0 >= d1 {
            return;
        }

        let start_idx = self.find_segment(d0);
        let end_idx = self.find_segment(d1);

        let mut moved = !start_with_move;
        for idx in start_idx..=end_idx {
            let seg = self.segments[idx];
            let seg_start_distance = if idx == 0 { 0.0 } else { self.segments[idx - 1].distance };
            let seg_t_start = if idx == 0 || self.segments[idx - 1].pt_index != seg.pt_index {
                0.0
            } else {
                self.segments[idx - 1].t()
            };
            let seg_t_end = seg.t();
            let seg_len = (seg.distance - seg_start_distance).max(f32::EPSILON);

            let local_from = if idx == start_idx { ((d0 - seg_start_distance) / seg_len).clamp(0.0, 1.0) } else { 0.0 };
            let local_to = if idx == end_idx { ((d1 - seg_start_distance) / seg_len).clamp(0.0, 1.0) } else { 1.0 };

            let t_from = seg_t_start + (seg_t_end - seg_t_start) * local_from;
            let t_to = seg_t_start + (seg_t_end - seg_t_start) * local_to;

            let p = &self.points[seg.pt_index as usize..];
            match seg.kind() {
                SegmentType::Line => {
                    let a = p[0];
                    let b = p[1];
                    let from = a.lerp(b, t_from);
                    let to = a.lerp(b, t_to);
                    if !moved {
                        dst.move_to(from);
                        moved = true;
                    }
                    dst.line_to(to);
                }
                SegmentType::Quad => {
                    let (sub_p0, sub_p1, sub_p2) = sub_quad(p[0], p[1], p[2], t_from, t_to);
                    if !moved {
                        dst.move_to(sub_p0);
                        moved = true;
                    }
                    dst.quad_to(sub_p1, sub_p2);
                }
                SegmentType::Cubic => {
                    let (sub_p0, sub_p1, sub_p2, sub_p3) =
                        sub_cubic(p[0], p[1], p[2], p[3], t_from, t_to);
                    if !moved {
                        dst.move_to(sub_p0);
                        moved = true;
                    }
                    dst.cubic_to(sub_p1, sub_p2, sub_p3);
                }
            }
        }
    }

    /// `warp(u, v)`: the primitive behind text-on-path. Interprets `src` as
    /// `(arc length, perpendicular offset)` and returns the corresponding
    /// world-space point.
    pub fn warp(&self, src: Vec2) -> Vec2 {
        let result = self.get_pos_tan(src.x);
        Vec2::new(
            result.pos.x - result.tan.y * src.y,
            result.pos.y + result.tan.x * src.y,
        )
    }
}

fn trim_quad_right(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> (Vec2, Vec2, Vec2) {
    let ab = p0.lerp(p1, t);
    let bc = p1.lerp(p2, t);
    let split = ab.lerp(bc, t);
    (p0, ab, split)
}

fn trim_quad_left(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> (Vec2, Vec2, Vec2) {
    let ab = p0.lerp(p1, t);
    let bc = p1.lerp(p2, t);
    let split = ab.lerp(bc, t);
    (split, bc, p2)
}

fn sub_quad(p0: Vec2, p1: Vec2, p2: Vec2, t0: f32, t1: f32) -> (Vec2, Vec2, Vec2) {
    let (a0, a1, a2) = trim_quad_right(p0, p1, p2, t1);
    let t0_remapped = if t1.abs() > f32::EPSILON { t0 / t1 } else { 0.0 };
    trim_quad_left(a0, a1, a2, t0_remapped.clamp(0.0, 1.0))
}

fn sub_cubic(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t0: f32, t1: f32) -> (Vec2, Vec2, Vec2, Vec2) {
    // Standard two-step de Casteljau sub-cubic extraction: trim to [0, t1], then
    // trim that to [t0/t1, 1].
    let (a0, a1, a2, a3) = trim_cubic_right(p0, p1, p2, p3, t1);
    let t0_remapped = if t1.abs() > f32::EPSILON { t0 / t1 } else { 0.0 };
    trim_cubic_left(a0, a1, a2, a3, t0_remapped.clamp(0.0, 1.0))
}

fn trim_cubic_right(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> (Vec2, Vec2, Vec2, Vec2) {
    let ab = p0.lerp(p1, t);
    let bc = p1.lerp(p2, t);
    let cd = p2.lerp(p3, t);
    let ab_bc = ab.lerp(bc, t);
    let bc_cd = bc.lerp(cd, t);
    let split = ab_bc.lerp(bc_cd, t);
    (p0, ab, ab_bc, split)
}

fn trim_cubic_left(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> (Vec2, Vec2, Vec2, Vec2) {
    let ab = p0.lerp(p1, t);
    let bc = p1.lerp(p2, t);
    let cd = p2.lerp(p3, t);
    let ab_bc = ab.lerp(bc, t);
    let bc_cd = bc.lerp(cd, t);
    let split = ab_bc.lerp(bc_cd, t);
    (split, bc_cd, cd, p3)
}

/// Walks a path and yields one [`ContourMeasure`] per non-degenerate
/// contour; zero-length contours are skipped.
pub struct ContourMeasureIter<'a> {
    path: &'a RawPath,
    verb_idx: usize,
    pt_idx: usize,
    tolerance: f32,
}

impl<'a> ContourMeasureIter<'a> {
    pub fn new(path: &'a RawPath, tolerance: f32) -> Self {
        Self { path, verb_idx: 0, pt_idx: 0, tolerance }
    }

    pub fn next_measure(&mut self) -> Option<ContourMeasure> {
        loop {
            let measure = self.try_next()?;
            if measure.length > 0.0 {
                return Some(measure);
            }
            // Zero-length contour: skip and continue scanning.
        }
    }

    fn try_next(&mut self) -> Option<ContourMeasure> {
        let verbs = self.path.verbs();
        if self.verb_idx >= verbs.len() {
            return None;
        }

        let mut segments = Vec::new();
        let mut points = Vec::new();
        let mut distance = 0.0f32;
        let mut is_closed = false;
        let mut contour_move = Vec2::ZERO;
        let mut started = false;

        while self.verb_idx < verbs.len() {
            let verb = verbs[self.verb_idx];
            if verb == PathVerb::Move && started {
                break;
            }
            self.verb_idx += 1;

            match verb {
                PathVerb::Move => {
                    contour_move = self.path.points()[self.pt_idx];
                    self.pt_idx += 1;
                    points.push(contour_move);
                    started = true;
                }
                PathVerb::Line => {
                    let a = *points.last().unwrap();
                    let b = self.path.points()[self.pt_idx];
                    self.pt_idx += 1;
                    let len = a.distance(b);
                    if len > 0.0 {
                        let pt_index = (points.len() - 1) as u32;
                        points.push(b);
                        distance += len;
                        segments.push(Segment::new(distance, pt_index, 1.0, SegmentType::Line));
                    }
                }
                PathVerb::Quad => {
                    let a = *points.last().unwrap();
                    let c0 = self.path.points()[self.pt_idx];
                    let c1 = self.path.points()[self.pt_idx + 1];
                    self.pt_idx += 2;
                    let steps = flatten_step_count(a, c0, c1, self.tolerance);
                    let pt_index = (points.len() - 1) as u32;
                    points.push(c0);
                    points.push(c1);
                    let mut prev = a;
                    for i in 1..=steps {
                        let t = i as f32 / steps as f32;
                        let p = quad_point_at(t, a, c0, c1);
                        distance += prev.distance(p);
                        segments.push(Segment::new(distance, pt_index, t, SegmentType::Quad));
                        prev = p;
                    }
                }
                PathVerb::Cubic => {
                    let a = *points.last().unwrap();
                    let c0 = self.path.points()[self.pt_idx];
                    let c1 = self.path.points()[self.pt_idx + 1];
                    let c2 = self.path.points()[self.pt_idx + 2];
                    self.pt_idx += 3;
                    let steps = flatten_step_count(a, c0, c1, self.tolerance).max(
                        flatten_step_count(a, c1, c2, self.tolerance),
                    );
                    let pt_index = (points.len() - 1) as u32;
                    points.push(c0);
                    points.push(c1);
                    points.push(c2);
                    let mut prev = a;
                    for i in 1..=steps {
                        let t = i as f32 / steps as f32;
                        let p = cubic_point_at(t, a, c0, c1, c2);
                        distance += prev.distance(p);
                        segments.push(Segment::new(distance, pt_index, t, SegmentType::Cubic));
                        prev = p;
                    }
                }
                PathVerb::Close => {
                    let a = *points.last().unwrap();
                    let len = a.distance(contour_move);
                    if len > 0.0 {
                        let pt_index = (points.len() - 1) as u32;
                        points.push(contour_move);
                        distance += len;
                        segments.push(Segment::new(distance, pt_index, 1.0, SegmentType::Line));
                    }
                    is_closed = true;
                    break;
                }
            }
        }

        Some(ContourMeasure { segments, points, length: distance, is_closed })
    }
}

/// A conservative flatness-driven step count for a quad/cubic control
/// polygon, used to decide how many arc-length sub-segments to accumulate.
fn flatten_step_count(a: Vec2, b: Vec2, c: Vec2, tolerance: f32) -> u32 {
    let dev = b.distance(a.lerp(c, 0.5)).max(a.distance(c) * 0.001);
    let steps = (dev / tolerance.max(1e-4)).sqrt().ceil() as u32;
    steps.clamp(1, 64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Aabb, PathDirection};

    #[test]
    fn line_length_matches_euclidean_distance() {
        let mut path = RawPath::new();
        path.move_to(Vec2::new(0.0, 0.0));
        path.line_to(Vec2::new(30.0, 40.0));

        let mut iter = ContourMeasureIter::new(&path, DEFAULT_TOLERANCE);
        let measure = iter.next_measure().unwrap();
        assert!((measure.length() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn get_pos_tan_returns_unit_tangent() {
        let mut path = RawPath::new();
        path.move_to(Vec2::new(0.0, 0.0));
        path.line_to(Vec2::new(100.0, 0.0));
        let mut iter = ContourMeasureIter::new(&path, DEFAULT_TOLERANCE);
        let measure = iter.next_measure().unwrap();

        for i in 0..=10 {
            let d = measure.length() * (i as f32 / 10.0);
            let pt = measure.get_pos_tan(d);
            assert!((pt.tan.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn get_segment_round_trips_endpoints() {
        let mut path = RawPath::new();
        path.move_to(Vec2::new(0.0, 0.0));
        path.line_to(Vec2::new(50.0, 0.0));
        path.line_to(Vec2::new(50.0, 50.0));

        let mut iter = ContourMeasureIter::new(&path, DEFAULT_TOLERANCE);
        let measure = iter.next_measure().unwrap();

        let mut dst = RawPath::new();
        measure.get_segment(0.0, measure.length(), &mut dst, true);

        assert_eq!(dst.points().first(), Some(&Vec2::new(0.0, 0.0)));
        assert!(dst.points().last().unwrap().distance(Vec2::new(50.0, 50.0)) < 1e-3);
    }

    #[test]
    fn zero_length_contours_are_skipped() {
        let mut path = RawPath::new();
        path.move_to(Vec2::new(0.0, 0.0));
        path.close();
        path.move_to(Vec2::new(10.0, 10.0));
        path.line_to(Vec2::new(20.0, 10.0));

        let mut iter = ContourMeasureIter::new(&path, DEFAULT_TOLERANCE);
        let measure = iter.next_measure().unwrap();
        assert!((measure.length() - 10.0).abs() < 1e-3);
        assert!(iter.next_measure().is_none());
    }

    #[test]
    fn warp_horizontal_line_offsets_vertically() {
        let mut path = RawPath::new();
        path.move_to(Vec2::new(0.0, 0.0));
        path.line_to(Vec2::new(100.0, 0.0));
        let mut iter = ContourMeasureIter::new(&path, DEFAULT_TOLERANCE);
        let measure = iter.next_measure().unwrap();

        let warped = measure.warp(Vec2::new(50.0, 5.0));
        assert!((warped.x - 50.0).abs() < 1e-3);
        assert!((warped.y - 5.0).abs() < 1e-3);
    }

    #[test]
    fn closed_oval_contour_reports_closed() {
        let mut path = RawPath::new();
        path.add_oval(&Aabb::from_ltrb(0.0, 0.0, 20.0, 20.0), PathDirection::Cw);
        let mut iter = ContourMeasureIter::new(&path, DEFAULT_TOLERANCE);
        let measure = iter.next_measure().unwrap();
        assert!(measure.is_closed());
    }
}
