//! Stroke properties and the stroke extruder for shapes: triangle
//! generation, joins, and caps. See DESIGN.md for the extrusion
//! algorithm's grounding.
//!
//! # Examples
//!
//! ```
//! use rive_render_core::Color;
//! use rive_render_core::Stroke;
//!
//! let red_stroke = Stroke::new(2.0, Color::rgb(255, 0, 0));
//! let transparent_stroke = Stroke::default();
//!
//! assert!(!red_stroke.is_empty());
//! assert!(transparent_stroke.is_empty());
//! ```

use crate::contour::SegmentedContour;
use crate::geometry::Vec2;
use crate::Color;

/// How two stroke segments meet at an interior vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeJoin {
    Miter,
    Round,
    Bevel,
}

/// How a stroke terminates at an open sub-path endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeCap {
    Butt,
    Square,
    Round,
}

/// Represents the stroke properties of a shape: width, color, join, and cap.
#[derive(Clone, Debug, Copy, PartialEq)]
pub struct Stroke {
    /// The full width of the stroke in user-space units. Half of this is
    /// extruded to either side of the contour.
    pub width: f32,
    /// The color of the stroke.
    pub color: Color,
    pub join: StrokeJoin,
    pub cap: StrokeCap,
    /// Ratio of miter length to stroke width above which a miter join
    /// collapses to a bevel.
    pub miter_limit: f32,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            width: 0.0,
            color: Color::TRANSPARENT,
            join: StrokeJoin::Miter,
            cap: StrokeCap::Butt,
            miter_limit: 4.0,
        }
    }
}

impl Stroke {
    /// Creates a new `Stroke` with the specified width and color.
    ///
    /// # Examples
    ///
    /// ```
    /// use rive_render_core::Color;
    /// use rive_render_core::Stroke;
    ///
    /// let orange_stroke = Stroke::new(3.0, Color::rgba(255, 165, 0, 255));
    /// ```
    #[inline]
    pub fn new(width: impl Into<f32>, color: impl Into<Color>) -> Self {
        Self { width: width.into(), color: color.into(), ..Default::default() }
    }

    pub fn with_join(mut self, join: StrokeJoin) -> Self {
        self.join = join;
        self
    }

    pub fn with_cap(mut self, cap: StrokeCap) -> Self {
        self.cap = cap;
        self
    }

    /// Determines whether the stroke is empty: its width is zero or its
    /// color is fully transparent. An empty stroke's extruder emits no
    /// triangles.
    ///
    /// # Examples
    ///
    /// ```
    /// use rive_render_core::Color;
    /// use rive_render_core::Stroke;
    ///
    /// let empty_stroke = Stroke::default();
    /// assert!(empty_stroke.is_empty());
    ///
    /// let visible_stroke = Stroke::new(1.0, Color::BLACK);
    /// assert!(!visible_stroke.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.color == Color::TRANSPARENT
    }
}

/// Vertex-range offset into a [`StrokeStrip`]'s triangle list for one
/// sub-path, used for indexed draws.
#[derive(Clone, Copy, Debug)]
pub struct StrokeSubPathRange {
    pub start: usize,
    pub count: usize,
}

/// The triangle list produced by extruding a segmented contour, plus
/// per-sub-path offsets.
#[derive(Clone, Debug, Default)]
pub struct StrokeStrip {
    triangles: Vec<Vec2>,
    sub_paths: Vec<StrokeSubPathRange>,
}

impl StrokeStrip {
    pub fn reset(&mut self) {
        self.triangles.clear();
        self.sub_paths.clear();
    }

    /// Flat triangle-list vertices: each group of three is one triangle.
    /// A list rather than an indexed strip, since joins fan out to a
    /// variable vertex count per corner.
    pub fn triangles(&self) -> &[Vec2] {
        &self.triangles
    }

    pub fn sub_paths(&self) -> &[StrokeSubPathRange] {
        &self.sub_paths
    }

    fn push_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2) {
        self.triangles.push(a);
        self.triangles.push(b);
        self.triangles.push(c);
    }

    fn push_quad(&mut self, a: Vec2, b: Vec2, c: Vec2, d: Vec2) {
        self.push_triangle(a, b, c);
        self.push_triangle(a, c, d);
    }

    /// Extrudes every sub-path ring of `contour` by `stroke.width / 2` along
    /// each segment's normal, handling joins and caps. A ring is treated as
    /// closed when its last flattened vertex coincides
    /// with its first, which is how `SegmentedContour::build` represents a
    /// path's `close()` call.
    pub fn build(&mut self, contour: &SegmentedContour, stroke: &Stroke) {
        self.reset();
        if stroke.is_empty() {
            return;
        }

        for ring in contour.rings() {
            if ring.len() < 2 {
                continue;
            }
            let is_closed = ring.first().unwrap().distance_squared(*ring.last().unwrap()) < 1e-8;
            let verts = if is_closed { &ring[..ring.len() - 1] } else { ring };
            if verts.len() < 2 {
                continue;
            }
            self.extrude_ring(verts, is_closed, stroke);
        }
    }

    fn extrude_ring(&mut self, verts: &[Vec2], is_closed: bool, stroke: &Stroke) {
        let start = self.triangles.len();
        let radius = stroke.width * 0.5;

        let n = verts.len();
        let segment_count = if is_closed { n } else { n - 1 };

        let mut dirs = Vec::with_capacity(segment_count);
        for i in 0..segment_count {
            let a = verts[i];
            let b = verts[(i + 1) % n];
            dirs.push((b - a).normalized());
        }

        for i in 0..segment_count {
            let a = verts[i];
            let b = verts[(i + 1) % n];
            let d = dirs[i];
            let p = d.perp() * radius;
            self.push_quad(a + p, b + p, b - p, a - p);
        }

        let first_join = if is_closed { 0 } else { 1 };
        let last_join = if is_closed { n } else { n - 1 };
        for i in first_join..last_join {
            let prev_dir = dirs[(i + segment_count - 1) % segment_count];
            let next_dir = dirs[i % segment_count];
            self.emit_join(verts[i % n], prev_dir, next_dir, radius, stroke);
        }

        if !is_closed {
            self.emit_cap(verts[0], -dirs[0], radius, stroke.cap);
            self.emit_cap(verts[n - 1], dirs[segment_count - 1], radius, stroke.cap);
        }

        self.sub_paths.push(StrokeSubPathRange { start, count: self.triangles.len() - start });
    }

    fn emit_join(&mut self, v: Vec2, prev_dir: Vec2, next_dir: Vec2, radius: f32, stroke: &Stroke) {
        let p_prev = prev_dir.perp() * radius;
        let p_next = next_dir.perp() * radius;

        let bisector = p_prev + p_next;
        if bisector.length_squared() > f32::EPSILON {
            let b_unit = bisector.normalized();
            let cos_half_angle = b_unit.dot(p_next.normalized());
            if stroke.join == StrokeJoin::Miter && cos_half_angle.abs() > f32::EPSILON {
                let miter_scale = 1.0 / cos_half_angle;
                if miter_scale.abs() <= stroke.miter_limit {
                    let miter_vec = b_unit * (radius * miter_scale);
                    self.push_quad(v + p_prev, v + miter_vec, v + p_next, v);
                    self.push_quad(v - p_prev, v - miter_vec, v - p_next, v);
                    return;
                }
            }
        }

        // Bevel (or round, subdivided) fan spanning the outer side of the turn.
        let turn = prev_dir.cross(next_dir);
        let (outer_from, outer_to) = if turn >= 0.0 { (-p_prev, -p_next) } else { (p_prev, p_next) };

        if stroke.join == StrokeJoin::Round {
            let cos_angle = outer_from.normalized().dot(outer_to.normalized()).clamp(-1.0, 1.0);
            let arc_len = radius * cos_angle.acos();
            let segments = ((arc_len / 4.0).ceil() as u32).max(1);
            self.emit_fan(v, outer_from, outer_to, segments);
        } else {
            self.push_triangle(v, v + outer_from, v + outer_to);
        }
    }

    fn emit_fan(&mut self, center: Vec2, from: Vec2, to: Vec2, segments: u32) {
        let angle_from = from.y.atan2(from.x);
        let mut angle_to = to.y.atan2(to.x);
        let two_pi = std::f32::consts::TAU;
        let mut delta = angle_to - angle_from;
        if delta > std::f32::consts::PI {
            delta -= two_pi;
        } else if delta < -std::f32::consts::PI {
            delta += two_pi;
        }
        angle_to = angle_from + delta;

        let radius = from.length();
        let mut prev = from;
        for i in 1..=segments {
            let t = i as f32 / segments as f32;
            let angle = angle_from + (angle_to - angle_from) * t;
            let next = Vec2::new(angle.cos(), angle.sin()) * radius;
            self.push_triangle(center, center + prev, center + next);
            prev = next;
        }
    }

    fn emit_cap(&mut self, v: Vec2, outward_dir: Vec2, radius: f32, cap: StrokeCap) {
        let perp = outward_dir.perp() * radius;
        match cap {
            StrokeCap::Butt => {}
            StrokeCap::Square => {
                let ext = outward_dir.normalized() * radius;
                self.push_quad(v + perp, v + perp + ext, v - perp + ext, v - perp);
            }
            StrokeCap::Round => {
                let segments = ((std::f32::consts::PI * radius / 4.0).ceil() as u32).max(2);
                self.emit_fan(v, perp, -perp, segments);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Aabb, Mat2D, PathDirection, RawPath};

    fn straight_line_contour() -> SegmentedContour {
        let mut path = RawPath::new();
        path.move_to(Vec2::new(0.0, 0.0));
        path.line_to(Vec2::new(100.0, 0.0));
        let mut contour = SegmentedContour::default();
        contour.build(&path, 0.5, &Mat2D::IDENTITY);
        contour
    }

    #[test]
    fn zero_width_stroke_emits_no_triangles() {
        let contour = straight_line_contour();
        let stroke = Stroke::new(0.0, Color::BLACK);
        let mut strip = StrokeStrip::default();
        strip.build(&contour, &stroke);
        assert!(strip.triangles().is_empty());
    }

    #[test]
    fn transparent_stroke_emits_no_triangles() {
        let contour = straight_line_contour();
        let stroke = Stroke::new(4.0, Color::TRANSPARENT);
        let mut strip = StrokeStrip::default();
        strip.build(&contour, &stroke);
        assert!(strip.triangles().is_empty());
    }

    #[test]
    fn straight_stroke_produces_two_triangles() {
        let contour = straight_line_contour();
        let stroke = Stroke::new(4.0, Color::BLACK);
        let mut strip = StrokeStrip::default();
        strip.build(&contour, &stroke);
        assert_eq!(strip.triangles().len(), 6);
    }

    #[test]
    fn stroke_covers_expected_width_on_both_sides() {
        let contour = straight_line_contour();
        let stroke = Stroke::new(4.0, Color::BLACK);
        let mut strip = StrokeStrip::default();
        strip.build(&contour, &stroke);
        let ys: Vec<f32> = strip.triangles().iter().map(|v| v.y).collect();
        let max_y = ys.iter().cloned().fold(f32::MIN, f32::max);
        let min_y = ys.iter().cloned().fold(f32::MAX, f32::min);
        assert!((max_y - 2.0).abs() < 1e-3);
        assert!((min_y + 2.0).abs() < 1e-3);
    }

    #[test]
    fn closed_square_stroke_has_joins() {
        let mut path = RawPath::new();
        path.add_rect(&Aabb::from_ltrb(0.0, 0.0, 50.0, 50.0), PathDirection::Cw);
        let mut contour = SegmentedContour::default();
        contour.build(&path, 0.5, &Mat2D::IDENTITY);

        let stroke = Stroke::new(4.0, Color::BLACK).with_join(StrokeJoin::Miter);
        let mut strip = StrokeStrip::default();
        strip.build(&contour, &stroke);
        assert!(!strip.triangles().is_empty());
    }

    #[test]
    fn round_join_produces_more_triangles_than_bevel() {
        let mut path = RawPath::new();
        path.move_to(Vec2::new(0.0, 0.0));
        path.line_to(Vec2::new(50.0, 0.0));
        path.line_to(Vec2::new(50.0, -50.0));
        let mut contour = SegmentedContour::default();
        contour.build(&path, 0.5, &Mat2D::IDENTITY);

        let bevel = Stroke::new(10.0, Color::BLACK).with_join(StrokeJoin::Bevel);
        let mut bevel_strip = StrokeStrip::default();
        bevel_strip.build(&contour, &bevel);

        let round = Stroke::new(10.0, Color::BLACK).with_join(StrokeJoin::Round);
        let mut round_strip = StrokeStrip::default();
        round_strip.build(&contour, &round);

        assert!(round_strip.triangles().len() >= bevel_strip.triangles().len());
    }
}
