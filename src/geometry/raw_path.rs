//! `RawPath`: an ordered verb/point stream. See DESIGN.md for the
//! algorithm's grounding.

use super::aabb::Aabb;
use super::cubic::UNIT_CIRCLE_CONTROL_FACTOR;
use super::mat2d::Mat2D;
use super::vec2::Vec2;

/// One segment kind in a `RawPath`'s verb stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathVerb {
    Move,
    Line,
    Quad,
    Cubic,
    Close,
}

impl PathVerb {
    /// How many new points this verb appends to the path's point array.
    #[inline]
    pub fn point_count(self) -> usize {
        match self {
            PathVerb::Move => 1,
            PathVerb::Line => 1,
            PathVerb::Quad => 2,
            PathVerb::Cubic => 3,
            PathVerb::Close => 0,
        }
    }
}

/// Which way a newly added contour (rect, oval, polygon) winds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathDirection {
    Cw,
    Ccw,
}

/// An ordered sequence of `(verb, points)` backed by two parallel arrays.
/// Geometry verbs are always preceded by a `move`; `add_to`-style
/// construction (the individual `line`/`quad`/`cubic` methods) injects one
/// automatically if missing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawPath {
    points: Vec<Vec2>,
    verbs: Vec<PathVerb>,
    last_move_idx: usize,
    /// True if the path is nonempty and the most recent verb is not `Close`.
    contour_is_open: bool,
}

impl RawPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn verbs(&self) -> &[PathVerb] {
        &self.verbs
    }

    /// A linear scan over every control point: a loose, conservative hull
    /// that does not account for curve extrema.
    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::EMPTY;
        for &p in &self.points {
            aabb.add_point(p);
        }
        aabb
    }

    fn inject_implicit_move_if_needed(&mut self) {
        if !self.contour_is_open {
            let start = self.points.last().copied().unwrap_or(Vec2::ZERO);
            self.move_to(start);
        }
    }

    pub fn move_to(&mut self, p: Vec2) {
        self.last_move_idx = self.points.len();
        self.points.push(p);
        self.verbs.push(PathVerb::Move);
        self.contour_is_open = true;
    }

    pub fn line_to(&mut self, p: Vec2) {
        self.inject_implicit_move_if_needed();
        self.points.push(p);
        self.verbs.push(PathVerb::Line);
    }

    pub fn quad_to(&mut self, ctrl: Vec2, to: Vec2) {
        self.inject_implicit_move_if_needed();
        self.points.push(ctrl);
        self.points.push(to);
        self.verbs.push(PathVerb::Quad);
    }

    pub fn cubic_to(&mut self, ctrl0: Vec2, ctrl1: Vec2, to: Vec2) {
        self.inject_implicit_move_if_needed();
        self.points.push(ctrl0);
        self.points.push(ctrl1);
        self.points.push(to);
        self.verbs.push(PathVerb::Cubic);
    }

    pub fn close(&mut self) {
        if self.contour_is_open {
            self.verbs.push(PathVerb::Close);
            self.contour_is_open = false;
        }
    }

    /// Clears the path but keeps its allocated capacity.
    pub fn rewind(&mut self) {
        self.points.clear();
        self.verbs.clear();
        self.last_move_idx = 0;
        self.contour_is_open = false;
    }

    /// Clears the path and frees any memory the drawing calls allocated.
    pub fn reset(&mut self) {
        self.points = Vec::new();
        self.verbs = Vec::new();
        self.last_move_idx = 0;
        self.contour_is_open = false;
    }

    pub fn add_rect(&mut self, aabb: &Aabb, direction: PathDirection) {
        let c = aabb.corners();
        self.move_to(c[0]);
        match direction {
            PathDirection::Cw => {
                self.line_to(c[1]);
                self.line_to(c[2]);
                self.line_to(c[3]);
            }
            PathDirection::Ccw => {
                self.line_to(c[3]);
                self.line_to(c[2]);
                self.line_to(c[1]);
            }
        }
        self.close();
    }

    /// Approximates an oval (ellipse inscribed in `aabb`) with four cubics,
    /// using the Bézier unit-circle approximation constant `c`.
    pub fn add_oval(&mut self, aabb: &Aabb, direction: PathDirection) {
        let cx = (aabb.min.x + aabb.max.x) * 0.5;
        let cy = (aabb.min.y + aabb.max.y) * 0.5;
        let rx = aabb.width() * 0.5;
        let ry = aabb.height() * 0.5;
        let k = UNIT_CIRCLE_CONTROL_FACTOR;

        let right = Vec2::new(cx + rx, cy);
        let top = Vec2::new(cx, cy - ry);
        let left = Vec2::new(cx - rx, cy);
        let bottom = Vec2::new(cx, cy + ry);

        let ox = rx * k;
        let oy = ry * k;

        self.move_to(right);
        match direction {
            PathDirection::Cw => {
                self.cubic_to(
                    Vec2::new(right.x, right.y - oy),
                    Vec2::new(top.x + ox, top.y),
                    top,
                );
                self.cubic_to(
                    Vec2::new(top.x - ox, top.y),
                    Vec2::new(left.x, left.y - oy),
                    left,
                );
                self.cubic_to(
                    Vec2::new(left.x, left.y + oy),
                    Vec2::new(bottom.x - ox, bottom.y),
                    bottom,
                );
                self.cubic_to(
                    Vec2::new(bottom.x + ox, bottom.y),
                    Vec2::new(right.x, right.y + oy),
                    right,
                );
            }
            PathDirection::Ccw => {
                self.cubic_to(
                    Vec2::new(right.x, right.y + oy),
                    Vec2::new(bottom.x + ox, bottom.y),
                    bottom,
                );
                self.cubic_to(
                    Vec2::new(bottom.x - ox, bottom.y),
                    Vec2::new(left.x, left.y + oy),
                    left,
                );
                self.cubic_to(
                    Vec2::new(left.x, left.y - oy),
                    Vec2::new(top.x - ox, top.y),
                    top,
                );
                self.cubic_to(
                    Vec2::new(top.x + ox, top.y),
                    Vec2::new(right.x, right.y - oy),
                    right,
                );
            }
        }
        self.close();
    }

    pub fn add_poly(&mut self, points: &[Vec2], is_closed: bool) {
        if points.is_empty() {
            return;
        }
        self.move_to(points[0]);
        for &p in &points[1..] {
            self.line_to(p);
        }
        if is_closed {
            self.close();
        }
    }

    /// Embeds `other`'s verb stream, optionally transformed, into this path.
    pub fn add_path(&mut self, other: &RawPath, matrix: Option<&Mat2D>) {
        for (verb, pts) in other.iter() {
            let t = |p: Vec2| matrix.map_or(p, |m| m.apply(p));
            match verb {
                PathVerb::Move => self.move_to(t(pts[0])),
                PathVerb::Line => self.line_to(t(pts[1])),
                PathVerb::Quad => self.quad_to(t(pts[1]), t(pts[2])),
                PathVerb::Cubic => self.cubic_to(t(pts[1]), t(pts[2]), t(pts[3])),
                PathVerb::Close => self.close(),
            }
        }
    }

    /// Returns a new path with `matrix` applied to every point.
    pub fn transform(&self, matrix: &Mat2D) -> RawPath {
        RawPath {
            points: self.points.iter().map(|&p| matrix.apply(p)).collect(),
            verbs: self.verbs.clone(),
            last_move_idx: self.last_move_idx,
            contour_is_open: self.contour_is_open,
        }
    }

    pub fn transform_in_place(&mut self, matrix: &Mat2D) {
        for p in &mut self.points {
            *p = matrix.apply(*p);
        }
    }

    /// Returns a new path with `f` applied to every control point, preserving
    /// the verb stream.
    pub fn morph(&self, mut f: impl FnMut(Vec2) -> Vec2) -> RawPath {
        let mut dst = RawPath::new();
        for (verb, pts) in self.iter() {
            match verb {
                PathVerb::Move => dst.move_to(f(pts[0])),
                PathVerb::Line => dst.line_to(f(pts[1])),
                PathVerb::Quad => dst.quad_to(f(pts[1]), f(pts[2])),
                PathVerb::Cubic => dst.cubic_to(f(pts[1]), f(pts[2]), f(pts[3])),
                PathVerb::Close => dst.close(),
            }
        }
        dst
    }

    /// Returns a bidirectional iterator over `(verb, points-slice)` pairs,
    /// where `points` is "back-set" by one entry so consumers can read the
    /// segment's start point at `pts[0]` without tracking it externally
    ///.
    pub fn iter(&self) -> PathIter<'_> {
        PathIter { path: self, verb_idx: 0, pt_idx: 0 }
    }
}

/// Iterator over `(verb, &[start_point, ...new points])`. `start_point` is
/// the value the verb reads as its own first coordinate for curves/lines
/// (the prior point); for `Move` it is simply the new point, and for `Close`
/// it is the most recent point before the close.
pub struct PathIter<'a> {
    path: &'a RawPath,
    verb_idx: usize,
    pt_idx: usize,
}

impl<'a> Iterator for PathIter<'a> {
    type Item = (PathVerb, &'a [Vec2]);

    fn next(&mut self) -> Option<Self::Item> {
        let verb = *self.path.verbs.get(self.verb_idx)?;
        self.verb_idx += 1;

        let slice = match verb {
            PathVerb::Move => {
                let s = &self.path.points[self.pt_idx..self.pt_idx + 1];
                self.pt_idx += 1;
                s
            }
            PathVerb::Close => {
                // No new points; expose the previous point as the lone entry
                // so callers can still read "where the close started from."
                let backset = self.pt_idx.saturating_sub(1);
                &self.path.points[backset..self.pt_idx]
            }
            PathVerb::Line | PathVerb::Quad | PathVerb::Cubic => {
                let n = verb.point_count();
                let backset = self.pt_idx.saturating_sub(1);
                let end = self.pt_idx + n;
                self.pt_idx = end;
                &self.path.points[backset..end]
            }
        };
        Some((verb, slice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterator_visits_every_verb_with_correct_backset() {
        let mut path = RawPath::new();
        path.move_to(Vec2::new(0.0, 0.0));
        path.line_to(Vec2::new(1.0, 0.0));
        path.quad_to(Vec2::new(2.0, 1.0), Vec2::new(2.0, 2.0));
        path.cubic_to(Vec2::new(3.0, 3.0), Vec2::new(4.0, 3.0), Vec2::new(4.0, 0.0));
        path.close();

        let mut count = 0;
        for (verb, pts) in path.iter() {
            count += 1;
            match verb {
                PathVerb::Move => assert_eq!(pts.len(), 1),
                PathVerb::Line => {
                    assert_eq!(pts[0], Vec2::new(0.0, 0.0));
                    assert_eq!(pts[1], Vec2::new(1.0, 0.0));
                }
                PathVerb::Quad => assert_eq!(pts[0], Vec2::new(1.0, 0.0)),
                PathVerb::Cubic => assert_eq!(pts[0], Vec2::new(2.0, 2.0)),
                PathVerb::Close => {}
            }
        }
        assert_eq!(count, 5);
    }

    #[test]
    fn line_without_move_injects_implicit_move() {
        let mut path = RawPath::new();
        path.line_to(Vec2::new(5.0, 5.0));
        assert_eq!(path.verbs(), &[PathVerb::Move, PathVerb::Line]);
    }

    #[test]
    fn transform_bounds_contains_every_mapped_control_point() {
        let mut path = RawPath::new();
        path.add_rect(&Aabb::from_ltrb(0.0, 0.0, 10.0, 10.0), PathDirection::Cw);
        let m = Mat2D::new(2.0, 0.0, 0.0, 2.0, 1.0, 1.0);
        let transformed = path.transform(&m);
        let bounds = transformed.bounds();
        for &p in path.points() {
            let mapped = m.apply(p);
            assert!(bounds.contains_point(mapped));
        }
    }

    #[test]
    fn rewind_keeps_capacity_reset_frees() {
        let mut path = RawPath::new();
        path.add_rect(&Aabb::from_ltrb(0.0, 0.0, 1.0, 1.0), PathDirection::Cw);
        let cap_before = path.points.capacity();
        path.rewind();
        assert!(path.is_empty());
        assert!(path.points.capacity() >= cap_before);
        path.reset();
        assert_eq!(path.points.capacity(), 0);
    }

    #[test]
    fn add_oval_emits_four_cubics_closed() {
        let mut path = RawPath::new();
        path.add_oval(&Aabb::from_ltrb(0.0, 0.0, 10.0, 10.0), PathDirection::Cw);
        let cubic_count = path.verbs().iter().filter(|v| **v == PathVerb::Cubic).count();
        assert_eq!(cubic_count, 4);
        assert_eq!(path.verbs().last(), Some(&PathVerb::Close));
    }

    #[test]
    fn morph_preserves_verb_stream() {
        let mut path = RawPath::new();
        path.add_rect(&Aabb::from_ltrb(0.0, 0.0, 1.0, 1.0), PathDirection::Cw);
        let morphed = path.morph(|p| p * 2.0);
        assert_eq!(path.verbs(), morphed.verbs());
        assert_eq!(morphed.points()[0], Vec2::new(0.0, 0.0));
    }
}
