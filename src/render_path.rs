//! `RenderPath`: the renderer-facing path type, wrapping
//! [`crate::geometry::RawPath`] with a fill rule and an identity used for
//! tessellation-cache lookups.

use crate::geometry::{Mat2D, RawPath, Vec2};
use std::sync::atomic::{AtomicU64, Ordering};

/// How overlapping sub-paths combine to determine "inside".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

static NEXT_PATH_ID: AtomicU64 = AtomicU64::new(1);

/// A drawable path: a verb/point stream plus the fill rule it should be
/// triangulated with. Each instance has a stable id used as a tessellation
/// and stroke-extrusion cache key.
#[derive(Clone, Debug)]
pub struct RenderPath {
    id: u64,
    raw: RawPath,
    fill_rule: FillRule,
}

impl Default for RenderPath {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPath {
    pub fn new() -> Self {
        Self { id: NEXT_PATH_ID.fetch_add(1, Ordering::Relaxed), raw: RawPath::new(), fill_rule: FillRule::default() }
    }

    /// Stable identity, distinct from the path's content, used to key
    /// cached tessellation/stroke output across frames.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn raw(&self) -> &RawPath {
        &self.raw
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    pub fn set_fill_rule(&mut self, fill_rule: FillRule) {
        self.fill_rule = fill_rule;
    }

    /// Clears the path's geometry but keeps its identity and allocated
    /// capacity, so cached GPU resources keyed on `id()` remain valid for
    /// the next frame's content.
    pub fn rewind(&mut self) {
        self.raw.rewind();
    }

    pub fn move_to(&mut self, p: impl Into<Vec2>) -> &mut Self {
        self.raw.move_to(p.into());
        self
    }

    pub fn line_to(&mut self, p: impl Into<Vec2>) -> &mut Self {
        self.raw.line_to(p.into());
        self
    }

    pub fn quad_to(&mut self, ctrl: impl Into<Vec2>, to: impl Into<Vec2>) -> &mut Self {
        self.raw.quad_to(ctrl.into(), to.into());
        self
    }

    pub fn cubic_to(&mut self, ctrl0: impl Into<Vec2>, ctrl1: impl Into<Vec2>, to: impl Into<Vec2>) -> &mut Self {
        self.raw.cubic_to(ctrl0.into(), ctrl1.into(), to.into());
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.raw.close();
        self
    }

    /// Embeds `other`'s geometry into this path, optionally transformed,
    /// and adopts a fresh identity since the resulting content differs from
    /// either source path.
    pub fn add_render_path(&mut self, other: &RenderPath, matrix: Option<&Mat2D>) {
        self.raw.add_path(&other.raw, matrix);
        self.id = NEXT_PATH_ID.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_paths_have_distinct_ids() {
        let a = RenderPath::new();
        let b = RenderPath::new();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn rewind_preserves_identity() {
        let mut path = RenderPath::new();
        let id_before = path.id();
        path.move_to((0.0, 0.0)).line_to((10.0, 10.0));
        path.rewind();
        assert_eq!(path.id(), id_before);
        assert!(path.raw().is_empty());
    }

    #[test]
    fn add_render_path_changes_identity() {
        let mut a = RenderPath::new();
        let id_before = a.id();
        let mut b = RenderPath::new();
        b.move_to((0.0, 0.0)).line_to((1.0, 1.0));
        a.add_render_path(&b, None);
        assert_ne!(a.id(), id_before);
    }
}
