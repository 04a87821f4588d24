//! Render paint descriptors: the fill/stroke style and color a path is
//! drawn with, as a standalone POD paint struct.

use crate::stroke::{StrokeCap, StrokeJoin};
use crate::Color;

/// Whether a path is filled, stroked, or both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintStyle {
    Fill,
    Stroke,
}

/// How two overlapping draws combine in the color plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    #[default]
    SrcOver,
    Screen,
    Multiply,
    Additive,
}

/// A solid color or, when `stops` is non-empty, a linear gradient along
/// `start..end` in local path space.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    pub start: crate::geometry::Vec2,
    pub end: crate::geometry::Vec2,
    pub stops: Vec<(f32, Color)>,
}

/// The paint a [`crate::render_path::RenderPath`] is drawn with: color or
/// gradient, fill/stroke style, and the stroke geometry parameters when
/// `style` is [`PaintStyle::Stroke`].
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPaint {
    pub color: Color,
    pub gradient: Option<Gradient>,
    pub style: PaintStyle,
    pub thickness: f32,
    pub join: StrokeJoin,
    pub cap: StrokeCap,
    pub blend_mode: BlendMode,
    /// Radius in user-space units of a soft edge feathered outward from the
    /// path boundary; `0.0` disables feathering.
    pub feather_radius: f32,
}

impl Default for RenderPaint {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            gradient: None,
            style: PaintStyle::Fill,
            thickness: 1.0,
            join: StrokeJoin::Miter,
            cap: StrokeCap::Butt,
            blend_mode: BlendMode::SrcOver,
            feather_radius: 0.0,
        }
    }
}

impl RenderPaint {
    pub fn fill(color: Color) -> Self {
        Self { color, style: PaintStyle::Fill, ..Default::default() }
    }

    pub fn stroke(color: Color, thickness: f32) -> Self {
        Self { color, style: PaintStyle::Stroke, thickness, ..Default::default() }
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    pub fn with_feather(mut self, radius: f32) -> Self {
        self.feather_radius = radius.max(0.0);
        self
    }

    pub fn is_visible(&self) -> bool {
        self.color.to_array()[3] != 0 || self.gradient.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_transparent_fill_is_not_visible() {
        let paint = RenderPaint::fill(Color::TRANSPARENT);
        assert!(!paint.is_visible());
    }

    #[test]
    fn opaque_fill_is_visible() {
        let paint = RenderPaint::fill(Color::BLACK);
        assert!(paint.is_visible());
    }

    #[test]
    fn feather_radius_clamped_to_non_negative() {
        let paint = RenderPaint::fill(Color::BLACK).with_feather(-5.0);
        assert_eq!(paint.feather_radius, 0.0);
    }
}
