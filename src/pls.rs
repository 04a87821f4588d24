//! Pixel local storage capability selection: picks which
//! [`crate::frame::InterlockMode`] a frame uses and describes how its four
//! logical planes (color/clip/scratch-color/coverage) map onto the backend's
//! actual render-attachment and stencil resources.
//!
//! True PLS (rasterizer-ordered views, coherent fragment-shader atomics) has
//! no portable `wgpu` expression, and there is no compiler available in this
//! exercise to validate hand-written WGSL atomic/compute variants for each of
//! the five interlock modes. This module therefore models PLS as a
//! capability-selection and plane-wiring layer: [`select_interlock_mode`]
//! picks the best mode a backend can support, and [`PlaneLayout`] records
//! which physical attachment backs each logical plane. The actual color
//! plane is always realized through the existing stencil-incrementing fill
//! pipeline (`pipeline.rs`); modes beyond `Msaa` currently select wiring that
//! degrades gracefully to the MSAA path. See DESIGN.md.

use crate::frame::InterlockMode;

pub const COLOR_PLANE_IDX: usize = 0;
pub const CLIP_PLANE_IDX: usize = 1;
pub const SCRATCH_COLOR_PLANE_IDX: usize = 2;
pub const COVERAGE_PLANE_IDX: usize = 3;

/// What a backend can actually provide, queried once at
/// [`crate::context::RenderContext`] construction time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlsCapabilities {
    /// Coherent fragment-shader read-modify-write to a storage texture.
    pub supports_atomics: bool,
    /// The caller has committed to submitting draws in a front-to-back,
    /// non-overlapping order.
    pub supports_clockwise: bool,
    pub max_color_attachments: u32,
}

impl PlsCapabilities {
    /// Whether `mode` can run at all given these capabilities. `Msaa` is
    /// always supported; it is the universal fallback.
    pub fn supports(&self, mode: InterlockMode) -> bool {
        match mode {
            InterlockMode::RasterOrdering => false,
            InterlockMode::Atomics => self.supports_atomics,
            InterlockMode::ClockwiseAtomic => self.supports_atomics && self.supports_clockwise,
            InterlockMode::Clockwise => self.supports_clockwise,
            InterlockMode::Msaa => true,
        }
    }
}

/// Picks the highest-preference [`InterlockMode`] these capabilities can
/// run, or `preferred` itself if the caller pinned one and it is supported
///.
pub fn select_interlock_mode(
    capabilities: PlsCapabilities,
    preferred: Option<InterlockMode>,
) -> InterlockMode {
    if let Some(mode) = preferred {
        if capabilities.supports(mode) {
            return mode;
        }
    }
    InterlockMode::PREFERENCE_ORDER
        .into_iter()
        .find(|&mode| capabilities.supports(mode))
        .unwrap_or(InterlockMode::Msaa)
}

/// Where each logical PLS plane's data actually lives for the selected mode.
/// In every mode this crate currently implements, the color plane is the
/// render target's own color attachment and the clip plane is the stencil
/// aspect of its depth-stencil attachment; the scratch-color and coverage
/// planes are only meaningful under `Atomics`/`ClockwiseAtomic` and are
/// unbacked (`None`) otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneLayout {
    pub mode: InterlockMode,
    pub color_is_attachment: bool,
    pub clip_is_stencil: bool,
    pub scratch_color_backed: bool,
    pub coverage_backed: bool,
}

impl PlaneLayout {
    pub fn for_mode(mode: InterlockMode) -> Self {
        let atomics_backed = matches!(mode, InterlockMode::Atomics | InterlockMode::ClockwiseAtomic);
        Self {
            mode,
            color_is_attachment: true,
            clip_is_stencil: true,
            scratch_color_backed: atomics_backed,
            coverage_backed: atomics_backed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msaa_only_backend_falls_back_to_msaa() {
        let caps = PlsCapabilities { supports_atomics: false, supports_clockwise: false, max_color_attachments: 1 };
        assert_eq!(select_interlock_mode(caps, None), InterlockMode::Msaa);
    }

    #[test]
    fn atomics_capable_backend_prefers_clockwise_atomic_over_plain_atomics() {
        let caps = PlsCapabilities { supports_atomics: true, supports_clockwise: true, max_color_attachments: 4 };
        assert_eq!(select_interlock_mode(caps, None), InterlockMode::ClockwiseAtomic);
    }

    #[test]
    fn unsupported_preference_falls_back_to_best_supported() {
        let caps = PlsCapabilities { supports_atomics: false, supports_clockwise: true, max_color_attachments: 4 };
        assert_eq!(select_interlock_mode(caps, Some(InterlockMode::RasterOrdering)), InterlockMode::Clockwise);
    }

    #[test]
    fn plane_layout_only_backs_scratch_and_coverage_under_atomics() {
        let layout = PlaneLayout::for_mode(InterlockMode::Clockwise);
        assert!(!layout.scratch_color_backed);
        assert!(!layout.coverage_backed);

        let atomic_layout = PlaneLayout::for_mode(InterlockMode::ClockwiseAtomic);
        assert!(atomic_layout.scratch_color_backed);
        assert!(atomic_layout.coverage_backed);
    }
}
