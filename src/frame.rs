//! Per-frame descriptors exchanged with a [`crate::context::RenderContext`]:
//! the frame's clear color and viewport, and how the accumulated draw queue
//! should be submitted.

/// Which PLS (pixel local storage) composition strategy the backend should
/// use for a frame, in descending order of GPU-hardware requirements
///.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterlockMode {
    /// Native rasterizer-ordered-views support (e.g. Direct3D ROV).
    RasterOrdering,
    /// Fragment-shader atomics (e.g. GL `coherent` buffer/image loads).
    Atomics,
    /// A draw order that guarantees non-overlapping coverage
    /// front-to-back, needing no synchronization at all.
    Clockwise,
    /// Clockwise ordering plus atomics, for partial overlap.
    ClockwiseAtomic,
    /// Plain multisampled anti-aliasing with no PLS planes; the fallback
    /// interlock mode every backend supports.
    Msaa,
}

impl InterlockMode {
    /// The preference order used when a backend capability is unspecified
    ///: prefer true pixel-local storage, then atomics-backed
    /// variants, and fall back to MSAA last since it forfeits PLS clipping.
    pub const PREFERENCE_ORDER: [InterlockMode; 5] = [
        InterlockMode::RasterOrdering,
        InterlockMode::Atomics,
        InterlockMode::ClockwiseAtomic,
        InterlockMode::Clockwise,
        InterlockMode::Msaa,
    ];
}

/// How a frame's color attachment is treated before the first draw touches
/// it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LoadAction {
    /// Clear to `clear_color` before drawing.
    #[default]
    Clear,
    /// Keep whatever is already in the target's color plane, so this
    /// frame's draws composite on top of the previous frame's contents.
    PreserveRenderTarget,
    /// The initial contents are unspecified; `wgpu` has no attachment load
    /// op cheaper than `Load`, so this is handled the same way as
    /// `PreserveRenderTarget`.
    DontCare,
}

/// Describes one frame's render target and viewport before any draws are
/// recorded.
#[derive(Clone, Debug)]
pub struct FrameDescriptor {
    pub clear_color: Option<crate::Color>,
    pub load_action: LoadAction,
    /// Logical size in user-space units; physical pixels are
    /// `logical_size * scale_factor`.
    pub logical_size: (f32, f32),
    pub scale_factor: f32,
}

/// Describes how the accumulated draw queue should be submitted
///: present to a swapchain, or resolve into an offscreen
/// target and read back.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlushDescriptor {
    /// If true, resolve MSAA and copy the result back to host memory after
    /// submission.
    pub readback: bool,
}
