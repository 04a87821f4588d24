//! Per-frame GPU orchestrator: owns the device/queue, scratch
//! buffer pools, the draw-tree accumulator, and the fixed
//! tessellation/draw/resolve pass sequence. See DESIGN.md for how this
//! module's submodules are grounded.

mod construction;
mod draw_queue;
mod metrics;
mod passes;
mod preparation;
mod readback;
mod rendering;
mod surface;
mod traversal;
mod types;

pub use metrics::FrameMetrics;

use crate::cache::Cache;
use crate::frame::{InterlockMode, LoadAction};
use crate::paint::BlendMode;
use crate::pls::PlsCapabilities;
use crate::texture_manager::TextureManager;
use crate::util::PoolManager;
use crate::vertex::CustomVertex;
use std::sync::Arc;
use types::DrawCommand;
use wgpu::{BindGroup, Buffer, CompositeAlphaMode, Device, InstanceDescriptor, Queue, RenderPipeline, SurfaceConfiguration, SurfaceTarget};

/// Construction-time tuning knobs: ring-buffer sizing, MSAA sample count,
/// and the feather/gradient atlas size, surfaced as a single struct so
/// callers can override them.
#[derive(Debug, Clone, Copy)]
pub struct RenderContextOptions {
    pub msaa_sample_count: u32,
    pub vsync: bool,
    pub transparent: bool,
    /// Preferred interlock mode; `None` picks the highest-preference mode
    /// the backend supports.
    pub preferred_interlock_mode: Option<InterlockMode>,
    /// Side length of the square feather/gradient atlas texture.
    pub feather_atlas_size: u32,
}

impl Default for RenderContextOptions {
    fn default() -> Self {
        Self {
            msaa_sample_count: 1,
            vsync: true,
            transparent: false,
            preferred_interlock_mode: None,
            feather_atlas_size: 256,
        }
    }
}

pub struct RenderContext<'a> {
    instance: wgpu::Instance,
    surface: Option<wgpu::Surface<'a>>,
    device: Arc<Device>,
    queue: Arc<Queue>,
    config: SurfaceConfiguration,
    physical_size: (u32, u32),
    scale_factor: f64,
    options: RenderContextOptions,

    texture_manager: TextureManager,
    pool_manager: PoolManager,

    /// `pipeline::create_pipeline` owns its uniform buffer internally and
    /// hands back only the bind group wired to it; canvas-size changes on
    /// resize are applied by rebuilding this bind group/pipeline pair rather
    /// than writing into a buffer handle we don't have (see `surface.rs`).
    fill_bind_group: BindGroup,
    fill_pipeline: Arc<RenderPipeline>,
    clip_bind_group: BindGroup,
    clip_pipeline: Arc<RenderPipeline>,

    texture_bind_group_layout: wgpu::BindGroupLayout,
    texture_pipeline: Arc<RenderPipeline>,
    texture_pipeline_always: Arc<RenderPipeline>,
    /// Per-blend-mode image pipeline pairs (stencil-tested, always-pass),
    /// built lazily the first time a `drawImage`/`drawImageMesh` call uses a
    /// given [`BlendMode`]; `BlendMode::SrcOver` is seeded at construction
    /// from `texture_pipeline`/`texture_pipeline_always` above.
    image_blend_pipelines: ahash::HashMap<BlendMode, (Arc<RenderPipeline>, Arc<RenderPipeline>)>,

    draw_tree: easy_tree::Tree<DrawCommand>,

    /// Scratch triangle-list vertices for path fills/strokes, rebuilt by
    /// `prepare_render` each frame and drawn with a non-indexed `draw()`
    /// since `triangulate_fill`/`StrokeStrip` output is already flattened.
    temp_vertices: Vec<CustomVertex>,
    aggregated_vertex_buffer: Option<Buffer>,
    aggregated_vertex_buffer_len: usize,

    /// Scratch indexed mesh for `drawImageMesh` calls.
    temp_mesh_vertices: Vec<crate::vertex::TexturedVertex>,
    temp_mesh_indices: Vec<u16>,
    aggregated_mesh_vertex_buffer: Option<Buffer>,
    aggregated_mesh_index_buffer: Option<Buffer>,
    aggregated_mesh_index_buffer_len: usize,

    msaa_sample_count: u32,
    msaa_color_texture_view: Option<wgpu::TextureView>,
    depth_stencil_texture: Option<wgpu::Texture>,
    depth_stencil_view: Option<wgpu::TextureView>,

    interlock_mode: InterlockMode,
    frame_active: bool,
    pending_clear_color: Option<crate::Color>,
    pending_load_action: LoadAction,
    /// The swapchain frame acquired by `acquire_surface_target`, held here
    /// until `present_frame` consumes it — `wgpu::SurfaceTexture::present`
    /// takes the whole handle, not just the `Texture` stored in the
    /// corresponding `RenderTarget`, so the two must be tracked separately.
    pending_present: Option<wgpu::SurfaceTexture>,
    metrics: FrameMetrics,
}

impl<'a> RenderContext<'a> {
    const DEFAULT_PLS_CAPABILITIES: PlsCapabilities =
        PlsCapabilities { supports_atomics: false, supports_clockwise: true, max_color_attachments: 4 };

    pub fn texture_manager(&self) -> &TextureManager {
        &self.texture_manager
    }

    pub fn size(&self) -> (u32, u32) {
        self.physical_size
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn interlock_mode(&self) -> InterlockMode {
        self.interlock_mode
    }

    pub fn metrics(&self) -> FrameMetrics {
        self.metrics
    }
}
