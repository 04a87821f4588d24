//! Device/adapter/pipeline construction, grounded on the
//! teacher's `renderer/construction.rs::new`/`build_from_device`, adapted to
//! this crate's `pipeline.rs` (a fixed increment/decrement stencil pipeline
//! pair plus one texture pipeline, no MSAA-parameterized `create_pipeline`
//! and no effect/backdrop subsystems — those have no spec counterpart).

use super::metrics::FrameMetrics;
use super::{RenderContext, RenderContextOptions};
use crate::pipeline::{self, PipelineType};
use crate::pls::select_interlock_mode;
use crate::texture_manager::TextureManager;
use crate::util::{to_logical, PoolManager};
use std::sync::Arc;
use wgpu::{CompositeAlphaMode, InstanceDescriptor, SurfaceTarget};

fn select_alpha_mode(transparent: bool, supported: &[CompositeAlphaMode]) -> CompositeAlphaMode {
    if transparent && supported.contains(&CompositeAlphaMode::PreMultiplied) {
        CompositeAlphaMode::PreMultiplied
    } else if transparent && supported.contains(&CompositeAlphaMode::PostMultiplied) {
        CompositeAlphaMode::PostMultiplied
    } else {
        CompositeAlphaMode::Opaque
    }
}

impl<'a> RenderContext<'a> {
    /// Creates a context backed by a real swapchain surface.
    pub async fn new(
        window: impl Into<SurfaceTarget<'a>>,
        physical_size: (u32, u32),
        scale_factor: f64,
        options: RenderContextOptions,
    ) -> Self {
        let instance = wgpu::Instance::new(&InstanceDescriptor::default());
        let surface = instance.create_surface(window).expect("failed to create rendering surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("failed to find a compatible graphics adapter");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
            })
            .await
            .expect("failed to request a device from the adapter");

        let swapchain_format = wgpu::TextureFormat::Bgra8UnormSrgb;
        let surface_caps = surface.get_capabilities(&adapter);
        let alpha_mode = select_alpha_mode(options.transparent, &surface_caps.alpha_modes);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            format: swapchain_format,
            width: physical_size.0.max(1),
            height: physical_size.1.max(1),
            present_mode: if options.vsync { wgpu::PresentMode::AutoVsync } else { wgpu::PresentMode::AutoNoVsync },
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        Self::build(instance, Some(surface), device, queue, config, physical_size, scale_factor, options)
    }

    /// Creates a surface-less context that only ever renders into offscreen
    /// targets; used by headless batch rendering and tests.
    pub async fn new_headless(physical_size: (u32, u32), scale_factor: f64, options: RenderContextOptions) -> Self {
        let instance = wgpu::Instance::new(&InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .expect("failed to find a compatible graphics adapter");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
            })
            .await
            .expect("failed to request a device from the adapter");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            width: physical_size.0.max(1),
            height: physical_size.1.max(1),
            present_mode: wgpu::PresentMode::AutoNoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode: CompositeAlphaMode::Opaque,
            view_formats: vec![],
        };

        Self::build(instance, None, device, queue, config, physical_size, scale_factor, options)
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        instance: wgpu::Instance,
        surface: Option<wgpu::Surface<'a>>,
        device: wgpu::Device,
        queue: wgpu::Queue,
        config: wgpu::SurfaceConfiguration,
        physical_size: (u32, u32),
        scale_factor: f64,
        options: RenderContextOptions,
    ) -> Self {
        let canvas_logical_size = to_logical(physical_size, scale_factor);

        let (_fill_uniforms, fill_bind_group, fill_pipeline) =
            pipeline::create_pipeline(canvas_logical_size, &device, &config, PipelineType::EqualIncrementStencil);
        let (_clip_uniforms, clip_bind_group, clip_pipeline) =
            pipeline::create_pipeline(canvas_logical_size, &device, &config, PipelineType::EqualDecrementStencil);
        let (texture_bind_group_layout, texture_pipeline, texture_pipeline_always) =
            pipeline::create_texture_pipeline(&device, &config);

        let depth_stencil_texture = pipeline::create_and_depth_texture(&device, physical_size);
        let depth_stencil_view = depth_stencil_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let texture_manager = TextureManager::new(device.clone(), queue.clone(), texture_bind_group_layout.clone());

        let msaa_sample_count = options.msaa_sample_count.max(1);
        let interlock_mode = select_interlock_mode(Self::DEFAULT_PLS_CAPABILITIES, options.preferred_interlock_mode);

        let texture_pipeline = Arc::new(texture_pipeline);
        let texture_pipeline_always = Arc::new(texture_pipeline_always);
        let mut image_blend_pipelines = ahash::HashMap::default();
        image_blend_pipelines
            .insert(crate::paint::BlendMode::SrcOver, (texture_pipeline.clone(), texture_pipeline_always.clone()));

        Self {
            instance,
            surface,
            device,
            queue,
            config,
            physical_size,
            scale_factor,
            options,

            texture_manager,
            pool_manager: PoolManager::new(),

            fill_bind_group,
            fill_pipeline: Arc::new(fill_pipeline),
            clip_bind_group,
            clip_pipeline: Arc::new(clip_pipeline),

            texture_bind_group_layout,
            texture_pipeline,
            texture_pipeline_always,
            image_blend_pipelines,

            draw_tree: easy_tree::Tree::new(),

            temp_vertices: Vec::new(),
            aggregated_vertex_buffer: None,
            aggregated_vertex_buffer_len: 0,

            temp_mesh_vertices: Vec::new(),
            temp_mesh_indices: Vec::new(),
            aggregated_mesh_vertex_buffer: None,
            aggregated_mesh_index_buffer: None,
            aggregated_mesh_index_buffer_len: 0,

            msaa_sample_count,
            msaa_color_texture_view: None,
            depth_stencil_texture: Some(depth_stencil_texture),
            depth_stencil_view: Some(depth_stencil_view),

            interlock_mode,
            frame_active: false,
            pending_clear_color: None,
            pending_load_action: crate::frame::LoadAction::default(),
            pending_present: None,
            metrics: FrameMetrics::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::select_alpha_mode;
    use wgpu::CompositeAlphaMode;

    #[test]
    fn picks_premultiplied_when_transparent_and_supported() {
        let supported = [CompositeAlphaMode::Opaque, CompositeAlphaMode::PreMultiplied];
        assert_eq!(select_alpha_mode(true, &supported), CompositeAlphaMode::PreMultiplied);
    }

    #[test]
    fn falls_back_to_opaque_when_not_transparent() {
        let supported = [CompositeAlphaMode::Opaque, CompositeAlphaMode::PreMultiplied];
        assert_eq!(select_alpha_mode(false, &supported), CompositeAlphaMode::Opaque);
    }

    #[test]
    fn falls_back_to_opaque_when_transparency_unsupported() {
        let supported = [CompositeAlphaMode::Opaque];
        assert_eq!(select_alpha_mode(true, &supported), CompositeAlphaMode::Opaque);
    }
}
