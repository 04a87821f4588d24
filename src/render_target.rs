//! Render target abstraction: a swapchain surface or an offscreen texture,
//! with MSAA fallback when the backend lacks PLS support. Owned
//! independently of the render context so offscreen and swapchain targets
//! share one acquisition/readback path.

use crate::error::{RenderError, Result};

/// A lightweight, cloneable reference to a render target owned by a
/// [`crate::context::RenderContext`]. Opaque to callers; constructed only by
/// `RenderContext::create_offscreen_target` / `RenderContext::acquire_surface_target`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderTargetHandle(pub(crate) u32);

/// Backing storage for a render target: either a caller-owned swapchain
/// surface texture (immutable from our side — we never resize or recreate
/// it) or a texture we own outright for offscreen rendering.
pub(crate) enum RenderTargetStorage {
    /// Wraps a swapchain frame handed to us for exactly one frame. Keeps
    /// the underlying `Texture` (not just its view) so `readback.rs` can
    /// issue a `copy_texture_to_buffer` against it.
    Surface { texture: wgpu::Texture, view: wgpu::TextureView, format: wgpu::TextureFormat },
    /// An offscreen color texture we allocated and own, used when no
    /// surface is available or when the caller explicitly asks for
    /// headless rendering.
    Offscreen { texture: wgpu::Texture, view: wgpu::TextureView, format: wgpu::TextureFormat },
}

/// Opaque handle to a target the render context can draw into. See the
/// constructors on [`crate::context::RenderContext`].
pub struct RenderTarget {
    pub(crate) storage: RenderTargetStorage,
    pub(crate) width: u32,
    pub(crate) height: u32,
    /// Present when the backend's chosen interlock mode is MSAA rather than
    /// true PLS — the resolve step runs after the last color pass.
    pub(crate) msaa: Option<MsaaAttachment>,
}

pub(crate) struct MsaaAttachment {
    pub(crate) view: wgpu::TextureView,
    pub(crate) sample_count: u32,
}

impl RenderTarget {
    pub(crate) fn color_view(&self) -> &wgpu::TextureView {
        match &self.storage {
            RenderTargetStorage::Surface { view, .. } => view,
            RenderTargetStorage::Offscreen { view, .. } => view,
        }
    }

    pub(crate) fn color_texture(&self) -> &wgpu::Texture {
        match &self.storage {
            RenderTargetStorage::Surface { texture, .. } => texture,
            RenderTargetStorage::Offscreen { texture, .. } => texture,
        }
    }

    pub(crate) fn format(&self) -> wgpu::TextureFormat {
        match &self.storage {
            RenderTargetStorage::Surface { format, .. } => *format,
            RenderTargetStorage::Offscreen { format, .. } => *format,
        }
    }

    /// The attachment the color pass should actually draw into: the MSAA
    /// texture when present (resolved into `color_view` afterward), or
    /// `color_view` itself otherwise.
    pub(crate) fn draw_view(&self) -> &wgpu::TextureView {
        match &self.msaa {
            Some(msaa) => &msaa.view,
            None => self.color_view(),
        }
    }

    pub(crate) fn resolve_target(&self) -> Option<&wgpu::TextureView> {
        self.msaa.as_ref().map(|_| self.color_view())
    }
}

pub(crate) fn create_offscreen_color_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> Result<(wgpu::Texture, wgpu::TextureView)> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidTargetDimensions { width, height });
    }
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("rive-render-core-offscreen-color"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::COPY_SRC
            | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    Ok((texture, view))
}

pub(crate) fn create_msaa_color_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    sample_count: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("rive-render-core-msaa-color"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
