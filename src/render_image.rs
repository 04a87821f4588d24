//! `RenderImage`: width, height, an optional uv-transform, and backend-opaque
//! pixel data, plus the draw-side quad/bind-group bookkeeping the context
//! attaches to an image draw. Image placement rects are plain
//! [`crate::geometry::Aabb`] values.

use crate::geometry::{Aabb, Mat2D};
use crate::texture_manager::TextureManager;
use crate::util::PoolManager;
use crate::BlendMode;
use std::sync::atomic::{AtomicU64, Ordering};
use wgpu::{BindGroup, BufferSlice};

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// A decoded bitmap plus an optional uv-transform, handed to the context via
/// its factory methods. Pixel decoding is out of scope: callers
/// supply already-decoded RGBA8 premultiplied bytes.
#[derive(Debug, Clone)]
pub struct RenderImage {
    id: u64,
    width: u32,
    height: u32,
    uv_transform: Option<Mat2D>,
    pixels: std::sync::Arc<[u8]>,
}

impl RenderImage {
    pub fn new(width: u32, height: u32, pixels: impl Into<std::sync::Arc<[u8]>>) -> Self {
        Self {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            uv_transform: None,
            pixels: pixels.into(),
        }
    }

    pub fn with_uv_transform(mut self, transform: Mat2D) -> Self {
        self.uv_transform = Some(transform);
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn uv_transform(&self) -> Option<&Mat2D> {
        self.uv_transform.as_ref()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Per-draw GPU resources for a `drawImage` call: a textured quad, its
/// sampler bind group, and the logical screen-space rect it covers.
pub(crate) struct ImageDrawData {
    pub(crate) texture_id: u64,
    pub(crate) logical_rect: Aabb,
    pub(crate) clip_to_shape: Option<usize>,
    pub(crate) blend_mode: BlendMode,
    pub(crate) opacity: f32,
    pub(crate) bind_group: Option<BindGroup>,
    pub(crate) vertex_buffer: Option<wgpu::Buffer>,
    pub(crate) index_buffer: Option<wgpu::Buffer>,
    pub(crate) num_indices: Option<u32>,
}

impl ImageDrawData {
    pub fn new(
        texture_id: u64,
        rect: [(f32, f32); 2],
        blend_mode: BlendMode,
        opacity: f32,
        clip_to_shape: Option<usize>,
    ) -> Self {
        Self {
            texture_id,
            logical_rect: Aabb::new(rect[0].into(), rect[1].into()),
            clip_to_shape,
            blend_mode,
            opacity,
            bind_group: None,
            vertex_buffer: None,
            index_buffer: None,
            num_indices: None,
        }
    }

    pub(crate) fn prepare(
        &mut self,
        texture_manager: &TextureManager,
        canvas_physical_size: (u32, u32),
        scale_factor: f32,
        buffers_pool: &mut PoolManager,
    ) {
        let (vertex_buffer, index_buffer, bind_group) = texture_manager
            .create_everything_to_render_texture(
                self.texture_id,
                canvas_physical_size,
                &self.logical_rect,
                scale_factor,
                self.opacity,
                buffers_pool,
            )
            .unwrap();

        self.bind_group = Some(bind_group);
        self.vertex_buffer = Some(vertex_buffer);
        self.index_buffer = Some(index_buffer);
        self.num_indices = Some(6);
    }

    pub fn return_buffers_to_pool(&mut self, buffers_pool: &mut PoolManager) {
        if let Some(vertex_buffer) = self.vertex_buffer.take() {
            buffers_pool.image_buffers_pool.return_vertex_buffer(vertex_buffer);
        }

        if let Some(index_buffer) = self.index_buffer.take() {
            buffers_pool.image_buffers_pool.return_index_buffer(index_buffer);
        }
    }

    pub(crate) fn vertex_buffer(&self) -> BufferSlice<'_> {
        self.vertex_buffer.as_ref().expect("image buffers to be prepared").slice(..)
    }

    pub(crate) fn index_buffer(&self) -> BufferSlice<'_> {
        self.index_buffer.as_ref().expect("image buffers to be prepared").slice(..)
    }

    pub(crate) fn bind_group(&self) -> &BindGroup {
        self.bind_group.as_ref().expect("image buffers to be prepared")
    }

    pub(crate) fn num_indices(&self) -> u32 {
        self.num_indices.expect("image buffers to be prepared")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_images_have_distinct_ids() {
        let a = RenderImage::new(4, 4, vec![0u8; 64]);
        let b = RenderImage::new(4, 4, vec![0u8; 64]);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn uv_transform_defaults_to_none() {
        let img = RenderImage::new(2, 2, vec![0u8; 16]);
        assert!(img.uv_transform().is_none());
    }
}
