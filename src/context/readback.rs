//! Render-target pixel readback: copies the post-resolve
//! color texture into host memory and returns straight RGBA8 bytes.
//!
//! This backend's only non-RGBA color format is a BGRA swapchain, which is
//! cheaper to swizzle on the CPU while unpadding rows than to dispatch a
//! compute shader for.

use super::RenderContext;
use crate::error::{RenderError, Result};
use crate::render_target::RenderTarget;
use std::sync::mpsc;

fn unpad_rows(padded: &[u8], width: u32, height: u32, padded_bytes_per_row: u32) -> Vec<u8> {
    let row_bytes = (width * 4) as usize;
    let mut out = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * padded_bytes_per_row as usize;
        out.extend_from_slice(&padded[start..start + row_bytes]);
    }
    out
}

fn bgra_to_rgba_inplace(pixels: &mut [u8]) {
    for texel in pixels.chunks_exact_mut(4) {
        texel.swap(0, 2);
    }
}

/// Converts premultiplied-alpha RGBA8 (the convention every color attachment
/// in this backend is rendered in) to straight alpha in place.
fn unpremultiply_rgba8_inplace(pixels: &mut [u8]) {
    for texel in pixels.chunks_exact_mut(4) {
        let a = texel[3];
        if a == 0 || a == 255 {
            continue;
        }
        for channel in &mut texel[..3] {
            *channel = ((*channel as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8;
        }
    }
}

impl<'a> RenderContext<'a> {
    /// Reads `target`'s current color attachment back to the CPU as
    /// straight-alpha RGBA8, row-major, top-to-bottom. The attachment itself
    /// holds premultiplied alpha, so the copied bytes are un-premultiplied
    /// before returning.
    pub(super) fn read_back_target(&mut self, target: &RenderTarget) -> Result<Vec<u8>> {
        let width = target.width;
        let height = target.height;
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidTargetDimensions { width, height });
        }

        let unpadded_bytes_per_row = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;
        let buffer_size = (padded_bytes_per_row * height) as wgpu::BufferAddress;

        let readback_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("rive-render-context-readback"),
            size: buffer_size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("rive-render-context-readback") });
        encoder.copy_texture_to_buffer(
            target.color_texture().as_image_copy(),
            wgpu::TexelCopyBufferInfo {
                buffer: &readback_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let (tx, rx) = mpsc::channel();
        let slice = readback_buffer.slice(..);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        self.device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| RenderError::BackendError(e.to_string()))?;

        rx.recv()
            .map_err(|_| RenderError::BackendError("readback map callback never fired".into()))?
            .map_err(|e| RenderError::BackendError(e.to_string()))?;

        let mut pixels = {
            let mapped = slice.get_mapped_range();
            unpad_rows(&mapped, width, height, padded_bytes_per_row)
        };
        readback_buffer.unmap();

        let format = target.format();
        if format == wgpu::TextureFormat::Bgra8UnormSrgb || format == wgpu::TextureFormat::Bgra8Unorm {
            bgra_to_rgba_inplace(&mut pixels);
        }
        unpremultiply_rgba8_inplace(&mut pixels);

        Ok(pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpad_rows_strips_row_padding() {
        let padded = [1, 2, 3, 4, 0, 0, 0, 0, 5, 6, 7, 8, 0, 0, 0, 0];
        let out = unpad_rows(&padded, 1, 2, 8);
        assert_eq!(out, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn bgra_to_rgba_inplace_swaps_red_and_blue() {
        let mut pixels = [10, 20, 30, 40];
        bgra_to_rgba_inplace(&mut pixels);
        assert_eq!(pixels, [30, 20, 10, 40]);
    }

    #[test]
    fn unpremultiply_recovers_straight_alpha() {
        // 50% opaque red, premultiplied: (128, 0, 0, 128) -> roughly (255, 0, 0, 128).
        let mut pixels = [128, 0, 0, 128];
        unpremultiply_rgba8_inplace(&mut pixels);
        assert_eq!(pixels, [255, 0, 0, 128]);
    }

    #[test]
    fn unpremultiply_leaves_opaque_and_transparent_pixels_unchanged() {
        let mut pixels = [10, 20, 30, 255, 1, 2, 3, 0];
        unpremultiply_rgba8_inplace(&mut pixels);
        assert_eq!(pixels, [10, 20, 30, 255, 1, 2, 3, 0]);
    }
}
