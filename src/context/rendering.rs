//! Frame lifecycle entry points: `begin_frame` opens a frame
//! against a target, `flush` triangulates/uploads/submits every draw
//! recorded since then and closes it. Split into explicit begin/flush calls
//! so a caller can record draws across several `drawPath`/`drawImage`
//! invocations between them.

use super::RenderContext;
use crate::error::{RenderError, Result};
use crate::frame::{FlushDescriptor, FrameDescriptor};
use crate::render_target::RenderTarget;

impl<'a> RenderContext<'a> {
    /// Opens a new frame. Must be matched by exactly one [`Self::flush`]
    /// before the next `begin_frame` call.
    pub fn begin_frame(&mut self, desc: &FrameDescriptor) -> Result<()> {
        if self.frame_active {
            return Err(RenderError::FrameAlreadyActive);
        }
        self.frame_active = true;
        self.pending_clear_color = desc.clear_color;
        self.pending_load_action = desc.load_action;
        self.metrics.reset();
        Ok(())
    }

    /// Triangulates and uploads every draw recorded since `begin_frame`,
    /// submits the fixed pass sequence against `target`, and clears the
    /// draw queue for the next frame. Returns the read-back RGBA8 pixels
    /// when `desc.readback` is set.
    pub fn flush(&mut self, target: &RenderTarget, desc: FlushDescriptor) -> Result<Option<Vec<u8>>> {
        if !self.frame_active {
            return Err(RenderError::NoActiveFrame);
        }

        let prepared = self.prepare_render();

        let mut encoder =
            self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("rive-render-context") });

        self.run_passes(&mut encoder, target, &prepared);

        self.queue.submit(std::iter::once(encoder.finish()));

        let pixels = if desc.readback { Some(self.read_back_target(target)?) } else { None };

        self.frame_active = false;
        self.clear_draw_queue();
        Ok(pixels)
    }
}
