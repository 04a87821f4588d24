//! The scene-graph-facing `Renderer` contract: `save`/`restore`/
//! `transform`/`clipPath`/`drawPath`/`drawImage`/`drawImageMesh`.
//!
//! An explicit save/restore/clip stack the scene-graph caller drives one
//! call at a time, recording each draw against a borrowed path or image
//! rather than retaining it.

use crate::context::RenderContext;
use crate::geometry::Mat2D;
use crate::paint::RenderPaint;
use crate::render_image::RenderImage;
use crate::render_path::RenderPath;
use crate::BlendMode;

#[derive(Clone, Copy)]
struct SaveState {
    transform: Mat2D,
    clip_node: Option<usize>,
}

/// A stateful command recorder sitting on top of [`RenderContext`]: the
/// scene-graph caller drives it one call at a time, and it turns `drawPath`/
/// `drawImage` calls into draw-tree nodes carrying the current transform and
/// clip.
pub struct RiveRenderer<'ctx, 'a> {
    context: &'ctx mut RenderContext<'a>,
    current: SaveState,
    stack: Vec<SaveState>,
}

impl<'ctx, 'a> RiveRenderer<'ctx, 'a> {
    pub fn new(context: &'ctx mut RenderContext<'a>) -> Self {
        Self {
            context,
            current: SaveState { transform: Mat2D::IDENTITY, clip_node: None },
            stack: Vec::new(),
        }
    }

    /// Pushes the current transform/clip state.
    pub fn save(&mut self) {
        self.stack.push(self.current);
    }

    /// Pops back to the most recently saved transform/clip state. A no-op if
    /// the stack is empty, since a mismatched `restore` should never panic.
    pub fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.current = state;
        }
    }

    /// Left-multiplies the current transform by `matrix`.
    pub fn transform(&mut self, matrix: Mat2D) {
        self.current.transform = self.current.transform.mul(&matrix);
    }

    /// Establishes `path` as the clip for all subsequent draws until the
    /// matching `restore`. Returns the draw-tree node id of the clip shape,
    /// which becomes the parent of every following draw in this save scope.
    pub fn clip_path(&mut self, path: &RenderPath) {
        let node = self.context.push_clip_path(path, self.current.transform, self.current.clip_node);
        self.current.clip_node = Some(node);
    }

    pub fn draw_path(&mut self, path: &RenderPath, paint: &RenderPaint) {
        self.context.add_path_draw(path, paint, self.current.transform, self.current.clip_node);
    }

    pub fn draw_image(&mut self, image: &RenderImage, blend_mode: BlendMode, opacity: f32) {
        self.context.add_image_draw(image, self.current.transform, blend_mode, opacity, self.current.clip_node);
    }

    /// Draws a textured mesh: deforms `image` over an arbitrary
    /// triangle mesh rather than an axis-aligned quad. Vertices and uvs are
    /// parallel arrays of length `vertex_count`; `indices` has `index_count`
    /// entries, grouped in triangles.
    pub fn draw_image_mesh(
        &mut self,
        image: &RenderImage,
        vertices: &[crate::geometry::Vec2],
        uvs: &[crate::geometry::Vec2],
        indices: &[u16],
        blend_mode: BlendMode,
        opacity: f32,
    ) {
        self.context.add_image_mesh_draw(
            image,
            vertices,
            uvs,
            indices,
            self.current.transform,
            blend_mode,
            opacity,
            self.current.clip_node,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_restore_without_matching_save_is_a_noop() {
        // A RenderContext requires a GPU device to construct, so this only
        // exercises the stack bookkeeping in isolation.
        let mut stack: Vec<SaveState> = Vec::new();
        let mut current = SaveState { transform: Mat2D::IDENTITY, clip_node: None };
        if let Some(state) = stack.pop() {
            current = state;
        }
        assert_eq!(current.transform, Mat2D::IDENTITY);
    }
}
