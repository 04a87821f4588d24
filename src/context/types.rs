//! Draw-tree node payloads and small pure helpers shared across the context
//! submodules.

use crate::geometry::Mat2D;
use crate::paint::RenderPaint;
use crate::render_image::ImageDrawData;
use crate::BlendMode;

#[derive(Debug)]
pub(super) enum DrawCommand {
    Path(PathDrawData),
    Image(ImageDrawData),
    ImageMesh(ImageMeshDrawData),
}

impl DrawCommand {
    pub(super) fn clear_frame_state(&mut self) {
        match self {
            DrawCommand::Path(p) => {
                p.fill_range = None;
                p.stroke_range = None;
            }
            DrawCommand::Image(_) => {}
            DrawCommand::ImageMesh(m) => {
                m.vertex_offset = None;
                m.index_range = None;
            }
        }
    }
}

/// A recorded `drawPath` call: the fill/stroke meshes are computed eagerly
/// (local-space, fill mesh cache-keyed on `path_id`) since `RenderPath` is
/// only borrowed for the duration of the call and won't be
/// around anymore by the time `prepare_render` walks the draw tree.
///
/// `fill_mesh`/`stroke_mesh` are flat, non-shared triangle lists (as
/// produced by [`crate::triangulate::triangulate_fill`] and
/// [`crate::stroke::StrokeStrip`]), so once copied into the context's
/// aggregated vertex buffer they are drawn with a plain (non-indexed)
/// `draw()` call. `fill_range`/`stroke_range` are `(vertex_offset,
/// vertex_count)` into that buffer, filled in by `prepare_render`.
#[derive(Debug)]
pub(super) struct PathDrawData {
    pub(super) path_id: u64,
    pub(super) fill_mesh: Vec<crate::geometry::Vec2>,
    pub(super) stroke_mesh: Option<Vec<crate::geometry::Vec2>>,
    pub(super) paint: RenderPaint,
    pub(super) transform: Mat2D,
    pub(super) fill_range: Option<(usize, usize)>,
    pub(super) stroke_range: Option<(usize, usize)>,
}

/// A recorded `drawImageMesh` call. `vertices`/`uvs`/`indices` are a real
/// indexed mesh (vertices may be shared between triangles), so this draws
/// with `draw_indexed` against the context's aggregated textured-vertex and
/// index buffers. `vertex_offset` is the `base_vertex` and `index_range` is
/// `(index_offset, index_count)`, both filled in by `prepare_render`.
#[derive(Debug)]
pub(super) struct ImageMeshDrawData {
    pub(super) texture_id: u64,
    pub(super) vertices: Vec<crate::geometry::Vec2>,
    pub(super) uvs: Vec<crate::geometry::Vec2>,
    pub(super) indices: Vec<u16>,
    pub(super) transform: Mat2D,
    pub(super) blend_mode: BlendMode,
    pub(super) opacity: f32,
    pub(super) vertex_offset: Option<i32>,
    pub(super) index_range: Option<(usize, usize)>,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct BufferSizingDecision {
    pub(super) should_reallocate: bool,
}

/// Whether an existing GPU buffer is large enough to be reused, or must be
/// reallocated.
pub(super) fn decide_buffer_sizing(
    existing_size: Option<u64>,
    required_size: usize,
) -> BufferSizingDecision {
    let required_size = required_size as u64;
    let should_reallocate = existing_size.map(|size| size < required_size).unwrap_or(true);
    BufferSizingDecision { should_reallocate }
}

#[cfg(test)]
mod tests {
    use super::decide_buffer_sizing;

    #[test]
    fn reallocates_when_missing() {
        assert!(decide_buffer_sizing(None, 128).should_reallocate);
    }

    #[test]
    fn reallocates_when_too_small() {
        assert!(decide_buffer_sizing(Some(64), 128).should_reallocate);
    }

    #[test]
    fn keeps_buffer_when_large_enough() {
        assert!(!decide_buffer_sizing(Some(512), 128).should_reallocate);
    }
}
