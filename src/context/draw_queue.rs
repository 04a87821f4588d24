//! Recording methods invoked by [`crate::renderer_api::RiveRenderer`]
//!: turns `drawPath`/`drawImage`/`drawImageMesh`/`clipPath`
//! calls into draw-tree nodes.
//!
//! Fill (and, when the paint strokes, stroke) meshes are triangulated
//! eagerly here rather than lazily during `prepare_render`, since
//! `RenderPath` is only borrowed for the duration of the call;
//! by the time a later pass would want to walk the tree, the caller's path
//! may already be reused or dropped.

use super::types::{DrawCommand, ImageMeshDrawData, PathDrawData};
use super::RenderContext;
use crate::contour::{SegmentedContour, DEFAULT_TOLERANCE};
use crate::geometry::{Aabb, Mat2D, Vec2};
use crate::paint::{PaintStyle, RenderPaint};
use crate::render_image::{ImageDrawData, RenderImage};
use crate::render_path::RenderPath;
use crate::stroke::{Stroke, StrokeStrip};
use crate::triangulate::triangulate_fill;
use crate::BlendMode;

impl<'a> RenderContext<'a> {
    /// Uploads `image`'s pixels into the texture manager the first time it's
    /// drawn; later draws of the same image reuse the already-loaded texture
    ///.
    fn ensure_image_texture(&self, image: &RenderImage) {
        if !self.texture_manager.is_texture_loaded(image.id()) {
            self.texture_manager.allocate_texture_with_data(image.id(), (image.width(), image.height()), image.pixels());
        }
    }

    fn triangulate_fill_cached(&mut self, path: &RenderPath) -> Vec<Vec2> {
        if let Some(cached) = self.pool_manager.tessellation_cache.get(path.id()) {
            return cached.clone();
        }
        let mut contour = SegmentedContour::default();
        contour.build(path.raw(), DEFAULT_TOLERANCE, &Mat2D::IDENTITY);
        let rings: Vec<&[Vec2]> = contour.rings().collect();
        let mesh = triangulate_fill(&rings, path.fill_rule()).unwrap_or_default();
        self.pool_manager.tessellation_cache.insert(path.id(), mesh.clone());
        mesh
    }

    fn build_stroke_mesh(&self, path: &RenderPath, paint: &RenderPaint) -> Option<Vec<Vec2>> {
        if paint.style != PaintStyle::Stroke {
            return None;
        }
        let stroke = Stroke::new(paint.thickness, paint.color).with_join(paint.join).with_cap(paint.cap);
        if stroke.is_empty() {
            return None;
        }
        let mut contour = SegmentedContour::default();
        contour.build(path.raw(), DEFAULT_TOLERANCE, &Mat2D::IDENTITY);
        let mut strip = StrokeStrip::default();
        strip.build(&contour, &stroke);
        Some(strip.triangles().to_vec())
    }

    /// Records `path` as the clip for descendants added with this node as
    /// their `clip_node`, returning its draw-tree node id.
    pub fn push_clip_path(&mut self, path: &RenderPath, transform: Mat2D, parent_clip: Option<usize>) -> usize {
        let fill_mesh = self.triangulate_fill_cached(path);
        let data = PathDrawData {
            path_id: path.id(),
            fill_mesh,
            stroke_mesh: None,
            paint: RenderPaint::fill(crate::Color::TRANSPARENT),
            transform,
            fill_range: None,
            stroke_range: None,
        };
        match parent_clip {
            Some(parent) => self.draw_tree.add_child(parent, DrawCommand::Path(data)),
            None => self.draw_tree.add_node(DrawCommand::Path(data)),
        }
    }

    pub fn add_path_draw(&mut self, path: &RenderPath, paint: &RenderPaint, transform: Mat2D, clip_node: Option<usize>) {
        if !paint.is_visible() {
            return;
        }
        let fill_mesh = if paint.style == PaintStyle::Fill { self.triangulate_fill_cached(path) } else { Vec::new() };
        let stroke_mesh = self.build_stroke_mesh(path, paint);
        let data = PathDrawData {
            path_id: path.id(),
            fill_mesh,
            stroke_mesh,
            paint: paint.clone(),
            transform,
            fill_range: None,
            stroke_range: None,
        };
        self.insert_node(DrawCommand::Path(data), clip_node);
    }

    /// Records a `drawImage` call. The image's local rect is mapped through
    /// `transform` into an axis-aligned bound; non-axis-aligned transforms
    /// (rotation/shear) are approximated by their bounding box, since the
    /// underlying textured-quad pipeline (`texture_manager.rs`) only draws
    /// rectangles. Arbitrarily transformed quads need `draw_image_mesh`.
    pub fn add_image_draw(
        &mut self,
        image: &RenderImage,
        transform: Mat2D,
        blend_mode: BlendMode,
        opacity: f32,
        clip_node: Option<usize>,
    ) {
        self.ensure_image_texture(image);
        let local_rect = Aabb::new(Vec2::ZERO, Vec2::new(image.width() as f32, image.height() as f32));
        let mapped = transform.map_aabb(&local_rect);
        let data = ImageDrawData::new(
            image.id(),
            [(mapped.min.x, mapped.min.y), (mapped.max.x, mapped.max.y)],
            blend_mode,
            opacity,
            clip_node,
        );
        self.insert_node(DrawCommand::Image(data), clip_node);
    }

    pub fn add_image_mesh_draw(
        &mut self,
        image: &RenderImage,
        vertices: &[Vec2],
        uvs: &[Vec2],
        indices: &[u16],
        transform: Mat2D,
        blend_mode: BlendMode,
        opacity: f32,
        clip_node: Option<usize>,
    ) {
        self.ensure_image_texture(image);
        let data = ImageMeshDrawData {
            texture_id: image.id(),
            vertices: vertices.to_vec(),
            uvs: uvs.to_vec(),
            indices: indices.to_vec(),
            transform,
            blend_mode,
            opacity,
            vertex_offset: None,
            index_range: None,
        };
        self.insert_node(DrawCommand::ImageMesh(data), clip_node);
    }

    fn insert_node(&mut self, command: DrawCommand, clip_node: Option<usize>) -> usize {
        match clip_node {
            Some(parent) => self.draw_tree.add_child(parent, command),
            None => self.draw_tree.add_node(command),
        }
    }

    /// Discards every recorded draw, keeping the context's GPU resources
    ///.
    pub fn clear_draw_queue(&mut self) {
        self.draw_tree = easy_tree::Tree::new();
    }
}
