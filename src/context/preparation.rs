//! Builds this frame's aggregated GPU vertex/index buffers from the draw
//! tree, reusing the aggregated buffers across frames via a ring-buffer
//! upsert instead of reallocating.
//!
//! Per-draw transforms are applied to vertex positions here, on the CPU,
//! rather than uploaded as a second per-instance vertex buffer — this
//! avoids needing an additional instanced WGSL vertex attribute. See
//! DESIGN.md.

use super::traversal::{plan_traversal, TraversalEvent};
use super::types::{decide_buffer_sizing, DrawCommand};
use super::RenderContext;
use crate::geometry::{Mat2D, Vec2};
use crate::vertex::{CustomVertex, TexturedVertex};
use wgpu::util::DeviceExt;

pub(super) struct PreparedFrame {
    pub(super) events: Vec<TraversalEvent>,
    /// This node's own stencil value, used as the reference for its
    /// decrement draw (the region is currently at this value on entry to
    /// `Post`, and must fall back to `parent_stencils[node_id]`).
    pub(super) stencil_refs: ahash::HashMap<usize, u32>,
    /// The parent's stencil value, used as the reference for this node's
    /// increment draw (only the area still at the parent's value gets
    /// promoted to this node's value).
    pub(super) parent_stencils: ahash::HashMap<usize, u32>,
}

fn append_transformed(
    out: &mut Vec<CustomVertex>,
    mesh: &[Vec2],
    transform: &Mat2D,
    color: [f32; 4],
) {
    for &v in mesh {
        let p = transform.apply(v);
        out.push(CustomVertex { position: [p.x, p.y], color, depth: 0.0 });
    }
}

impl<'a> RenderContext<'a> {
    /// Rebuilds the aggregated vertex/index buffers from the current draw
    /// tree and returns the traversal plan `passes` needs to emit draw
    /// calls in the right stencil order.
    pub(super) fn prepare_render(&mut self) -> PreparedFrame {
        self.temp_vertices.clear();
        self.temp_mesh_vertices.clear();
        self.temp_mesh_indices.clear();

        let (events, stencil_refs, parent_stencils) = plan_traversal(&mut self.draw_tree, None);

        for (_node_id, command) in self.draw_tree.iter_mut() {
            match command {
                DrawCommand::Path(data) => {
                    let color = data.paint.color.normalize();

                    let fill_start = self.temp_vertices.len();
                    append_transformed(&mut self.temp_vertices, &data.fill_mesh, &data.transform, color);
                    let fill_count = self.temp_vertices.len() - fill_start;
                    data.fill_range = (fill_count > 0).then_some((fill_start, fill_count));

                    data.stroke_range = data.stroke_mesh.as_ref().and_then(|stroke_mesh| {
                        let stroke_start = self.temp_vertices.len();
                        append_transformed(&mut self.temp_vertices, stroke_mesh, &data.transform, color);
                        let stroke_count = self.temp_vertices.len() - stroke_start;
                        (stroke_count > 0).then_some((stroke_start, stroke_count))
                    });
                }
                DrawCommand::Image(data) => {
                    data.prepare(&self.texture_manager, self.physical_size, self.scale_factor as f32, &mut self.pool_manager);
                }
                DrawCommand::ImageMesh(mesh) => {
                    let vertex_offset = self.temp_mesh_vertices.len() as i32;
                    for (v, uv) in mesh.vertices.iter().zip(mesh.uvs.iter()) {
                        let p = mesh.transform.apply(*v);
                        self.temp_mesh_vertices.push(TexturedVertex {
                            position: [p.x, p.y],
                            tex_coords: [uv.x, uv.y],
                            opacity: mesh.opacity,
                        });
                    }
                    let index_start = self.temp_mesh_indices.len();
                    self.temp_mesh_indices.extend_from_slice(&mesh.indices);
                    mesh.vertex_offset = Some(vertex_offset);
                    mesh.index_range = Some((index_start, mesh.indices.len()));
                }
            }
        }

        self.upload_aggregated_buffers();

        PreparedFrame { events, stencil_refs, parent_stencils }
    }

    fn upload_aggregated_buffers(&mut self) {
        if self.temp_vertices.is_empty() {
            self.aggregated_vertex_buffer_len = 0;
        } else {
            let required = std::mem::size_of_val(self.temp_vertices.as_slice());
            let existing = self.aggregated_vertex_buffer.as_ref().map(|b| b.size());
            if decide_buffer_sizing(existing, required).should_reallocate {
                self.aggregated_vertex_buffer = Some(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("aggregated-fill-vertices"),
                    contents: bytemuck::cast_slice(&self.temp_vertices),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                }));
            } else if let Some(buffer) = &self.aggregated_vertex_buffer {
                self.queue.write_buffer(buffer, 0, bytemuck::cast_slice(&self.temp_vertices));
            }
            self.aggregated_vertex_buffer_len = self.temp_vertices.len();
        }

        if !self.temp_mesh_vertices.is_empty() {
            let required = std::mem::size_of_val(self.temp_mesh_vertices.as_slice());
            let existing = self.aggregated_mesh_vertex_buffer.as_ref().map(|b| b.size());
            if decide_buffer_sizing(existing, required).should_reallocate {
                self.aggregated_mesh_vertex_buffer =
                    Some(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("aggregated-mesh-vertices"),
                        contents: bytemuck::cast_slice(&self.temp_mesh_vertices),
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    }));
            } else if let Some(buffer) = &self.aggregated_mesh_vertex_buffer {
                self.queue.write_buffer(buffer, 0, bytemuck::cast_slice(&self.temp_mesh_vertices));
            }
        }

        if self.temp_mesh_indices.is_empty() {
            self.aggregated_mesh_index_buffer_len = 0;
        } else {
            let required = std::mem::size_of_val(self.temp_mesh_indices.as_slice());
            let existing = self.aggregated_mesh_index_buffer.as_ref().map(|b| b.size());
            if decide_buffer_sizing(existing, required).should_reallocate {
                self.aggregated_mesh_index_buffer =
                    Some(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("aggregated-mesh-indices"),
                        contents: bytemuck::cast_slice(&self.temp_mesh_indices),
                        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                    }));
            } else if let Some(buffer) = &self.aggregated_mesh_index_buffer {
                self.queue.write_buffer(buffer, 0, bytemuck::cast_slice(&self.temp_mesh_indices));
            }
            self.aggregated_mesh_index_buffer_len = self.temp_mesh_indices.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_transformed_applies_translation_and_color() {
        let mut out = Vec::new();
        let mesh = vec![Vec2::new(1.0, 2.0)];
        append_transformed(&mut out, &mesh, &Mat2D::from_translation(Vec2::new(10.0, 0.0)), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].position, [11.0, 2.0]);
        assert_eq!(out[0].color, [1.0, 0.0, 0.0, 1.0]);
    }
}
