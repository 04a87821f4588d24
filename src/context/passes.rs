//! The fixed draw-pass sequence emitted against a prepared frame: one stencil-incrementing draw per draw-tree node on
//! traversal entry, its matching decrementing draw on exit, nesting clips
//! correctly via the pipeline pair built in `construction.rs`.
//!
//! Pixel-local-storage plane selection happens once per
//! frame via [`crate::pls::PlaneLayout`]; since this backend's pipelines
//! only ever target a single color attachment (see DESIGN.md), the plane
//! layout currently only gates whether a resolve step runs afterward.

use super::preparation::PreparedFrame;
use super::traversal::TraversalEvent;
use super::types::DrawCommand;
use super::RenderContext;
use crate::frame::LoadAction;
use crate::render_target::RenderTarget;
use std::sync::Arc;

fn to_wgpu_color(color: crate::Color) -> wgpu::Color {
    let [r, g, b, a] = color.normalize();
    wgpu::Color { r: r as f64, g: g as f64, b: b as f64, a: a as f64 }
}

fn to_wgpu_load_op(load_action: LoadAction, clear_color: wgpu::Color) -> wgpu::LoadOp<wgpu::Color> {
    match load_action {
        LoadAction::Clear => wgpu::LoadOp::Clear(clear_color),
        LoadAction::PreserveRenderTarget | LoadAction::DontCare => wgpu::LoadOp::Load,
    }
}

impl<'a> RenderContext<'a> {
    pub(super) fn run_passes(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        target: &RenderTarget,
        prepared: &PreparedFrame,
    ) {
        let clear_color = self.pending_clear_color.take().map(to_wgpu_color).unwrap_or(wgpu::Color::TRANSPARENT);
        let load_op = to_wgpu_load_op(self.pending_load_action, clear_color);

        self.resolve_image_blend_pipelines();
        let mesh_bind_groups = self.resolve_image_mesh_bind_groups();

        let depth_view = match &self.depth_stencil_view {
            Some(view) => view,
            None => return,
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("rive-render-context-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.draw_view(),
                resolve_target: target.resolve_target(),
                ops: wgpu::Operations { load: load_op, store: wgpu::StoreOp::Store },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }),
                stencil_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(0), store: wgpu::StoreOp::Store }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        for event in &prepared.events {
            match *event {
                TraversalEvent::Pre(node_id) => {
                    let reference = *prepared.parent_stencils.get(&node_id).unwrap_or(&0);
                    self.draw_node(&mut pass, node_id, reference, &mesh_bind_groups);
                }
                TraversalEvent::Post(node_id) => {
                    let reference = *prepared.stencil_refs.get(&node_id).unwrap_or(&0);
                    self.draw_node_decrement(&mut pass, node_id, reference);
                }
            }
        }
    }

    /// Lazily builds the pipeline pair for any [`crate::paint::BlendMode`]
    /// used by a recorded `drawImage`/`drawImageMesh` call that isn't already
    /// in `image_blend_pipelines` (`SrcOver` is seeded at construction).
    fn resolve_image_blend_pipelines(&mut self) {
        let mut needed = Vec::new();
        for (_node_id, command) in self.draw_tree.iter_mut() {
            let blend_mode = match command {
                DrawCommand::Image(data) => data.blend_mode,
                DrawCommand::ImageMesh(mesh) => mesh.blend_mode,
                DrawCommand::Path(_) => continue,
            };
            if !self.image_blend_pipelines.contains_key(&blend_mode) && !needed.contains(&blend_mode) {
                needed.push(blend_mode);
            }
        }
        for blend_mode in needed {
            let (render_pipeline, always_render_pipeline) = crate::pipeline::create_texture_pipeline_with_blend(
                &self.device,
                &self.config,
                &self.texture_bind_group_layout,
                crate::pipeline::blend_state_for(blend_mode),
            );
            self.image_blend_pipelines.insert(blend_mode, (Arc::new(render_pipeline), Arc::new(always_render_pipeline)));
        }
    }

    /// Resolves (and lazily creates) the texture bind group each recorded
    /// `drawImageMesh` call needs, before the render pass opens — the bind
    /// groups must outlive the pass itself, so they're collected up front
    /// rather than fetched node-by-node while `pass` is borrowed.
    fn resolve_image_mesh_bind_groups(&mut self) -> ahash::HashMap<usize, Arc<wgpu::BindGroup>> {
        let mut groups = ahash::HashMap::default();
        for (node_id, command) in self.draw_tree.iter_mut() {
            if let DrawCommand::ImageMesh(mesh) = command {
                if let Ok(bind_group) =
                    self.texture_manager.get_or_create_shape_bind_group(&self.texture_bind_group_layout, 0, mesh.texture_id)
                {
                    groups.insert(node_id, bind_group);
                }
            }
        }
        groups
    }

    fn draw_node(
        &self,
        pass: &mut wgpu::RenderPass,
        node_id: usize,
        reference: u32,
        mesh_bind_groups: &ahash::HashMap<usize, Arc<wgpu::BindGroup>>,
    ) {
        let Some(command) = self.draw_tree.get(node_id) else { return };
        match command {
            DrawCommand::Path(data) => {
                let Some(vertex_buffer) = self.aggregated_vertex_buffer.as_ref() else { return };
                pass.set_pipeline(&self.fill_pipeline);
                pass.set_bind_group(0, &self.fill_bind_group, &[]);
                pass.set_stencil_reference(reference);
                pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                if let Some((start, count)) = data.fill_range {
                    pass.draw(start as u32..(start + count) as u32, 0..1);
                }
                if let Some((start, count)) = data.stroke_range {
                    pass.draw(start as u32..(start + count) as u32, 0..1);
                }
            }
            DrawCommand::Image(data) => {
                let pipeline = self
                    .image_blend_pipelines
                    .get(&data.blend_mode)
                    .map(|(stencil_tested, _)| stencil_tested.as_ref())
                    .unwrap_or(&self.texture_pipeline);
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, data.bind_group(), &[]);
                pass.set_stencil_reference(reference);
                pass.set_vertex_buffer(0, data.vertex_buffer());
                pass.set_index_buffer(data.index_buffer(), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..data.num_indices(), 0, 0..1);
            }
            DrawCommand::ImageMesh(mesh) => {
                let (Some(vertex_buffer), Some(index_buffer)) =
                    (self.aggregated_mesh_vertex_buffer.as_ref(), self.aggregated_mesh_index_buffer.as_ref())
                else {
                    return;
                };
                let (Some((index_start, index_count)), Some(base_vertex)) = (mesh.index_range, mesh.vertex_offset)
                else {
                    return;
                };
                let Some(bind_group) = mesh_bind_groups.get(&node_id) else { return };
                let pipeline = self
                    .image_blend_pipelines
                    .get(&mesh.blend_mode)
                    .map(|(_, always_pass)| always_pass.as_ref())
                    .unwrap_or(&self.texture_pipeline_always);
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, bind_group.as_ref(), &[]);
                pass.set_stencil_reference(reference);
                pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(index_start as u32..(index_start + index_count) as u32, base_vertex, 0..1);
            }
        }
    }

    fn draw_node_decrement(&self, pass: &mut wgpu::RenderPass, node_id: usize, reference: u32) {
        let Some(command) = self.draw_tree.get(node_id) else { return };
        let DrawCommand::Path(data) = command else {
            // Only clip paths leave a lasting stencil increment to unwind;
            // image/image-mesh draws don't nest further clips beneath them
            // in this backend, so they have no matching decrement.
            return;
        };
        let Some(vertex_buffer) = self.aggregated_vertex_buffer.as_ref() else { return };
        pass.set_pipeline(&self.clip_pipeline);
        pass.set_bind_group(0, &self.clip_bind_group, &[]);
        pass.set_stencil_reference(reference);
        pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        if let Some((start, count)) = data.fill_range {
            pass.draw(start as u32..(start + count) as u32, 0..1);
        }
    }
}
