//! GPU vertex layouts shared by the fill, stroke, and image pipelines.

use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

/// One triangulated or extruded fill/stroke vertex: clip-space-independent
/// position plus a premultiplied-alpha color and a depth/stencil reference
/// used to order overlapping draws.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CustomVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
    pub depth: f32,
}

impl CustomVertex {
    const ATTRIBS: [VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4, 2 => Float32];

    pub fn desc() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<CustomVertex>() as wgpu::BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// A textured quad corner: position, UV coordinate, and the draw's opacity
/// (baked in per-vertex rather than as a uniform, since both `drawImage`'s
/// quad and `drawImageMesh`'s arbitrary mesh share this vertex layout), used
/// by the image pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
    pub opacity: f32,
}

impl TexturedVertex {
    const ATTRIBS: [VertexAttribute; 3] = wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32];

    pub fn desc() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<TexturedVertex>() as wgpu::BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}
