use crate::cache::Cache;
use crate::geometry::{Aabb, Vec2};
use std::collections::HashMap;
use wgpu::util::DeviceExt;
use wgpu::{Buffer, BufferUsages};

pub fn normalize_rgba_color(color: &[u8; 4]) -> [f32; 4] {
    [
        color[0] as f32 / 255.0,
        color[1] as f32 / 255.0,
        color[2] as f32 / 255.0,
        color[3] as f32 / 255.0,
    ]
}

#[inline(always)]
pub fn normalize_rect(logical_rect: &Aabb, canvas_physical_size: (u32, u32), scale_factor: f32) -> Aabb {
    let ndc_min_x = 2.0 * logical_rect.min.x * scale_factor / canvas_physical_size.0 as f32 - 1.0;
    let ndc_min_y = 1.0 - 2.0 * logical_rect.min.y * scale_factor / canvas_physical_size.1 as f32;
    let ndc_max_x = 2.0 * logical_rect.max.x * scale_factor / canvas_physical_size.0 as f32 - 1.0;
    let ndc_max_y = 1.0 - 2.0 * logical_rect.max.y * scale_factor / canvas_physical_size.1 as f32;

    Aabb::new(Vec2::new(ndc_min_x, ndc_min_y), Vec2::new(ndc_max_x, ndc_max_y))
}

pub(crate) struct BufferPool {
    buffer_usages: BufferUsages,
    buffers: HashMap<usize, Vec<Buffer>>,
}

impl BufferPool {
    pub(crate) fn new(buffer_usages: BufferUsages) -> Self {
        Self { buffers: HashMap::new(), buffer_usages }
    }

    pub(crate) fn get_buffer(&mut self, device: &wgpu::Device, size: usize) -> Buffer {
        if let Some(cache) = self.buffers.get_mut(&size) {
            if let Some(buffer) = cache.pop() {
                return buffer;
            }
        } else {
            self.buffers.insert(size, Vec::new());
        }
        device.create_buffer(&wgpu::BufferDescriptor {
            label: None,
            size: size as u64,
            usage: self.buffer_usages,
            mapped_at_creation: false,
        })
    }

    pub(crate) fn return_buffer(&mut self, buffer: Buffer, capacity: usize) {
        self.buffers.entry(capacity).or_default().push(buffer);
    }
}

pub struct ImageBuffersPool {
    vertex_buffers: Vec<wgpu::Buffer>,
    index_buffers: Vec<wgpu::Buffer>,
}

impl Default for ImageBuffersPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuffersPool {
    pub fn new() -> Self {
        Self { vertex_buffers: Vec::new(), index_buffers: Vec::new() }
    }

    pub fn get_vertex_buffer(&mut self, device: &wgpu::Device) -> wgpu::Buffer {
        if let Some(buffer) = self.vertex_buffers.pop() {
            buffer
        } else {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: None,
                // An image quad is always 4 textured vertices, so the size never changes.
                size: 64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        }
    }

    pub fn get_index_buffer(&mut self, device: &wgpu::Device) -> wgpu::Buffer {
        if let Some(buffer) = self.index_buffers.pop() {
            buffer
        } else {
            let indices: &[u16] = &[0, 1, 2, 2, 3, 0];
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: None,
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        }
    }

    pub fn return_vertex_buffer(&mut self, buffer: wgpu::Buffer) {
        self.vertex_buffers.push(buffer);
    }

    pub fn return_index_buffer(&mut self, buffer: wgpu::Buffer) {
        self.index_buffers.push(buffer);
    }
}

/// Scratch GPU-buffer pools reused across frames. Vertex buffers come from
/// tessellation output produced by [`crate::triangulate`].
pub(crate) struct PoolManager {
    pub vertex_buffer_pool: BufferPool,
    pub index_buffer_pool: BufferPool,
    pub image_buffers_pool: ImageBuffersPool,
    pub tessellation_cache: Cache,
}

impl PoolManager {
    pub(crate) fn new() -> Self {
        Self {
            vertex_buffer_pool: BufferPool::new(BufferUsages::VERTEX | BufferUsages::COPY_DST),
            index_buffer_pool: BufferPool::new(wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST),
            image_buffers_pool: ImageBuffersPool::new(),
            tessellation_cache: Cache::new(),
        }
    }
}

#[inline(always)]
pub fn to_logical(physical_size: (u32, u32), scale_factor: f64) -> (f32, f32) {
    let (physical_width, physical_height) = physical_size;
    let logical_width = physical_width as f64 / scale_factor;
    let logical_height = physical_height as f64 / scale_factor;
    (logical_width as f32, logical_height as f32)
}
