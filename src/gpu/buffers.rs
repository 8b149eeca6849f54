use wgpu::{Buffer, BufferUsages, Device, Queue, Texture, TextureView};

use crate::render::{FieldImage, Vertex};

/// Surface size in pixels, used to map layer coordinates to clip space
/// (16 bytes, aligned to 16)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewportUniform {
    pub size: [f32; 2],
    pub _padding: [f32; 2],
}

impl ViewportUniform {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: [width.max(1) as f32, height.max(1) as f32],
            _padding: [0.0; 2],
        }
    }
}

/// Vertex buffer for one layer's draw list. Grows to the next power of two
/// when a frame needs more room and never shrinks.
pub struct VertexStream {
    buffer: Buffer,
    capacity: usize,
    len: u32,
}

impl VertexStream {
    const MIN_CAPACITY: usize = 1024;

    pub fn new(device: &Device) -> Self {
        Self {
            buffer: Self::allocate(device, Self::MIN_CAPACITY),
            capacity: Self::MIN_CAPACITY,
            len: 0,
        }
    }

    fn allocate(device: &Device, capacity: usize) -> Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("layer-vertex-buffer"),
            size: (capacity * std::mem::size_of::<Vertex>()) as u64,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn upload(&mut self, device: &Device, queue: &Queue, vertices: &[Vertex]) {
        if vertices.len() > self.capacity {
            self.capacity = vertices.len().next_power_of_two();
            self.buffer = Self::allocate(device, self.capacity);
        }
        if !vertices.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(vertices));
        }
        self.len = vertices.len() as u32;
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn slice(&self) -> wgpu::BufferSlice<'_> {
        self.buffer
            .slice(..(self.len as u64 * std::mem::size_of::<Vertex>() as u64))
    }
}

/// RGBA texture holding a layer's blocked bitmap
pub struct FieldTexture {
    texture: Texture,
    pub view: TextureView,
    pub width: u32,
    pub height: u32,
}

impl FieldTexture {
    pub fn new(device: &Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("field-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    pub fn matches(&self, image: &FieldImage) -> bool {
        self.width == image.width && self.height == image.height
    }

    /// Caller guarantees `matches(image)`
    pub fn upload(&self, queue: &Queue, image: &FieldImage) {
        if image.width == 0 || image.height == 0 {
            return;
        }
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
        );
    }
}
