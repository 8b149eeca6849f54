use wgpu::{
    BindGroup, BindGroupLayout, Buffer, BufferUsages, Device, Queue, RenderPipeline, Sampler,
    TextureFormat, TextureView,
};

use super::buffers::{FieldTexture, VertexStream, ViewportUniform};
use crate::config::BACKGROUND_COLOR;
use crate::render::{LayerSurface, Vertex};

fn color_target(format: TextureFormat) -> [Option<wgpu::ColorTargetState>; 1] {
    [Some(wgpu::ColorTargetState {
        format,
        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
        write_mask: wgpu::ColorWrites::ALL,
    })]
}

fn triangle_list() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

/// Pipeline for draw-list triangles in pixel space
pub struct PrimitivePipeline {
    pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
}

impl PrimitivePipeline {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    pub fn new(device: &Device, format: TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("primitive-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/primitive.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("primitive-bind-group-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("primitive-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("primitive-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &Self::ATTRIBUTES,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &color_target(format),
                compilation_options: Default::default(),
            }),
            primitive: triangle_list(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
        }
    }

    pub fn create_bind_group(&self, device: &Device, viewport_buffer: &Buffer) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("primitive-bind-group"),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_buffer.as_entire_binding(),
            }],
        })
    }
}

/// Pipeline stretching a field bitmap over the surface with a fullscreen triangle
pub struct FieldPipeline {
    pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
    sampler: Sampler,
}

impl FieldPipeline {
    pub fn new(device: &Device, format: TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("field-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/field.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("field-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("field-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("field-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &color_target(format),
                compilation_options: Default::default(),
            }),
            primitive: triangle_list(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // Nearest keeps the blocked look of the bitmap
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("field-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            pipeline,
            bind_group_layout,
            sampler,
        }
    }

    pub fn create_bind_group(&self, device: &Device, view: &TextureView) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("field-bind-group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

/// GPU resources mirroring one layer surface
struct LayerSlot {
    vertices: VertexStream,
    field: Option<(FieldTexture, BindGroup)>,
}

/// Composites layer surfaces in paint order: each layer's bitmap, then its shapes
pub struct Compositor {
    primitive: PrimitivePipeline,
    field: FieldPipeline,
    viewport_buffer: Buffer,
    viewport_bind_group: BindGroup,
    slots: Vec<LayerSlot>,
}

impl Compositor {
    pub fn new(device: &Device, format: TextureFormat) -> Self {
        let primitive = PrimitivePipeline::new(device, format);
        let field = FieldPipeline::new(device, format);

        let viewport_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("viewport-uniform-buffer"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let viewport_bind_group = primitive.create_bind_group(device, &viewport_buffer);

        Self {
            primitive,
            field,
            viewport_buffer,
            viewport_bind_group,
            slots: Vec::new(),
        }
    }

    pub fn resize(&self, queue: &Queue, width: u32, height: u32) {
        let uniform = ViewportUniform::new(width, height);
        queue.write_buffer(&self.viewport_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    /// Upload the current surfaces. Slots beyond the surface count are released.
    pub fn prepare<'a>(
        &mut self,
        device: &Device,
        queue: &Queue,
        surfaces: impl Iterator<Item = &'a LayerSurface>,
    ) {
        let mut used = 0;
        for (index, surface) in surfaces.enumerate() {
            if index == self.slots.len() {
                self.slots.push(LayerSlot {
                    vertices: VertexStream::new(device),
                    field: None,
                });
            }
            let slot = &mut self.slots[index];
            slot.vertices.upload(device, queue, surface.shapes.vertices());

            match &surface.image {
                Some(image) if image.width > 0 && image.height > 0 => {
                    let stale = slot
                        .field
                        .as_ref()
                        .map_or(true, |(texture, _)| !texture.matches(image));
                    if stale {
                        let texture = FieldTexture::new(device, image.width, image.height);
                        let bind_group = self.field.create_bind_group(device, &texture.view);
                        slot.field = Some((texture, bind_group));
                    }
                    if let Some((texture, _)) = &slot.field {
                        texture.upload(queue, image);
                    }
                }
                _ => slot.field = None,
            }
            used = index + 1;
        }
        self.slots.truncate(used);
    }

    pub fn draw(&self, encoder: &mut wgpu::CommandEncoder, view: &TextureView) {
        let [r, g, b, a] = BACKGROUND_COLOR;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("backdrop-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        for slot in &self.slots {
            if let Some((_, bind_group)) = &slot.field {
                pass.set_pipeline(&self.field.pipeline);
                pass.set_bind_group(0, bind_group, &[]);
                pass.draw(0..3, 0..1);
            }
            if !slot.vertices.is_empty() {
                pass.set_pipeline(&self.primitive.pipeline);
                pass.set_bind_group(0, &self.viewport_bind_group, &[]);
                pass.set_vertex_buffer(0, slot.vertices.slice());
                pass.draw(0..slot.vertices.len(), 0..1);
            }
        }
    }
}
