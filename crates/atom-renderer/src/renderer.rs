//! Instanced filled-circle rendering.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Per-atom draw request: top-left corner of the bounding square, its side
/// length, and the fill color.
///
/// Layout matches the WGSL `AtomInstance` struct (32 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct AtomInstance {
    pub top_left: [f32; 2],
    pub diameter: f32,
    pub _padding: f32,
    /// Linear-space RGBA, premultiplied nowhere; alpha is 1 for a solid fill.
    pub color: [f32; 4],
}

impl AtomInstance {
    /// Build an instance from sRGB color components in [0, 1].
    ///
    /// The surface format is sRGB, so the shader works in linear space and
    /// the conversion happens once here on the CPU.
    pub fn new(top_left: [f32; 2], diameter: f32, srgb: [f32; 3]) -> Self {
        Self {
            top_left,
            diameter,
            _padding: 0.0,
            color: [
                srgb_to_linear(srgb[0]),
                srgb_to_linear(srgb[1]),
                srgb_to_linear(srgb[2]),
                1.0,
            ],
        }
    }
}

/// Canvas extents uniform (matches the WGSL `Viewport` struct, 16 bytes).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ViewportUniform {
    size: [f32; 2],
    _padding: [f32; 2],
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Renderer for a fixed-size scene of circles on a solid background.
///
/// The atom count is fixed for the run, so the instance buffer and bind
/// group are created once; only the instance contents are rewritten each
/// frame.
pub struct AtomRenderer {
    render_pipeline: wgpu::RenderPipeline,
    // Kept alive for the lifetime of the bind group that references it.
    _viewport_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    background: wgpu::Color,
    capacity: u32,
}

impl AtomRenderer {
    /// `canvas` is the physics extent in pixels; it stays fixed even if the
    /// window is resized. `background` is a packed 24-bit RGB color.
    pub fn new(
        device: &wgpu::Device,
        surface_config: &wgpu::SurfaceConfiguration,
        canvas: [f32; 2],
        background: u32,
        capacity: usize,
    ) -> Self {
        let viewport_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Viewport Buffer"),
            contents: bytemuck::cast_slice(&[ViewportUniform {
                size: canvas,
                _padding: [0.0; 2],
            }]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Atom Instance Buffer"),
            size: (capacity.max(1) * std::mem::size_of::<AtomInstance>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Atom Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/atom.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Atom Bind Group Layout"),
            entries: &[
                // Viewport (Uniform) - Binding 0
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Atom instances (Storage) - Binding 1
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Atom Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Atom Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vertex"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fragment"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Atom Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: viewport_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: instance_buffer.as_entire_binding(),
                },
            ],
        });

        log::info!("atom renderer ready for {capacity} instances");

        Self {
            render_pipeline,
            _viewport_buffer: viewport_buffer,
            instance_buffer,
            bind_group,
            background: linear_clear_color(background),
            capacity: capacity as u32,
        }
    }

    /// Draw one frame: clear to the background color, then every instance as
    /// a filled circle, in sequence order.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_view: &wgpu::TextureView,
        instances: &[AtomInstance],
    ) {
        debug_assert!(instances.len() as u32 <= self.capacity);
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Atom Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Atom Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..6, 0..instances.len() as u32);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

/// Clear color for an sRGB surface: unpack the 24-bit value and linearize.
fn linear_clear_color(packed: u32) -> wgpu::Color {
    let channel = |shift: u32| srgb_to_linear(((packed >> shift) & 0xFF) as f32 / 255.0) as f64;
    wgpu::Color {
        r: channel(16),
        g: channel(8),
        b: channel(0),
        a: 1.0,
    }
}
