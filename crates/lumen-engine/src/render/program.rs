use anyhow::Result;
use glam::{Mat4, Vec3};

use super::uniforms::{round_up, UniformBlockLayout, UniformKind, UniformSet, UniformSlot};
use super::{GpuMesh, RenderCtx, RenderTarget};

/// Everything needed to build a `ShadingProgram`.
///
/// Both sources are complete WGSL modules. The vertex module must export
/// `vs_main`, the fragment module `fs_main`. Both may bind the frame block at
/// `@group(0) @binding(0)` and the draw block at `@group(1) @binding(0)`.
#[derive(Debug, Clone)]
pub struct ProgramDesc<'a> {
    pub label: &'a str,
    pub vertex_source: &'a str,
    pub fragment_source: &'a str,
    pub frame_uniforms: UniformBlockLayout,
    pub draw_uniforms: UniformBlockLayout,
    pub vertex_layout: wgpu::VertexBufferLayout<'static>,
    pub cull_mode: Option<wgpu::Face>,
}

/// Minimum number of per-draw slots allocated up front.
const MIN_DRAW_CAPACITY: u32 = 64;

/// Compiled vertex+fragment pipeline with named uniform slots.
///
/// Uniform values are staged on the CPU. Frame-block values are shared by every
/// draw of a pass; draw-block values are captured each time `ShadingPass::draw`
/// is called, so they behave like per-draw uniform uploads.
pub struct ShadingProgram {
    label: String,
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformSet,

    frame_ubo: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,

    draw_bgl: wgpu::BindGroupLayout,
    draw_ubo: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_stride: u32,
    draw_capacity: u32,
    draw_staging: Vec<u8>,
}

impl ShadingProgram {
    pub fn new(ctx: &RenderCtx<'_>, desc: ProgramDesc<'_>) -> Result<Self> {
        let ProgramDesc {
            label,
            vertex_source,
            fragment_source,
            frame_uniforms,
            draw_uniforms,
            vertex_layout,
            cull_mode,
        } = desc;

        anyhow::ensure!(!vertex_source.trim().is_empty(), "{label}: empty vertex source");
        anyhow::ensure!(!fragment_source.trim().is_empty(), "{label}: empty fragment source");

        let vs = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} vertex shader")),
            source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
        });
        let fs = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} fragment shader")),
            source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
        });

        let frame_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label} frame bgl")),
            entries: &[uniform_entry(false, &frame_uniforms)],
        });
        let draw_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label} draw bgl")),
            entries: &[uniform_entry(true, &draw_uniforms)],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} pipeline layout")),
            bind_group_layouts: &[&frame_bgl, &draw_bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{label} pipeline")),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: ctx.depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let uniforms = UniformSet::new(frame_uniforms, draw_uniforms);

        let frame_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} frame ubo")),
            size: buffer_size(uniforms.frame.layout()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} frame bind group")),
            layout: &frame_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_ubo.as_entire_binding(),
            }],
        });

        let alignment = ctx.device.limits().min_uniform_buffer_offset_alignment;
        let draw_stride = round_up(buffer_size(uniforms.draw.layout()) as u32, alignment);
        let (draw_ubo, draw_bind_group) =
            create_draw_binding(ctx.device, label, &draw_bgl, uniforms.draw.layout(), draw_stride, MIN_DRAW_CAPACITY);

        log::debug!(
            "{label}: {} frame uniforms ({} bytes), {} draw uniforms (stride {draw_stride})",
            uniforms.frame.layout().len(),
            uniforms.frame.layout().size(),
            uniforms.draw.layout().len(),
        );

        Ok(Self {
            label: label.to_string(),
            pipeline,
            uniforms,
            frame_ubo,
            frame_bind_group,
            draw_bgl,
            draw_ubo,
            draw_bind_group,
            draw_stride,
            draw_capacity: MIN_DRAW_CAPACITY,
            draw_staging: Vec::new(),
        })
    }

    /// Resolves a uniform by name. Unknown names give `UniformSlot::INVALID`.
    pub fn uniform_location(&self, name: &str) -> UniformSlot {
        let slot = self.uniforms.location(name);
        if !slot.is_valid() {
            log::debug!("{}: no uniform named `{name}`", self.label);
        }
        slot
    }

    pub fn set_i32(&mut self, slot: UniformSlot, value: i32) {
        self.uniforms.write(slot, UniformKind::I32, &value.to_ne_bytes());
    }

    pub fn set_f32(&mut self, slot: UniformSlot, value: f32) {
        self.uniforms.write(slot, UniformKind::F32, &value.to_ne_bytes());
    }

    pub fn set_vec3(&mut self, slot: UniformSlot, value: Vec3) {
        self.uniforms.write(slot, UniformKind::Vec3, bytemuck::bytes_of(&value));
    }

    /// Column-major, as WGSL `mat4x4<f32>` expects.
    pub fn set_mat4(&mut self, slot: UniformSlot, value: &Mat4) {
        self.uniforms.write(slot, UniformKind::Mat4, bytemuck::bytes_of(value));
    }

    /// Begins a render pass that clears color and depth and binds this program.
    ///
    /// `max_draws` reserves per-draw uniform slots; draws beyond it are dropped.
    pub fn begin_pass<'p>(
        &'p mut self,
        ctx: &RenderCtx<'p>,
        target: &'p mut RenderTarget<'_>,
        clear: wgpu::Color,
        max_draws: u32,
    ) -> ShadingPass<'p> {
        self.ensure_draw_capacity(ctx.device, max_draws);
        self.draw_staging.clear();

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lumen shading pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.frame_bind_group, &[]);

        ShadingPass {
            program: self,
            rpass,
            queue: ctx.queue,
            draws: 0,
            dropped: 0,
        }
    }

    fn ensure_draw_capacity(&mut self, device: &wgpu::Device, required: u32) {
        if required <= self.draw_capacity {
            return;
        }
        let new_cap = required.next_power_of_two().max(MIN_DRAW_CAPACITY);
        let (ubo, bind_group) = create_draw_binding(
            device,
            &self.label,
            &self.draw_bgl,
            self.uniforms.draw.layout(),
            self.draw_stride,
            new_cap,
        );
        self.draw_ubo.destroy();
        self.draw_ubo = ubo;
        self.draw_bind_group = bind_group;
        self.draw_capacity = new_cap;
    }
}

/// An open render pass bound to a `ShadingProgram`.
///
/// Uniform writes made through the pass go to the program's staging blocks.
/// Staged uniforms are uploaded when the pass is dropped (or `finish`ed), before
/// the encoder is submitted.
pub struct ShadingPass<'p> {
    program: &'p mut ShadingProgram,
    rpass: wgpu::RenderPass<'p>,
    queue: &'p wgpu::Queue,
    draws: u32,
    dropped: u32,
}

impl<'p> ShadingPass<'p> {
    pub fn set_i32(&mut self, slot: UniformSlot, value: i32) {
        self.program.set_i32(slot, value);
    }

    pub fn set_f32(&mut self, slot: UniformSlot, value: f32) {
        self.program.set_f32(slot, value);
    }

    pub fn set_vec3(&mut self, slot: UniformSlot, value: Vec3) {
        self.program.set_vec3(slot, value);
    }

    pub fn set_mat4(&mut self, slot: UniformSlot, value: &Mat4) {
        self.program.set_mat4(slot, value);
    }

    /// Captures the current draw block and draws `mesh` with it.
    pub fn draw(&mut self, mesh: &GpuMesh) {
        if self.draws >= self.program.draw_capacity {
            self.dropped += 1;
            return;
        }

        let stride = self.program.draw_stride as usize;
        let offset = self.draws as usize * stride;
        let block = self.program.uniforms.draw.bytes();
        self.program.draw_staging.resize(offset + stride, 0);
        self.program.draw_staging[offset..offset + block.len()].copy_from_slice(block);

        self.rpass
            .set_bind_group(1, &self.program.draw_bind_group, &[offset as u32]);
        mesh.draw(&mut self.rpass);

        self.draws += 1;
    }

    pub fn draw_count(&self) -> u32 {
        self.draws
    }

    /// Ends the pass and uploads the staged uniforms.
    pub fn finish(self) {}
}

impl Drop for ShadingPass<'_> {
    fn drop(&mut self) {
        let program = &*self.program;
        self.queue
            .write_buffer(&program.frame_ubo, 0, program.uniforms.frame.bytes());
        if !program.draw_staging.is_empty() {
            self.queue.write_buffer(&program.draw_ubo, 0, &program.draw_staging);
        }
        if self.dropped > 0 {
            log::warn!(
                "{}: dropped {} draws over capacity {}",
                program.label,
                self.dropped,
                program.draw_capacity
            );
        }
    }
}

fn uniform_entry(dynamic: bool, layout: &UniformBlockLayout) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: Some(layout.min_binding_size()),
        },
        count: None,
    }
}

/// Uniform buffers are sized to at least 16 bytes so empty blocks stay bindable.
fn buffer_size(layout: &UniformBlockLayout) -> u64 {
    u64::from(layout.size().max(16))
}

fn create_draw_binding(
    device: &wgpu::Device,
    label: &str,
    bgl: &wgpu::BindGroupLayout,
    layout: &UniformBlockLayout,
    stride: u32,
    capacity: u32,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let ubo = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(&format!("{label} draw ubo")),
        size: u64::from(stride) * u64::from(capacity),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label} draw bind group")),
        layout: bgl,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &ubo,
                offset: 0,
                size: Some(layout.min_binding_size()),
            }),
        }],
    });
    (ubo, bind_group)
}
