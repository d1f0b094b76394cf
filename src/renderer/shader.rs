//! Shader programs
//!
//! A program is a vertex/fragment WGSL pair sharing one uniform struct.
//! Both stages are parsed and validated up front so a broken shader is a
//! startup error instead of a device-lost at the first draw.

use std::cell::RefCell;

use glam::{Mat4, Vec2, Vec3, Vec4};

use super::uniforms::{UniformBlock, UniformLayout, UniformRing};

/// Uniform slots available to one program per frame
pub const DRAWS_PER_FRAME: u32 = 512;

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("{stage} shader failed to parse:\n{message}")]
    Parse { stage: &'static str, message: String },

    #[error("{stage} shader failed validation: {message}")]
    Validation { stage: &'static str, message: String },

    #[error("{stage} shader declares no uniform struct at @group(0) @binding(0)")]
    MissingUniformBlock { stage: &'static str },

    #[error("uniform `{name}` has different offsets in the vertex and fragment stages")]
    UniformMismatch { name: String },
}

/// Checked WGSL for both stages plus the reflected uniform layout
#[derive(Debug, Clone)]
pub struct ProgramSource {
    pub vertex: String,
    pub fragment: String,
    pub layout: UniformLayout,
}

impl ProgramSource {
    pub fn parse(vertex: &str, fragment: &str) -> Result<Self, ShaderError> {
        let vs_layout = check_stage("vertex", vertex)?;
        let fs_layout = check_stage("fragment", fragment)?;
        let layout = vs_layout
            .merge(fs_layout)
            .map_err(|name| ShaderError::UniformMismatch { name })?;

        Ok(Self {
            vertex: vertex.to_string(),
            fragment: fragment.to_string(),
            layout,
        })
    }
}

fn check_stage(stage: &'static str, source: &str) -> Result<UniformLayout, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Parse {
        stage,
        message: e.emit_to_string(source),
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| ShaderError::Validation {
        stage,
        message: e.as_inner().to_string(),
    })?;

    UniformLayout::from_module(&module).ok_or(ShaderError::MissingUniformBlock { stage })
}

/// Render state a program is drawn with
pub struct PipelineOptions<'a> {
    pub label: &'a str,
    pub format: wgpu::TextureFormat,
    pub blend: Option<wgpu::BlendState>,
    pub sample_count: u32,
    /// Layout of the group 1 texture binding, if the program samples one
    pub texture_layout: Option<&'a wgpu::BindGroupLayout>,
}

/// A compiled program with named uniform setters.
///
/// Setters write into a staging block owned by the program; the block is
/// uploaded to its own ring slot by `bind_uniforms`, so values set before a
/// draw are the values that draw sees.
pub struct ShaderProgram {
    name: String,
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    layout: UniformLayout,
    uniform_layout: wgpu::BindGroupLayout,
    staging: RefCell<UniformBlock>,
    ring: UniformRing,
}

impl ShaderProgram {
    pub fn compile(
        device: &wgpu::Device,
        name: &str,
        vertex: &str,
        fragment: &str,
    ) -> Result<Self, ShaderError> {
        let source = ProgramSource::parse(vertex, fragment)?;
        Ok(Self::from_source(device, name, source))
    }

    pub fn from_source(device: &wgpu::Device, name: &str, source: ProgramSource) -> Self {
        let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{name}.vert")),
            source: wgpu::ShaderSource::Wgsl(source.vertex.into()),
        });
        let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{name}.frag")),
            source: wgpu::ShaderSource::Wgsl(source.fragment.into()),
        });

        let span = source.layout.span();
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{name}_uniform_layout")),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(span as u64),
                },
                count: None,
            }],
        });

        let ring = UniformRing::new(
            device,
            &format!("{name}_uniforms"),
            &uniform_layout,
            span,
            DRAWS_PER_FRAME,
        );

        log::info!(
            "Compiled shader program '{name}' ({} uniforms, {span} bytes)",
            source.layout.len()
        );

        Self {
            name: name.to_string(),
            vertex,
            fragment,
            staging: RefCell::new(UniformBlock::new(span)),
            layout: source.layout,
            uniform_layout,
            ring,
        }
    }

    /// Build a triangle-list pipeline for this program
    pub fn create_pipeline(
        &self,
        device: &wgpu::Device,
        opts: &PipelineOptions<'_>,
        vertex_layouts: &[wgpu::VertexBufferLayout<'_>],
    ) -> wgpu::RenderPipeline {
        let mut bind_group_layouts = vec![&self.uniform_layout];
        if let Some(textures) = opts.texture_layout {
            bind_group_layouts.push(textures);
        }

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(opts.label),
            bind_group_layouts: &bind_group_layouts,
            immediate_size: 0,
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(opts.label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.vertex,
                entry_point: Some("vs_main"),
                buffers: vertex_layouts,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.fragment,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: opts.format,
                    blend: opts.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: opts.sample_count,
                ..Default::default()
            },
            multiview_mask: None,
            cache: None,
        })
    }

    fn set_bytes(&self, name: &str, data: &[u8]) {
        let Some(field) = self.layout.field(name) else {
            log::warn!("Program '{}' has no uniform '{name}'", self.name);
            return;
        };
        if !self.staging.borrow_mut().write(field, data) {
            log::warn!(
                "Uniform '{name}' of '{}' is {} bytes, got {}",
                self.name,
                field.size,
                data.len()
            );
        }
    }

    pub fn set_float(&self, name: &str, value: f32) {
        self.set_bytes(name, bytemuck::bytes_of(&value));
    }

    pub fn set_int(&self, name: &str, value: i32) {
        self.set_bytes(name, bytemuck::bytes_of(&value));
    }

    pub fn set_vec2(&self, name: &str, value: Vec2) {
        self.set_bytes(name, bytemuck::bytes_of(&value));
    }

    pub fn set_vec3(&self, name: &str, value: Vec3) {
        self.set_bytes(name, bytemuck::bytes_of(&value));
    }

    pub fn set_vec4(&self, name: &str, value: Vec4) {
        self.set_bytes(name, bytemuck::bytes_of(&value));
    }

    pub fn set_mat4(&self, name: &str, value: &Mat4) {
        self.set_bytes(name, bytemuck::bytes_of(value));
    }

    /// Arrays of scalars/vec2 are declared as `array<vec4<f32>, N>` to meet
    /// uniform array stride rules
    pub fn set_vec4_array(&self, name: &str, values: &[Vec4]) {
        self.set_bytes(name, bytemuck::cast_slice(values));
    }

    /// Upload the current uniform values for the next draw and bind them at
    /// group 0. Returns false when this frame's slots are exhausted.
    pub fn bind_uniforms(&self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>) -> bool {
        let staging = self.staging.borrow();
        match self.ring.push(queue, staging.as_bytes()) {
            Some(offset) => {
                pass.set_bind_group(0, self.ring.bind_group(), &[offset]);
                true
            }
            None => {
                log::warn!("Program '{}' ran out of uniform slots this frame", self.name);
                false
            }
        }
    }

    /// Release this frame's uniform slots
    pub fn begin_frame(&self) {
        self.ring.rewind();
    }
}
