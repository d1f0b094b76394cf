//! Additive particle quads

use std::rc::Rc;

use wgpu::util::DeviceExt;

use super::gpu::Gpu;
use super::shader::{PipelineOptions, ShaderProgram};
use super::texture::Texture2D;
use super::vertex::{UNIT_QUAD, Vertex};
use crate::sim::ParticlePool;

/// source * alpha + destination
pub const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent::OVER,
};

pub struct ParticleRenderer {
    program: Rc<ShaderProgram>,
    pipeline: wgpu::RenderPipeline,
    quad: wgpu::Buffer,
    texture: Texture2D,
}

impl ParticleRenderer {
    /// The program's `projection` and `scale` must already be set
    pub fn new(
        gpu: &Gpu,
        program: Rc<ShaderProgram>,
        texture: Texture2D,
        sample_count: u32,
    ) -> Self {
        let pipeline = program.create_pipeline(
            gpu.device(),
            &PipelineOptions {
                label: "particle_pipeline",
                format: gpu.surface_format(),
                blend: Some(ADDITIVE_BLEND),
                sample_count,
                texture_layout: Some(gpu.texture_layout()),
            },
            &[Vertex::desc()],
        );

        let quad = gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("particle_quad"),
                contents: bytemuck::cast_slice(&UNIT_QUAD),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Self {
            program,
            pipeline,
            quad,
            texture,
        }
    }

    /// Draw live particles in pool order. Later draws switch back to their own
    /// (alpha blended) pipelines.
    pub fn draw(&self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>, pool: &ParticlePool) {
        pass.set_pipeline(&self.pipeline);
        self.texture.bind(pass, 1);
        pass.set_vertex_buffer(0, self.quad.slice(..));

        for particle in pool.live() {
            self.program.set_vec2("offset", particle.position);
            self.program.set_vec4("color", particle.color);
            if !self.program.bind_uniforms(queue, pass) {
                break;
            }
            pass.draw(0..UNIT_QUAD.len() as u32, 0..1);
        }
    }
}
