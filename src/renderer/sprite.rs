//! Textured, tinted quads with a 2D transform

use std::rc::Rc;

use glam::{Mat4, Vec2, Vec3};
use wgpu::util::DeviceExt;

use super::gpu::Gpu;
use super::shader::{PipelineOptions, ShaderProgram};
use super::texture::Texture2D;
use super::vertex::{UNIT_QUAD, Vertex};

/// Model transform: translate * rotate * scale, rotating about the quad's
/// top-left corner
pub fn sprite_model(position: Vec2, size: Vec2, rotation: f32) -> Mat4 {
    Mat4::from_translation(position.extend(0.0))
        * Mat4::from_rotation_z(rotation)
        * Mat4::from_scale(size.extend(1.0))
}

/// Pixel-space orthographic projection with y growing downward
pub fn screen_projection(width: f32, height: f32) -> Mat4 {
    Mat4::orthographic_rh(0.0, width, height, 0.0, -1.0, 1.0)
}

pub struct SpriteRenderer {
    program: Rc<ShaderProgram>,
    pipeline: wgpu::RenderPipeline,
    quad: wgpu::Buffer,
}

impl SpriteRenderer {
    /// `sample_count` must match the scene target this renderer draws into
    pub fn new(gpu: &Gpu, program: Rc<ShaderProgram>, sample_count: u32) -> Self {
        let pipeline = program.create_pipeline(
            gpu.device(),
            &PipelineOptions {
                label: "sprite_pipeline",
                format: gpu.surface_format(),
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                sample_count,
                texture_layout: Some(gpu.texture_layout()),
            },
            &[Vertex::desc()],
        );

        let quad = gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sprite_quad"),
                contents: bytemuck::cast_slice(&UNIT_QUAD),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Self {
            program,
            pipeline,
            quad,
        }
    }

    /// One draw call for one quad
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        texture: &Texture2D,
        position: Vec2,
        size: Vec2,
        rotation: f32,
        color: Vec3,
    ) {
        self.program
            .set_mat4("model", &sprite_model(position, size, rotation));
        self.program.set_vec3("spriteColor", color);

        pass.set_pipeline(&self.pipeline);
        if !self.program.bind_uniforms(queue, pass) {
            return;
        }
        texture.bind(pass, 1);
        pass.set_vertex_buffer(0, self.quad.slice(..));
        pass.draw(0..UNIT_QUAD.len() as u32, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_model_places_unit_quad() {
        let m = sprite_model(Vec2::new(10.0, 250.0), Vec2::new(20.0, 100.0), 0.0);
        assert!(approx(m.transform_point3(Vec3::ZERO).truncate(), Vec2::new(10.0, 250.0)));
        assert!(approx(m.transform_point3(Vec3::new(1.0, 1.0, 0.0)).truncate(), Vec2::new(30.0, 350.0)));
    }

    #[test]
    fn test_rotation_is_about_the_origin_corner() {
        let m = sprite_model(Vec2::new(100.0, 100.0), Vec2::new(20.0, 10.0), FRAC_PI_2);
        // The anchored corner stays put
        assert!(approx(m.transform_point3(Vec3::ZERO).truncate(), Vec2::new(100.0, 100.0)));
        // Scaled x edge (20, 0) rotates onto +y
        let corner = m.transform_point3(Vec3::new(1.0, 0.0, 0.0)).truncate();
        assert!(approx(corner, Vec2::new(100.0, 120.0)));
    }

    #[test]
    fn test_projection_maps_screen_corners() {
        let p = screen_projection(800.0, 600.0);
        let top_left = p.project_point3(Vec3::ZERO);
        let bottom_right = p.project_point3(Vec3::new(800.0, 600.0, 0.0));
        assert!(approx(top_left.truncate(), Vec2::new(-1.0, 1.0)));
        assert!(approx(bottom_right.truncate(), Vec2::new(1.0, -1.0)));
    }
}
