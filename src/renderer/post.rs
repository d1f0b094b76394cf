//! Offscreen scene target and full-screen effects composite
//!
//! Per frame: `begin_render` opens a pass on the (multisampled) scene target,
//! the scene is drawn into it, `end_render` closes the pass which resolves
//! into the sampled scene texture, and `render` composites that texture onto
//! the surface through the post-processing program. Skipping the bracket
//! composites whatever was resolved last.

use std::rc::Rc;

use glam::{Vec2, Vec4};
use wgpu::util::DeviceExt;

use super::gpu::Gpu;
use super::shader::{PipelineOptions, ShaderProgram};
use super::texture::{Texture2D, TextureError, TextureOptions};
use super::vertex::{FULLSCREEN_QUAD, Vertex};
use crate::consts::CLEAR_COLOR;

/// Spacing of the 3x3 sampling grid in uv units
pub const KERNEL_OFFSET: f32 = 1.0 / 300.0;

pub const EDGE_KERNEL: [f32; 9] = [
    -1.0, -1.0, -1.0, //
    -1.0, 8.0, -1.0, //
    -1.0, -1.0, -1.0,
];

pub const BLUR_KERNEL: [f32; 9] = [
    1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0, //
    2.0 / 16.0, 4.0 / 16.0, 2.0 / 16.0, //
    1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0,
];

/// Row-major 3x3 grid of uv offsets, top-left first; index 4 is the center
pub fn kernel_offsets(spacing: f32) -> [Vec2; 9] {
    let mut offsets = [Vec2::ZERO; 9];
    for (i, offset) in offsets.iter_mut().enumerate() {
        let col = (i % 3) as f32 - 1.0;
        let row = 1.0 - (i / 3) as f32;
        *offset = Vec2::new(col * spacing, row * spacing);
    }
    offsets
}

/// Pack scalars/vec2s into the x/xy lanes of a vec4 uniform array
fn lanes<const N: usize>(values: impl IntoIterator<Item = Vec4>) -> [Vec4; N] {
    let mut out = [Vec4::ZERO; N];
    for (slot, v) in out.iter_mut().zip(values) {
        *slot = v;
    }
    out
}

/// Composite effects; several may be on at once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effects {
    pub shake: bool,
    pub confuse: bool,
    pub chaos: bool,
}

struct MsaaTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

pub struct PostProcessor {
    program: Rc<ShaderProgram>,
    pipeline: wgpu::RenderPipeline,
    quad: wgpu::Buffer,
    msaa: Option<MsaaTarget>,
    /// Resolved scene, sampled by the composite
    scene: Texture2D,
    sample_count: u32,
    pub effects: Effects,
}

impl PostProcessor {
    /// Falls back to single-sampled rendering when `samples` is not supported
    /// for the surface format.
    pub fn new(
        gpu: &Gpu,
        program: Rc<ShaderProgram>,
        width: u32,
        height: u32,
        samples: u32,
    ) -> Result<Self, TextureError> {
        let format = gpu.surface_format();
        let sample_count = if gpu.supports_msaa(samples) {
            samples.max(1)
        } else {
            log::warn!("{samples}x MSAA unsupported for {format:?}; rendering single-sampled");
            1
        };

        let scene = Texture2D::generate(
            gpu,
            "scene",
            width,
            height,
            None,
            TextureOptions {
                format,
                wrap: wgpu::AddressMode::Repeat,
                filter: wgpu::FilterMode::Linear,
                render_target: true,
            },
        )?;

        let msaa = (sample_count > 1).then(|| {
            let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
                label: Some("scene_msaa"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            MsaaTarget {
                _texture: texture,
                view,
            }
        });

        let pipeline = program.create_pipeline(
            gpu.device(),
            &PipelineOptions {
                label: "post_processing_pipeline",
                format,
                blend: None,
                sample_count: 1,
                texture_layout: Some(gpu.texture_layout()),
            },
            &[Vertex::desc()],
        );

        let quad = gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("post_quad"),
                contents: bytemuck::cast_slice(&FULLSCREEN_QUAD),
                usage: wgpu::BufferUsages::VERTEX,
            });

        // Constant for the program's lifetime
        let offsets = kernel_offsets(KERNEL_OFFSET);
        program.set_vec4_array(
            "offsets",
            &lanes::<9>(offsets.iter().map(|o| o.extend(0.0).extend(0.0))),
        );
        program.set_vec4_array(
            "edge_kernel",
            &lanes::<9>(EDGE_KERNEL.iter().map(|&k| Vec4::new(k, 0.0, 0.0, 0.0))),
        );
        program.set_vec4_array(
            "blur_kernel",
            &lanes::<9>(BLUR_KERNEL.iter().map(|&k| Vec4::new(k, 0.0, 0.0, 0.0))),
        );

        log::info!("Post-processor ready: {width}x{height}, {sample_count}x MSAA");

        Ok(Self {
            program,
            pipeline,
            quad,
            msaa,
            scene,
            sample_count,
            effects: Effects::default(),
        })
    }

    /// Sample count scene pipelines must be built with
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Open the scene pass, cleared to the background color
    pub fn begin_render<'e>(&self, encoder: &'e mut wgpu::CommandEncoder) -> wgpu::RenderPass<'e> {
        let (view, resolve_target) = match &self.msaa {
            Some(msaa) => (&msaa.view, Some(&self.scene.view)),
            None => (&self.scene.view, None),
        };
        let [r, g, b] = CLEAR_COLOR;

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a: 1.0 }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }

    /// Close the scene pass; the multisampled target resolves into the scene
    /// texture as the pass ends
    pub fn end_render(&self, pass: wgpu::RenderPass<'_>) {
        drop(pass);
    }

    /// Composite the resolved scene onto `target` with the active effects
    pub fn render(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        time: f32,
    ) {
        self.program.set_float("time", time);
        self.program.set_int("confuse", self.effects.confuse as i32);
        self.program.set_int("chaos", self.effects.chaos as i32);
        self.program.set_int("shake", self.effects.shake as i32);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("post_processing_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(&self.pipeline);
        if !self.program.bind_uniforms(queue, &mut pass) {
            return;
        }
        self.scene.bind(&mut pass, 1);
        pass.set_vertex_buffer(0, self.quad.slice(..));
        pass.draw(0..FULLSCREEN_QUAD.len() as u32, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_offsets_grid() {
        let o = kernel_offsets(KERNEL_OFFSET);
        assert_eq!(o[4], Vec2::ZERO);
        assert_eq!(o[0], Vec2::new(-KERNEL_OFFSET, KERNEL_OFFSET));
        assert_eq!(o[8], Vec2::new(KERNEL_OFFSET, -KERNEL_OFFSET));
        // Symmetric about the center
        for i in 0..9 {
            assert_eq!(o[i], -o[8 - i]);
        }
    }

    #[test]
    fn test_edge_kernel_sums_to_zero() {
        assert_eq!(EDGE_KERNEL.iter().sum::<f32>(), 0.0);
    }

    #[test]
    fn test_blur_kernel_preserves_brightness() {
        assert!((BLUR_KERNEL.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_lanes_pads_with_zero() {
        let packed = lanes::<4>([Vec4::ONE, Vec4::X]);
        assert_eq!(packed, [Vec4::ONE, Vec4::X, Vec4::ZERO, Vec4::ZERO]);
    }
}
