//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex with texture coordinates. Shaders receive it as one
/// `vec4<f32>` (xy = position, zw = uv).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y],
            tex_coords: [u, v],
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x4,
            }],
        }
    }
}

/// Two triangles spanning [0,1]x[0,1]; uv follows position so v=0 is the top
/// edge in a y-down projection
pub const UNIT_QUAD: [Vertex; 6] = [
    Vertex::new(0.0, 1.0, 0.0, 1.0),
    Vertex::new(1.0, 0.0, 1.0, 0.0),
    Vertex::new(0.0, 0.0, 0.0, 0.0),
    Vertex::new(0.0, 1.0, 0.0, 1.0),
    Vertex::new(1.0, 1.0, 1.0, 1.0),
    Vertex::new(1.0, 0.0, 1.0, 0.0),
];

/// Clip-space quad covering the whole target; uv (0,0) is the top-left texel
pub const FULLSCREEN_QUAD: [Vertex; 6] = [
    Vertex::new(-1.0, -1.0, 0.0, 1.0),
    Vertex::new(1.0, 1.0, 1.0, 0.0),
    Vertex::new(-1.0, 1.0, 0.0, 0.0),
    Vertex::new(-1.0, -1.0, 0.0, 1.0),
    Vertex::new(1.0, -1.0, 1.0, 1.0),
    Vertex::new(1.0, 1.0, 1.0, 0.0),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_one_vec4() {
        assert_eq!(std::mem::size_of::<Vertex>(), 16);
    }

    #[test]
    fn test_unit_quad_covers_unit_square() {
        for v in UNIT_QUAD {
            assert!(v.position.iter().all(|c| *c == 0.0 || *c == 1.0));
            assert_eq!(v.position, v.tex_coords);
        }
    }

    #[test]
    fn test_fullscreen_quad_maps_top_to_v_zero() {
        for v in FULLSCREEN_QUAD {
            let expected_v = (1.0 - v.position[1]) / 2.0;
            assert_eq!(v.tex_coords[1], expected_v);
        }
    }
}
