//! wgpu rendering module
//!
//! Render paths:
//! - `sprite`: textured, tinted quads (paddles, ball)
//! - `particles`: additive quads from a `ParticlePool`
//! - `text`: one texture per glyph, drawn straight to the surface
//! - `post`: offscreen scene target and effects composite

pub mod gpu;
pub mod particles;
pub mod post;
pub mod shader;
pub mod sprite;
pub mod text;
pub mod texture;
pub mod uniforms;
pub mod vertex;

pub use gpu::{Frame, Gpu, GpuError, SurfaceErrorAction};
pub use particles::ParticleRenderer;
pub use post::{Effects, PostProcessor};
pub use shader::{ShaderError, ShaderProgram};
pub use sprite::{SpriteRenderer, screen_projection};
pub use text::{FontError, TextRenderer};
pub use texture::{Texture2D, TextureError, TextureOptions};
