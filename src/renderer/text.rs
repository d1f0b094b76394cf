//! Bitmap text
//!
//! Glyphs for printable ASCII are rasterized once with `fontdue`, each into
//! its own single-channel texture. Blank glyphs such as space have no
//! outline; they get an empty cell of advance width x line box (ascent to
//! descent) so they still occupy a quad. A string is laid out left to right
//! on a baseline, one textured quad per character, no kerning or wrapping.

use std::cell::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use glam::Vec3;

use super::gpu::Gpu;
use super::shader::{PipelineOptions, ShaderProgram};
use super::texture::{Texture2D, TextureError, TextureOptions};
use super::vertex::Vertex;

/// Code points rasterized at load time
pub const GLYPH_RANGE: std::ops::RangeInclusive<char> = ' '..='\u{7f}';
/// Drawn in place of characters that were not loaded
pub const FALLBACK_GLYPH: char = '?';
/// Glyph quads the vertex ring holds per frame
pub const MAX_GLYPHS_PER_FRAME: u32 = 1024;

const VERTICES_PER_GLYPH: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("cannot read font {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid font data: {0}")]
    Parse(String),
    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// Metrics of one rasterized glyph, in pixels unless noted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub width: u32,
    pub height: u32,
    /// Pen advance in 1/64 pixel units
    pub advance: i32,
    /// Left edge relative to the pen
    pub bearing_h: i32,
    /// Extent below the baseline (positive down)
    pub bearing_v: i32,
}

/// A glyph bitmap, one coverage byte per pixel, rows top to bottom
#[derive(Debug, Clone)]
pub struct GlyphBitmap {
    pub glyph: Glyph,
    pub coverage: Vec<u8>,
}

/// Rasterized glyphs keyed by code point
#[derive(Debug, Clone, Default)]
pub struct GlyphSet {
    glyphs: HashMap<char, GlyphBitmap>,
}

impl GlyphSet {
    /// Rasterize every code point of `GLYPH_RANGE` at `size` pixels
    pub fn rasterize(font_bytes: &[u8], size: f32) -> Result<Self, FontError> {
        let font = fontdue::Font::from_bytes(font_bytes, fontdue::FontSettings::default())
            .map_err(|e| FontError::Parse(e.to_string()))?;
        let line = font.horizontal_line_metrics(size);

        let mut glyphs = HashMap::new();
        for ch in GLYPH_RANGE {
            let (metrics, coverage) = font.rasterize(ch, size);
            let advance = (metrics.advance_width * 64.0).round() as i32;

            let bitmap = if metrics.width == 0 || metrics.height == 0 {
                // Advance x line box; fontdue has no global bounding box
                let (ascent, descent) = line.map_or((size, 0.0), |l| (l.ascent, l.descent));
                let width = (metrics.advance_width.round() as u32).max(1);
                let height = ((ascent - descent).round() as u32).max(1);
                GlyphBitmap {
                    glyph: Glyph {
                        width,
                        height,
                        advance,
                        bearing_h: 0,
                        bearing_v: (-descent).round() as i32,
                    },
                    coverage: vec![0; (width * height) as usize],
                }
            } else {
                GlyphBitmap {
                    glyph: Glyph {
                        width: metrics.width as u32,
                        height: metrics.height as u32,
                        advance,
                        bearing_h: metrics.xmin,
                        bearing_v: -metrics.ymin,
                    },
                    coverage,
                }
            };
            glyphs.insert(ch, bitmap);
        }

        log::info!("Rasterized {} glyphs at {size}px", glyphs.len());
        Ok(Self { glyphs })
    }

    pub fn from_bitmaps(glyphs: impl IntoIterator<Item = (char, GlyphBitmap)>) -> Self {
        Self {
            glyphs: glyphs.into_iter().collect(),
        }
    }

    /// The glyph drawn for `ch`: itself, else the fallback, else nothing
    pub fn resolve(&self, ch: char) -> Option<(char, &Glyph)> {
        self.glyphs
            .get(&ch)
            .map(|g| (ch, &g.glyph))
            .or_else(|| self.glyphs.get(&FALLBACK_GLYPH).map(|g| (FALLBACK_GLYPH, &g.glyph)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&char, &GlyphBitmap)> {
        self.glyphs.iter()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Place `text` with its baseline at `y`, starting at pen position `x`
    pub fn layout(&self, text: &str, x: f32, y: f32, scale: f32) -> Vec<GlyphQuad> {
        let mut pen = x;
        let mut quads = Vec::with_capacity(text.len());
        for ch in text.chars() {
            let Some((drawn, glyph)) = self.resolve(ch) else {
                continue;
            };
            quads.push(GlyphQuad {
                ch: drawn,
                x: pen + glyph.bearing_h as f32 * scale,
                y: y - (glyph.height as i32 - glyph.bearing_v) as f32 * scale,
                width: glyph.width as f32 * scale,
                height: glyph.height as f32 * scale,
            });
            pen += (glyph.advance >> 6) as f32 * scale;
        }
        quads
    }
}

/// One positioned glyph: top-left corner and size in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    pub ch: char,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl GlyphQuad {
    pub fn vertices(&self) -> [Vertex; VERTICES_PER_GLYPH] {
        let (x0, y0) = (self.x, self.y);
        let (x1, y1) = (self.x + self.width, self.y + self.height);
        [
            Vertex::new(x0, y0, 0.0, 0.0),
            Vertex::new(x1, y0, 1.0, 0.0),
            Vertex::new(x0, y1, 0.0, 1.0),
            Vertex::new(x0, y1, 0.0, 1.0),
            Vertex::new(x1, y0, 1.0, 0.0),
            Vertex::new(x1, y1, 1.0, 1.0),
        ]
    }
}

pub struct TextRenderer {
    program: Rc<ShaderProgram>,
    pipeline: wgpu::RenderPipeline,
    glyphs: GlyphSet,
    textures: HashMap<char, Texture2D>,
    /// Glyph quads written this frame; each quad gets its own ring slot
    vertices: wgpu::Buffer,
    cursor: Cell<u32>,
}

impl TextRenderer {
    /// Draws straight to the surface. The program's `projection` must be set.
    pub fn new(gpu: &Gpu, program: Rc<ShaderProgram>) -> Self {
        let pipeline = program.create_pipeline(
            gpu.device(),
            &PipelineOptions {
                label: "text_pipeline",
                format: gpu.surface_format(),
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                sample_count: 1,
                texture_layout: Some(gpu.texture_layout()),
            },
            &[Vertex::desc()],
        );

        let vertices = gpu.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("text_vertices"),
            size: (std::mem::size_of::<Vertex>() * VERTICES_PER_GLYPH) as u64
                * MAX_GLYPHS_PER_FRAME as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            program,
            pipeline,
            glyphs: GlyphSet::default(),
            textures: HashMap::new(),
            vertices,
            cursor: Cell::new(0),
        }
    }

    /// Load a TrueType font and upload one texture per glyph
    pub fn load_font(&mut self, gpu: &Gpu, path: &Path, size: f32) -> Result<(), FontError> {
        let bytes = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let glyphs = GlyphSet::rasterize(&bytes, size)?;

        let mut textures = HashMap::with_capacity(glyphs.len());
        for (&ch, bitmap) in glyphs.iter() {
            let texture = Texture2D::generate(
                gpu,
                &format!("glyph_{:02x}", ch as u32),
                bitmap.glyph.width,
                bitmap.glyph.height,
                Some(bitmap.coverage.as_slice()),
                TextureOptions::alpha_mask(),
            )?;
            textures.insert(ch, texture);
        }

        log::info!("Loaded font {}", path.display());
        self.glyphs = glyphs;
        self.textures = textures;
        Ok(())
    }

    /// Release this frame's glyph slots
    pub fn begin_frame(&self) {
        self.cursor.set(0);
    }

    /// Draw `text` exactly as given, baseline at `y`
    #[allow(clippy::too_many_arguments)]
    pub fn render_text(
        &self,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        text: &str,
        x: f32,
        y: f32,
        scale: f32,
        color: Vec3,
    ) {
        let quads = self.glyphs.layout(text, x, y, scale);
        if quads.is_empty() {
            return;
        }

        self.program.set_vec3("textColor", color);
        pass.set_pipeline(&self.pipeline);
        if !self.program.bind_uniforms(queue, pass) {
            return;
        }

        let stride = (std::mem::size_of::<Vertex>() * VERTICES_PER_GLYPH) as u64;
        for quad in quads {
            let Some(texture) = self.textures.get(&quad.ch) else {
                continue;
            };
            let slot = self.cursor.get();
            if slot >= MAX_GLYPHS_PER_FRAME {
                log::warn!("Glyph budget exhausted, dropping text");
                return;
            }
            self.cursor.set(slot + 1);

            let offset = slot as u64 * stride;
            queue.write_buffer(&self.vertices, offset, bytemuck::cast_slice(&quad.vertices()));
            texture.bind(pass, 1);
            pass.set_vertex_buffer(0, self.vertices.slice(offset..offset + stride));
            pass.draw(0..VERTICES_PER_GLYPH as u32, 0..1);
        }
    }
}
