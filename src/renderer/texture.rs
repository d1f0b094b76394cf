//! 2D textures with their sampler and group 1 bind group

use super::gpu::Gpu;

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("texture '{label}' has zero size ({width}x{height})")]
    ZeroSize {
        label: String,
        width: u32,
        height: u32,
    },

    #[error("texture '{label}' expects {expected} bytes of pixel data, got {actual}")]
    SizeMismatch {
        label: String,
        expected: usize,
        actual: usize,
    },

    #[error("texture format {0:?} cannot be uploaded from the CPU")]
    UnsupportedFormat(wgpu::TextureFormat),
}

/// How a texture is stored and sampled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureOptions {
    pub format: wgpu::TextureFormat,
    pub wrap: wgpu::AddressMode,
    pub filter: wgpu::FilterMode,
    /// Also usable as a color attachment
    pub render_target: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            format: wgpu::TextureFormat::Rgba8Unorm,
            wrap: wgpu::AddressMode::ClampToEdge,
            filter: wgpu::FilterMode::Linear,
            render_target: false,
        }
    }
}

impl TextureOptions {
    /// Single-channel coverage, as used for glyphs
    pub fn alpha_mask() -> Self {
        Self {
            format: wgpu::TextureFormat::R8Unorm,
            ..Self::default()
        }
    }
}

/// Number of bytes a full upload of `width` x `height` texels must have
pub fn upload_size(
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> Result<usize, TextureError> {
    let texel = format
        .block_copy_size(None)
        .ok_or(TextureError::UnsupportedFormat(format))?;
    Ok(texel as usize * width as usize * height as usize)
}

pub struct Texture2D {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub bind_group: wgpu::BindGroup,
    pub width: u32,
    pub height: u32,
}

impl Texture2D {
    /// Allocate a texture, optionally uploading `pixels` (tightly packed rows).
    ///
    /// No mipmaps are generated.
    pub fn generate(
        gpu: &Gpu,
        label: &str,
        width: u32,
        height: u32,
        pixels: Option<&[u8]>,
        opts: TextureOptions,
    ) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroSize {
                label: label.to_string(),
                width,
                height,
            });
        }
        if let Some(data) = pixels {
            let expected = upload_size(opts.format, width, height)?;
            if data.len() != expected {
                return Err(TextureError::SizeMismatch {
                    label: label.to_string(),
                    expected,
                    actual: data.len(),
                });
            }
        }

        let device = gpu.device();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let mut usage = wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST;
        if opts.render_target {
            usage |= wgpu::TextureUsages::RENDER_ATTACHMENT;
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: opts.format,
            usage,
            view_formats: &[],
        });

        if let Some(data) = pixels {
            let bytes_per_texel = opts
                .format
                .block_copy_size(None)
                .ok_or(TextureError::UnsupportedFormat(opts.format))?;
            gpu.queue().write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                data,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_texel * width),
                    rows_per_image: Some(height),
                },
                size,
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: opts.wrap,
            address_mode_v: opts.wrap,
            address_mode_w: opts.wrap,
            mag_filter: opts.filter,
            min_filter: opts.filter,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: gpu.texture_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Ok(Self {
            texture,
            view,
            sampler,
            bind_group,
            width,
            height,
        })
    }

    /// Bind as the sampled texture of the next draws
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>, group: u32) {
        pass.set_bind_group(group, &self.bind_group, &[]);
    }
}

/// Layout every `Texture2D` bind group follows: texture at 0, sampler at 1
pub fn texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("texture_layout"),
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
    })
}

/// RGBA8 pixels of a filled disc with a one-pixel soft edge
pub fn disc_pixels(size: u32) -> Vec<u8> {
    radial_pixels(size, |d| (0.5 * size as f32 - d + 0.5).clamp(0.0, 1.0))
}

/// RGBA8 pixels of a dot fading out towards its rim
pub fn glow_pixels(size: u32) -> Vec<u8> {
    radial_pixels(size, |d| {
        let t = (1.0 - d / (0.5 * size as f32)).clamp(0.0, 1.0);
        t * t
    })
}

fn radial_pixels(size: u32, coverage: impl Fn(f32) -> f32) -> Vec<u8> {
    let center = size as f32 / 2.0;
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            let alpha = coverage((dx * dx + dy * dy).sqrt());
            pixels.extend_from_slice(&[255, 255, 255, (alpha * 255.0).round() as u8]);
        }
    }
    pixels
}
