use std::path::Path;

use crate::error::AssetError;

use super::units::TextureBinding;

/// Sampled 2D color texture (albedo maps).
pub struct Texture2d {
    texture: wgpu::Texture,
    binding: TextureBinding,
}

impl Texture2d {
    /// Uploads tightly packed RGBA8 pixels, top row first.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            binding: TextureBinding {
                view,
                sampler,
                dimension: wgpu::TextureViewDimension::D2,
            },
        }
    }

    /// Decodes an image file (PNG, JPEG or TGA) and uploads it.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<Path>,
    ) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| AssetError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgba8();
        let (width, height) = image.dimensions();
        log::debug!("loaded {} ({width}x{height})", path.display());

        let label = path.display().to_string();
        Ok(Self::from_rgba8(device, queue, &label, width, height, image.as_raw()))
    }

    /// 1x1 opaque white, for objects whose texture failed to load.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba8(device, queue, "white", 1, 1, &[255; 4])
    }

    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    pub fn height(&self) -> u32 {
        self.texture.height()
    }

    /// View + sampler ready to go into a texture unit.
    pub fn binding(&self) -> TextureBinding {
        self.binding.clone()
    }
}
