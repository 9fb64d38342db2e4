//! Headless device for tests that need a real GPU.
//!
//! [`TestGpu::new`] returns `None` on machines without an adapter; callers
//! skip in that case.

use super::{RenderCtx, Viewport};

pub(crate) const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

pub(crate) struct TestGpu {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl TestGpu {
    pub fn new() -> Option<Self> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
            let adapter = match instance
                .request_adapter(&wgpu::RequestAdapterOptions::default())
                .await
            {
                Ok(adapter) => adapter,
                Err(e) => {
                    eprintln!("no GPU adapter, skipping: {e}");
                    return None;
                }
            };
            let features = adapter.features()
                & (wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER
                    | wgpu::Features::CONSERVATIVE_RASTERIZATION);
            let (device, queue) = adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("test device"),
                    required_features: features,
                    ..Default::default()
                })
                .await
                .ok()?;
            Some(Self { device, queue })
        })
    }

    pub fn ctx(&self, viewport: Viewport) -> RenderCtx<'_> {
        RenderCtx::new(
            &self.device,
            &self.queue,
            TARGET_FORMAT,
            viewport,
            self.device.features(),
            self.device.limits(),
        )
    }

    pub fn encoder(&self) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("test encoder") })
    }

    pub fn submit(&self, encoder: wgpu::CommandEncoder) {
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Reads back one mip level of a cubic RGBA8 3D texture, x fastest.
    pub fn read_level(&self, texture: &wgpu::Texture, level: u32) -> Vec<[u8; 4]> {
        let extent = (texture.width() >> level).max(1);
        let row = extent * 4;
        let padded_row = row.next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("test readback"),
            size: (padded_row * extent * extent) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self.encoder();
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: level,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(extent),
                },
            },
            wgpu::Extent3d {
                width: extent,
                height: extent,
                depth_or_array_layers: extent,
            },
        );
        self.submit(encoder);

        let slice = buffer.slice(..);
        slice.map_async(wgpu::MapMode::Read, |_| {});
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .expect("device poll");

        let data = slice.get_mapped_range();
        let texels = data
            .chunks(padded_row as usize)
            .flat_map(|r| r[..row as usize].chunks_exact(4))
            .map(|t| [t[0], t[1], t[2], t[3]])
            .collect();
        drop(data);
        buffer.unmap();
        texels
    }
}
