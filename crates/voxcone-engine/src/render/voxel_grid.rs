use glam::{Mat4, UVec3, Vec3};

use crate::error::{BindError, ShaderProgramError};

use super::program::{ShaderProgram, COMPUTE_ENTRY};
use super::shaders;
use super::uniforms::ClearUniform;
use super::units::{TextureBinding, TextureUnits};
use super::RenderCtx;

/// Side of the voxel grid used by the Cornell scene.
pub const DEFAULT_GRID_SIZE: u32 = 64;

pub const VOXEL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Matches `@workgroup_size(4, 4, 4)` in the grid compute shaders.
const WORKGROUP_SIZE: u32 = 4;

/// Number of mip levels down to a single texel.
pub fn mip_level_count(size: u32) -> u32 {
    32 - size.max(1).leading_zeros()
}

pub fn mip_extent(size: u32, level: u32) -> u32 {
    (size >> level).max(1)
}

/// Workgroups needed to cover `extent` texels along one axis.
pub fn workgroup_count(extent: u32) -> u32 {
    extent.div_ceil(WORKGROUP_SIZE)
}

/// Fixed view of the voxelization pass: at the origin, looking down -Z.
pub fn grid_view() -> Mat4 {
    Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y)
}

/// Orthographic box covering world `[-1, 1]^3`.
pub fn grid_projection() -> Mat4 {
    Mat4::orthographic_rh_gl(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0)
}

/// World space to grid clip space. Both passes address the volume through
/// this matrix.
pub fn grid_transform() -> Mat4 {
    grid_projection() * grid_view()
}

/// Texel hit by a point in grid clip space, or `None` outside the volume.
pub fn voxel_coord(ndc: Vec3, size: u32) -> Option<UVec3> {
    let t = ((ndc * 0.5 + 0.5) * size as f32).floor();
    if t.min_element() < 0.0 || t.max_element() >= size as f32 {
        return None;
    }
    Some(t.as_uvec3())
}

/// Mipmapped RGBA8 volume that geometry is voxelized into and cones are
/// traced through.
///
/// Level 0 is written as a storage texture by the voxelization pass. Clearing
/// and mip generation run as compute passes on the caller's encoder, so they
/// are ordered with the render passes around them.
pub struct VoxelGrid {
    size: u32,
    texture: wgpu::Texture,
    sampled: TextureBinding,
    level_views: Vec<wgpu::TextureView>,
    border_clamped: bool,

    clear_pipeline: wgpu::ComputePipeline,
    clear_ubo: wgpu::Buffer,
    clear_bind_groups: Vec<wgpu::BindGroup>,

    mip_pipeline: wgpu::ComputePipeline,
    /// Entry `i` reads level `i` and writes level `i + 1`.
    mip_bind_groups: Vec<wgpu::BindGroup>,
}

impl VoxelGrid {
    pub fn new(ctx: &RenderCtx<'_>, size: u32) -> Result<Self, ShaderProgramError> {
        let size = size.max(1);
        let levels = mip_level_count(size);
        let device = ctx.device;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("voxel grid"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: size,
            },
            mip_level_count: levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D3,
            format: VOXEL_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let border_clamped = ctx.supports(wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER);
        let (address_mode, border_color) = if border_clamped {
            (
                wgpu::AddressMode::ClampToBorder,
                Some(wgpu::SamplerBorderColor::TransparentBlack),
            )
        } else {
            log::warn!("clamp-to-border unsupported; voxel grid clamps to edge");
            (wgpu::AddressMode::ClampToEdge, None)
        };

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("voxel grid sampler"),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            border_color,
            ..Default::default()
        });

        let sampled = TextureBinding {
            view: texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some("voxel grid view"),
                dimension: Some(wgpu::TextureViewDimension::D3),
                ..Default::default()
            }),
            sampler,
            dimension: wgpu::TextureViewDimension::D3,
        };

        let level_views: Vec<wgpu::TextureView> = (0..levels)
            .map(|level| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some("voxel grid level"),
                    dimension: Some(wgpu::TextureViewDimension::D3),
                    base_mip_level: level,
                    mip_level_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        // ── clear ──

        let clear_program = ShaderProgram::build(device, "grid clear", shaders::GRID_CLEAR, &[])?;
        let clear_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("grid clear bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage_entry(1, wgpu::ShaderStages::COMPUTE),
            ],
        });
        let clear_pipeline = compute_pipeline(device, "grid clear", &clear_program, &clear_bgl)?;

        let clear_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("grid clear ubo"),
            size: std::mem::size_of::<ClearUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let clear_bind_groups = level_views
            .iter()
            .map(|view| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("grid clear bg"),
                    layout: &clear_bgl,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: clear_ubo.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(view),
                        },
                    ],
                })
            })
            .collect();

        // ── mipmap ──

        let mip_program = ShaderProgram::build(device, "grid mipmap", shaders::GRID_MIPMAP, &[])?;
        let mip_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("grid mipmap bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D3,
                        multisampled: false,
                    },
                    count: None,
                },
                storage_entry(1, wgpu::ShaderStages::COMPUTE),
            ],
        });
        let mip_pipeline = compute_pipeline(device, "grid mipmap", &mip_program, &mip_bgl)?;

        let mip_bind_groups = level_views
            .windows(2)
            .map(|pair| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("grid mipmap bg"),
                    layout: &mip_bgl,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&pair[0]),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&pair[1]),
                        },
                    ],
                })
            })
            .collect();

        log::info!("voxel grid {size}^3, {levels} mip levels");

        Ok(Self {
            size,
            texture,
            sampled,
            level_views,
            border_clamped,
            clear_pipeline,
            clear_ubo,
            clear_bind_groups,
            mip_pipeline,
            mip_bind_groups,
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn mip_level_count(&self) -> u32 {
        self.texture.mip_level_count()
    }

    /// Whether out-of-grid samples read transparent black.
    pub fn border_clamped(&self) -> bool {
        self.border_clamped
    }

    /// Fills every texel of every level with `color`.
    pub fn clear(&self, queue: &wgpu::Queue, encoder: &mut wgpu::CommandEncoder, color: [f32; 4]) {
        queue.write_buffer(&self.clear_ubo, 0, bytemuck::bytes_of(&ClearUniform { color }));

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("grid clear pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.clear_pipeline);
        for (level, bind_group) in self.clear_bind_groups.iter().enumerate() {
            let n = workgroup_count(mip_extent(self.size, level as u32));
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(n, n, n);
        }
    }

    /// Rebuilds levels 1.. from level 0.
    pub fn generate_mipmaps(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("grid mipmap pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.mip_pipeline);
        for (i, bind_group) in self.mip_bind_groups.iter().enumerate() {
            let n = workgroup_count(mip_extent(self.size, i as u32 + 1));
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(n, n, n);
        }
    }

    /// Makes the whole mip chain available for sampling at `unit`.
    pub fn bind(&self, units: &mut TextureUnits, unit: u32) -> Result<(), BindError> {
        units.bind(unit, self.binding())
    }

    pub fn binding(&self) -> TextureBinding {
        self.sampled.clone()
    }

    #[cfg(test)]
    pub(crate) fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// Level 0 as a write-only image.
    pub fn storage_view(&self) -> &wgpu::TextureView {
        &self.level_views[0]
    }
}

fn storage_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::StorageTexture {
            access: wgpu::StorageTextureAccess::WriteOnly,
            format: VOXEL_FORMAT,
            view_dimension: wgpu::TextureViewDimension::D3,
        },
        count: None,
    }
}

fn compute_pipeline(
    device: &wgpu::Device,
    label: &str,
    program: &ShaderProgram,
    bgl: &wgpu::BindGroupLayout,
) -> Result<wgpu::ComputePipeline, ShaderProgramError> {
    let module = program.linked_module()?;
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[bgl],
        immediate_size: 0,
    });
    Ok(device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        module,
        entry_point: Some(COMPUTE_ENTRY),
        compilation_options: Default::default(),
        cache: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::gpu_test::TestGpu;
    use crate::render::Viewport;

    // ── mip chain ─────────────────────────────────────────────────────────

    #[test]
    fn sixty_four_has_seven_levels() {
        assert_eq!(mip_level_count(64), 7);
        assert_eq!(mip_extent(64, 6), 1);
    }

    #[test]
    fn odd_sizes_round_down_per_level() {
        assert_eq!(mip_level_count(1), 1);
        assert_eq!(mip_level_count(100), 7);
        assert_eq!(mip_extent(100, 1), 50);
        assert_eq!(mip_extent(100, 6), 1);
        assert_eq!(mip_extent(100, 9), 1);
    }

    #[test]
    fn workgroups_cover_the_extent() {
        assert_eq!(workgroup_count(64), 16);
        assert_eq!(workgroup_count(2), 1);
        assert_eq!(workgroup_count(5), 2);
    }

    // ── addressing ────────────────────────────────────────────────────────

    #[test]
    fn corners_map_to_edge_texels() {
        assert_eq!(voxel_coord(Vec3::splat(-1.0), 64), Some(UVec3::ZERO));
        assert_eq!(voxel_coord(Vec3::splat(0.999), 64), Some(UVec3::splat(63)));
    }

    #[test]
    fn outside_is_rejected() {
        assert_eq!(voxel_coord(Vec3::new(1.0, 0.0, 0.0), 64), None);
        assert_eq!(voxel_coord(Vec3::new(0.0, -1.01, 0.0), 64), None);
    }

    #[test]
    fn grid_transform_keeps_the_unit_cube_inside() {
        let g = grid_transform();
        for corner in [Vec3::splat(-0.99), Vec3::splat(0.99), Vec3::new(0.5, -0.5, 0.9)] {
            let ndc = g.project_point3(corner);
            assert!(voxel_coord(ndc, DEFAULT_GRID_SIZE).is_some(), "{corner} -> {ndc}");
        }
        assert!(voxel_coord(g.project_point3(Vec3::new(0.0, 0.0, 1.5)), 64).is_none());
    }

    #[test]
    fn grid_transform_is_an_axis_aligned_unit_box() {
        let g = grid_transform();
        assert!(g.project_point3(Vec3::ZERO).abs_diff_eq(Vec3::ZERO, 1e-6));
        let p = g.project_point3(Vec3::new(0.5, 0.25, 0.0));
        assert!(p.abs_diff_eq(Vec3::new(0.5, 0.25, 0.0), 1e-6));
    }

    // ── gpu (skipped without an adapter) ──────────────────────────────────

    fn assert_close(got: [u8; 4], want: [u8; 4], at: usize) {
        let off = got.iter().zip(want).any(|(g, w)| g.abs_diff(w) > 1);
        assert!(!off, "texel {at}: got {got:?}, want {want:?}");
    }

    #[test]
    fn clear_fills_every_texel_of_every_level() {
        let Some(gpu) = TestGpu::new() else { return };
        let grid = VoxelGrid::new(&gpu.ctx(Viewport::new(8, 8)), 8).unwrap();

        let mut encoder = gpu.encoder();
        grid.clear(&gpu.queue, &mut encoder, [0.2, 0.4, 0.6, 1.0]);
        gpu.submit(encoder);

        for level in 0..grid.mip_level_count() {
            let texels = gpu.read_level(grid.texture(), level);
            assert_eq!(texels.len(), (mip_extent(8, level) as usize).pow(3));
            for (i, t) in texels.into_iter().enumerate() {
                assert_close(t, [51, 102, 153, 255], i);
            }
        }
    }

    #[test]
    fn second_clear_replaces_the_first() {
        let Some(gpu) = TestGpu::new() else { return };
        let grid = VoxelGrid::new(&gpu.ctx(Viewport::new(4, 4)), 4).unwrap();

        let mut encoder = gpu.encoder();
        grid.clear(&gpu.queue, &mut encoder, [1.0; 4]);
        gpu.submit(encoder);
        let mut encoder = gpu.encoder();
        grid.clear(&gpu.queue, &mut encoder, [0.0; 4]);
        gpu.submit(encoder);

        assert!(gpu.read_level(grid.texture(), 0).iter().all(|t| *t == [0; 4]));
    }

    #[test]
    fn mip_levels_are_box_filtered() {
        let Some(gpu) = TestGpu::new() else { return };
        let size = 4u32;
        let grid = VoxelGrid::new(&gpu.ctx(Viewport::new(4, 4)), size).unwrap();

        // texel (x, y, z) holds 2 * (x + 4y + 16z) so each 2x2x2 mean is whole
        let seed: Vec<u8> = (0..size.pow(3))
            .flat_map(|i| {
                let v = (2 * i) as u8;
                [v, 255 - v, v / 2, 255]
            })
            .collect();
        gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: grid.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &seed,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size * 4),
                rows_per_image: Some(size),
            },
            wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: size,
            },
        );

        let mut encoder = gpu.encoder();
        grid.generate_mipmaps(&mut encoder);
        gpu.submit(encoder);

        let mut src = gpu.read_level(grid.texture(), 0);
        for level in 1..grid.mip_level_count() {
            let (n, m) = (mip_extent(size, level) as usize, mip_extent(size, level - 1) as usize);
            let dst = gpu.read_level(grid.texture(), level);
            for z in 0..n {
                for y in 0..n {
                    for x in 0..n {
                        let mut sum = [0u32; 4];
                        for (dx, dy, dz) in (0..8).map(|i| (i & 1, (i >> 1) & 1, i >> 2)) {
                            let t = src[(2 * x + dx) + (2 * y + dy) * m + (2 * z + dz) * m * m];
                            sum.iter_mut().zip(t).for_each(|(s, c)| *s += c as u32);
                        }
                        let want = sum.map(|s| ((s as f32) / 8.0).round() as u8);
                        let at = x + y * n + z * n * n;
                        assert_close(dst[at], want, at);
                    }
                }
            }
            src = dst;
        }
    }
}
