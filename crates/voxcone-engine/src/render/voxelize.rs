use crate::error::RenderError;

use super::draw::{sampler_entry, texture_entries, texture_entry, DrawItem, ObjectBuffers};
use super::program::{ShaderProgram, FRAGMENT_ENTRY, VERTEX_ENTRY};
use super::voxel_grid::{VoxelGrid, VOXEL_FORMAT};
use super::RenderCtx;
use crate::geometry::Vertex;

const DUMMY_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Renders objects into the voxel grid.
///
/// Runs with an N x N viewport, no depth test, no culling and no blending, so
/// every triangle reaches the grid regardless of facing. Color output goes to
/// a dummy target with writes masked off; the fragment stage stores into the
/// grid directly.
#[derive(Default)]
pub struct VoxelizePass {
    pipeline: Option<wgpu::RenderPipeline>,
    textures_bgl: Option<wgpu::BindGroupLayout>,
    objects: Option<ObjectBuffers>,

    dummy_size: u32,
    dummy_view: Option<wgpu::TextureView>,
}

impl VoxelizePass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Voxelizes `items` into `grid`'s level 0. The grid should have been
    /// cleared earlier on the same encoder; mipmaps are left to the caller.
    pub fn record(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        program: &ShaderProgram,
        grid: &VoxelGrid,
        items: &[DrawItem<'_>],
    ) -> Result<(), RenderError> {
        self.ensure_pipeline(ctx, program)?;
        self.ensure_dummy_target(ctx, grid.size());

        let (Some(pipeline), Some(textures_bgl), Some(objects), Some(dummy_view)) = (
            self.pipeline.as_ref(),
            self.textures_bgl.as_ref(),
            self.objects.as_mut(),
            self.dummy_view.as_ref(),
        ) else {
            return Ok(());
        };

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("voxelize pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: dummy_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Discard,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_pipeline(pipeline);

        for item in items {
            let [albedo_view, albedo_sampler] = texture_entries(1, &item.albedo);
            let textures = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("voxelize textures"),
                layout: textures_bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(grid.storage_view()),
                    },
                    albedo_view,
                    albedo_sampler,
                ],
            });
            let uniforms = objects.write(ctx.device, ctx.queue, item.key, &item.uniforms);

            rpass.set_bind_group(0, &uniforms, &[]);
            rpass.set_bind_group(1, &textures, &[]);
            item.object.draw(&mut rpass);
        }

        Ok(())
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, program: &ShaderProgram) -> Result<(), RenderError> {
        if self.pipeline.is_some() {
            return Ok(());
        }
        let module = program.linked_module()?;

        let objects = ObjectBuffers::new(ctx.device, "voxelize object ubo");
        let textures_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("voxelize textures bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: VOXEL_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D3,
                    },
                    count: None,
                },
                texture_entry(1, wgpu::TextureViewDimension::D2),
                sampler_entry(2),
            ],
        });

        let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("voxelize pipeline layout"),
            bind_group_layouts: &[objects.layout(), &textures_bgl],
            immediate_size: 0,
        });

        let conservative = ctx.supports(wgpu::Features::CONSERVATIVE_RASTERIZATION);
        if !conservative {
            log::info!("conservative rasterization unavailable; thin triangles may leave gaps in the grid");
        }

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("voxelize pipeline"),
            layout: Some(&layout),

            vertex: wgpu::VertexState {
                module,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: DUMMY_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::empty(),
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline = Some(pipeline);
        self.textures_bgl = Some(textures_bgl);
        self.objects = Some(objects);
        Ok(())
    }

    fn ensure_dummy_target(&mut self, ctx: &RenderCtx<'_>, size: u32) {
        if self.dummy_size == size && self.dummy_view.is_some() {
            return;
        }

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("voxelize dummy target"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DUMMY_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        self.dummy_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.dummy_size = size;
    }
}
