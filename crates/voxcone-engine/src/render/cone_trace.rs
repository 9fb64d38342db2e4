use crate::error::RenderError;
use crate::geometry::Vertex;

use super::draw::{sampler_entry, texture_entries, texture_entry, DrawItem, ObjectBuffers};
use super::program::{ShaderProgram, FRAGMENT_ENTRY, VERTEX_ENTRY};
use super::{RenderCtx, RenderTarget, Viewport};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Shades objects onto the surface, sampling the voxel grid for indirect
/// light.
///
/// Depth-tested with back-face culling and standard alpha blending. The color
/// target is loaded, not cleared, so the frame's clear color shows through.
#[derive(Default)]
pub struct ConeTracePass {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    textures_bgl: Option<wgpu::BindGroupLayout>,
    objects: Option<ObjectBuffers>,

    depth_size: Viewport,
    depth_view: Option<wgpu::TextureView>,
}

impl ConeTracePass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        program: &ShaderProgram,
        items: &[DrawItem<'_>],
    ) -> Result<(), RenderError> {
        if ctx.viewport.is_empty() {
            return Ok(());
        }
        self.ensure_pipeline(ctx, program)?;
        self.ensure_depth(ctx);

        let (Some(pipeline), Some(textures_bgl), Some(objects), Some(depth_view)) = (
            self.pipeline.as_ref(),
            self.textures_bgl.as_ref(),
            self.objects.as_mut(),
            self.depth_view.as_ref(),
        ) else {
            return Ok(());
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("cone trace pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_pipeline(pipeline);

        for item in items {
            let [grid_view, grid_sampler] = texture_entries(0, &item.grid);
            let [albedo_view, albedo_sampler] = texture_entries(2, &item.albedo);
            let textures = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("cone trace textures"),
                layout: textures_bgl,
                entries: &[grid_view, grid_sampler, albedo_view, albedo_sampler],
            });
            let uniforms = objects.write(ctx.device, ctx.queue, item.key, &item.uniforms);

            rpass.set_bind_group(0, &uniforms, &[]);
            rpass.set_bind_group(1, &textures, &[]);
            item.object.draw(&mut rpass);
        }

        Ok(())
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, program: &ShaderProgram) -> Result<(), RenderError> {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return Ok(());
        }
        let module = program.linked_module()?;

        let objects = ObjectBuffers::new(ctx.device, "cone trace object ubo");
        let textures_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cone trace textures bgl"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::D3),
                sampler_entry(1),
                texture_entry(2, wgpu::TextureViewDimension::D2),
                sampler_entry(3),
            ],
        });

        let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cone trace pipeline layout"),
            bind_group_layouts: &[objects.layout(), &textures_bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cone trace pipeline"),
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
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.textures_bgl = Some(textures_bgl);
        self.objects = Some(objects);
        Ok(())
    }

    /// Keeps the depth buffer the size of the surface.
    fn ensure_depth(&mut self, ctx: &RenderCtx<'_>) {
        if self.depth_size == ctx.viewport && self.depth_view.is_some() {
            return;
        }

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("cone trace depth"),
            size: wgpu::Extent3d {
                width: ctx.viewport.width,
                height: ctx.viewport.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        log::debug!("depth buffer {}x{}", ctx.viewport.width, ctx.viewport.height);
        self.depth_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.depth_size = ctx.viewport;
    }
}
