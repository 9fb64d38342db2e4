//! Pieces shared by the voxelization and cone-tracing passes.

use slotmap::SecondaryMap;

use crate::scene::{ObjectKey, SceneObject};

use super::uniforms::ObjectUniforms;
use super::units::TextureBinding;

/// Texture unit an object's albedo map is bound to.
pub const ALBEDO_UNIT: u32 = 0;
/// Texture unit the voxel grid is sampled from while shading.
pub const VOXEL_UNIT: u32 = 1;

/// One object as a pass sees it.
pub struct DrawItem<'a> {
    pub key: ObjectKey,
    pub object: &'a SceneObject,
    pub uniforms: ObjectUniforms,
    /// What was bound at [`ALBEDO_UNIT`] for this object.
    pub albedo: TextureBinding,
    /// What was bound at [`VOXEL_UNIT`].
    pub grid: TextureBinding,
}

/// One uniform buffer + bind group per object.
///
/// Each pass owns its own set: queue writes all land before the frame's
/// submit, so two passes sharing a buffer would both see the last write.
pub(crate) struct ObjectBuffers {
    label: &'static str,
    layout: wgpu::BindGroupLayout,
    slots: SecondaryMap<ObjectKey, (wgpu::Buffer, wgpu::BindGroup)>,
}

impl ObjectBuffers {
    pub fn new(device: &wgpu::Device, label: &'static str) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ObjectUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });
        Self {
            label,
            layout,
            slots: SecondaryMap::new(),
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Uploads `uniforms` for `key`, creating its buffer on first use.
    pub fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        key: ObjectKey,
        uniforms: &ObjectUniforms,
    ) -> wgpu::BindGroup {
        if let Some((buffer, bind_group)) = self.slots.get(key) {
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(uniforms));
            return bind_group.clone();
        }

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(self.label),
            size: std::mem::size_of::<ObjectUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(self.label),
            layout: &self.layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        queue.write_buffer(&buffer, 0, bytemuck::bytes_of(uniforms));
        self.slots.insert(key, (buffer, bind_group.clone()));
        bind_group
    }
}

pub(crate) fn texture_entry(
    binding: u32,
    dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: dimension,
            multisampled: false,
        },
        count: None,
    }
}

pub(crate) fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

/// View + sampler entries for `texture` at `binding` and `binding + 1`.
pub(crate) fn texture_entries(binding: u32, texture: &TextureBinding) -> [wgpu::BindGroupEntry<'_>; 2] {
    [
        wgpu::BindGroupEntry {
            binding,
            resource: wgpu::BindingResource::TextureView(&texture.view),
        },
        wgpu::BindGroupEntry {
            binding: binding + 1,
            resource: wgpu::BindingResource::Sampler(&texture.sampler),
        },
    ]
}
