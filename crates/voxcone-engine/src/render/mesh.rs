use std::path::Path;

use wgpu::util::DeviceExt;

use crate::geometry::MeshData;

/// Vertex buffer of a flattened triangle list.
pub struct Mesh {
    vbo: wgpu::Buffer,
    vertex_count: u32,
}

impl Mesh {
    pub fn from_data(device: &wgpu::Device, label: &str, data: &MeshData) -> Self {
        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            vbo,
            vertex_count: data.vertices.len() as u32,
        }
    }

    /// Loads an OBJ file, or uploads `fallback()` if that fails.
    pub fn load_or(
        device: &wgpu::Device,
        path: impl AsRef<Path>,
        fallback: impl FnOnce() -> MeshData,
    ) -> Self {
        let path = path.as_ref();
        let label = path.display().to_string();
        match MeshData::from_obj(path) {
            Ok(data) => Self::from_data(device, &label, &data),
            Err(e) => {
                log::warn!("{e}; using built-in stand-in");
                Self::from_data(device, &label, &fallback())
            }
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Issues the draw. Pipeline and bind groups must already be set.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.vertex_count == 0 {
            return;
        }
        pass.set_vertex_buffer(0, self.vbo.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}
