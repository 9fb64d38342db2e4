use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::error::AssetError;

/// One corner of a triangle as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
    /// Geometric normal of the owning triangle, shared by its three corners.
    pub face_normal: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x2, // tex_coord
        3 => Float32x3  // face_normal
    ];

    /// Attribute names as the shaders declare them, by location.
    pub const ATTRIBUTE_NAMES: [&'static str; 4] =
        ["position", "normal", "tex_coord", "face_normal"];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Flattened triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Appends a triangle wound counter-clockwise as seen from its front.
    ///
    /// Missing vertex normals fall back to the face normal.
    pub fn push_triangle(&mut self, p: [Vec3; 3], n: Option<[Vec3; 3]>, uv: [Vec2; 3]) {
        let face = face_normal(p);
        let n = n.unwrap_or([face; 3]);
        for i in 0..3 {
            self.vertices.push(Vertex {
                position: p[i].to_array(),
                normal: n[i].to_array(),
                tex_coord: uv[i].to_array(),
                face_normal: face.to_array(),
            });
        }
    }

    /// Appends the quad `a b c d` (counter-clockwise) as two triangles.
    pub fn push_quad(&mut self, corners: [Vec3; 4], uv: [Vec2; 4]) {
        let [a, b, c, d] = corners;
        self.push_triangle([a, b, c], None, [uv[0], uv[1], uv[2]]);
        self.push_triangle([a, c, d], None, [uv[0], uv[2], uv[3]]);
    }

    /// Builds a mesh from flat indexed arrays (3 floats per position/normal,
    /// 2 per texture coordinate) sharing one index list.
    ///
    /// Texture coordinates are flipped vertically: model files put v=0 at
    /// the bottom of the image, wgpu puts it at the top.
    pub fn from_indexed(positions: &[f32], normals: &[f32], texcoords: &[f32], indices: &[u32]) -> Self {
        let pos = |i: usize| Vec3::from_slice(&positions[i * 3..i * 3 + 3]);
        let has_normals = normals.len() == positions.len();
        let has_uvs = texcoords.len() / 2 == positions.len() / 3;

        let mut mesh = MeshData::new();
        for tri in indices.chunks_exact(3) {
            let idx = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if idx.iter().any(|&i| i * 3 + 3 > positions.len()) {
                continue;
            }

            let p = idx.map(pos);
            let n = has_normals.then(|| idx.map(|i| Vec3::from_slice(&normals[i * 3..i * 3 + 3])));
            let uv = if has_uvs {
                idx.map(|i| Vec2::new(texcoords[i * 2], 1.0 - texcoords[i * 2 + 1]))
            } else {
                [Vec2::ZERO; 3]
            };
            mesh.push_triangle(p, n, uv);
        }
        mesh
    }

    /// Loads every model in an OBJ file into one flattened mesh.
    pub fn from_obj(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let options = tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        };

        let (models, _materials) =
            tobj::load_obj(path, &options).map_err(|source| AssetError::Model {
                path: path.to_path_buf(),
                source,
            })?;

        let mut mesh = MeshData::new();
        for model in &models {
            let m = &model.mesh;
            let part = MeshData::from_indexed(&m.positions, &m.normals, &m.texcoords, &m.indices);
            mesh.vertices.extend(part.vertices);
        }

        if mesh.is_empty() {
            return Err(AssetError::EmptyModel {
                path: path.to_path_buf(),
            });
        }

        log::debug!(
            "loaded {} ({} triangles)",
            path.display(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    /// Axis-aligned bounds, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.vertices.iter().map(|v| Vec3::from(v.position));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

/// Unit geometric normal of a counter-clockwise triangle.
///
/// Degenerate triangles get +Y so they still pick a projection axis.
fn face_normal(p: [Vec3; 3]) -> Vec3 {
    (p[1] - p[0])
        .cross(p[2] - p[0])
        .try_normalize()
        .unwrap_or(Vec3::Y)
}
