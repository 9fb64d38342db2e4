//! CPU-side triangle meshes.
//!
//! Meshes are stored flattened (three vertices per triangle, no index buffer)
//! so every vertex can carry its triangle's face normal. The voxelizer picks
//! its projection axis from that normal.

mod mesh_data;
mod primitives;

pub use mesh_data::{MeshData, Vertex};
pub use primitives::{cornell_box, cornell_palette, cube, uv_sphere, CornellWall};
