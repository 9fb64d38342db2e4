//! GPU rendering subsystem.
//!
//! Two passes per frame share one voxel grid: [`VoxelizePass`] writes lit
//! geometry into it, [`ConeTracePass`] shades the visible surfaces by tracing
//! cones through its mip chain. Each pass owns its pipelines and per-object
//! uniform buffers; shader programs, meshes and textures are handed in by the
//! scene that owns them.

mod cone_trace;
mod ctx;
mod draw;
#[cfg(test)]
pub(crate) mod gpu_test;
mod mesh;
mod program;
pub mod shaders;
mod texture;
pub mod uniforms;
mod units;
mod voxel_grid;
mod voxelize;

pub use cone_trace::{ConeTracePass, DEPTH_FORMAT};
pub use ctx::{RenderCtx, RenderTarget, Viewport};
pub use draw::{DrawItem, ALBEDO_UNIT, VOXEL_UNIT};
pub use mesh::Mesh;
pub use program::{ShaderProgram, COMPUTE_ENTRY, FRAGMENT_ENTRY, VERTEX_ENTRY};
pub use texture::Texture2d;
pub use units::{TextureBinding, TextureUnits};
pub use voxel_grid::{
    grid_projection, grid_transform, grid_view, mip_extent, mip_level_count, voxel_coord,
    workgroup_count, VoxelGrid, DEFAULT_GRID_SIZE, VOXEL_FORMAT,
};
pub use voxelize::VoxelizePass;
