//! WGSL sources, with the shared uniform block prepended where needed.

pub const VOXELIZE: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/voxelize.wgsl")
);

pub const CONE_TRACING: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/cone_tracing.wgsl")
);

pub const GRID_CLEAR: &str = include_str!("shaders/grid_clear.wgsl");

pub const GRID_MIPMAP: &str = include_str!("shaders/grid_mipmap.wgsl");
