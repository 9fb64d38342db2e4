//! CPU mirrors of the uniform blocks declared in `shaders/common.wgsl`.
//!
//! Every field is 4-byte scalars in multiples of 16 bytes, so the Rust layout
//! is the WGSL uniform layout without hidden padding.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

// ── light ─────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct LightUniform {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// constant, linear, quadratic, unused
    pub attenuation: [f32; 4],
}

// ── material ──────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct MaterialUniform {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// shininess, emissivity, diffuse reflectivity, specular reflectivity
    pub params: [f32; 4],
}

// ── per-object block ──────────────────────────────────────────────────────

/// Everything one draw of one object needs, for either pass.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ObjectUniforms {
    /// Projection * view * model of the current pass.
    pub transform: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// Maps world space into voxel-grid clip space.
    pub grid_transform: [[f32; 4]; 4],
    pub view_pos: [f32; 4],
    pub light: LightUniform,
    pub material: MaterialUniform,
    pub grid_size: u32,
    pub mode: u32,
    pub _pad: [u32; 2],
}

impl ObjectUniforms {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        transform: Mat4,
        model: Mat4,
        grid_transform: Mat4,
        view_pos: Vec3,
        light: LightUniform,
        material: MaterialUniform,
        grid_size: u32,
        mode: u32,
    ) -> Self {
        Self {
            transform: transform.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            grid_transform: grid_transform.to_cols_array_2d(),
            view_pos: view_pos.extend(1.0).to_array(),
            light,
            material,
            grid_size,
            mode,
            _pad: [0; 2],
        }
    }
}

/// Clear color for the voxel grid compute fill.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ClearUniform {
    pub color: [f32; 4],
}

pub(crate) fn vec4(v: Vec3, w: f32) -> [f32; 4] {
    v.extend(w).to_array()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 80);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 64);
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 368);
        assert_eq!(std::mem::size_of::<ObjectUniforms>() % 16, 0);
    }

    #[test]
    fn matrices_are_column_major() {
        let t = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let u = ObjectUniforms::new(
            t,
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Vec3::ZERO,
            LightUniform::zeroed(),
            MaterialUniform::zeroed(),
            64,
            0,
        );
        assert_eq!(u.transform[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(u.view_pos, [0.0, 0.0, 0.0, 1.0]);
    }
}
