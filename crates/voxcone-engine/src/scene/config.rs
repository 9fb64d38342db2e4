use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3};

use crate::camera::Camera;
use crate::render::DEFAULT_GRID_SIZE;

use super::light::PointLight;
use super::material::Material;

/// Construction-time settings of a scene.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Material objects start from before their own overrides.
    pub material: Material,
    pub light: PointLight,

    /// Side of the voxel grid.
    pub grid_size: u32,
    pub clear_color: wgpu::Color,

    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,

    /// Directory model and image paths are resolved against.
    pub asset_root: PathBuf,

    pub camera_position: Vec3,
    /// Degrees.
    pub camera_yaw: f32,
    /// Degrees.
    pub camera_pitch: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            material: Material::default(),
            light: PointLight::default(),
            grid_size: DEFAULT_GRID_SIZE,
            clear_color: wgpu::Color::BLACK,
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            asset_root: PathBuf::from("resc"),
            camera_position: Vec3::new(-3.3, 0.0, 0.0),
            camera_yaw: 0.0,
            camera_pitch: 0.0,
        }
    }
}

impl SceneConfig {
    /// Perspective projection for a surface of the given aspect ratio.
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), aspect, self.near, self.far)
    }

    pub fn asset(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.asset_root.join(relative)
    }

    pub fn camera(&self) -> Camera {
        Camera::new(self.camera_position, Vec3::Y, self.camera_yaw, self.camera_pitch)
    }
}
