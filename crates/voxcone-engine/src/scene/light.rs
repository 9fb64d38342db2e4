use glam::Vec3;

use crate::render::uniforms::{vec4, LightUniform};

/// Point light with constant/linear/quadratic distance attenuation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl PointLight {
    /// Intensity multiplier at `distance`.
    pub fn attenuation(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }

    pub fn to_uniform(&self) -> LightUniform {
        LightUniform {
            position: vec4(self.position, 1.0),
            ambient: vec4(self.ambient, 1.0),
            diffuse: vec4(self.diffuse, 1.0),
            specular: vec4(self.specular, 1.0),
            attenuation: [self.constant, self.linear, self.quadratic, 0.0],
        }
    }
}

impl Default for PointLight {
    /// Soft white light just under the ceiling of a unit box.
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.85, 0.0),
            ambient: Vec3::splat(0.5),
            diffuse: Vec3::splat(0.7),
            specular: Vec3::splat(0.3),
            constant: 1.0,
            linear: 0.0,
            quadratic: 1.0,
        }
    }
}
