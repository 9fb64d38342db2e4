use glam::Vec3;

use crate::render::uniforms::{vec4, MaterialUniform};

/// Phong material plus the reflectivities the cone tracer scales indirect
/// light by. Plain value, copied into each object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    /// Phong exponent.
    pub shininess: f32,
    /// Share of the surface color emitted regardless of lighting.
    pub emissivity: f32,
    pub diffuse_reflectivity: f32,
    pub specular_reflectivity: f32,
}

impl Material {
    /// Emissivity 0, both reflectivities 1.
    pub fn new(ambient: Vec3, diffuse: Vec3, specular: Vec3, shininess: f32) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            shininess,
            emissivity: 0.0,
            diffuse_reflectivity: 1.0,
            specular_reflectivity: 1.0,
        }
    }

    pub fn with_emissivity(mut self, emissivity: f32) -> Self {
        self.emissivity = emissivity;
        self
    }

    pub fn with_diffuse_reflectivity(mut self, value: f32) -> Self {
        self.diffuse_reflectivity = value;
        self
    }

    pub fn with_specular_reflectivity(mut self, value: f32) -> Self {
        self.specular_reflectivity = value;
        self
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        MaterialUniform {
            ambient: vec4(self.ambient, 1.0),
            diffuse: vec4(self.diffuse, 1.0),
            specular: vec4(self.specular, 1.0),
            params: [
                self.shininess,
                self.emissivity,
                self.diffuse_reflectivity,
                self.specular_reflectivity,
            ],
        }
    }
}

impl Default for Material {
    /// White, moderately glossy, non-emissive.
    fn default() -> Self {
        Self::new(Vec3::ONE, Vec3::ONE, Vec3::splat(0.5), 0.6 * 128.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_full_reflectivity_and_no_emission() {
        let m = Material::new(Vec3::ZERO, Vec3::ONE, Vec3::ONE, 32.0);
        assert_eq!(m.emissivity, 0.0);
        assert_eq!(m.diffuse_reflectivity, 1.0);
        assert_eq!(m.specular_reflectivity, 1.0);
    }

    #[test]
    fn uniform_packs_scalars_in_order() {
        let m = Material::default()
            .with_emissivity(0.7)
            .with_specular_reflectivity(0.1);
        let u = m.to_uniform();
        assert_eq!(u.params, [76.8, 0.7, 1.0, 0.1]);
        assert_eq!(u.specular, [0.5, 0.5, 0.5, 1.0]);
    }
}
