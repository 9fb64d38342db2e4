use glam::{Mat4, Vec3};

use crate::render::uniforms::{LightUniform, ObjectUniforms};
use crate::render::Mesh;
use crate::transform::{Transform, TransformLookup};

use super::material::Material;

/// Per-pass values shared by every object drawn in that pass.
#[derive(Debug, Clone, Copy)]
pub struct PassInputs {
    pub grid_transform: Mat4,
    pub view_pos: Vec3,
    pub light: LightUniform,
    pub grid_size: u32,
    pub mode: u32,
}

/// Packs one object's uniform block. The transform's view and projection
/// must already be set for the pass.
pub fn object_uniforms(
    transform: &Transform,
    material: &Material,
    lookup: &impl TransformLookup,
    inputs: &PassInputs,
) -> ObjectUniforms {
    ObjectUniforms::new(
        transform.mvp(lookup),
        transform.model_transform(lookup),
        inputs.grid_transform,
        inputs.view_pos,
        inputs.light,
        material.to_uniform(),
        inputs.grid_size,
        inputs.mode,
    )
}

/// A mesh placed in the scene with its own material and transform.
///
/// The texture is a name into the scene's texture table. Drawing assumes the
/// caller has already bound the pipeline and this object's uniforms.
pub struct SceneObject {
    mesh: Mesh,
    texture: String,
    pub material: Material,
    pub transform: Transform,
}

impl SceneObject {
    pub fn new(mesh: Mesh, material: Material, texture: impl Into<String>) -> Self {
        Self {
            mesh,
            texture: texture.into(),
            material,
            transform: Transform::new(),
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn texture_name(&self) -> &str {
        &self.texture
    }

    pub fn uniforms(&self, lookup: &impl TransformLookup, inputs: &PassInputs) -> ObjectUniforms {
        object_uniforms(&self.transform, &self.material, lookup, inputs)
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.mesh.draw(pass);
    }
}

impl AsRef<Transform> for SceneObject {
    fn as_ref(&self) -> &Transform {
        &self.transform
    }
}
