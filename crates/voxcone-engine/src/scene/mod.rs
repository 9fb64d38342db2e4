//! Scene contract, object registry, and the pieces a scene is assembled from.

mod config;
mod controls;
mod host;
mod light;
mod material;
mod mode;
mod object;
mod registry;
mod voxel_scene;

pub use config::SceneConfig;
pub use controls::Controls;
pub use host::SceneHost;
pub use light::PointLight;
pub use material::Material;
pub use mode::ShadingMode;
pub use object::{object_uniforms, PassInputs, SceneObject};
pub use registry::{ObjectKey, ObjectTable, Registry};
pub use voxel_scene::{VoxelScene, CONE_TRACING, VOXELIZATION};

use crate::error::RenderError;
use crate::input::InputEvent;
use crate::render::{RenderCtx, RenderTarget};

/// A renderable world driven by [`SceneHost`].
pub trait Scene {
    /// Advances time-dependent state. `elapsed` is seconds since start.
    fn update(&mut self, dt: f32, elapsed: f32);

    /// Records the frame into `target`. The color target has already been
    /// cleared to [`clear_color`](Self::clear_color).
    fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) -> Result<(), RenderError>;

    fn handle_event(&mut self, event: &InputEvent, dt: f32);

    fn clear_color(&self) -> wgpu::Color {
        wgpu::Color::BLACK
    }
}
