use std::path::Path;

use glam::Mat4;

use crate::camera::Camera;
use crate::error::{RenderError, ShaderProgramError};
use crate::geometry::{MeshData, Vertex};
use crate::input::InputEvent;
use crate::render::{
    grid_projection, grid_transform, grid_view, shaders, ConeTracePass, DrawItem, Mesh,
    RenderCtx, RenderTarget, ShaderProgram, Texture2d, TextureUnits, VoxelGrid, VoxelizePass,
    ALBEDO_UNIT, VOXEL_UNIT,
};

use super::config::SceneConfig;
use super::controls::Controls;
use super::light::PointLight;
use super::object::{PassInputs, SceneObject};
use super::registry::{ObjectKey, Registry};

/// Registry name of the shading program.
pub const CONE_TRACING: &str = "ConeTracing";
/// Registry name of the voxelization program.
pub const VOXELIZATION: &str = "Voxelization";

/// Owns a voxel cone traced world: objects, programs, textures, camera,
/// light, and the grid. Content is added by whoever builds it.
///
/// Each [`render`](Self::render) clears the grid, voxelizes every object,
/// rebuilds the grid's mips, then shades every object from the camera. All of
/// it goes onto one encoder, so the shading reads see the finished grid.
pub struct VoxelScene {
    pub config: SceneConfig,
    pub registry: Registry,
    pub camera: Camera,
    pub controls: Controls,
    pub light: PointLight,

    grid: VoxelGrid,
    units: TextureUnits,
    voxelize: VoxelizePass,
    cone_trace: ConeTracePass,
}

impl VoxelScene {
    /// Compiles both programs and allocates the grid. Fails on the first
    /// program that does not compile or link.
    pub fn new(ctx: &RenderCtx<'_>, config: SceneConfig) -> Result<Self, ShaderProgramError> {
        let mut registry = Registry::new();
        for (name, source) in [
            (CONE_TRACING, shaders::CONE_TRACING),
            (VOXELIZATION, shaders::VOXELIZE),
        ] {
            let program = ShaderProgram::build(ctx.device, name, source, &Vertex::ATTRIBUTE_NAMES)?;
            registry.insert_program(name, program);
        }

        let grid = VoxelGrid::new(ctx, config.grid_size)?;
        let units = TextureUnits::from_limits(&ctx.limits);
        log::debug!("{} texture units available", units.max_units());

        Ok(Self {
            camera: config.camera(),
            light: config.light,
            controls: Controls::new(),
            registry,
            grid,
            units,
            voxelize: VoxelizePass::new(),
            cone_trace: ConeTracePass::new(),
            config,
        })
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    // ── content ───────────────────────────────────────────────────────────

    /// Loads `file` from the asset root, or uploads `fallback()` with a
    /// warning.
    pub fn load_mesh(
        &self,
        ctx: &RenderCtx<'_>,
        file: impl AsRef<Path>,
        fallback: impl FnOnce() -> MeshData,
    ) -> Mesh {
        Mesh::load_or(ctx.device, self.config.asset(file), fallback)
    }

    /// Registers the image at `file` as `name`, or `fallback()` if it cannot
    /// be read.
    pub fn load_texture_or(
        &mut self,
        ctx: &RenderCtx<'_>,
        name: &str,
        file: impl AsRef<Path>,
        fallback: impl FnOnce() -> Texture2d,
    ) {
        let texture = match Texture2d::load(ctx.device, ctx.queue, self.config.asset(file)) {
            Ok(t) => t,
            Err(e) => {
                log::warn!("{e}; texture '{name}' uses a stand-in");
                fallback()
            }
        };
        self.registry.insert_texture(name, texture);
    }

    /// Like [`load_texture_or`](Self::load_texture_or) with plain white as
    /// the stand-in.
    pub fn load_texture(&mut self, ctx: &RenderCtx<'_>, name: &str, file: impl AsRef<Path>) {
        self.load_texture_or(ctx, name, file, || Texture2d::white(ctx.device, ctx.queue));
    }

    /// A new object using the configured material, not yet in the scene.
    pub fn new_object(&self, mesh: Mesh, texture: &str) -> SceneObject {
        SceneObject::new(mesh, self.config.material, texture)
    }

    /// Adds `object` under `name`, replacing any object already there.
    pub fn insert_object(&mut self, name: &str, object: SceneObject) -> ObjectKey {
        self.registry.objects.insert(name, object)
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.registry.objects.get_mut(name)
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// Routes input to the camera controls.
    pub fn handle_event(&mut self, event: &InputEvent) {
        self.controls.handle_event(event, &mut self.camera);
    }

    /// Feeds held keys to the camera and applies one smoothing step.
    pub fn step(&mut self, dt: f32) {
        self.controls.apply(&mut self.camera, dt);
        self.camera.update();
    }

    /// Records one frame: clear grid, voxelize, mipmap, shade.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) -> Result<(), RenderError> {
        let inputs = PassInputs {
            grid_transform: grid_transform(),
            view_pos: self.camera.position(),
            light: self.light.to_uniform(),
            grid_size: self.grid.size(),
            mode: self.controls.mode().index(),
        };
        record_frame(&mut FrameRecorder {
            scene: self,
            ctx,
            target,
            inputs,
        })
    }

    fn set_pass_matrices(&mut self, view: Mat4, proj: Mat4) {
        for (_, object) in self.registry.objects.iter_mut() {
            object.transform.set_view(view);
            object.transform.set_proj(proj);
        }
    }
}

/// The grid-dependent stages of a frame.
pub(crate) trait FrameStages {
    fn clear_grid(&mut self) -> Result<(), RenderError>;
    fn voxelize(&mut self) -> Result<(), RenderError>;
    fn generate_mipmaps(&mut self) -> Result<(), RenderError>;
    fn shade(&mut self) -> Result<(), RenderError>;
}

/// Shading samples the grid, so it runs only after the grid is rebuilt. The
/// first failing stage ends the frame.
pub(crate) fn record_frame(stages: &mut impl FrameStages) -> Result<(), RenderError> {
    stages.clear_grid()?;
    stages.voxelize()?;
    stages.generate_mipmaps()?;
    stages.shade()
}

/// Records every stage onto the frame's encoder.
struct FrameRecorder<'a, 'c, 't> {
    scene: &'a mut VoxelScene,
    ctx: &'a RenderCtx<'c>,
    target: &'a mut RenderTarget<'t>,
    inputs: PassInputs,
}

impl FrameStages for FrameRecorder<'_, '_, '_> {
    fn clear_grid(&mut self) -> Result<(), RenderError> {
        self.scene.grid.clear(self.ctx.queue, self.target.encoder, [0.0; 4]);
        Ok(())
    }

    fn voxelize(&mut self) -> Result<(), RenderError> {
        // fixed orthographic view of the grid volume
        self.scene.set_pass_matrices(grid_view(), grid_projection());

        let scene = &mut *self.scene;
        let items = draw_items(&scene.registry, &mut scene.units, &scene.grid, &self.inputs)?;
        let program = scene.registry.program(VOXELIZATION)?;
        scene
            .voxelize
            .record(self.ctx, self.target.encoder, program, &scene.grid, &items)
    }

    fn generate_mipmaps(&mut self) -> Result<(), RenderError> {
        self.scene.grid.generate_mipmaps(self.target.encoder);
        Ok(())
    }

    fn shade(&mut self) -> Result<(), RenderError> {
        let proj = self.scene.config.projection(self.ctx.viewport.aspect());
        let view = self.scene.camera.view_matrix();
        self.scene.set_pass_matrices(view, proj);

        let scene = &mut *self.scene;
        let items = draw_items(&scene.registry, &mut scene.units, &scene.grid, &self.inputs)?;
        let program = scene.registry.program(CONE_TRACING)?;
        scene.cone_trace.record(self.ctx, self.target, program, &items)
    }
}

/// Binds each object's textures and collects what the passes read.
fn draw_items<'a>(
    registry: &'a Registry,
    units: &mut TextureUnits,
    grid: &VoxelGrid,
    inputs: &PassInputs,
) -> Result<Vec<DrawItem<'a>>, RenderError> {
    grid.bind(units, VOXEL_UNIT)?;
    let grid_binding = units.require(VOXEL_UNIT)?.clone();

    let mut items = Vec::with_capacity(registry.objects.len());
    for (key, object) in registry.objects.iter() {
        let texture = registry.texture(object.texture_name())?;
        units.bind(ALBEDO_UNIT, texture.binding())?;
        items.push(DrawItem {
            key,
            object,
            uniforms: object.uniforms(&registry.objects, inputs),
            albedo: units.require(ALBEDO_UNIT)?.clone(),
            grid: grid_binding.clone(),
        });
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindError;
    use crate::geometry::cube;
    use crate::render::gpu_test::{TestGpu, TARGET_FORMAT};
    use crate::render::Viewport;

    // ── stage order ───────────────────────────────────────────────────────

    #[derive(Default)]
    struct Trace {
        stages: Vec<&'static str>,
        fail_at: Option<&'static str>,
    }

    impl Trace {
        fn run(&mut self, stage: &'static str) -> Result<(), RenderError> {
            self.stages.push(stage);
            match self.fail_at {
                Some(f) if f == stage => Err(RenderError::Bind(BindError::Unbound { unit: 0 })),
                _ => Ok(()),
            }
        }
    }

    impl FrameStages for Trace {
        fn clear_grid(&mut self) -> Result<(), RenderError> {
            self.run("clear")
        }
        fn voxelize(&mut self) -> Result<(), RenderError> {
            self.run("voxelize")
        }
        fn generate_mipmaps(&mut self) -> Result<(), RenderError> {
            self.run("mipmap")
        }
        fn shade(&mut self) -> Result<(), RenderError> {
            self.run("shade")
        }
    }

    #[test]
    fn grid_is_rebuilt_before_shading() {
        let mut trace = Trace::default();
        record_frame(&mut trace).unwrap();
        assert_eq!(trace.stages, ["clear", "voxelize", "mipmap", "shade"]);
    }

    #[test]
    fn failed_voxelization_skips_the_rest() {
        let mut trace = Trace {
            fail_at: Some("voxelize"),
            ..Default::default()
        };
        assert!(record_frame(&mut trace).is_err());
        assert_eq!(trace.stages, ["clear", "voxelize"]);
    }

    // ── gpu (skipped without an adapter) ──────────────────────────────────

    fn scene_with_cube(gpu: &TestGpu, texture: &str) -> (VoxelScene, ObjectKey) {
        let ctx = gpu.ctx(Viewport::new(32, 32));
        let config = SceneConfig {
            grid_size: 8,
            ..SceneConfig::default()
        };
        let mut scene = VoxelScene::new(&ctx, config).unwrap();
        scene
            .registry
            .insert_texture("White", Texture2d::white(&gpu.device, &gpu.queue));
        let mesh = Mesh::from_data(&gpu.device, "cube", &cube(0.5));
        let key = scene.insert_object("Cube", scene.new_object(mesh, texture));
        (scene, key)
    }

    fn color_target(gpu: &TestGpu) -> wgpu::TextureView {
        gpu.device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("test color"),
                size: wgpu::Extent3d {
                    width: 32,
                    height: 32,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: TARGET_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    #[test]
    fn draw_items_borrow_the_registered_objects() {
        let Some(gpu) = TestGpu::new() else { return };
        let (mut scene, key) = scene_with_cube(&gpu, "White");
        let inputs = PassInputs {
            grid_transform: grid_transform(),
            view_pos: scene.camera.position(),
            light: scene.light.to_uniform(),
            grid_size: scene.grid.size(),
            mode: 0,
        };

        let items = draw_items(&scene.registry, &mut scene.units, &scene.grid, &inputs).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].key, key);
        let registered = scene.registry.objects.get("Cube").unwrap();
        assert!(std::ptr::eq(items[0].object, registered));
        assert_eq!(items[0].grid.dimension, wgpu::TextureViewDimension::D3);
        assert_eq!(items[0].albedo.dimension, wgpu::TextureViewDimension::D2);
    }

    #[test]
    fn unknown_texture_fails_the_frame() {
        let Some(gpu) = TestGpu::new() else { return };
        let (mut scene, _) = scene_with_cube(&gpu, "Missing");

        let view = color_target(&gpu);
        let mut encoder = gpu.encoder();
        let ctx = gpu.ctx(Viewport::new(32, 32));

        let err = scene
            .render(&ctx, &mut RenderTarget::new(&mut encoder, &view))
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingTexture(name) if name == "Missing"));
    }

    #[test]
    fn full_frame_records_and_submits() {
        let Some(gpu) = TestGpu::new() else { return };
        let (mut scene, _) = scene_with_cube(&gpu, "White");

        let view = color_target(&gpu);
        let ctx = gpu.ctx(Viewport::new(32, 32));

        for _ in 0..2 {
            let mut encoder = gpu.encoder();
            scene
                .render(&ctx, &mut RenderTarget::new(&mut encoder, &view))
                .unwrap();
            gpu.submit(encoder);
        }

        // the cube sits inside the grid volume, so its surface got voxelized
        let texels = gpu.read_level(scene.grid.texture(), 0);
        assert!(texels.iter().any(|t| t[3] == 255));
    }
}
