//! The Cornell box demo: a box, a bunny, a teapot, and a small emissive ball
//! riding the orbit of the point light.

use anyhow::Context;
use glam::Vec3;

use voxcone_engine::error::RenderError;
use voxcone_engine::geometry::{cornell_box, cornell_palette, cube, uv_sphere};
use voxcone_engine::input::InputEvent;
use voxcone_engine::render::{RenderCtx, RenderTarget, Texture2d};
use voxcone_engine::scene::{Scene, SceneConfig, VoxelScene};

const BOX: &str = "Box";
const BUNNY: &str = "Bunny";
const TEAPOT: &str = "Teapot";
const BALL: &str = "Ball";

const CONCRETE: &str = "Concrete";
const FLOWER: &str = "Flower";
const CORNELL: &str = "Cornell";

/// Radius of the light's orbit and its height.
const ORBIT: f32 = 0.5;
const BALL_SCALE: f32 = 0.025;

pub struct CornellScene {
    inner: VoxelScene,
}

impl CornellScene {
    pub fn new(ctx: &RenderCtx<'_>, config: SceneConfig) -> anyhow::Result<Self> {
        let mut scene = VoxelScene::new(ctx, config).context("failed to build shader programs")?;

        scene.load_texture(ctx, CONCRETE, "conc.tga");
        scene.load_texture(ctx, FLOWER, "maskros512.tga");
        scene.load_texture_or(ctx, CORNELL, "cornellUVtextureRasp.tga", || {
            let (w, h, pixels) = cornell_palette();
            Texture2d::from_rgba8(ctx.device, ctx.queue, "cornell palette", w, h, &pixels)
        });

        let mesh = scene.load_mesh(ctx, "cornellTextCoords.obj", cornell_box);
        let mut object = scene.new_object(mesh, CORNELL);
        object.transform.rotate((-90.0f32).to_radians(), Vec3::Y);
        object.transform.scale(Vec3::splat(0.999));
        object.material.specular_reflectivity = 0.1;
        scene.insert_object(BOX, object);

        let mesh = scene.load_mesh(ctx, "bunnyHD.obj", || uv_sphere(0.5, 16, 24));
        let mut object = scene.new_object(mesh, CORNELL);
        object.transform.translate(Vec3::new(0.36, 0.0, -0.38));
        object.transform.scale(Vec3::splat(0.3));
        object.material.emissivity = 0.7;
        object.material.specular_reflectivity = 0.1;
        scene.insert_object(BUNNY, object);

        let mesh = scene.load_mesh(ctx, "teapot.obj", || cube(1.5));
        let mut object = scene.new_object(mesh, CONCRETE);
        object.transform.rotate(90.0f32.to_radians(), Vec3::NEG_X);
        object.transform.translate(Vec3::new(-0.23, -0.51, -0.56));
        object.transform.scale(Vec3::splat(0.1));
        object.material.specular_reflectivity = 1.0;
        scene.insert_object(TEAPOT, object);

        let mesh = scene.load_mesh(ctx, "ball.obj", || uv_sphere(1.0, 12, 16));
        let mut object = scene.new_object(mesh, CORNELL);
        object.material.emissivity = 1.0;
        scene.insert_object(BALL, object);

        log::info!(
            "cornell scene: {} objects, grid {}^3",
            scene.registry.objects.len(),
            scene.grid().size()
        );
        Ok(Self { inner: scene })
    }
}

impl Scene for CornellScene {
    fn update(&mut self, dt: f32, elapsed: f32) {
        let (s, c) = elapsed.sin_cos();
        self.inner.light.position = Vec3::new(ORBIT * s, ORBIT, ORBIT * c);

        // Scaled after translating, so the ball lands on the light's orbit.
        if let Some(ball) = self.inner.object_mut(BALL) {
            let at = Vec3::new(s, 1.0, c) * (ORBIT / BALL_SCALE);
            ball.transform
                .set_chain(at, 0.0, Vec3::ONE, Vec3::splat(BALL_SCALE));
        }

        self.inner.step(dt);
    }

    fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) -> Result<(), RenderError> {
        self.inner.render(ctx, target)
    }

    fn handle_event(&mut self, event: &InputEvent, _dt: f32) {
        self.inner.handle_event(event);
    }

    fn clear_color(&self) -> wgpu::Color {
        self.inner.config.clear_color
    }
}
