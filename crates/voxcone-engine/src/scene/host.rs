use crate::core::{App, AppControl, CursorMode, FrameCtx};
use crate::input::{InputEvent, Key, KeyState};
use crate::render::RenderCtx;
use crate::time::FpsCounter;

use super::Scene;

/// Runs a [`Scene`] inside the window runtime.
///
/// The scene is built from `factory` on the first frame, once a device exists.
/// Every frame then drains input into the scene, draws it, and advances it.
/// Escape, a failed build, or a failed draw ends the loop.
pub struct SceneHost<F, S> {
    factory: Option<F>,
    scene: Option<S>,
    fps: FpsCounter,
}

impl<F, S> SceneHost<F, S>
where
    F: FnOnce(&RenderCtx<'_>) -> anyhow::Result<S>,
    S: Scene,
{
    pub fn new(factory: F) -> Self {
        Self {
            factory: Some(factory),
            scene: None,
            fps: FpsCounter::new(),
        }
    }

    fn ensure_scene(&mut self, ctx: &FrameCtx<'_, '_>) -> anyhow::Result<()> {
        if self.scene.is_some() {
            return Ok(());
        }
        let Some(factory) = self.factory.take() else {
            anyhow::bail!("scene factory already consumed");
        };
        self.scene = Some(factory(&ctx.render_ctx())?);
        log::info!("scene ready");
        Ok(())
    }
}

impl<F, S> App for SceneHost<F, S>
where
    F: FnOnce(&RenderCtx<'_>) -> anyhow::Result<S>,
    S: Scene,
{
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if let Err(e) = self.ensure_scene(ctx) {
            log::error!("scene setup failed: {e:#}");
            ctx.runtime.exit();
            return AppControl::Exit;
        }
        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Exit;
        };

        if ctx.window.cursor_mode() != CursorMode::Disabled {
            ctx.window.set_cursor_mode(CursorMode::Disabled);
        }

        let dt = ctx.time.dt;
        let events: Vec<InputEvent> = ctx.input_frame.drain_events().collect();
        for event in &events {
            if wants_exit(event) {
                ctx.runtime.exit();
                return AppControl::Exit;
            }
            scene.handle_event(event, dt);
        }

        let clear = scene.clear_color();
        match ctx.render(clear, |rctx, target| scene.draw(rctx, target)) {
            Ok(AppControl::Continue) => {}
            Ok(AppControl::Exit) => {
                ctx.runtime.exit();
                return AppControl::Exit;
            }
            Err(e) => {
                log::error!("draw failed: {e}");
                ctx.runtime.exit();
                return AppControl::Exit;
            }
        }

        scene.update(dt, ctx.time.elapsed);

        if let Some(fps) = self.fps.tick(ctx.time.elapsed) {
            ctx.window.set_title(&format!("{fps} FPS"));
        }

        AppControl::Continue
    }

    fn on_exit(&mut self) {
        if self.scene.take().is_some() {
            log::info!("scene released");
        }
    }
}

fn wants_exit(event: &InputEvent) -> bool {
    matches!(
        event,
        InputEvent::Key {
            key: Key::Escape,
            state: KeyState::Pressed,
            ..
        }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_press_requests_exit() {
        assert!(wants_exit(&InputEvent::key(Key::Escape, KeyState::Pressed)));
        assert!(!wants_exit(&InputEvent::key(Key::Escape, KeyState::Released)));
        assert!(!wants_exit(&InputEvent::key(Key::W, KeyState::Pressed)));
        assert!(!wants_exit(&InputEvent::pointer(1.0, 2.0)));
    }
}
