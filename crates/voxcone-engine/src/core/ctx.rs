use winit::window::{CursorGrabMode, Window, WindowId};

use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::{InputFrame, InputState};
use crate::render::{RenderCtx, RenderTarget, Viewport};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// How the OS cursor behaves over the window.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum CursorMode {
    #[default]
    Normal,
    /// Hidden and locked to the window. The runtime turns raw mouse motion
    /// into an unbounded virtual pointer position, so look-around keeps
    /// working at the window edge.
    Disabled,
}

/// Per-window handles and window-scoped state.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
    pub(crate) cursor_mode: &'a mut CursorMode,
}

impl<'a> WindowCtx<'a> {
    /// Drawable size in physical pixels.
    pub fn viewport(&self) -> Viewport {
        let size = self.window.inner_size();
        Viewport::new(size.width, size.height)
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }

    pub fn cursor_mode(&self) -> CursorMode {
        *self.cursor_mode
    }

    /// Applies a cursor mode. Grabbing is best effort: platforms without
    /// cursor locking fall back to confinement, then to a visible-only change.
    pub fn set_cursor_mode(&mut self, mode: CursorMode) {
        if *self.cursor_mode == mode {
            return;
        }

        match mode {
            CursorMode::Normal => {
                if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
                    log::warn!("cursor release failed: {e}");
                }
                self.window.set_cursor_visible(true);
            }
            CursorMode::Disabled => {
                let grabbed = self
                    .window
                    .set_cursor_grab(CursorGrabMode::Locked)
                    .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
                if let Err(e) = grabbed {
                    log::warn!("cursor grab unavailable: {e}");
                }
                self.window.set_cursor_visible(false);
            }
        }

        *self.cursor_mode = mode;
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub input: &'a InputState,
    pub input_frame: &'a mut InputFrame,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Device handles for building GPU resources outside a frame.
    pub fn render_ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            self.window.viewport(),
            self.gpu.features(),
            self.gpu.limits(),
        )
    }

    /// Clears the surface to `clear`, calls `draw` with a ready [`RenderCtx`]
    /// and [`RenderTarget`], then presents the frame.
    ///
    /// Surface errors are absorbed here (reconfigure or skip). An error from
    /// `draw` drops the frame unsubmitted and is returned to the caller.
    pub fn render<F, E>(&mut self, clear: wgpu::Color, draw: F) -> Result<AppControl, E>
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>) -> Result<(), E>,
    {
        let viewport = self.window.viewport();
        if viewport.is_empty() {
            return Ok(AppControl::Continue);
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                if self.gpu.handle_surface_error(err) == SurfaceErrorAction::Fatal {
                    log::error!("surface ran out of memory");
                    return Ok(AppControl::Exit);
                }
                return Ok(AppControl::Continue);
            }
        };

        // Clear pass, dropped before the encoder is handed to the renderer.
        {
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("voxcone clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        let rctx = self.render_ctx();

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            draw(&rctx, &mut target)?;
        }

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        Ok(AppControl::Continue)
    }
}
