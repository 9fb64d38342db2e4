use crate::camera::{Camera, CameraMovement};
use crate::input::{InputEvent, Key, KeyState};

use super::mode::ShadingMode;

/// Keyboard and mouse bindings of the fly-through viewer.
///
/// Key events only flip held flags; [`apply`](Self::apply) turns the flags
/// into camera travel once per frame. Mouse deltas go to the camera as they
/// arrive.
#[derive(Debug, Clone, Default)]
pub struct Controls {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    up: bool,

    mode: ShadingMode,

    last_pointer: Option<(f32, f32)>,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ShadingMode {
        self.mode
    }

    pub fn handle_event(&mut self, event: &InputEvent, camera: &mut Camera) {
        match *event {
            InputEvent::Key {
                key, state, repeat, ..
            } => self.handle_key(key, state, repeat, camera),
            InputEvent::PointerMoved(p) => {
                // first sample only establishes the reference point
                if let Some((last_x, last_y)) = self.last_pointer {
                    camera.process_mouse_movement(p.x - last_x, last_y - p.y);
                }
                self.last_pointer = Some((p.x, p.y));
            }
            InputEvent::PointerLeft => self.last_pointer = None,
            InputEvent::Focused(false) => self.release_all(),
            InputEvent::Focused(true) | InputEvent::ModifiersChanged(_) => {}
        }
    }

    fn handle_key(&mut self, key: Key, state: KeyState, repeat: bool, camera: &Camera) {
        let down = state == KeyState::Pressed;
        match key {
            Key::W => self.forward = down,
            Key::S => self.backward = down,
            Key::A => self.left = down,
            Key::D => self.right = down,
            Key::Space => self.up = down,
            Key::C if state == KeyState::Released => {
                self.mode = self.mode.next();
                log::info!("shading mode: {:?}", self.mode);
            }
            Key::P if down && !repeat => {
                let p = camera.position();
                log::info!("camera position: ({:.3}, {:.3}, {:.3})", p.x, p.y, p.z);
            }
            _ => {}
        }
    }

    /// Queues travel for every held direction.
    pub fn apply(&self, camera: &mut Camera, dt: f32) {
        let held = [
            (self.forward, CameraMovement::Forward),
            (self.backward, CameraMovement::Backward),
            (self.left, CameraMovement::Left),
            (self.right, CameraMovement::Right),
            (self.up, CameraMovement::Up),
        ];
        for (_, movement) in held.into_iter().filter(|(on, _)| *on) {
            camera.process_keyboard(movement, dt);
        }
    }

    /// Drops held keys and the pointer reference, e.g. after focus loss.
    pub fn release_all(&mut self) {
        self.forward = false;
        self.backward = false;
        self.left = false;
        self.right = false;
        self.up = false;
        self.last_pointer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(key: Key) -> InputEvent {
        InputEvent::key(key, KeyState::Pressed)
    }

    fn release(key: Key) -> InputEvent {
        InputEvent::key(key, KeyState::Released)
    }

    // ── movement ──────────────────────────────────────────────────────────

    #[test]
    fn held_key_queues_travel_each_apply() {
        let mut controls = Controls::new();
        let mut camera = Camera::default();
        controls.handle_event(&press(Key::W), &mut camera);

        controls.apply(&mut camera, 0.5);
        controls.apply(&mut camera, 0.5);
        assert!((camera.pending_forward() - camera.movement_speed).abs() < 1e-6);

        controls.handle_event(&release(Key::W), &mut camera);
        let before = camera.pending_forward();
        controls.apply(&mut camera, 0.5);
        assert_eq!(camera.pending_forward(), before);
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut controls = Controls::new();
        let mut camera = Camera::default();
        controls.handle_event(&press(Key::W), &mut camera);
        controls.handle_event(&press(Key::S), &mut camera);
        controls.apply(&mut camera, 1.0);
        assert_eq!(camera.pending_forward(), 0.0);
    }

    #[test]
    fn release_all_stops_travel() {
        let mut controls = Controls::new();
        let mut camera = Camera::default();
        controls.handle_event(&press(Key::D), &mut camera);
        controls.release_all();
        controls.apply(&mut camera, 1.0);
        assert_eq!(camera.pending_magnitude(), 0.0);
    }

    // ── mode ──────────────────────────────────────────────────────────────

    #[test]
    fn mode_cycles_on_release_only() {
        let mut controls = Controls::new();
        let mut camera = Camera::default();
        controls.handle_event(&press(Key::C), &mut camera);
        assert_eq!(controls.mode(), ShadingMode::Full);

        controls.handle_event(&release(Key::C), &mut camera);
        assert_eq!(controls.mode(), ShadingMode::Direct);
    }

    #[test]
    fn mode_wraps_after_six_releases() {
        let mut controls = Controls::new();
        let mut camera = Camera::default();
        for _ in 0..ShadingMode::COUNT {
            controls.handle_event(&release(Key::C), &mut camera);
        }
        assert_eq!(controls.mode(), ShadingMode::Full);
    }

    // ── mouse ─────────────────────────────────────────────────────────────

    #[test]
    fn first_pointer_sample_does_not_turn() {
        let mut controls = Controls::new();
        let mut camera = Camera::default();
        controls.handle_event(&InputEvent::pointer(500.0, 300.0), &mut camera);
        assert_eq!(camera.pending_magnitude(), 0.0);
    }

    #[test]
    fn pointer_deltas_are_queued_with_y_inverted() {
        let mut controls = Controls::new();
        let mut camera = Camera::default();
        controls.handle_event(&InputEvent::pointer(100.0, 100.0), &mut camera);
        controls.handle_event(&InputEvent::pointer(110.0, 90.0), &mut camera);

        let yaw0 = camera.yaw();
        let pitch0 = camera.pitch();
        for _ in 0..200 {
            camera.update();
        }
        assert!(camera.yaw() > yaw0);
        assert!(camera.pitch() > pitch0);
    }

    #[test]
    fn leaving_the_window_resets_the_reference() {
        let mut controls = Controls::new();
        let mut camera = Camera::default();
        controls.handle_event(&InputEvent::pointer(0.0, 0.0), &mut camera);
        controls.handle_event(&InputEvent::PointerLeft, &mut camera);
        controls.handle_event(&InputEvent::pointer(400.0, 400.0), &mut camera);
        assert_eq!(camera.pending_magnitude(), 0.0);
    }
}
