use glam::{Mat4, Vec3};

/// Default yaw in degrees; faces -Z.
pub const YAW: f32 = -90.0;
pub const PITCH: f32 = 0.0;
/// World units per second.
pub const SPEED: f32 = 1.5;
/// Degrees per pointer pixel.
pub const SENSITIVITY: f32 = 0.1;

/// Share of each pending offset applied per `update`; the rest carries over.
pub const SMOOTH_MOVEMENT_CONSTANT: f32 = 0.1;

/// Pitch is clamped to ±this many degrees so the basis never flips.
pub const PITCH_LIMIT: f32 = 89.0;

/// Movement intents accepted by [`Camera::process_keyboard`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    /// Along world up, independent of pitch.
    Up,
    Down,
}

/// Fly camera with exponentially smoothed movement and look.
///
/// Input never moves the camera directly. Keyboard and pointer calls add to
/// pending offsets, and each [`update`](Camera::update) applies a fixed share
/// of them and decays the remainder.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    world_up: Vec3,

    yaw: f32,
    pitch: f32,

    pub movement_speed: f32,
    pub mouse_sensitivity: f32,

    acc_forward: f32,
    acc_strafe: f32,
    acc_vertical: f32,
    acc_yaw: f32,
    acc_pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Y, YAW, PITCH)
    }
}

impl Camera {
    /// `yaw` and `pitch` in degrees.
    pub fn new(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut cam = Self {
            position,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            world_up: world_up.try_normalize().unwrap_or(Vec3::Y),
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            movement_speed: SPEED,
            mouse_sensitivity: SENSITIVITY,
            acc_forward: 0.0,
            acc_strafe: 0.0,
            acc_vertical: 0.0,
            acc_yaw: 0.0,
            acc_pitch: 0.0,
        };
        cam.update_vectors();
        cam
    }

    /// Look-at from the position toward `position + front`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Queues `movement_speed * dt` of travel in `direction`.
    pub fn process_keyboard(&mut self, direction: CameraMovement, dt: f32) {
        let velocity = self.movement_speed * dt;
        match direction {
            CameraMovement::Forward => self.acc_forward += velocity,
            CameraMovement::Backward => self.acc_forward -= velocity,
            CameraMovement::Left => self.acc_strafe -= velocity,
            CameraMovement::Right => self.acc_strafe += velocity,
            CameraMovement::Up => self.acc_vertical += velocity,
            CameraMovement::Down => self.acc_vertical -= velocity,
        }
    }

    /// Queues a look change from pointer deltas (pixels; +y looks up).
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32) {
        self.acc_yaw += x_offset * self.mouse_sensitivity;
        self.acc_pitch += y_offset * self.mouse_sensitivity;
    }

    /// Applies one smoothing step and rebuilds the basis.
    pub fn update(&mut self) {
        let k = SMOOTH_MOVEMENT_CONSTANT;

        self.position += self.front * self.acc_forward * k;
        self.position += self.right * self.acc_strafe * k;
        self.position += self.world_up * self.acc_vertical * k;
        self.yaw += self.acc_yaw * k;
        self.pitch += self.acc_pitch * k;

        self.acc_forward *= 1.0 - k;
        self.acc_strafe *= 1.0 - k;
        self.acc_vertical *= 1.0 - k;
        self.acc_yaw *= 1.0 - k;
        self.acc_pitch *= 1.0 - k;

        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn world_up(&self) -> Vec3 {
        self.world_up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Pending forward offset not yet applied to the position.
    pub fn pending_forward(&self) -> f32 {
        self.acc_forward
    }

    /// Largest pending offset magnitude across all accumulators.
    pub fn pending_magnitude(&self) -> f32 {
        [
            self.acc_forward,
            self.acc_strafe,
            self.acc_vertical,
            self.acc_yaw,
            self.acc_pitch,
        ]
        .into_iter()
        .fold(0.0, |m, v| m.max(v.abs()))
    }
}
