//! Smoothed first-person camera.

mod fly;

pub use fly::{
    Camera, CameraMovement, PITCH_LIMIT, SENSITIVITY, SMOOTH_MOVEMENT_CONSTANT, SPEED, YAW,
};
