//! Voxcone engine crate.
//!
//! Platform and GPU runtime (window, device, input, time, logging) plus the
//! voxel cone tracing renderer: transforms, camera, materials, the voxel grid
//! and its two render passes, and the scene contract that ties them together.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod error;
pub mod transform;
pub mod camera;
pub mod geometry;
pub mod render;
pub mod scene;
