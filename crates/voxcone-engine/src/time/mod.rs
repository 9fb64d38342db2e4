//! Time subsystem.
//!
//! Frame timing utilities decoupled from the runtime:
//! - one `FrameClock` per window, ticked once per presented frame
//! - `FpsCounter` for the once-per-second frame rate readout

mod fps;
mod frame_clock;

pub use fps::FpsCounter;
pub use frame_clock::{FrameClock, FrameTime};
