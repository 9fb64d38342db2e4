//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates platform events into `InputEvent`s; scenes consume
//! them from the per-frame `InputFrame` in arrival order.

mod frame;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{InputEvent, Key, KeyState, Modifiers, PointerMoveEvent};
