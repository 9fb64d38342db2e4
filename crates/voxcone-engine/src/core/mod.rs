//! Core engine-facing contracts.
//!
//! Defines the interface between the runtime (platform loop) and the layers
//! above it (scenes, the studio binary) and the per-frame context they get.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{CursorMode, FrameCtx, WindowCtx};
