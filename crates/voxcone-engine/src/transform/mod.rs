//! Model/view/projection composition for scene objects.
//!
//! A [`Transform`] accumulates a local model matrix and stores the view and
//! projection of whichever pass is about to draw it. Parent links are handles
//! resolved through a [`TransformLookup`], never owning references.

mod pipeline;

pub use pipeline::{Transform, TransformLookup, MAX_PARENT_DEPTH};
