//! Error types surfaced by the engine.
//!
//! Setup failures (shaders, assets) happen once at scene construction.
//! Per-frame code only fails on invalid arguments such as an out-of-range
//! texture unit.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid use of the texture unit table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("texture unit {unit} out of range (device supports {max_units})")]
    UnitOutOfRange { unit: u32, max_units: u32 },

    #[error("texture unit {unit} has nothing bound")]
    Unbound { unit: u32 },
}

/// WGSL that failed to parse, validate, or match its declared interface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaderProgramError {
    #[error("shader program '{label}' failed to compile:\n{message}")]
    Compile { label: String, message: String },

    #[error("shader program '{label}' failed to link: {message}")]
    Link { label: String, message: String },

    #[error("shader program '{label}' linked before compiling")]
    NotCompiled { label: String },
}

/// Model or image files that could not be loaded.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to load model {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("model {path} contains no triangles")]
    EmptyModel { path: PathBuf },

    #[error("failed to load image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Failures while recording a frame.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Program(#[from] ShaderProgramError),

    #[error("no texture registered as '{0}'")]
    MissingTexture(String),

    #[error("no shader program registered as '{0}'")]
    MissingProgram(String),
}
