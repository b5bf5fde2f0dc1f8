//! Error types for the viewer

use std::fmt;

use thiserror::Error;

/// Fixed-capacity storage that can run out of room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertices,
    TriangleIndices,
    LineIndices,
    Textures,
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Vertices => "vertex pool",
            Self::TriangleIndices => "triangle index list",
            Self::LineIndices => "line index list",
            Self::Textures => "texture registry",
        };
        f.write_str(name)
    }
}

/// Viewer errors
#[derive(Debug, Error)]
pub enum Error {
    /// A push or load would exceed a fixed capacity. Nothing was written.
    #[error("{buffer} is full (capacity {capacity})")]
    CapacityExceeded { buffer: BufferKind, capacity: usize },

    /// The render backend could not be created
    #[error("Failed to initialize render backend: {0}")]
    BackendInitializationFailed(String),

    /// SDL window, canvas or texture failure
    #[error("Window error: {0}")]
    Window(String),

    /// TOML configuration could not be parsed or serialized
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for viewer operations
pub type Result<T> = std::result::Result<T, Error>;
