//! An interactive 3D scene viewer with a fly camera and immediate-mode geometry.
//!
//! Scene code pushes lines, triangles and quads into a deduplicating
//! [`geometry::GeometryBatch`] each frame; a [`render::RenderBackend`] draws
//! the published batch. SDL2 is used only for the window and input events.
//!
//! # Quick Start
//!
//! ```ignore
//! use flyview::prelude::*;
//!
//! let config = ViewerConfig::default();
//! let mut viewer = Viewer::new(&config);
//! let mut backend = SoftwareBackend::new(1280, 720, 2)?;
//!
//! viewer.update(1.0 / 60.0);
//! viewer.begin_frame();
//! viewer.batch_mut().push_line(Vec3::ZERO, Vec3::UP, 0)?;
//! viewer.render(&mut backend);
//! viewer.end_frame();
//! ```

pub mod camera;
pub mod colors;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod intersect;
pub mod math;
pub mod projection;
pub mod render;
pub mod texture;
pub mod transform;
pub mod viewer;
pub mod window;

pub use config::ViewerConfig;
pub use error::{Error, Result};
pub use projection::Projection;
pub use transform::Transform;
pub use viewer::Viewer;

/// Prelude module for convenient imports.
pub mod prelude {
    // Camera
    pub use crate::camera::{Camera, CameraController, CameraMode};

    // Config
    pub use crate::config::ViewerConfig;

    // Geometry
    pub use crate::geometry::{GeometryBatch, Vertex};

    // Input
    pub use crate::input::{InputState, Key, MouseButton};

    // Math
    pub use crate::math::{Mat4, Quat, Vec2, Vec3, Vec4};

    // Projection
    pub use crate::projection::Projection;

    // Rendering
    pub use crate::render::{RenderBackend, SoftwareBackend};
    pub use crate::texture::{TextureRegistry, TextureSlot};

    // Transform
    pub use crate::transform::Transform;

    // Viewer
    pub use crate::viewer::Viewer;

    // Window
    pub use crate::window::{FrameLimiter, Window, WindowEvent};
}
