//! Viewer settings with TOML file support.
//!
//! Every section uses `#[serde(default)]`, so a file that only overrides
//! `[camera]` keeps defaults for everything else.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::camera::{DEFAULT_PITCH, DEFAULT_SENSITIVITY, DEFAULT_SPEED, DEFAULT_YAW};
use crate::error::{Error, Result};
use crate::geometry::BatchCapacity;
use crate::math::Vec3;
use crate::texture::DEFAULT_TEXTURE_CAPACITY;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Frame cap; 0 disables the limiter.
    pub target_fps: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "flyview".to_owned(),
            width: 1280,
            height: 720,
            target_fps: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Units per second in fly mode.
    pub speed: f32,
    /// Degrees per pixel of mouse movement.
    pub sensitivity: f32,
    pub position: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y: 45.0,
            z_near: 0.1,
            z_far: 100.0,
            speed: DEFAULT_SPEED,
            sensitivity: DEFAULT_SENSITIVITY,
            position: [0.0, 0.0, 3.0],
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
        }
    }
}

impl CameraConfig {
    pub fn position(&self) -> Vec3 {
        let [x, y, z] = self.position;
        Vec3::new(x, y, z)
    }
}

/// Fixed buffer sizes of the geometry batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeometryConfig {
    pub vertices: usize,
    pub triangle_indices: usize,
    pub line_indices: usize,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        let capacity = BatchCapacity::default();
        Self {
            vertices: capacity.vertices,
            triangle_indices: capacity.triangle_indices,
            line_indices: capacity.line_indices,
        }
    }
}

impl GeometryConfig {
    pub fn capacity(&self) -> BatchCapacity {
        BatchCapacity {
            vertices: self.vertices,
            triangle_indices: self.triangle_indices,
            line_indices: self.line_indices,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Supersampling factor per axis.
    pub samples: u32,
    /// Texture registry capacity.
    pub textures: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples: 2,
            textures: DEFAULT_TEXTURE_CAPACITY,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub geometry: GeometryConfig,
    pub render: RenderConfig,
}

impl ViewerConfig {
    /// Load a config from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}
