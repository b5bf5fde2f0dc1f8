//! Perspective projection parameters and screen/world conversions.
//!
//! The [`Projection`] struct is the single source of truth for the perspective
//! parameters (FOV, viewport, near/far planes). The free functions map between
//! screen pixels, NDC and world space for picking.

use crate::intersect::Ray;
use crate::math::{Mat4, Vec2, Vec3, Vec4};

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians.
    fov_y: f32,
    width: f32,
    height: f32,
    z_near: f32,
    z_far: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `fov_y` - Vertical field of view in radians
    /// * `width`, `height` - Viewport size in pixels
    /// * `z_near` - Near clipping plane distance (must be > 0)
    /// * `z_far` - Far clipping plane distance (must be > z_near)
    pub fn new(fov_y: f32, width: f32, height: f32, z_near: f32, z_far: f32) -> Self {
        let mut projection = Self {
            fov_y,
            width: 1.0,
            height: 1.0,
            z_near,
            z_far,
        };
        projection.set_viewport(width, height);
        projection
    }

    /// Creates a projection from degrees instead of radians.
    pub fn from_degrees(fov_y_degrees: f32, width: f32, height: f32, z_near: f32, z_far: f32) -> Self {
        Self::new(fov_y_degrees.to_radians(), width, height, z_near, z_far)
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    /// Horizontal field of view in radians, derived from the aspect ratio.
    pub fn fov_x(&self) -> f32 {
        2.0 * (self.aspect_ratio() * (self.fov_y / 2.0).tan()).atan()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }

    pub fn viewport(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn z_near(&self) -> f32 {
        self.z_near
    }

    pub fn z_far(&self) -> f32 {
        self.z_far
    }

    /// Updates the viewport (typically on window resize). A zero-sized
    /// (minimized) viewport is clamped to one pixel.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    /// Generates the right-handed OpenGL perspective matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov_y, self.width, self.height, self.z_near, self.z_far)
    }
}

/// Maps a point in NDC (or any clip-space-normalized coordinates) back to
/// world space by inverting `projection * view`.
///
/// Returns `None` when the combined matrix is singular or the homogeneous
/// result has `w == 0`.
pub fn unproject(source: Vec3, projection: &Mat4, view: &Mat4) -> Option<Vec3> {
    let inverse = (*projection * *view).inverse()?;
    (inverse * Vec4::from_vec3(source, 1.0)).perspective_divide()
}

/// Converts a pixel position (origin top-left, y down) into NDC.
pub fn screen_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(2.0 * x / width - 1.0, 1.0 - 2.0 * y / height)
}

/// World-space ray from the camera through the pixel under `mouse`.
///
/// The far end is found by unprojecting the pixel at NDC depth 1.
pub fn pick_ray(
    mouse: Vec2,
    viewport: (f32, f32),
    projection: &Mat4,
    view: &Mat4,
    eye: Vec3,
) -> Option<Ray> {
    let ndc = screen_to_ndc(mouse.x, mouse.y, viewport.0, viewport.1);
    let far = unproject(Vec3::new(ndc.x, ndc.y, 1.0), projection, view)?;
    Some(Ray::new(eye, (far - eye).normalize()))
}
