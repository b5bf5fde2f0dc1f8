//! Rendering backends.
//!
//! A backend consumes one frame of batched geometry and produces an ARGB8888
//! image the window can present. [`SoftwareBackend`] rasterizes on the CPU.

mod backend;
pub mod framebuffer;
pub mod rasterizer;

pub use backend::{SoftwareBackend, MAX_SAMPLES};
pub use framebuffer::FrameBuffer;

use crate::error::Result;
use crate::geometry::FrameGeometry;
use crate::math::Mat4;
use crate::texture::TextureRegistry;

pub trait RenderBackend {
    /// Reallocates targets for a new viewport size.
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;

    /// Draws triangles then lines with depth testing. Vertex texture slots
    /// index `textures`.
    fn draw(&mut self, frame: &FrameGeometry<'_>, view_projection: &Mat4, textures: &TextureRegistry);

    /// Last drawn frame, `width * 4` bytes per row.
    fn frame_bytes(&self) -> &[u8];

    fn size(&self) -> (u32, u32);
}
