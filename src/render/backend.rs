//! CPU implementation of [`RenderBackend`] with supersampled anti-aliasing.

use log::info;

use crate::colors;
use crate::error::{Error, Result};
use crate::geometry::FrameGeometry;
use crate::math::Mat4;
use crate::texture::TextureRegistry;

use super::framebuffer::FrameBuffer;
use super::rasterizer;
use super::RenderBackend;

/// Largest supported per-axis sample factor.
pub const MAX_SAMPLES: u32 = 8;

/// Renders into a `(width * samples) x (height * samples)` target and box
/// filters it down to an ARGB8888 screen buffer.
pub struct SoftwareBackend {
    width: u32,
    height: u32,
    samples: u32,
    color_buffer: Vec<u32>,
    depth_buffer: Vec<f32>,
    screen: Vec<u32>,
}

/// Sample count of the target for a viewport, or an error if it is unusable.
fn target_len(width: u32, height: u32, samples: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::BackendInitializationFailed(format!(
            "viewport {width}x{height} is empty"
        )));
    }
    if samples == 0 || samples > MAX_SAMPLES {
        return Err(Error::BackendInitializationFailed(format!(
            "sample factor {samples} outside 1..={MAX_SAMPLES}"
        )));
    }
    width
        .checked_mul(samples)
        .zip(height.checked_mul(samples))
        .and_then(|(w, h)| (w as usize).checked_mul(h as usize))
        .ok_or_else(|| {
            Error::BackendInitializationFailed(format!(
                "target {width}x{height} at {samples}x is too large"
            ))
        })
}

impl SoftwareBackend {
    pub fn new(width: u32, height: u32, samples: u32) -> Result<Self> {
        let len = target_len(width, height, samples)?;
        info!("software backend {width}x{height}, {samples}x{samples} samples per pixel");
        Ok(Self {
            width,
            height,
            samples,
            color_buffer: vec![colors::CLEAR; len],
            depth_buffer: vec![0.0; len],
            screen: vec![colors::CLEAR; (width * height) as usize],
        })
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Averages each `samples x samples` block into one screen pixel.
    fn resolve(&mut self) {
        let s = self.samples as usize;
        let (width, height) = (self.width as usize, self.height as usize);
        let target_width = width * s;
        let count = (s * s) as u32;

        for y in 0..height {
            for x in 0..width {
                let mut sum = [0u32; 4];
                for sy in 0..s {
                    let start = (y * s + sy) * target_width + x * s;
                    for &sample in &self.color_buffer[start..start + s] {
                        for (acc, channel) in sum.iter_mut().zip(colors::channels(sample)) {
                            *acc += channel;
                        }
                    }
                }
                let [a, r, g, b] = sum.map(|c| ((c + count / 2) / count) as u8);
                self.screen[y * width + x] = colors::argb(r, g, b, a);
            }
        }
    }
}

impl RenderBackend for SoftwareBackend {
    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let len = target_len(width, height, self.samples)?;
        self.width = width;
        self.height = height;
        self.color_buffer = vec![colors::CLEAR; len];
        self.depth_buffer = vec![0.0; len];
        self.screen = vec![colors::CLEAR; (width * height) as usize];
        Ok(())
    }

    fn draw(&mut self, frame: &FrameGeometry<'_>, view_projection: &Mat4, textures: &TextureRegistry) {
        let target_width = self.width * self.samples;
        let target_height = self.height * self.samples;
        let (tw, th) = (target_width as f32, target_height as f32);

        let mut buffer = FrameBuffer::new(
            &mut self.color_buffer,
            &mut self.depth_buffer,
            target_width,
            target_height,
        );
        buffer.clear(colors::CLEAR);

        let vertex = |index: u32| frame.vertices.get(index as usize);

        for tri in frame.triangle_indices.chunks_exact(3) {
            let (Some(a), Some(b), Some(c)) = (vertex(tri[0]), vertex(tri[1]), vertex(tri[2])) else {
                continue;
            };
            if let Some(screen) = rasterizer::project_triangle([a, b, c], view_projection, tw, th) {
                rasterizer::fill_triangle(&mut buffer, screen, textures.get(a.texture));
            }
        }

        for line in frame.line_indices.chunks_exact(2) {
            let (Some(a), Some(b)) = (vertex(line[0]), vertex(line[1])) else {
                continue;
            };
            if let Some((sa, sb)) = rasterizer::project_line(a, b, view_projection, tw, th) {
                rasterizer::draw_line(&mut buffer, sa, sb, textures.get(a.texture), self.samples);
            }
        }

        self.resolve();
    }

    fn frame_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.screen)
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
