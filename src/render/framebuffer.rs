//! Borrowed color + depth view over the supersampled render target.

/// A view into color and depth buffers of equal size.
///
/// The depth buffer stores 1/w (reciprocal of clip-space W) per sample.
/// 1/w interpolates linearly in screen space; larger values are closer, and
/// 0.0 means infinitely far.
pub struct FrameBuffer<'a> {
    color_buffer: &'a mut [u32],
    depth_buffer: &'a mut [f32],
    width: u32,
    height: u32,
}

impl<'a> FrameBuffer<'a> {
    pub fn new(
        color_buffer: &'a mut [u32],
        depth_buffer: &'a mut [f32],
        width: u32,
        height: u32,
    ) -> Self {
        debug_assert_eq!(color_buffer.len(), (width * height) as usize);
        debug_assert_eq!(depth_buffer.len(), (width * height) as usize);
        Self {
            color_buffer,
            depth_buffer,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Fills color with `color` and resets depth to infinitely far.
    pub fn clear(&mut self, color: u32) {
        self.color_buffer.fill(color);
        self.depth_buffer.fill(0.0);
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some((y as u32 * self.width + x as u32) as usize)
        } else {
            None
        }
    }

    /// Writes `color` if `inv_depth` is closer than what is stored.
    /// Out-of-bounds coordinates are ignored.
    #[inline]
    pub fn set_pixel_with_depth(&mut self, x: i32, y: i32, inv_depth: f32, color: u32) {
        if let Some(idx) = self.index(x, y) {
            if inv_depth > self.depth_buffer[idx] {
                self.depth_buffer[idx] = inv_depth;
                self.color_buffer[idx] = color;
            }
        }
    }

    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|idx| self.color_buffer[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_test_keeps_closer_sample() {
        let mut color = vec![0u32; 4];
        let mut depth = vec![0.0f32; 4];
        let mut fb = FrameBuffer::new(&mut color, &mut depth, 2, 2);

        fb.set_pixel_with_depth(1, 0, 0.5, 0xFF00_00FF);
        fb.set_pixel_with_depth(1, 0, 0.25, 0xFFFF_0000);
        assert_eq!(fb.get_pixel(1, 0), Some(0xFF00_00FF));

        fb.set_pixel_with_depth(1, 0, 0.75, 0xFF00_FF00);
        assert_eq!(fb.get_pixel(1, 0), Some(0xFF00_FF00));
    }

    #[test]
    fn out_of_bounds_is_ignored() {
        let mut color = vec![0u32; 4];
        let mut depth = vec![0.0f32; 4];
        let mut fb = FrameBuffer::new(&mut color, &mut depth, 2, 2);
        fb.set_pixel_with_depth(-1, 0, 1.0, 1);
        fb.set_pixel_with_depth(0, 2, 1.0, 1);
        assert_eq!(fb.get_pixel(2, 0), None);
        assert!(color.iter().all(|&c| c == 0));
    }
}
