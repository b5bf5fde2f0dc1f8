//! ARGB8888 color packing.
//!
//! Vertex colors are `Vec4` in `[0, 1]` with `x, y, z, w = r, g, b, a`.
//! Framebuffers and textures store packed `0xAARRGGBB` words.

use crate::math::Vec4;

pub const WHITE: u32 = 0xFFFF_FFFF;
pub const BLACK: u32 = 0xFF00_0000;
pub const CLEAR: u32 = 0xFF1E_1E1E;

pub const WHITE_F: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);

#[inline]
fn to_byte(channel: f32) -> u32 {
    (channel.clamp(0.0, 1.0) * 255.0 + 0.5) as u32
}

/// Packs an RGBA color in `[0, 1]` into `0xAARRGGBB`. Channels are clamped.
#[inline]
pub fn pack_color(color: Vec4) -> u32 {
    (to_byte(color.w) << 24) | (to_byte(color.x) << 16) | (to_byte(color.y) << 8) | to_byte(color.z)
}

#[inline]
pub fn unpack_color(argb: u32) -> Vec4 {
    let channel = |shift: u32| ((argb >> shift) & 0xFF) as f32 / 255.0;
    Vec4::new(channel(16), channel(8), channel(0), channel(24))
}

/// Packs 8-bit channels into `0xAARRGGBB`.
#[inline]
pub const fn argb(r: u8, g: u8, b: u8, a: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Splits `0xAARRGGBB` into `[a, r, g, b]`.
#[inline]
pub const fn channels(argb: u32) -> [u32; 4] {
    [(argb >> 24) & 0xFF, (argb >> 16) & 0xFF, (argb >> 8) & 0xFF, argb & 0xFF]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pack_unpack() {
        assert_eq!(pack_color(WHITE_F), WHITE);
        assert_eq!(pack_color(Vec4::new(1.0, 0.0, 0.0, 1.0)), 0xFFFF_0000);
        assert_relative_eq!(unpack_color(0xFF00_FF00), Vec4::new(0.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn pack_clamps_out_of_range() {
        assert_eq!(pack_color(Vec4::new(2.0, -1.0, 0.0, 1.0)), 0xFFFF_0000);
    }

    #[test]
    fn byte_helpers() {
        let c = argb(1, 2, 3, 4);
        assert_eq!(channels(c), [4, 1, 2, 3]);
    }
}
