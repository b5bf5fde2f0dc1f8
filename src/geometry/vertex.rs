use bytemuck::{Pod, Zeroable};

use crate::colors::WHITE_F;
use crate::math::{Vec2, Vec3, Vec4};

/// Interleaved vertex as uploaded to the backend.
///
/// Layout is `#[repr(C)]` with no padding: 13 consecutive `f32`/`u32` words.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub color: Vec4,
    pub uv: Vec2,
    pub normal: Vec3,
    /// Slot in the texture registry.
    pub texture: u32,
}

pub(crate) const VERTEX_WORDS: usize = std::mem::size_of::<Vertex>() / 4;

/// Exact bit pattern of every field of a [`Vertex`].
///
/// Two vertices share a key only when all fields are bit-identical, so
/// `0.0` and `-0.0` are different keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VertexKey([u32; VERTEX_WORDS]);

impl Vertex {
    pub const fn new(position: Vec3, color: Vec4, uv: Vec2, normal: Vec3, texture: u32) -> Self {
        Self {
            position,
            color,
            uv,
            normal,
            texture,
        }
    }

    /// White, untextured-coordinate vertex used for line endpoints.
    pub const fn line_point(position: Vec3, texture: u32) -> Self {
        Self::new(position, WHITE_F, Vec2::ZERO, Vec3::ZERO, texture)
    }

    pub fn key(&self) -> VertexKey {
        VertexKey(bytemuck::cast(*self))
    }
}
