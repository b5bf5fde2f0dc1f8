//! Textures and the fixed-size registry that vertices index into.

use std::path::Path;

use log::info;

use crate::colors::{self, WHITE};
use crate::error::{BufferKind, Error, Result};
use crate::math::Vec4;

pub const DEFAULT_TEXTURE_CAPACITY: usize = 8;

/// Represents a 2D texture for texture mapping.
#[derive(Debug, Clone)]
pub struct Texture {
    data: Vec<u32>, // ARGB8888, rows top to bottom
    width: u32,
    height: u32,
}

impl Texture {
    /// Builds a texture from ARGB pixels. Empty input yields a 1x1 white texel.
    pub fn from_pixels(width: u32, height: u32, data: Vec<u32>) -> Self {
        if width == 0 || height == 0 || data.len() != (width * height) as usize {
            return Self::from_color(Vec4::ONE);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// A 1x1 texture of a single color.
    pub fn from_color(color: Vec4) -> Self {
        Self {
            data: vec![colors::pack_color(color)],
            width: 1,
            height: 1,
        }
    }

    // Load a texture from an image file (PNG, JPG, etc.)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();

        let data: Vec<u32> = img
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                colors::argb(r, g, b, a)
            })
            .collect();

        Ok(Self::from_pixels(width, height, data))
    }

    /// Sample the texture at UV coordinates using nearest-neighbor filtering.
    ///
    /// UV (0,0) is the bottom-left of the image; rows are stored top-first,
    /// so V is flipped. Coordinates outside [0,1) wrap.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        let u = u.rem_euclid(1.0);
        let v = (1.0 - v).rem_euclid(1.0);

        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);

        self.data[(y * self.width + x) as usize]
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Index of a texture in a [`TextureRegistry`], as stored in `Vertex::texture`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSlot(pub u32);

impl TextureSlot {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Fixed-capacity list of textures addressed by slot.
#[derive(Debug)]
pub struct TextureRegistry {
    textures: Vec<Texture>,
    capacity: usize,
}

impl Default for TextureRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TEXTURE_CAPACITY)
    }
}

impl TextureRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            textures: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn insert(&mut self, texture: Texture) -> Result<TextureSlot> {
        if self.textures.len() >= self.capacity {
            return Err(Error::CapacityExceeded {
                buffer: BufferKind::Textures,
                capacity: self.capacity,
            });
        }
        let slot = TextureSlot(self.textures.len() as u32);
        self.textures.push(texture);
        Ok(slot)
    }

    /// Registers a 1x1 texture of the given color (channels in [0, 1]).
    pub fn load_color(&mut self, r: f32, g: f32, b: f32, a: f32) -> Result<TextureSlot> {
        self.insert(Texture::from_color(Vec4::new(r, g, b, a)))
    }

    pub fn load_image<P: AsRef<Path>>(&mut self, path: P) -> Result<TextureSlot> {
        let path = path.as_ref();
        let texture = Texture::from_file(path)?;
        info!(
            "loaded texture {} ({}x{})",
            path.display(),
            texture.width(),
            texture.height()
        );
        self.insert(texture)
    }

    pub fn get(&self, slot: u32) -> Option<&Texture> {
        self.textures.get(slot as usize)
    }

    /// Samples the texture in `slot`; an unknown slot samples as white.
    #[inline]
    pub fn sample(&self, slot: u32, u: f32, v: f32) -> u32 {
        self.get(slot).map_or(WHITE, |texture| texture.sample(u, v))
    }
}
