//! Core types for the rasterizer

use serde::{Deserialize, Serialize};

use super::math::{Vec3, Vec4};

/// Packed RGBA pixel: red in the high byte, alpha in the low byte
pub type Pixel = u32;

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Quantize a fragment color. Channels are clamped to [0, 1] and
    /// truncated to 8 bits; the result is always opaque.
    pub fn from_unit(c: Vec4) -> Self {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u8;
        Self::new(q(c.x), q(c.y), q(c.z))
    }

    /// Convert to packed RGBA
    pub fn to_u32(self) -> Pixel {
        ((self.r as u32) << 24) | ((self.g as u32) << 16) | ((self.b as u32) << 8) | (self.a as u32)
    }

    /// Unpack from packed RGBA
    pub fn from_u32(p: Pixel) -> Self {
        Self {
            r: (p >> 24) as u8,
            g: (p >> 16) as u8,
            b: (p >> 8) as u8,
            a: p as u8,
        }
    }

    /// Convert to [u8; 4] for image encoding
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Convert to a [0, 1] color vector
    pub fn to_unit(self) -> Vec4 {
        Vec4::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        )
    }
}

/// Simple texture (array of colors), row 0 at the bottom
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
}

impl Texture {
    /// Wrap decoded pixels
    pub fn from_pixels(pixels: &[Pixel], width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: pixels.iter().copied().map(Color::from_u32).collect(),
        }
    }

    /// Create a checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, pixels }
    }

    /// Sample texture at UV coordinates (nearest, wrapping)
    pub fn sample(&self, u: f32, v: f32) -> Color {
        if self.width == 0 || self.height == 0 || !u.is_finite() || !v.is_finite() {
            return Color::BLACK;
        }
        let tx = ((u * self.width as f32).floor() as i64).rem_euclid(self.width as i64) as usize;
        let ty = ((v * self.height as f32).floor() as i64).rem_euclid(self.height as i64) as usize;
        self.pixels[ty * self.width + tx]
    }
}

/// Which planes triangles are clipped against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipMode {
    /// Near plane only
    #[default]
    Near,
    /// All six planes of the view volume
    Frustum,
}

/// Face culling by screen-space winding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CullMode {
    #[default]
    None,
    /// Drop clockwise triangles
    Back,
    /// Drop counter-clockwise triangles
    Front,
}

/// A shaded vertex in clip space, before the perspective divide
#[derive(Debug, Clone, PartialEq)]
pub struct ClipVertex {
    pub pos: Vec4,
    pub data: Vec<f32>,
}

impl ClipVertex {
    pub fn new(pos: Vec4, data: Vec<f32>) -> Self {
        Self { pos, data }
    }

    /// Interpolate position and attributes, `self` at t = 0
    pub fn lerp(&self, other: &ClipVertex, t: f32) -> ClipVertex {
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| super::math::lerp(a, b, t))
            .collect();
        ClipVertex {
            pos: self.pos.lerp(other.pos, t),
            data,
        }
    }
}

/// A vertex after perspective divide and viewport transform
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenVertex {
    /// Pixel x, pixel y (row 0 at the bottom), NDC depth
    pub pos: Vec3,
    /// 1 / clip w
    pub inv_w: f32,
    /// Attributes premultiplied by `inv_w`
    pub data: Vec<f32>,
}
