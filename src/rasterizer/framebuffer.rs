//! Color and depth buffers
//!
//! Both buffers are row-major with row 0 at the bottom of the image.

use super::driver::RenderError;
use super::types::{Color, Pixel};

/// Framebuffer for software rendering
pub struct Framebuffer {
    pub color: Vec<Pixel>,
    pub depth: Vec<f32>,
    width: usize,
    height: usize,
}

impl Framebuffer {
    /// Allocate a framebuffer cleared to `background` and `far`.
    pub fn new(width: usize, height: usize, background: Color, far: f32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::ZeroSize { width, height });
        }
        let len = width
            .checked_mul(height)
            .ok_or(RenderError::ZeroSize { width, height })?;
        Ok(Self {
            color: vec![background.to_u32(); len],
            depth: vec![far; len],
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, background: Color, far: f32) {
        self.color.fill(background.to_u32());
        self.depth.fill(far);
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn pixel(&self, x: usize, y: usize) -> Pixel {
        self.color[self.index(x, y)]
    }

    pub fn depth_at(&self, x: usize, y: usize) -> f32 {
        self.depth[self.index(x, y)]
    }

    /// The whole framebuffer as a single band
    pub fn as_band(&mut self) -> Band<'_> {
        Band {
            y0: 0,
            rows: self.height,
            width: self.width,
            color: &mut self.color,
            depth: &mut self.depth,
        }
    }

    /// Split into disjoint bands of at most `band_height` rows each
    pub fn bands(&mut self, band_height: usize) -> Vec<Band<'_>> {
        let width = self.width;
        let band_height = band_height.max(1);
        let chunk = width * band_height;
        self.color
            .chunks_mut(chunk)
            .zip(self.depth.chunks_mut(chunk))
            .enumerate()
            .map(|(i, (color, depth))| Band {
                y0: i * band_height,
                rows: color.len() / width,
                width,
                color,
                depth,
            })
            .collect()
    }
}

/// A horizontal slice of the framebuffer owned by one writer
pub struct Band<'a> {
    y0: usize,
    rows: usize,
    width: usize,
    color: &'a mut [Pixel],
    depth: &'a mut [f32],
}

impl<'a> Band<'a> {
    /// First row covered by this band
    pub fn y0(&self) -> usize {
        self.y0
    }

    /// One past the last row covered by this band
    pub fn y1(&self) -> usize {
        self.y0 + self.rows
    }

    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && (self.y0..self.y1()).contains(&y));
        (y - self.y0) * self.width + x
    }

    /// Less-than depth test against the stored value
    #[inline]
    pub fn depth_passes(&self, x: usize, y: usize, z: f32) -> bool {
        z < self.depth[self.index(x, y)]
    }

    #[inline]
    pub fn write(&mut self, x: usize, y: usize, z: f32, pixel: Pixel) {
        let idx = self.index(x, y);
        self.color[idx] = pixel;
        self.depth[idx] = z;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_rejected() {
        assert!(Framebuffer::new(0, 10, Color::BLACK, 2.0).is_err());
        assert!(Framebuffer::new(10, 0, Color::BLACK, 2.0).is_err());
    }

    #[test]
    fn test_clear() {
        let mut fb = Framebuffer::new(4, 3, Color::BLACK, 2.0).unwrap();
        fb.as_band().write(1, 2, 0.5, Color::RED.to_u32());
        assert_eq!(fb.pixel(1, 2), Color::RED.to_u32());
        assert_eq!(fb.depth_at(1, 2), 0.5);

        fb.clear(Color::BLUE, 2.0);
        assert!(fb.color.iter().all(|&p| p == Color::BLUE.to_u32()));
        assert!(fb.depth.iter().all(|&d| d == 2.0));
    }

    #[test]
    fn test_bands_partition_rows() {
        let mut fb = Framebuffer::new(5, 7, Color::BLACK, 2.0).unwrap();
        let bands = fb.bands(3);
        let spans: Vec<_> = bands.iter().map(|b| (b.y0(), b.y1())).collect();
        assert_eq!(spans, vec![(0, 3), (3, 6), (6, 7)]);
    }

    #[test]
    fn test_band_writes_land_in_place() {
        let mut fb = Framebuffer::new(4, 4, Color::BLACK, 2.0).unwrap();
        {
            let mut bands = fb.bands(2);
            assert!(bands[1].depth_passes(3, 3, 1.0));
            bands[1].write(3, 3, 1.0, Color::GREEN.to_u32());
            assert!(!bands[1].depth_passes(3, 3, 1.0));
        }
        assert_eq!(fb.pixel(3, 3), Color::GREEN.to_u32());
        assert_eq!(fb.depth_at(3, 3), 1.0);
    }
}
