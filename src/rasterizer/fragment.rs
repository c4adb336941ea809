//! Depth test and fragment stage

use super::framebuffer::Band;
use super::shader::FragmentShader;
use super::types::Color;

/// Tests fragments against the depth buffer and shades the survivors.
pub struct FragmentStage<'a> {
    shader: &'a dyn FragmentShader,
    uniform: &'a [f32],
    attrs: Vec<f32>,
}

impl<'a> FragmentStage<'a> {
    pub fn new(shader: &'a dyn FragmentShader, uniform: &'a [f32]) -> Self {
        Self {
            shader,
            uniform,
            attrs: Vec::new(),
        }
    }

    /// Processes the fragment at (`x`, `y`) with depth `z`.
    ///
    /// If `z` is closer than the stored depth, `interpolate` fills in the
    /// fragment's attributes, the shader is run, and color and depth are
    /// written. Otherwise nothing is written. Returns whether the fragment
    /// was written.
    pub fn process<F>(&mut self, band: &mut Band<'_>, x: usize, y: usize, z: f32, interpolate: F) -> bool
    where
        F: FnOnce(&mut Vec<f32>),
    {
        if !band.depth_passes(x, y, z) {
            return false;
        }
        interpolate(&mut self.attrs);
        let color = self.shader.shade_fragment(&self.attrs, self.uniform);
        band.write(x, y, z, Color::from_unit(color).to_u32());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::framebuffer::Framebuffer;
    use crate::rasterizer::math::Vec4;

    fn from_attrs(data: &[f32], _uniform: &[f32]) -> Vec4 {
        Vec4::new(data[0], data[1], data[2], 1.0)
    }

    #[test]
    fn test_closer_fragment_wins() {
        let mut fb = Framebuffer::new(2, 2, Color::BLACK, 2.0).unwrap();
        let mut stage = FragmentStage::new(&from_attrs, &[]);
        {
            let mut band = fb.as_band();
            let red = |a: &mut Vec<f32>| *a = vec![1.0, 0.0, 0.0];
            let green = |a: &mut Vec<f32>| *a = vec![0.0, 1.0, 0.0];
            assert!(stage.process(&mut band, 1, 0, 0.5, red));
            assert!(!stage.process(&mut band, 1, 0, 0.7, green));
            assert!(!stage.process(&mut band, 1, 0, 0.5, green));
        }
        assert_eq!(fb.pixel(1, 0), Color::RED.to_u32());
        assert_eq!(fb.depth_at(1, 0), 0.5);
    }

    #[test]
    fn test_failed_test_skips_shader() {
        let mut fb = Framebuffer::new(1, 1, Color::BLACK, 0.0).unwrap();
        let mut stage = FragmentStage::new(&from_attrs, &[]);
        let mut called = false;
        let mut band = fb.as_band();
        assert!(!stage.process(&mut band, 0, 0, 0.5, |_| called = true));
        assert!(!called);
    }

    #[test]
    fn test_color_clamped() {
        let mut fb = Framebuffer::new(1, 1, Color::BLACK, 2.0).unwrap();
        let mut stage = FragmentStage::new(&from_attrs, &[]);
        stage.process(&mut fb.as_band(), 0, 0, 0.0, |a| *a = vec![2.0, -1.0, 0.5]);
        assert_eq!(Color::from_u32(fb.pixel(0, 0)), Color::new(255, 0, 127));
    }
}
