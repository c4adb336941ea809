//! Vertex and fragment shader hooks
//!
//! A *vertex shader* maps one vertex of the input array to a clip-space
//! position plus the attribute vector that gets interpolated across the
//! triangle. A *fragment shader* maps interpolated attributes to a color.
//! Both receive the same read-only uniform block and must be deterministic.

use super::math::Vec4;

/// Output of the vertex stage for one vertex
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryOut {
    /// Clip-space position, before the perspective divide
    pub position: Vec4,
    /// Attributes to interpolate
    pub data: Vec<f32>,
}

pub trait VertexShader: Send + Sync {
    /// Shades one vertex. `vertex` holds exactly `floats_per_vertex` floats.
    ///
    /// # Panics
    /// `shade_vertex` should never panic.
    fn shade_vertex(&self, vertex: &[f32], uniform: &[f32]) -> GeometryOut;
}

pub trait FragmentShader: Send + Sync {
    /// Computes the RGBA color of a fragment from its perspective-correct
    /// attributes. Channels outside [0, 1] are clamped by the pipeline.
    ///
    /// # Panics
    /// `shade_fragment` should never panic.
    fn shade_fragment(&self, data: &[f32], uniform: &[f32]) -> Vec4;
}

impl<F> VertexShader for F
where
    F: Fn(&[f32], &[f32]) -> GeometryOut + Send + Sync,
{
    fn shade_vertex(&self, vertex: &[f32], uniform: &[f32]) -> GeometryOut {
        self(vertex, uniform)
    }
}

impl<F> FragmentShader for F
where
    F: Fn(&[f32], &[f32]) -> Vec4 + Send + Sync,
{
    fn shade_fragment(&self, data: &[f32], uniform: &[f32]) -> Vec4 {
        self(data, uniform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closures_are_shaders() {
        let vs = |v: &[f32], _u: &[f32]| GeometryOut {
            position: Vec4::from_slice(v, 1.0),
            data: v.to_vec(),
        };
        let fs = |_d: &[f32], u: &[f32]| Vec4::from_slice(u, 1.0);

        let vs: &dyn VertexShader = &vs;
        let fs: &dyn FragmentShader = &fs;

        let out = vs.shade_vertex(&[1.0, 2.0, 3.0], &[]);
        assert_eq!(out.position, Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(out.data, vec![1.0, 2.0, 3.0]);
        assert_eq!(fs.shade_fragment(&[], &[0.5]), Vec4::new(0.5, 1.0, 1.0, 1.0));
    }
}
