//! Vertex stage
//!
//! Runs the vertex shader over the vertices referenced by the index buffer.
//! Results are cached per vertex index, so a vertex shared by several
//! triangles is shaded once.

use super::shader::VertexShader;
use super::types::ClipVertex;

pub struct VertexStage<'a> {
    shader: &'a dyn VertexShader,
    vertices: &'a [f32],
    floats_per_vertex: usize,
    uniform: &'a [f32],
    cache: Vec<Option<ClipVertex>>,
    shaded: usize,
}

impl<'a> VertexStage<'a> {
    pub fn new(
        shader: &'a dyn VertexShader,
        vertices: &'a [f32],
        floats_per_vertex: usize,
        uniform: &'a [f32],
    ) -> Self {
        let count = vertices.len().checked_div(floats_per_vertex).unwrap_or(0);
        Self {
            shader,
            vertices,
            floats_per_vertex,
            uniform,
            cache: vec![None; count],
            shaded: 0,
        }
    }

    /// Number of shader invocations so far
    pub fn shaded(&self) -> usize {
        self.shaded
    }

    /// Returns the shaded vertex `index`, or `None` if it is out of range.
    pub fn shade(&mut self, index: usize) -> Option<&ClipVertex> {
        let slot = self.cache.get_mut(index)?;
        if slot.is_none() {
            let start = index * self.floats_per_vertex;
            let vertex = &self.vertices[start..start + self.floats_per_vertex];
            let out = self.shader.shade_vertex(vertex, self.uniform);
            *slot = Some(ClipVertex::new(out.position, out.data));
            self.shaded += 1;
        }
        slot.as_ref()
    }

    /// Shades the three corners of a triangle
    pub fn triangle(&mut self, [i0, i1, i2]: [usize; 3]) -> Option<[ClipVertex; 3]> {
        let a = self.shade(i0)?.clone();
        let b = self.shade(i1)?.clone();
        let c = self.shade(i2)?.clone();
        Some([a, b, c])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::math::Vec4;
    use crate::rasterizer::shader::GeometryOut;

    fn scale_by_uniform(v: &[f32], u: &[f32]) -> GeometryOut {
        let s = u.first().copied().unwrap_or(1.0);
        GeometryOut {
            position: Vec4::new(v[0] * s, v[1] * s, v[2] * s, 1.0),
            data: v[3..].to_vec(),
        }
    }

    #[test]
    fn test_shade_reads_its_own_slice() {
        let verts = [0.0, 0.0, 0.0, 7.0, 1.0, 2.0, 3.0, 8.0];
        let uniform = [2.0];
        let mut stage = VertexStage::new(&scale_by_uniform, &verts, 4, &uniform);

        let v = stage.shade(1).unwrap();
        assert_eq!(v.pos, Vec4::new(2.0, 4.0, 6.0, 1.0));
        assert_eq!(v.data, vec![8.0]);
    }

    #[test]
    fn test_shared_vertices_shaded_once() {
        let verts = [0.0; 12];
        let mut stage = VertexStage::new(&scale_by_uniform, &verts, 3, &[]);
        stage.triangle([0, 1, 2]).unwrap();
        stage.triangle([2, 1, 3]).unwrap();
        assert_eq!(stage.shaded(), 4);
    }

    #[test]
    fn test_out_of_range_index() {
        let verts = [0.0; 9];
        let mut stage = VertexStage::new(&scale_by_uniform, &verts, 3, &[]);
        assert!(stage.shade(3).is_none());
        assert!(stage.triangle([0, 1, 3]).is_none());
    }
}
