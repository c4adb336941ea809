//! Built-in shaders selectable by name from a command file
//!
//! Vertex shaders copy the whole input vertex into the attribute vector, so
//! fragment shaders address attributes by their offset in the vertex.
//! Missing uniform or attribute floats read as 0.

use std::sync::Arc;

use crate::rasterizer::{FragmentShader, GeometryOut, Mat4, Texture, Vec4, VertexShader};

fn get(s: &[f32], i: usize) -> f32 {
    s.get(i).copied().unwrap_or(0.0)
}

fn rgb_at(s: &[f32], offset: usize) -> Vec4 {
    Vec4::new(get(s, offset), get(s, offset + 1), get(s, offset + 2), 1.0)
}

/// Position straight from the vertex
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough {
    /// Take w from the fourth float instead of using 1
    pub homogeneous: bool,
}

impl VertexShader for Passthrough {
    fn shade_vertex(&self, vertex: &[f32], _uniform: &[f32]) -> GeometryOut {
        let w = if self.homogeneous { get(vertex, 3) } else { 1.0 };
        GeometryOut {
            position: Vec4::new(get(vertex, 0), get(vertex, 1), get(vertex, 2), w),
            data: vertex.to_vec(),
        }
    }
}

/// Position multiplied by a column-major matrix read from the uniforms
#[derive(Debug, Clone, Copy, Default)]
pub struct Transform {
    pub offset: usize,
}

impl VertexShader for Transform {
    fn shade_vertex(&self, vertex: &[f32], uniform: &[f32]) -> GeometryOut {
        let m = uniform
            .get(self.offset..)
            .and_then(Mat4::from_cols_slice)
            .unwrap_or_default();
        let p = Vec4::new(get(vertex, 0), get(vertex, 1), get(vertex, 2), 1.0);
        GeometryOut {
            position: m.transform(p),
            data: vertex.to_vec(),
        }
    }
}

/// One color from the uniforms
#[derive(Debug, Clone, Copy, Default)]
pub struct Solid {
    pub offset: usize,
}

impl FragmentShader for Solid {
    fn shade_fragment(&self, _data: &[f32], uniform: &[f32]) -> Vec4 {
        rgb_at(uniform, self.offset)
    }
}

/// Color from interpolated vertex attributes
#[derive(Debug, Clone, Copy)]
pub struct Attribute {
    pub offset: usize,
}

impl Default for Attribute {
    fn default() -> Self {
        Self { offset: 3 }
    }
}

impl FragmentShader for Attribute {
    fn shade_fragment(&self, data: &[f32], _uniform: &[f32]) -> Vec4 {
        rgb_at(data, self.offset)
    }
}

/// Texture lookup at interpolated uv coordinates
#[derive(Debug, Clone)]
pub struct Textured {
    pub texture: Arc<Texture>,
    pub offset: usize,
}

impl FragmentShader for Textured {
    fn shade_fragment(&self, data: &[f32], _uniform: &[f32]) -> Vec4 {
        let (u, v) = (get(data, self.offset), get(data, self.offset + 1));
        self.texture.sample(u, v).to_unit()
    }
}

/// Looks up a vertex shader by name. `arg` is the optional numeric argument.
pub fn vertex_shader(name: &str, arg: Option<usize>) -> Option<Box<dyn VertexShader>> {
    match name {
        "passthrough" => Some(Box::new(Passthrough { homogeneous: arg == Some(4) })),
        "transform" => Some(Box::new(Transform { offset: arg.unwrap_or(0) })),
        _ => None,
    }
}

/// Looks up a fragment shader by name. `textured` needs a loaded texture.
pub fn fragment_shader(
    name: &str,
    arg: Option<usize>,
    texture: Option<&Arc<Texture>>,
) -> Option<Box<dyn FragmentShader>> {
    match name {
        "solid" => Some(Box::new(Solid { offset: arg.unwrap_or(0) })),
        "attribute" => Some(Box::new(Attribute { offset: arg.unwrap_or(3) })),
        "textured" => Some(Box::new(Textured {
            texture: Arc::clone(texture?),
            offset: arg.unwrap_or(3),
        })),
        _ => None,
    }
}
