//! Vector math for the pipeline
//!
//! Just enough linear algebra for clip space, screen space and the
//! edge-function rasterizer.

use std::ops::{Add, Mul, Sub};
use serde::{Deserialize, Serialize};

/// 3D Vector (screen-space position: pixel x, pixel y, NDC depth)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }
}

/// 4D homogeneous vector (clip-space position, RGBA color)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Builds a vector from the first four floats of `s`, reading missing
    /// components as `fill`.
    pub fn from_slice(s: &[f32], fill: f32) -> Self {
        let at = |i: usize| s.get(i).copied().unwrap_or(fill);
        Self::new(at(0), at(1), at(2), at(3))
    }

    pub fn dot(self, other: Vec4) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Linear interpolation, `self` at t = 0 and `other` at t = 1
    pub fn lerp(self, other: Vec4, t: f32) -> Vec4 {
        self + (other - self) * t
    }
}

impl Add for Vec4 {
    type Output = Vec4;
    fn add(self, other: Vec4) -> Vec4 {
        Vec4 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
            w: self.w + other.w,
        }
    }
}

impl Sub for Vec4 {
    type Output = Vec4;
    fn sub(self, other: Vec4) -> Vec4 {
        Vec4 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
            w: self.w - other.w,
        }
    }
}

impl Mul<f32> for Vec4 {
    type Output = Vec4;
    fn mul(self, s: f32) -> Vec4 {
        Vec4 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
            w: self.w * s,
        }
    }
}

/// Column-major 4x4 matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub cols: [Vec4; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            Vec4 { x: 1.0, y: 0.0, z: 0.0, w: 0.0 },
            Vec4 { x: 0.0, y: 1.0, z: 0.0, w: 0.0 },
            Vec4 { x: 0.0, y: 0.0, z: 1.0, w: 0.0 },
            Vec4 { x: 0.0, y: 0.0, z: 0.0, w: 1.0 },
        ],
    };

    /// Reads 16 column-major floats, or `None` if `s` is too short
    pub fn from_cols_slice(s: &[f32]) -> Option<Self> {
        let s = s.get(..16)?;
        Some(Mat4 {
            cols: [
                Vec4::from_slice(&s[0..4], 0.0),
                Vec4::from_slice(&s[4..8], 0.0),
                Vec4::from_slice(&s[8..12], 0.0),
                Vec4::from_slice(&s[12..16], 0.0),
            ],
        })
    }

    pub fn transform(&self, v: Vec4) -> Vec4 {
        let [c0, c1, c2, c3] = self.cols;
        c0 * v.x + c1 * v.y + c2 * v.z + c3 * v.w
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Scalar linear interpolation
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Edge function: twice the signed area of triangle (p0, p1, p).
///
/// Positive when `p` lies to the left of the directed edge p0 -> p1
/// (with y pointing up).
pub fn edge(p0: Vec3, p1: Vec3, p: Vec3) -> f32 {
    (p1.x - p0.x) * (p.y - p0.y) - (p1.y - p0.y) * (p.x - p0.x)
}

/// Edge function evaluated with the endpoints in a fixed order.
///
/// `edge(a, b, p)` and `edge(b, a, p)` are not exact negations of each other
/// in floating point. Evaluating every undirected edge the same way makes the
/// two triangles sharing it see exactly opposite values, which the fill
/// convention relies on.
pub fn edge_canonical(p0: Vec3, p1: Vec3, p: Vec3) -> f32 {
    if (p0.x, p0.y) <= (p1.x, p1.y) {
        edge(p0, p1, p)
    } else {
        -edge(p1, p0, p)
    }
}

/// Fill convention: is the directed edge p0 -> p1 of a counter-clockwise
/// (y up) triangle a top or left edge? Pixels exactly on such edges belong
/// to the triangle.
pub fn is_top_left(p0: Vec3, p1: Vec3) -> bool {
    let dx = p1.x - p0.x;
    let dy = p1.y - p0.y;
    dy < 0.0 || (dy == 0.0 && dx < 0.0)
}
