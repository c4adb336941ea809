//! Primitive assembly and clipping
//!
//! Triangles are clipped in homogeneous clip space, before the perspective
//! divide. A point is inside a plane when its signed distance to the plane is
//! non-negative. For the near plane the distance is `z + w`, so the inside
//! half-space is `z >= -w`.
//!
//! A triangle entirely inside every plane is passed through unchanged. One
//! entirely outside any single plane is dropped. Anything else is clipped as
//! a convex polygon against each plane in turn (Sutherland-Hodgman) and the
//! result is fanned back into triangles, keeping the original winding.
//!
//! ```text
//!     C
//!     |\          outside
//! ----Q--P-------- plane ----
//!     |   \       inside
//!     A----B      => QAB, QBP
//! ```

use log::trace;

use super::math::Vec4;
use super::types::{ClipMode, ClipVertex};

/// Smallest `w` that survives clipping; keeps the perspective divide finite.
pub const MIN_W: f32 = 1e-5;

/// A clip plane given by the coefficients and offset of its signed
/// distance function
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlane(Vec4, f32);

/// Visibility of a triangle against a set of planes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Entirely inside; passed through unchanged
    Visible,
    /// Straddles at least one plane
    Clipped,
    /// Entirely outside; no output
    Hidden,
}

impl ClipPlane {
    /// `w >= MIN_W`
    pub const W_MIN: ClipPlane = ClipPlane(Vec4 { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }, MIN_W);
    /// `z >= -w`
    pub const NEAR: ClipPlane = ClipPlane(Vec4 { x: 0.0, y: 0.0, z: 1.0, w: 1.0 }, 0.0);
    /// `z <= w`
    pub const FAR: ClipPlane = ClipPlane(Vec4 { x: 0.0, y: 0.0, z: -1.0, w: 1.0 }, 0.0);
    /// `x >= -w`
    pub const LEFT: ClipPlane = ClipPlane(Vec4 { x: 1.0, y: 0.0, z: 0.0, w: 1.0 }, 0.0);
    /// `x <= w`
    pub const RIGHT: ClipPlane = ClipPlane(Vec4 { x: -1.0, y: 0.0, z: 0.0, w: 1.0 }, 0.0);
    /// `y >= -w`
    pub const BOTTOM: ClipPlane = ClipPlane(Vec4 { x: 0.0, y: 1.0, z: 0.0, w: 1.0 }, 0.0);
    /// `y <= w`
    pub const TOP: ClipPlane = ClipPlane(Vec4 { x: 0.0, y: -1.0, z: 0.0, w: 1.0 }, 0.0);

    /// Signed distance; non-negative means inside
    #[inline]
    pub fn signed_dist(&self, pos: Vec4) -> f32 {
        self.0.dot(pos) - self.1
    }

    #[inline]
    pub fn is_inside(&self, v: &ClipVertex) -> bool {
        self.signed_dist(v.pos) >= 0.0
    }

    /// Clips a convex polygon against `self`, appending the result to
    /// `verts_out`.
    pub fn clip_polygon(&self, verts_in: &[ClipVertex], verts_out: &mut Vec<ClipVertex>) {
        let Some(last) = verts_in.last() else {
            return;
        };
        let mut v0 = last;
        let mut d0 = self.signed_dist(v0.pos);

        for v1 in verts_in {
            let d1 = self.signed_dist(v1.pos);
            if (d0 >= 0.0) != (d1 >= 0.0) {
                // The edge crosses the plane. Always interpolate from the
                // inside endpoint so triangles sharing this edge get
                // bit-identical intersection points.
                let (inside, d_in, outside, d_out) = if d0 >= 0.0 {
                    (v0, d0, v1, d1)
                } else {
                    (v1, d1, v0, d0)
                };
                let t = d_in / (d_in - d_out);
                verts_out.push(inside.lerp(outside, t));
            }
            if d1 >= 0.0 {
                verts_out.push(v1.clone());
            }
            v0 = v1;
            d0 = d1;
        }
    }
}

/// The planes clipped against in `mode`, guard plane first
pub fn planes(mode: ClipMode) -> &'static [ClipPlane] {
    const NEAR_ONLY: [ClipPlane; 2] = [ClipPlane::W_MIN, ClipPlane::NEAR];
    const FRUSTUM: [ClipPlane; 7] = [
        ClipPlane::W_MIN,
        ClipPlane::NEAR,
        ClipPlane::FAR,
        ClipPlane::LEFT,
        ClipPlane::RIGHT,
        ClipPlane::BOTTOM,
        ClipPlane::TOP,
    ];
    match mode {
        ClipMode::Near => &NEAR_ONLY,
        ClipMode::Frustum => &FRUSTUM,
    }
}

/// Classifies a triangle against `planes`.
pub fn status(tri: &[ClipVertex; 3], planes: &[ClipPlane]) -> Status {
    let mut all_inside = true;
    for plane in planes {
        let inside = tri.iter().filter(|v| plane.is_inside(v)).count();
        if inside == 0 {
            return Status::Hidden;
        }
        all_inside &= inside == 3;
    }
    if all_inside {
        Status::Visible
    } else {
        Status::Clipped
    }
}

/// Clips one triangle, appending zero or more triangles to `out`.
pub fn clip_triangle(
    tri: [ClipVertex; 3],
    planes: &[ClipPlane],
    out: &mut Vec<[ClipVertex; 3]>,
) -> Status {
    let status = status(&tri, planes);
    match status {
        Status::Visible => out.push(tri),
        Status::Hidden => {}
        Status::Clipped => {
            let mut verts: Vec<ClipVertex> = tri.into();
            let mut scratch = Vec::with_capacity(verts.len() + planes.len());
            for plane in planes {
                scratch.clear();
                plane.clip_polygon(&verts, &mut scratch);
                std::mem::swap(&mut verts, &mut scratch);
                if verts.len() < 3 {
                    verts.clear();
                    break;
                }
            }
            let before = out.len();
            fan(&verts, out);
            trace!("clipped triangle into {} piece(s)", out.len() - before);
        }
    }
    status
}

/// Triangulates a convex polygon as a fan around its first vertex.
fn fan(verts: &[ClipVertex], out: &mut Vec<[ClipVertex; 3]>) {
    let Some((first, rest)) = verts.split_first() else {
        return;
    };
    for pair in rest.windows(2) {
        out.push([first.clone(), pair[0].clone(), pair[1].clone()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32, z: f32, w: f32, attr: f32) -> ClipVertex {
        ClipVertex::new(Vec4::new(x, y, z, w), vec![attr])
    }

    fn near() -> &'static [ClipPlane] {
        planes(ClipMode::Near)
    }

    #[test]
    fn test_inside_passes_unchanged() {
        let tri = [v(-0.5, -0.5, 0.0, 1.0, 0.0), v(0.5, -0.5, 0.0, 1.0, 1.0), v(0.0, 0.5, 0.0, 1.0, 2.0)];
        let mut out = Vec::new();
        assert_eq!(clip_triangle(tri.clone(), near(), &mut out), Status::Visible);
        assert_eq!(out, vec![tri]);
    }

    #[test]
    fn test_behind_near_plane_dropped() {
        let tri = [v(0.0, 0.0, -3.0, 1.0, 0.0), v(1.0, 0.0, -2.0, 1.0, 0.0), v(0.0, 1.0, -4.0, 1.0, 0.0)];
        let mut out = Vec::new();
        assert_eq!(clip_triangle(tri, near(), &mut out), Status::Hidden);
        assert!(out.is_empty());
    }

    #[test]
    fn test_one_vertex_behind_gives_two_triangles() {
        // C is behind the near plane (z + w < 0)
        let tri = [v(-1.0, 0.0, 0.0, 1.0, 0.0), v(1.0, 0.0, 0.0, 1.0, 0.0), v(0.0, 1.0, -3.0, 1.0, 4.0)];
        let mut out = Vec::new();
        assert_eq!(clip_triangle(tri, near(), &mut out), Status::Clipped);
        assert_eq!(out.len(), 2);
        for t in &out {
            for c in t {
                assert!(c.pos.z + c.pos.w >= -1e-6);
            }
        }
    }

    #[test]
    fn test_two_vertices_behind_gives_one_triangle() {
        let tri = [v(-1.0, 0.0, 0.0, 1.0, 0.0), v(1.0, 0.0, -3.0, 1.0, 4.0), v(0.0, 1.0, -3.0, 1.0, 4.0)];
        let mut out = Vec::new();
        clip_triangle(tri, near(), &mut out);
        assert_eq!(out.len(), 1);

        // New vertices sit on the plane, attributes interpolated at t = 1/3
        let (kept, new): (Vec<_>, Vec<_>) = out[0].iter().partition(|c| c.pos.z == 0.0);
        assert_eq!(kept.len(), 1);
        for p in new {
            assert!((p.pos.z + p.pos.w).abs() < 1e-6);
            assert!((p.data[0] - 4.0 / 3.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_shared_edge_intersection_identical() {
        let a = v(0.1, 0.2, 0.3, 1.0, 0.7);
        let b = v(0.9, -0.4, -2.7, 1.3, 0.1);
        let c = v(-0.6, 0.5, 0.2, 1.1, 0.3);
        let d = v(0.8, 0.9, 0.1, 0.9, 0.9);

        // AB is traversed A -> B in one polygon and B -> A in the other
        let mut first = Vec::new();
        ClipPlane::NEAR.clip_polygon(&[a.clone(), b.clone(), c.clone()], &mut first);
        let mut second = Vec::new();
        ClipPlane::NEAR.clip_polygon(&[b.clone(), a.clone(), d.clone()], &mut second);

        let inputs = [a, b, c, d];
        let shared: Vec<_> = first
            .iter()
            .filter(|p| !inputs.contains(p) && second.contains(p))
            .collect();
        assert_eq!(shared.len(), 1);
        assert!(ClipPlane::NEAR.signed_dist(shared[0].pos).abs() < 1e-6);
    }

    #[test]
    fn test_winding_preserved() {
        let tri = [v(-1.0, 0.0, 0.0, 1.0, 0.0), v(1.0, 0.0, 0.0, 1.0, 0.0), v(0.0, 1.0, -3.0, 1.0, 0.0)];
        let area = |t: &[ClipVertex; 3]| {
            let [a, b, c] = t.each_ref().map(|v| (v.pos.x / v.pos.w, v.pos.y / v.pos.w));
            (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
        };
        assert!(area(&tri) > 0.0);
        let mut out = Vec::new();
        clip_triangle(tri, near(), &mut out);
        assert!(out.iter().all(|t| area(t) > 0.0));
    }

    #[test]
    fn test_nonpositive_w_guarded() {
        // z + w >= 0 but w <= 0: rejected by the guard plane
        let tri = [v(0.0, 0.0, 1.0, 0.0, 0.0), v(1.0, 0.0, 2.0, -1.0, 0.0), v(0.0, 1.0, 1.0, 0.0, 0.0)];
        let mut out = Vec::new();
        assert_eq!(clip_triangle(tri, near(), &mut out), Status::Hidden);
    }

    #[test]
    fn test_frustum_clips_sides() {
        let tri = [v(-3.0, -0.5, 0.0, 1.0, 0.0), v(3.0, -0.5, 0.0, 1.0, 0.0), v(0.0, 0.5, 0.0, 1.0, 0.0)];
        let mut out = Vec::new();
        assert_eq!(clip_triangle(tri.clone(), near(), &mut out), Status::Visible);

        out.clear();
        assert_eq!(clip_triangle(tri, planes(ClipMode::Frustum), &mut out), Status::Clipped);
        assert!(!out.is_empty());
        for t in &out {
            for c in t {
                assert!(c.pos.x.abs() <= c.pos.w + 1e-6);
            }
        }
    }
}
