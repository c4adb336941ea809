//! Triangle scan conversion
//!
//! Clipped triangles are projected to the screen and every pixel whose center
//! `(x + 0.5, y + 0.5)` falls inside the triangle becomes a fragment. Coverage
//! uses edge functions: triangles are normalized to counter-clockwise winding
//! (y up), after which a pixel is inside when all three edge functions are
//! positive. A pixel exactly on an edge belongs to the triangle only if that
//! edge is a top or left edge, so triangles sharing an edge never both draw,
//! and never both skip, a pixel on it.
//!
//! Depth is interpolated linearly in screen space. Attributes are
//! interpolated perspective-correctly, using the `1/w` of each vertex.

use super::fragment::FragmentStage;
use super::framebuffer::Band;
use super::math::{edge, edge_canonical, is_top_left, Vec3};
use super::stats::Throughput;
use super::types::{ClipVertex, CullMode, ScreenVertex};

/// Perspective divide and viewport transform.
///
/// NDC [-1, 1] maps to [0, width] x [0, height], with row 0 at the bottom.
pub fn to_screen(v: &ClipVertex, width: usize, height: usize) -> ScreenVertex {
    let inv_w = 1.0 / v.pos.w;
    let (x, y, z) = (v.pos.x * inv_w, v.pos.y * inv_w, v.pos.z * inv_w);
    ScreenVertex {
        pos: Vec3::new(
            (x + 1.0) * 0.5 * width as f32,
            (y + 1.0) * 0.5 * height as f32,
            z,
        ),
        inv_w,
        data: v.data.iter().map(|a| a * inv_w).collect(),
    }
}

/// Why a triangle produced no screen triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reject {
    /// Zero area or non-finite coordinates
    Degenerate,
    /// Removed by face culling
    Culled,
}

/// A projected triangle, wound counter-clockwise, ready for scan conversion
#[derive(Debug, Clone)]
pub struct ScreenTriangle {
    verts: [ScreenVertex; 3],
    /// Fill convention flags for edges BC, CA and AB
    top_left: [bool; 3],
}

/// Projects a clipped triangle and prepares it for rasterization.
pub fn setup(
    tri: &[ClipVertex; 3],
    width: usize,
    height: usize,
    cull: CullMode,
) -> Result<ScreenTriangle, Reject> {
    let mut verts = tri.each_ref().map(|v| to_screen(v, width, height));
    if !verts.iter().all(|v| v.pos.is_finite() && v.inv_w.is_finite()) {
        return Err(Reject::Degenerate);
    }
    let area = edge(verts[0].pos, verts[1].pos, verts[2].pos);
    if area == 0.0 || !area.is_finite() {
        return Err(Reject::Degenerate);
    }
    match cull {
        CullMode::Back if area < 0.0 => return Err(Reject::Culled),
        CullMode::Front if area > 0.0 => return Err(Reject::Culled),
        _ => {}
    }
    if area < 0.0 {
        verts.swap(1, 2);
    }
    let [a, b, c] = verts.each_ref().map(|v| v.pos);
    Ok(ScreenTriangle {
        top_left: [is_top_left(b, c), is_top_left(c, a), is_top_left(a, b)],
        verts,
    })
}

#[inline]
fn covers(w: f32, top_left: bool) -> bool {
    w > 0.0 || (w == 0.0 && top_left)
}

/// Barycentric weights of `p` for A, B and C, or `None` if `p` is not
/// covered by the triangle.
pub fn barycentric(tri: &ScreenTriangle, p: Vec3) -> Option<[f32; 3]> {
    let [a, b, c] = tri.verts.each_ref().map(|v| v.pos);
    let w0 = edge_canonical(b, c, p);
    let w1 = edge_canonical(c, a, p);
    let w2 = edge_canonical(a, b, p);
    if !(covers(w0, tri.top_left[0]) && covers(w1, tri.top_left[1]) && covers(w2, tri.top_left[2])) {
        return None;
    }
    let sum = w0 + w1 + w2;
    if sum.is_nan() || sum <= 0.0 {
        return None;
    }
    Some([w0 / sum, w1 / sum, w2 / sum])
}

/// Linear screen-space depth
pub fn depth(tri: &ScreenTriangle, [l0, l1, l2]: [f32; 3]) -> f32 {
    let [a, b, c] = &tri.verts;
    l0 * a.pos.z + l1 * b.pos.z + l2 * c.pos.z
}

/// Perspective-correct attribute interpolation into `out`
pub fn interpolate(tri: &ScreenTriangle, [l0, l1, l2]: [f32; 3], out: &mut Vec<f32>) {
    let [a, b, c] = &tri.verts;
    let inv_w = l0 * a.inv_w + l1 * b.inv_w + l2 * c.inv_w;
    out.clear();
    out.extend(
        a.data
            .iter()
            .zip(&b.data)
            .zip(&c.data)
            .map(|((&da, &db), &dc)| (l0 * da + l1 * db + l2 * dc) / inv_w),
    );
}

/// Rasterizes one triangle into `band`, returning covered / written
/// fragment counts.
pub fn rasterize(tri: &ScreenTriangle, band: &mut Band<'_>, frags: &mut FragmentStage<'_>) -> Throughput {
    let [a, b, c] = tri.verts.each_ref().map(|v| v.pos);
    let min_x = a.x.min(b.x).min(c.x).floor().max(0.0);
    let max_x = a.x.max(b.x).max(c.x).ceil().min(band.width() as f32);
    let min_y = a.y.min(b.y).min(c.y).floor().max(band.y0() as f32);
    let max_y = a.y.max(b.y).max(c.y).ceil().min(band.y1() as f32);

    let mut count = Throughput::default();
    if min_x >= max_x || min_y >= max_y {
        return count;
    }

    for y in min_y as usize..max_y as usize {
        for x in min_x as usize..max_x as usize {
            let p = Vec3::new(x as f32 + 0.5, y as f32 + 0.5, 0.0);
            let Some(bary) = barycentric(tri, p) else {
                continue;
            };
            count.i += 1;
            let z = depth(tri, bary);
            if frags.process(band, x, y, z, |out| interpolate(tri, bary, out)) {
                count.o += 1;
            }
        }
    }
    count
}

/// Rasterizes `tris` in order into `band`.
pub fn draw_triangles(tris: &[ScreenTriangle], band: &mut Band<'_>, frags: &mut FragmentStage<'_>) -> Throughput {
    tris.iter()
        .map(|tri| rasterize(tri, band, frags))
        .fold(Throughput::default(), |acc, t| acc + t)
}
