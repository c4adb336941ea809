//! Render driver
//!
//! Owns the vertex, index and uniform arrays, the shader pair and the
//! framebuffer for one render context, and runs the pipeline stages in order:
//! vertex shading, assembly and clipping, rasterization, depth test and
//! fragment shading.

use std::time::Instant;

use log::debug;
use thiserror::Error;

use super::clip::{self, Status};
use super::fragment::FragmentStage;
use super::framebuffer::Framebuffer;
use super::raster::{self, Reject, ScreenTriangle};
use super::shader::{FragmentShader, VertexShader};
use super::stats::{Stats, Throughput};
use super::vertex::VertexStage;
use crate::config::RenderConfig;

/// Invalid render configuration
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("image size must be positive, got {width}x{height}")]
    ZeroSize { width: usize, height: usize },
    #[error("no framebuffer; set the image size first")]
    NoFramebuffer,
    #[error("no {0} shader set")]
    MissingShader(&'static str),
    #[error("vertex index {index} out of range ({count} vertices)")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("vertex has {got} floats, expected {expected}")]
    VertexWidth { got: usize, expected: usize },
    #[error("floats per vertex must be at least 3, got {0}")]
    FloatsPerVertex(usize),
}

pub struct Driver {
    vertex_data: Vec<f32>,
    floats_per_vertex: usize,
    index_data: Vec<usize>,
    uniform_data: Vec<f32>,
    vertex_shader: Option<Box<dyn VertexShader>>,
    fragment_shader: Option<Box<dyn FragmentShader>>,
    framebuffer: Option<Framebuffer>,
    config: RenderConfig,
    stats: Stats,
}

impl Driver {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            vertex_data: Vec::new(),
            floats_per_vertex: 3,
            index_data: Vec::new(),
            uniform_data: Vec::new(),
            vertex_shader: None,
            fragment_shader: None,
            framebuffer: None,
            config,
            stats: Stats::new(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RenderConfig {
        &mut self.config
    }

    /// Allocates a framebuffer of the given size, cleared to the background
    /// color and far depth.
    pub fn set_size(&mut self, width: usize, height: usize) -> Result<(), RenderError> {
        let fb = Framebuffer::new(width, height, self.config.background, self.config.clear_depth)?;
        self.framebuffer = Some(fb);
        Ok(())
    }

    pub fn framebuffer(&self) -> Option<&Framebuffer> {
        self.framebuffer.as_ref()
    }

    /// Fills the color buffer with the background color and the depth buffer
    /// with the far value.
    pub fn clear(&mut self) -> Result<(), RenderError> {
        let fb = self.framebuffer.as_mut().ok_or(RenderError::NoFramebuffer)?;
        fb.clear(self.config.background, self.config.clear_depth);
        Ok(())
    }

    /// Sets the vertex width, discarding any vertices already supplied.
    pub fn set_floats_per_vertex(&mut self, n: usize) -> Result<(), RenderError> {
        if n < 3 {
            return Err(RenderError::FloatsPerVertex(n));
        }
        self.floats_per_vertex = n;
        self.vertex_data.clear();
        Ok(())
    }

    pub fn push_vertex(&mut self, vertex: &[f32]) -> Result<(), RenderError> {
        if vertex.len() != self.floats_per_vertex {
            return Err(RenderError::VertexWidth {
                got: vertex.len(),
                expected: self.floats_per_vertex,
            });
        }
        self.vertex_data.extend_from_slice(vertex);
        Ok(())
    }

    /// Appends a triangle. Indices are checked when rendering.
    pub fn push_triangle(&mut self, indices: [usize; 3]) {
        self.index_data.extend(indices);
    }

    pub fn push_uniform(&mut self, values: &[f32]) {
        self.uniform_data.extend_from_slice(values);
    }

    /// Drops vertices, indices and uniforms. Shaders, framebuffer and
    /// configuration are kept.
    pub fn reset_geometry(&mut self) {
        self.vertex_data.clear();
        self.index_data.clear();
        self.uniform_data.clear();
    }

    pub fn num_triangles(&self) -> usize {
        self.index_data.len() / 3
    }

    pub fn set_vertex_shader(&mut self, shader: Box<dyn VertexShader>) {
        self.vertex_shader = Some(shader);
    }

    pub fn set_fragment_shader(&mut self, shader: Box<dyn FragmentShader>) {
        self.fragment_shader = Some(shader);
    }

    /// Statistics accumulated over all renders
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Renders every triangle of the index buffer into the framebuffer.
    ///
    /// The framebuffer is not cleared first. Returns the statistics of this
    /// call.
    pub fn render(&mut self) -> Result<Stats, RenderError> {
        let start = Instant::now();

        let vs = self.vertex_shader.as_deref().ok_or(RenderError::MissingShader("vertex"))?;
        let fs = self.fragment_shader.as_deref().ok_or(RenderError::MissingShader("fragment"))?;
        let fb = self.framebuffer.as_mut().ok_or(RenderError::NoFramebuffer)?;

        let count = self.vertex_data.len() / self.floats_per_vertex;
        if let Some(&index) = self.index_data.iter().find(|&&i| i >= count) {
            return Err(RenderError::IndexOutOfRange { index, count });
        }

        let mut stats = Stats {
            renders: 1,
            ..Stats::default()
        };
        let (width, height) = (fb.width(), fb.height());
        let planes = clip::planes(self.config.clip);
        let mut vertices = VertexStage::new(vs, &self.vertex_data, self.floats_per_vertex, &self.uniform_data);
        let mut clipped = Vec::new();
        let mut screen = Vec::new();

        for tri in self.index_data.chunks_exact(3) {
            stats.triangles.i += 1;
            let Some(verts) = vertices.triangle([tri[0], tri[1], tri[2]]) else {
                continue;
            };
            clipped.clear();
            match clip::clip_triangle(verts, planes, &mut clipped) {
                Status::Visible => {}
                Status::Clipped => stats.clipped += 1,
                Status::Hidden => stats.hidden += 1,
            }
            for piece in &clipped {
                match raster::setup(piece, width, height, self.config.cull) {
                    Ok(st) => screen.push(st),
                    Err(Reject::Degenerate) => stats.degenerate += 1,
                    Err(Reject::Culled) => stats.culled += 1,
                }
            }
        }
        stats.vertices = vertices.shaded();
        stats.triangles.o = screen.len();
        stats.fragments = draw(fb, &screen, fs, &self.uniform_data, self.config.band_height);
        stats.time = start.elapsed();

        debug!(
            "rendered {} triangles ({} rasterized), {} of {} fragments written",
            stats.triangles.i, stats.triangles.o, stats.fragments.o, stats.fragments.i
        );
        self.stats += stats.clone();
        Ok(stats)
    }
}

/// Rasterizes the screen triangles in order, one band of rows per worker.
#[cfg(feature = "multithreading")]
fn draw(
    fb: &mut Framebuffer,
    tris: &[ScreenTriangle],
    fs: &dyn FragmentShader,
    uniform: &[f32],
    band_height: usize,
) -> Throughput {
    use rayon::prelude::*;

    fb.bands(band_height)
        .into_par_iter()
        .map(|mut band| {
            let mut frags = FragmentStage::new(fs, uniform);
            raster::draw_triangles(tris, &mut band, &mut frags)
        })
        .reduce(Throughput::default, |a, b| a + b)
}

/// Rasterizes the screen triangles in order.
#[cfg(not(feature = "multithreading"))]
fn draw(
    fb: &mut Framebuffer,
    tris: &[ScreenTriangle],
    fs: &dyn FragmentShader,
    uniform: &[f32],
    _band_height: usize,
) -> Throughput {
    let mut frags = FragmentStage::new(fs, uniform);
    raster::draw_triangles(tris, &mut fb.as_band(), &mut frags)
}
