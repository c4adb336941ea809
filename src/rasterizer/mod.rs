//! CPU triangle rasterizer
//!
//! Pipeline, in order:
//! - Vertex stage: user vertex shader, memoized per vertex index
//! - Primitive assembly and homogeneous clipping (near plane, or full frustum)
//! - Perspective divide, viewport transform, optional face culling
//! - Edge-function scan conversion with a top-left fill convention
//! - Less-than depth test, perspective-correct attributes, fragment shader
//!
//! The [`Driver`] owns all state for a render context and runs the stages.

mod math;
mod types;
mod framebuffer;
mod shader;
mod stats;
pub mod vertex;
pub mod clip;
pub mod raster;
pub mod fragment;
mod driver;

pub use math::*;
pub use types::*;
pub use framebuffer::*;
pub use shader::*;
pub use stats::*;
pub use driver::*;
