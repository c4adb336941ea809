//! softrast: a software triangle rasterizer
//!
//! Renders indexed triangle lists on the CPU with programmable vertex and
//! fragment shaders:
//! - Homogeneous clipping against the near plane or the whole frustum
//! - Edge-function scan conversion with a top-left fill rule
//! - Perspective-correct attribute interpolation
//! - Less-than depth buffering
//!
//! Scenes are driven by line-oriented command files (see [`command`]).

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod rasterizer;
pub mod shaders;
pub mod command;
pub mod codec;
pub mod config;
pub mod compare;
