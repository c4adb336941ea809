//! Render configuration loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable config files.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rasterizer::{ClipMode, Color, CullMode};

/// Settings that stay fixed for a whole run unless a command overrides them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Color the framebuffer is cleared to, a dark blue unless overridden
    pub background: Color,
    /// Depth the depth buffer is cleared to; anything closer passes
    pub clear_depth: f32,
    pub clip: ClipMode,
    pub cull: CullMode,
    /// Rows per band when rendering with multiple threads
    pub band_height: usize,
    /// Per-channel difference tolerated when comparing with a solution
    pub tolerance: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: Color::new(50, 50, 250),
            clear_depth: 2.0,
            clip: ClipMode::Near,
            cull: CullMode::None,
            band_height: 32,
            tolerance: 0,
        }
    }
}

/// Error type for config loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    SerializeError(#[from] ron::Error),
}

/// Load a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RenderConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Load a config from a RON string
pub fn load_config_from_str(s: &str) -> Result<RenderConfig, ConfigError> {
    Ok(ron::from_str(s)?)
}

/// Save a config to a RON file
pub fn save_config<P: AsRef<Path>>(config: &RenderConfig, path: P) -> Result<(), ConfigError> {
    fs::write(path, config_to_string(config)?)?;
    Ok(())
}

/// Serialize a config to pretty-printed RON
pub fn config_to_string(config: &RenderConfig) -> Result<String, ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(2)
        .indentor("  ".to_string());
    Ok(ron::ser::to_string_pretty(config, pretty)?)
}
