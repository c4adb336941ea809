//! PNG encoding and decoding
//!
//! In memory, images are row-major packed RGBA pixels with row 0 at the
//! bottom. Image files store the top row first, so rows are flipped on the
//! way in and out.

use std::io::Cursor;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, RgbaImage};
use log::info;
use thiserror::Error;

use crate::rasterizer::{Color, Pixel};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to load {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to save {path}: {source}")]
    Save {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("{len} pixels do not make a {width}x{height} image")]
    SizeMismatch { len: usize, width: usize, height: usize },
}

/// Decoded image: bottom-up packed pixels, width, height
pub type Decoded = (Vec<Pixel>, usize, usize);

/// Read an image file of any supported format
pub fn decode_image<P: AsRef<Path>>(path: P) -> Result<Decoded, CodecError> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| CodecError::Load {
        path: path.display().to_string(),
        source,
    })?;
    let decoded = from_dynamic(img);
    info!("Loaded {} ({}x{})", path.display(), decoded.1, decoded.2);
    Ok(decoded)
}

/// Decode an image from raw file bytes
pub fn decode_bytes(bytes: &[u8]) -> Result<Decoded, CodecError> {
    Ok(from_dynamic(image::load_from_memory(bytes)?))
}

/// Write pixels to a PNG file
pub fn encode_image<P: AsRef<Path>>(
    pixels: &[Pixel],
    width: usize,
    height: usize,
    path: P,
) -> Result<(), CodecError> {
    let path = path.as_ref();
    let img = to_rgba(pixels, width, height)?;
    img.save_with_format(path, ImageFormat::Png).map_err(|source| CodecError::Save {
        path: path.display().to_string(),
        source,
    })?;
    info!("Wrote {} ({}x{})", path.display(), width, height);
    Ok(())
}

/// Encode pixels as PNG file bytes
pub fn encode_bytes(pixels: &[Pixel], width: usize, height: usize) -> Result<Vec<u8>, CodecError> {
    let img = to_rgba(pixels, width, height)?;
    let mut out = Cursor::new(Vec::new());
    PngEncoder::new(&mut out).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(out.into_inner())
}

fn from_dynamic(img: DynamicImage) -> Decoded {
    let rgba = img.to_rgba8();
    let (width, height) = (rgba.width() as usize, rgba.height() as usize);
    let mut pixels = Vec::with_capacity(width * height);
    for row in rgba.rows().rev() {
        pixels.extend(row.map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]).to_u32()));
    }
    (pixels, width, height)
}

fn to_rgba(pixels: &[Pixel], width: usize, height: usize) -> Result<RgbaImage, CodecError> {
    let mismatch = CodecError::SizeMismatch {
        len: pixels.len(),
        width,
        height,
    };
    if width == 0 || pixels.len() != width * height {
        return Err(mismatch);
    }
    let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
        return Err(mismatch);
    };
    let mut bytes = Vec::with_capacity(pixels.len() * 4);
    for row in pixels.chunks_exact(width).rev() {
        bytes.extend(row.iter().flat_map(|&p| Color::from_u32(p).to_bytes()));
    }
    RgbaImage::from_raw(w, h, bytes).ok_or(mismatch)
}
