use std::path::Path;

use image::RgbaImage;

use crate::foundation::{
    core::FrameSize,
    error::{SpriteError, SpriteResult},
};

/// Decode a frame file into straight-alpha RGBA8.
pub fn decode_frame(path: &Path) -> SpriteResult<RgbaImage> {
    let reader = image::ImageReader::open(path)
        .map_err(|e| SpriteError::decode(path, image::ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| SpriteError::decode(path, image::ImageError::IoError(e)))?;
    let img = reader.decode().map_err(|e| SpriteError::decode(path, e))?;
    Ok(img.to_rgba8())
}

/// Decode in-memory frame bytes; `label` names the frame in errors.
pub fn decode_frame_bytes(bytes: &[u8], label: &Path) -> SpriteResult<RgbaImage> {
    let img = image::load_from_memory(bytes).map_err(|e| SpriteError::decode(label, e))?;
    Ok(img.to_rgba8())
}

/// Read a frame's natural size from its header without decoding pixels.
pub fn probe_frame_size(path: &Path) -> SpriteResult<FrameSize> {
    let dims = image::image_dimensions(path).map_err(|e| SpriteError::decode(path, e))?;
    Ok(FrameSize::from_dimensions(dims))
}

/// Natural size of an already decoded frame.
pub fn frame_size(img: &RgbaImage) -> FrameSize {
    FrameSize::from_dimensions(img.dimensions())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
