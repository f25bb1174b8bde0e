use std::{io::Cursor, path::Path};

use image::RgbaImage;

use crate::{
    assets::decode::{decode_frame, frame_size},
    foundation::{
        core::CropRect,
        error::{SpriteError, SpriteResult},
    },
    geometry::crop::resolve_crop,
    render::blend::{Span, fill_rect_over, fill_rect_solid},
};

/// Dim applied outside the crop (straight RGBA).
pub const OVERLAY_RGBA: [u8; 4] = [0, 0, 0, 128];
/// Crop outline color (straight RGBA).
pub const OUTLINE_RGBA: [u8; 4] = [255, 0, 0, 255];
pub const OUTLINE_WIDTH: u32 = 2;

/// The four strips outside `crop` on a `width x height` frame: top, bottom, left, right.
///
/// Top and bottom span the full width; left and right only the crop's rows, so the
/// strips tile the outside exactly once.
pub fn overlay_bands(crop: CropRect, width: u32, height: u32) -> [Span; 4] {
    let x0 = crop.x.max(0) as u32;
    let y0 = crop.y.max(0) as u32;
    let x1 = crop.right().max(0) as u32;
    let y1 = crop.bottom().max(0) as u32;
    [
        (0, 0, width, y0),
        (0, y1, width, height),
        (0, y0, x0, y1),
        (x1, y0, width, y1),
    ]
}

/// Draw the crop highlight over a copy of `frame`.
///
/// Returns the annotated image and the crop it was resolved to.
pub fn render_preview_image(frame: &RgbaImage, crop: CropRect) -> (RgbaImage, CropRect) {
    let natural = frame_size(frame);
    let crop = resolve_crop(crop, natural.width, natural.height);
    let (width, height) = frame.dimensions();

    let mut out = frame.clone();
    for band in overlay_bands(crop, width, height) {
        fill_rect_over(&mut out, band, OVERLAY_RGBA);
    }

    if !crop.is_empty() {
        let (x0, y0) = (crop.x as u32, crop.y as u32);
        let (x1, y1) = (crop.right() as u32, crop.bottom() as u32);
        let tw = OUTLINE_WIDTH.min(x1 - x0);
        let th = OUTLINE_WIDTH.min(y1 - y0);
        for edge in [
            (x0, y0, x1, y0 + th),
            (x0, y1 - th, x1, y1),
            (x0, y0, x0 + tw, y1),
            (x1 - tw, y0, x1, y1),
        ] {
            fill_rect_solid(&mut out, edge, OUTLINE_RGBA);
        }
    }

    (out, crop)
}

/// Render a PNG preview of one frame with `crop` highlighted.
///
/// Always PNG, whatever the sheet's export format.
#[tracing::instrument(skip_all, fields(frame = %frame_path.display()))]
pub fn render_preview(frame_path: &Path, crop: CropRect) -> SpriteResult<Vec<u8>> {
    let frame = decode_frame(frame_path)?;
    let (preview, _) = render_preview_image(&frame, crop);

    let mut buf = Vec::new();
    preview
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| SpriteError::encode(None, e))?;
    Ok(buf)
}

/// [`render_preview`] for polling callers: any failure means "no preview this tick".
pub fn try_render_preview(frame_path: &Path, crop: CropRect) -> Option<Vec<u8>> {
    match render_preview(frame_path, crop) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            tracing::debug!(error = %err, frame = %frame_path.display(), "preview skipped");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/preview.rs"]
mod tests;
