use crate::foundation::core::{CropRect, FrameSize, Margins};

/// Clamp a requested crop to a `source_width x source_height` frame.
///
/// Non-positive `width`/`height` expand to the full source dimension. The result always
/// lies inside the source; it may be zero-area when the origin sits on (or past) the
/// far edge, which callers treat as "nothing to draw".
pub fn resolve_crop(requested: CropRect, source_width: i32, source_height: i32) -> CropRect {
    let source_width = source_width.max(0);
    let source_height = source_height.max(0);

    let x = requested.x.clamp(0, source_width);
    let y = requested.y.clamp(0, source_height);

    let width = if requested.width <= 0 {
        source_width
    } else {
        requested.width
    };
    let height = if requested.height <= 0 {
        source_height
    } else {
        requested.height
    };

    CropRect {
        x,
        y,
        width: width.min(source_width - x),
        height: height.min(source_height - y),
    }
}

/// Convert edge margins into a crop of an `original`-sized frame.
///
/// Returns `None` until the original size is known. Each resulting dimension is floored
/// at 1 so that over-large margins never produce an empty request.
pub fn crop_from_margins(original: FrameSize, margins: Margins) -> Option<CropRect> {
    if !original.is_known() {
        return None;
    }
    let m = margins.non_negative();
    let width = (i64::from(original.width) - i64::from(m.left) - i64::from(m.right)).max(1);
    let height = (i64::from(original.height) - i64::from(m.top) - i64::from(m.bottom)).max(1);
    Some(CropRect {
        x: m.left,
        y: m.top,
        width: i32::try_from(width).unwrap_or(i32::MAX),
        height: i32::try_from(height).unwrap_or(i32::MAX),
    })
}

/// Inverse of [`crop_from_margins`]: recover edge margins from a crop of `original`.
///
/// Sentinel axes map to zero margins on the far edge.
pub fn margins_from_crop(original: FrameSize, crop: CropRect) -> Margins {
    let far = |extent: i32, origin: i32, size: i32| -> i32 {
        if size <= 0 {
            return 0;
        }
        let rem = i64::from(extent) - i64::from(origin) - i64::from(size);
        i32::try_from(rem.max(0)).unwrap_or(i32::MAX)
    };
    Margins {
        top: crop.y.max(0),
        left: crop.x.max(0),
        right: far(original.width, crop.x, crop.width),
        bottom: far(original.height, crop.y, crop.height),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/crop.rs"]
mod tests;
