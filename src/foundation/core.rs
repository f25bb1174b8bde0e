/// Crop rectangle in source-image pixel coordinates.
///
/// A `width` or `height` of zero or less is the "full source dimension" sentinel; see
/// [`crate::resolve_crop`].
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(default)]
pub struct CropRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels, `<= 0` meaning "full width".
    pub width: i32,
    /// Height in pixels, `<= 0` meaning "full height".
    pub height: i32,
}

impl CropRect {
    /// Build a rectangle from its components.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The "whole frame" request: origin at zero, both axes using the sentinel.
    pub const fn full() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// True when either axis still carries the full-dimension sentinel.
    pub fn uses_full_sentinel(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// True when the rectangle covers no pixels.
    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Exclusive right edge.
    pub fn right(self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> i32 {
        self.y.saturating_add(self.height)
    }
}

/// Natural pixel size of a decoded frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameSize {
    pub width: i32,
    pub height: i32,
}

impl FrameSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Size of a decoded image, saturating dimensions that do not fit `i32`.
    pub fn from_dimensions((width, height): (u32, u32)) -> Self {
        Self {
            width: i32::try_from(width).unwrap_or(i32::MAX),
            height: i32::try_from(height).unwrap_or(i32::MAX),
        }
    }

    pub fn is_known(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Per-edge insets an editing session uses to describe a crop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

impl Margins {
    pub const fn new(top: i32, bottom: i32, left: i32, right: i32) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// Copy with every edge floored at zero.
    pub fn non_negative(self) -> Self {
        Self {
            top: self.top.max(0),
            bottom: self.bottom.max(0),
            left: self.left.max(0),
            right: self.right.max(0),
        }
    }
}
