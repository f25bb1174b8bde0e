use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context as _;

use crate::foundation::{
    core::CropRect,
    error::{SpriteError, SpriteResult},
};

/// Encoding used for the exported sheet.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpg,
    Bmp,
}

impl OutputFormat {
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpg => image::ImageFormat::Jpeg,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Bmp => "bmp",
        }
    }

    /// Infer the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpg),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }
}

/// Settings for one sprite sheet, as edited in a session and persisted as JSON.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Grid columns, `>= 1`.
    pub columns: i32,
    /// Grid rows; `<= 0` derives `ceil(frames / columns)`.
    pub rows: i32,
    /// Informational only: not applied when scanning or compositing.
    pub start_frame: i32,
    /// Shared crop applied to every frame.
    pub crop: CropRect,
    /// Inset between the sheet edge and the outer cells.
    pub padding: i32,
    /// Gap between adjacent cells.
    pub spacing: i32,
    /// Preview playback rate in frames per second.
    pub frame_rate: i32,
    pub is_looping: bool,
    pub output_format: OutputFormat,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            columns: 8,
            rows: 1,
            start_frame: 0,
            crop: CropRect::full(),
            padding: 0,
            spacing: 0,
            frame_rate: 12,
            is_looping: true,
            output_format: OutputFormat::Png,
        }
    }
}

impl SheetConfig {
    /// Read a JSON config; missing fields take their defaults.
    pub fn from_path(path: &Path) -> SpriteResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        serde_json::from_reader(BufReader::new(f))
            .map_err(|e| SpriteError::config(format!("parse '{}': {e}", path.display())))
    }

    /// Write this config as pretty-printed JSON.
    pub fn to_path(&self, path: &Path) -> SpriteResult<()> {
        crate::render::composite::ensure_parent_dir(path)?;
        let f =
            File::create(path).with_context(|| format!("create config '{}'", path.display()))?;
        serde_json::to_writer_pretty(f, self)
            .map_err(|e| SpriteError::config(format!("write '{}': {e}", path.display())))
    }

    /// Check the layout fields the compositor relies on.
    pub fn validate(&self) -> SpriteResult<()> {
        if self.columns <= 0 {
            return Err(SpriteError::invalid_input(format!(
                "invalid layout: columns must be >= 1 (got {})",
                self.columns
            )));
        }
        if self.padding < 0 {
            return Err(SpriteError::invalid_input(format!(
                "padding must be >= 0 (got {})",
                self.padding
            )));
        }
        if self.spacing < 0 {
            return Err(SpriteError::invalid_input(format!(
                "spacing must be >= 0 (got {})",
                self.spacing
            )));
        }
        Ok(())
    }

    /// Playback rate with non-positive values clamped to 1 fps.
    pub fn effective_frame_rate(&self) -> u32 {
        self.frame_rate.max(1) as u32
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sheet/config.rs"]
mod tests;
