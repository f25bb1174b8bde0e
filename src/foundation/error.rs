use std::path::{Path, PathBuf};

/// Convenience result type used across the crate.
pub type SpriteResult<T> = Result<T, SpriteError>;

/// Top-level error taxonomy used by sheet, preview and scan APIs.
#[derive(thiserror::Error, Debug)]
pub enum SpriteError {
    /// Empty frame set, invalid layout, or a folder that cannot be scanned.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A source frame could not be opened or decoded.
    #[error("failed to decode frame '{}'", .path.display())]
    Decode {
        /// Offending frame file.
        path: PathBuf,
        /// Underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// The output image could not be encoded or persisted.
    #[error("failed to encode sheet{}", dest_suffix(.path))]
    Encode {
        /// Destination, when encoding targets a file.
        path: Option<PathBuf>,
        /// Underlying encoder error.
        #[source]
        source: image::ImageError,
    },

    /// A configuration file could not be parsed or failed validation.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SpriteError {
    /// Build a [`SpriteError::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build a [`SpriteError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`SpriteError::Decode`] value for `path`.
    pub fn decode(path: impl AsRef<Path>, source: image::ImageError) -> Self {
        Self::Decode {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build a [`SpriteError::Encode`] value, optionally tagged with its destination.
    pub fn encode(path: Option<&Path>, source: image::ImageError) -> Self {
        Self::Encode {
            path: path.map(Path::to_path_buf),
            source,
        }
    }

    /// Build an [`SpriteError::Encode`] value from an IO failure while persisting output.
    pub fn write(path: &Path, source: std::io::Error) -> Self {
        Self::encode(Some(path), image::ImageError::IoError(source))
    }
}

fn dest_suffix(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" '{}'", p.display()),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
