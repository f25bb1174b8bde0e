use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};

use crate::foundation::error::{SpriteError, SpriteResult};

/// Extensions (lowercase, no dot) recognized as frame images.
pub const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Ordered, immutable list of frame files.
///
/// Order is by path, case-insensitive, tie-broken by raw bytes, so the same folder always
/// yields the same frame order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameSet {
    paths: Vec<PathBuf>,
}

impl FrameSet {
    /// Filter `paths` to recognized frame extensions and sort them.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut paths: Vec<PathBuf> = paths
            .into_iter()
            .map(Into::into)
            .filter(|p| is_frame_file(p))
            .collect();
        paths.sort_by(|a, b| compare_paths(a, b));
        Self { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn first(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.paths.get(index).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}

impl<'a> IntoIterator for &'a FrameSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// True when `path` has one of [`FRAME_EXTENSIONS`] (any case).
pub fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            FRAME_EXTENSIONS
                .iter()
                .any(|known| e.eq_ignore_ascii_case(known))
        })
}

/// List the frame images directly inside `dir`, in frame order.
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn scan_frames(dir: &Path) -> SpriteResult<FrameSet> {
    if !dir.is_dir() {
        return Err(SpriteError::invalid_input(format!(
            "folder '{}' does not exist or is not a directory",
            dir.display()
        )));
    }

    let entries = std::fs::read_dir(dir).map_err(|e| unreadable_folder(dir, &e))?;
    let files = collect_files(dir, entries.map(|entry| entry.map(|e| e.path())))?;

    let set = FrameSet::from_paths(files);
    tracing::debug!(frames = set.len(), "scanned frame folder");
    Ok(set)
}

/// Keep the regular files of a folder listing; any listing error makes the folder unreadable.
fn collect_files<I>(dir: &Path, entries: I) -> SpriteResult<Vec<PathBuf>>
where
    I: IntoIterator<Item = std::io::Result<PathBuf>>,
{
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| unreadable_folder(dir, &e))?;
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

fn unreadable_folder(dir: &Path, err: &std::io::Error) -> SpriteError {
    SpriteError::invalid_input(format!("cannot read folder '{}': {err}", dir.display()))
}

fn compare_paths(a: &Path, b: &Path) -> Ordering {
    let a = a.as_os_str().as_encoded_bytes();
    let b = b.as_os_str().as_encoded_bytes();
    a.iter()
        .map(u8::to_ascii_lowercase)
        .cmp(b.iter().map(u8::to_ascii_lowercase))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/scan.rs"]
mod tests;
