use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use image::RgbaImage;
use rayon::prelude::*;

use crate::{
    assets::decode::{decode_frame, frame_size},
    foundation::{
        core::{CropRect, FrameSize},
        error::{SpriteError, SpriteResult},
    },
    geometry::crop::resolve_crop,
    layout::grid::{GridPlan, plan_grid},
    sheet::config::{OutputFormat, SheetConfig},
};

/// How frames are decoded while compositing.
///
/// Decoding may run on a rayon pool in chunks of `chunk_size`; blitting always happens
/// on the calling thread in input order.
#[derive(Clone, Debug)]
pub struct CompositeThreading {
    pub parallel: bool,
    pub chunk_size: usize,
    pub threads: Option<usize>,
}

impl Default for CompositeThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 16,
            threads: None,
        }
    }
}

/// A composited, not yet encoded, sprite sheet.
#[derive(Clone, Debug)]
pub struct SpriteSheet {
    pub image: RgbaImage,
    pub plan: GridPlan,
    /// Crop resolved against the first frame and applied to every frame.
    pub crop: CropRect,
    pub format: OutputFormat,
}

impl SpriteSheet {
    pub fn encode(&self) -> SpriteResult<Vec<u8>> {
        encode_image(&self.image, self.format)
    }
}

/// Composite `frames` into a sheet and return the encoded bytes.
pub fn composite<P>(frames: &[P], config: &SheetConfig) -> SpriteResult<Vec<u8>>
where
    P: AsRef<Path> + Sync,
{
    build_sheet(frames, config)?.encode()
}

pub fn build_sheet<P>(frames: &[P], config: &SheetConfig) -> SpriteResult<SpriteSheet>
where
    P: AsRef<Path> + Sync,
{
    build_sheet_with(frames, config, &CompositeThreading::default())
}

/// Composite `frames` onto a transparent canvas laid out by `config`.
///
/// Every frame is cut with the crop resolved against the first frame. Frames smaller
/// than that crop leave the uncovered part of their cell transparent, and a zero-area
/// crop draws nothing while keeping the padded grid. Any decode failure aborts the whole
/// sheet; a sheet with no pixels at all is rejected.
#[tracing::instrument(skip_all, fields(frames = frames.len()))]
pub fn build_sheet_with<P>(
    frames: &[P],
    config: &SheetConfig,
    threading: &CompositeThreading,
) -> SpriteResult<SpriteSheet>
where
    P: AsRef<Path> + Sync,
{
    let Some(first_path) = frames.first() else {
        return Err(SpriteError::invalid_input("no frames to composite"));
    };
    config.validate()?;

    let first = decode_frame(first_path.as_ref())?;
    let natural = frame_size(&first);
    let crop = resolve_crop(config.crop, natural.width, natural.height);
    let cell = FrameSize::new(crop.width, crop.height);
    tracing::debug!(?crop, ?natural, "resolved sheet crop");

    let plan = plan_grid(
        frames.len(),
        config.columns,
        config.rows,
        cell,
        config.padding,
        config.spacing,
    )?;
    if plan.is_zero_area() {
        return Err(SpriteError::invalid_input(format!(
            "zero-area layout: a {}x{} sheet cannot be encoded (crop {}x{} of a {}x{} frame)",
            plan.sheet_width,
            plan.sheet_height,
            crop.width,
            crop.height,
            natural.width,
            natural.height
        )));
    }
    if plan.dropped > 0 {
        tracing::warn!(
            dropped = plan.dropped,
            capacity = plan.capacity(),
            "frames past grid capacity are left out of the sheet"
        );
    }
    tracing::debug!(
        columns = plan.columns,
        rows = plan.rows,
        width = plan.sheet_width,
        height = plan.sheet_height,
        "planned sheet grid"
    );

    let mut canvas = RgbaImage::new(plan.sheet_width, plan.sheet_height);
    let mut draw = |img: &RgbaImage, dest_x: u32, dest_y: u32| {
        let (w, h) = copy_extent(cell, frame_size(img), crop);
        blit_region(
            &mut canvas,
            img,
            (crop.x as u32, crop.y as u32),
            (w, h),
            (dest_x, dest_y),
        );
    };

    let Some((head, rest)) = plan.placements.split_first() else {
        return Err(SpriteError::invalid_input("zero-capacity layout"));
    };
    draw(&first, head.dest_x, head.dest_y);
    drop(first);

    if threading.parallel && !rest.is_empty() {
        let pool = build_thread_pool(threading.threads)?;
        for chunk in rest.chunks(threading.chunk_size.max(1)) {
            let decoded = pool.install(|| {
                chunk
                    .par_iter()
                    .map(|p| decode_frame(frames[p.index].as_ref()))
                    .collect::<Vec<_>>()
            });
            for (placement, img) in chunk.iter().zip(decoded) {
                draw(&img?, placement.dest_x, placement.dest_y);
            }
        }
    } else {
        for placement in rest {
            let img = decode_frame(frames[placement.index].as_ref())?;
            draw(&img, placement.dest_x, placement.dest_y);
        }
    }

    Ok(SpriteSheet {
        image: canvas,
        plan,
        crop,
        format: config.output_format,
    })
}

/// Composite `frames` and write the sheet to `out` in `config.output_format`.
///
/// The file is written only after the whole sheet is encoded, through a temporary
/// sibling that replaces `out` on success. Returns the written path.
pub fn export_sheet<P>(frames: &[P], config: &SheetConfig, out: &Path) -> SpriteResult<PathBuf>
where
    P: AsRef<Path> + Sync,
{
    export_sheet_with(frames, config, out, &CompositeThreading::default())
}

#[tracing::instrument(skip_all, fields(frames = frames.len(), out = %out.display()))]
pub fn export_sheet_with<P>(
    frames: &[P],
    config: &SheetConfig,
    out: &Path,
    threading: &CompositeThreading,
) -> SpriteResult<PathBuf>
where
    P: AsRef<Path> + Sync,
{
    let sheet = build_sheet_with(frames, config, threading)?;
    let bytes = sheet.encode().map_err(|e| retag_encode_error(e, out))?;
    write_atomically(out, &bytes)?;
    tracing::debug!(bytes = bytes.len(), "wrote sprite sheet");
    Ok(out.to_path_buf())
}

/// Encode an RGBA canvas. JPEG drops the alpha channel.
pub fn encode_image(img: &RgbaImage, format: OutputFormat) -> SpriteResult<Vec<u8>> {
    let dynamic = match format {
        OutputFormat::Jpg => image::DynamicImage::ImageRgb8(
            image::DynamicImage::ImageRgba8(img.clone()).to_rgb8(),
        ),
        OutputFormat::Png | OutputFormat::Bmp => image::DynamicImage::ImageRgba8(img.clone()),
    };
    let mut buf = Vec::new();
    dynamic
        .write_to(&mut Cursor::new(&mut buf), format.image_format())
        .map_err(|e| SpriteError::encode(None, e))?;
    Ok(buf)
}

/// Size of the region actually copied from a `source`-sized frame: the cell size,
/// shrunk to what the frame has to the right of and below the crop origin.
pub fn copy_extent(cell: FrameSize, source: FrameSize, crop: CropRect) -> (u32, u32) {
    let w = cell.width.min(source.width.saturating_sub(crop.x)).max(0);
    let h = cell.height.min(source.height.saturating_sub(crop.y)).max(0);
    (w as u32, h as u32)
}

/// Copy a `size` region at `src_origin` in `src` to `dest_origin` in `dst`.
///
/// The region is clipped to both images; a zero-area region is a no-op.
pub fn blit_region(
    dst: &mut RgbaImage,
    src: &RgbaImage,
    src_origin: (u32, u32),
    size: (u32, u32),
    dest_origin: (u32, u32),
) {
    let (sw, sh) = src.dimensions();
    let (dw, dh) = dst.dimensions();
    let (sx, sy) = src_origin;
    let (dx, dy) = dest_origin;

    let w = size.0.min(sw.saturating_sub(sx)).min(dw.saturating_sub(dx)) as usize;
    let h = size.1.min(sh.saturating_sub(sy)).min(dh.saturating_sub(dy)) as usize;
    if w == 0 || h == 0 {
        return;
    }

    let src_stride = sw as usize * 4;
    let dst_stride = dw as usize * 4;
    let src_buf: &[u8] = src.as_raw();
    let dst_buf: &mut [u8] = dst;
    for row in 0..h {
        let s = (sy as usize + row) * src_stride + sx as usize * 4;
        let d = (dy as usize + row) * dst_stride + dx as usize * 4;
        dst_buf[d..d + w * 4].copy_from_slice(&src_buf[s..s + w * 4]);
    }
}

pub fn ensure_parent_dir(path: &Path) -> SpriteResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("failed to create output directory '{}'", parent.display())
        })?;
    }
    Ok(())
}

fn write_atomically(out: &Path, bytes: &[u8]) -> SpriteResult<()> {
    ensure_parent_dir(out)?;
    let file_name = out.file_name().ok_or_else(|| {
        SpriteError::invalid_input(format!("'{}' is not a file path", out.display()))
    })?;
    let tmp = out.with_file_name(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    let mut guard = TempFileGuard(Some(tmp.clone()));
    std::fs::write(&tmp, bytes).map_err(|e| SpriteError::write(out, e))?;
    std::fs::rename(&tmp, out).map_err(|e| SpriteError::write(out, e))?;
    guard.0 = None;
    Ok(())
}

fn retag_encode_error(err: SpriteError, out: &Path) -> SpriteError {
    match err {
        SpriteError::Encode { path: None, source } => SpriteError::encode(Some(out), source),
        other => other,
    }
}

fn build_thread_pool(threads: Option<usize>) -> SpriteResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SpriteError::invalid_input(
            "composite threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        SpriteError::invalid_input(format!("failed to build rayon thread pool: {e}"))
    })
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
