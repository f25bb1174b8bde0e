//! Composite numbered animation frames into a single grid-arranged sprite sheet.
//!
//! # Pipeline overview
//!
//! 1. **Scan**: `folder -> FrameSet`, frame files ordered by path ([`scan_frames`])
//! 2. **Resolve**: the shared crop is clamped against the first frame ([`resolve_crop`])
//! 3. **Plan**: frame count + grid settings -> sheet size and cell placements ([`plan_grid`])
//! 4. **Composite**: each frame's cropped region is copied into its cell ([`build_sheet`])
//! 5. **Encode**: PNG, JPEG or BMP, to bytes ([`composite`]) or to a file ([`export_sheet`])
//!
//! [`render_preview`] is independent of steps 3-5: it highlights the crop on one frame
//! and always returns a PNG.
//!
//! The pipeline functions are stateless and take all inputs per call. [`Session`] is the
//! editing-context layer on top: it owns the live [`SheetConfig`], derives the crop from
//! edge margins, steps the preview cursor and notifies listeners of changes.
#![forbid(unsafe_code)]

mod assets;
mod foundation;
mod geometry;
mod layout;
mod render;
mod session;
mod sheet;

pub use assets::decode::{decode_frame, decode_frame_bytes, frame_size, probe_frame_size};
pub use assets::scan::{FRAME_EXTENSIONS, FrameSet, is_frame_file, scan_frames};
pub use foundation::core::{CropRect, FrameSize, Margins};
pub use foundation::error::{SpriteError, SpriteResult};
pub use geometry::crop::{crop_from_margins, margins_from_crop, resolve_crop};
pub use layout::grid::{GridPlacement, GridPlan, LayoutSuggestion, plan_grid, suggest_layout};
pub use render::blend::Span;
pub use render::composite::{
    CompositeThreading, SpriteSheet, blit_region, build_sheet, build_sheet_with, composite,
    copy_extent, encode_image, ensure_parent_dir, export_sheet, export_sheet_with,
};
pub use render::preview::{
    OUTLINE_RGBA, OUTLINE_WIDTH, OVERLAY_RGBA, overlay_bands, render_preview,
    render_preview_image, try_render_preview,
};
pub use session::{
    Playback, PreviewRequest, PreviewSequencer, PreviewTicket, Session, SessionEvent,
    SubscriptionId,
};
pub use sheet::config::{OutputFormat, SheetConfig};
