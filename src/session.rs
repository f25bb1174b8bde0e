//! Editing-session state around the sheet pipeline.
//!
//! A [`Session`] owns the live [`SheetConfig`], the loaded [`FrameSet`] and the crop
//! margins, and tells registered listeners when they change. The pipeline functions it
//! calls stay stateless and callback-free.

mod playback;
mod sequencer;

use std::path::{Path, PathBuf};

pub use playback::Playback;
pub use sequencer::{PreviewSequencer, PreviewTicket};

use crate::{
    assets::{
        decode::probe_frame_size,
        scan::{FrameSet, scan_frames},
    },
    foundation::{
        core::{CropRect, FrameSize, Margins},
        error::{SpriteError, SpriteResult},
    },
    geometry::crop::{crop_from_margins, margins_from_crop},
    layout::grid::suggest_layout,
    render::{
        composite::export_sheet,
        preview::{render_preview, try_render_preview},
    },
    sheet::config::{OutputFormat, SheetConfig},
};

/// Change notifications emitted by a [`Session`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A layout or export setting changed.
    ConfigChanged,
    CropChanged(CropRect),
    /// A new frame set was loaded; carries its length.
    FramesLoaded(usize),
    /// Effective preview rate in fps.
    FrameRateChanged(u32),
    LoopingChanged(bool),
}

/// Handle returned by [`Session::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&SessionEvent) + Send>;

/// A preview to render off the interactive thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewRequest {
    pub ticket: PreviewTicket,
    pub frame: PathBuf,
    pub crop: CropRect,
}

impl PreviewRequest {
    /// Encoded PNG, or `None` when this tick has nothing to show.
    pub fn render(&self) -> Option<Vec<u8>> {
        try_render_preview(&self.frame, self.crop)
    }

    pub fn try_render(&self) -> SpriteResult<Vec<u8>> {
        render_preview(&self.frame, self.crop)
    }
}

/// One editing session: current frames, settings and crop.
pub struct Session {
    config: SheetConfig,
    frames: FrameSet,
    original: FrameSize,
    margins: Margins,
    playback: Playback,
    previews: PreviewSequencer,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("frames", &self.frames.len())
            .field("original", &self.original)
            .field("margins", &self.margins)
            .field("playback", &self.playback)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let config = SheetConfig::default();
        let playback = Playback::new(config.frame_rate, config.is_looping);
        Self {
            config,
            frames: FrameSet::default(),
            original: FrameSize::default(),
            margins: Margins::default(),
            playback,
            previews: PreviewSequencer::new(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn frames(&self) -> &FrameSet {
        &self.frames
    }

    /// Natural size of the first loaded frame; unknown (0x0) before a load.
    pub fn original_size(&self) -> FrameSize {
        self.original
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    /// Size of the current crop as shown to the user.
    pub fn cropped_size(&self) -> FrameSize {
        FrameSize::new(self.config.crop.width, self.config.crop.height)
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    /// Register a listener for [`SessionEvent`]s.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&SessionEvent) + Send + 'static,
    {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(other, _)| *other != id);
        self.listeners.len() != before
    }

    /// Scan `dir` and load its frames; returns the number found.
    pub fn load_folder(&mut self, dir: &Path) -> SpriteResult<usize> {
        let set = scan_frames(dir)?;
        let n = set.len();
        self.load_frames(set)?;
        Ok(n)
    }

    /// Replace the frame set.
    ///
    /// A non-empty set resets the crop to the first frame's full size and picks a
    /// near-square grid for it.
    #[tracing::instrument(skip_all, fields(frames = frames.len()))]
    pub fn load_frames(&mut self, frames: FrameSet) -> SpriteResult<()> {
        let first_size = match frames.first() {
            Some(first) => Some(probe_frame_size(first)?),
            None => None,
        };

        self.frames = frames;
        self.playback.reset();
        self.emit(&SessionEvent::FramesLoaded(self.frames.len()));

        if let Some(size) = first_size {
            self.set_default_crop(size);
        }
        if let Some(layout) = suggest_layout(self.frames.len()) {
            tracing::debug!(columns = layout.columns, rows = layout.rows, "auto layout");
            self.set_columns(layout.columns);
            self.set_rows(layout.rows);
        }
        Ok(())
    }

    /// Record the original frame size and reset the crop to cover all of it.
    pub fn set_default_crop(&mut self, original: FrameSize) {
        self.original = original;
        self.margins = Margins::default();
        self.update_crop_from_margins();
    }

    pub fn set_margins(&mut self, margins: Margins) {
        if self.margins == margins {
            return;
        }
        self.margins = margins;
        self.update_crop_from_margins();
    }

    /// Back to zero margins (full frame).
    pub fn reset_crop(&mut self) {
        self.set_margins(Margins::default());
    }

    pub fn set_columns(&mut self, columns: i32) {
        if self.config.columns != columns {
            self.config.columns = columns;
            self.emit(&SessionEvent::ConfigChanged);
        }
    }

    pub fn set_rows(&mut self, rows: i32) {
        if self.config.rows != rows {
            self.config.rows = rows;
            self.emit(&SessionEvent::ConfigChanged);
        }
    }

    pub fn set_start_frame(&mut self, start_frame: i32) {
        if self.config.start_frame != start_frame {
            self.config.start_frame = start_frame;
            self.emit(&SessionEvent::ConfigChanged);
        }
    }

    pub fn set_padding(&mut self, padding: i32) {
        if self.config.padding != padding {
            self.config.padding = padding;
            self.emit(&SessionEvent::ConfigChanged);
        }
    }

    pub fn set_spacing(&mut self, spacing: i32) {
        if self.config.spacing != spacing {
            self.config.spacing = spacing;
            self.emit(&SessionEvent::ConfigChanged);
        }
    }

    pub fn set_frame_rate(&mut self, frame_rate: i32) {
        if self.config.frame_rate != frame_rate {
            self.config.frame_rate = frame_rate;
            self.playback.set_frame_rate(frame_rate);
            self.emit(&SessionEvent::FrameRateChanged(self.playback.frame_rate()));
        }
    }

    pub fn set_looping(&mut self, looping: bool) {
        if self.config.is_looping != looping {
            self.config.is_looping = looping;
            self.playback.set_looping(looping);
            self.emit(&SessionEvent::LoopingChanged(looping));
        }
    }

    pub fn set_output_format(&mut self, format: OutputFormat) {
        if self.config.output_format != format {
            self.config.output_format = format;
            self.emit(&SessionEvent::ConfigChanged);
        }
    }

    /// Replace the whole config, deriving margins from its crop.
    pub fn set_config(&mut self, config: SheetConfig) {
        self.config = config;
        self.margins = if self.original.is_known() {
            margins_from_crop(self.original, self.config.crop)
        } else {
            Margins {
                left: self.config.crop.x.max(0),
                top: self.config.crop.y.max(0),
                ..self.margins
            }
        };
        self.sync_playback();
        self.emit(&SessionEvent::CropChanged(self.config.crop));
        self.emit(&SessionEvent::ConfigChanged);
    }

    /// Fresh default config with the crop reset to the full frame.
    pub fn reset_defaults(&mut self) {
        self.config = SheetConfig::default();
        self.sync_playback();
        self.set_default_crop(self.original);
        self.emit(&SessionEvent::ConfigChanged);
    }

    /// Write the sheet for the loaded frames to `out`.
    pub fn export(&self, out: &Path) -> SpriteResult<PathBuf> {
        if self.frames.is_empty() {
            return Err(SpriteError::invalid_input(
                "no frames loaded; open a folder with images first",
            ));
        }
        export_sheet(self.frames.paths(), &self.config, out)
    }

    /// Preview request for the frame under the playback cursor.
    pub fn preview_request(&mut self) -> Option<PreviewRequest> {
        let index = self.playback.current(self.frames.len())?;
        let frame = self.frames.get(index)?.to_path_buf();
        Some(PreviewRequest {
            ticket: self.previews.begin(),
            frame,
            crop: self.config.crop,
        })
    }

    /// Advance playback one step and request the preview for the new frame.
    pub fn tick(&mut self) -> Option<PreviewRequest> {
        self.playback.advance(self.frames.len())?;
        self.preview_request()
    }

    /// True if a finished preview for `ticket` should replace what is displayed.
    pub fn accept_preview(&mut self, ticket: PreviewTicket) -> bool {
        self.previews.accept(ticket)
    }

    fn update_crop_from_margins(&mut self) {
        let Some(crop) = crop_from_margins(self.original, self.margins) else {
            return;
        };
        self.config.crop = crop;
        self.emit(&SessionEvent::CropChanged(crop));
        self.emit(&SessionEvent::ConfigChanged);
    }

    fn sync_playback(&mut self) {
        self.playback.set_frame_rate(self.config.frame_rate);
        self.playback.set_looping(self.config.is_looping);
    }

    fn emit(&mut self, event: &SessionEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/session/session.rs"]
mod tests;
