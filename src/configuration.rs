//! Extraction options.
//!
//! [`ExtractOptions`] is a builder that carries the video tool, seek mode,
//! extra encoder arguments, and an optional progress callback into
//! [`InputFile::make_screenshots`](crate::InputFile::make_screenshots)
//! without growing its signature.
//!
//! # Example
//!
//! ```no_run
//! use framepost::{ExtractOptions, FfmpegTool};
//!
//! let options = ExtractOptions::new()
//!     .with_ffmpeg(FfmpegTool::new("/opt/ffmpeg/bin/ffmpeg"))
//!     .with_frame_accurate(true)
//!     .with_extra_args("-vf scale=1280:-1");
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::ffmpeg::FfmpegTool;
use crate::progress::{NoOpProgress, ProgressCallback};

/// Settings for one screenshot batch.
#[derive(Clone)]
pub struct ExtractOptions {
    pub(crate) ffmpeg: FfmpegTool,
    pub(crate) frame_accurate: bool,
    pub(crate) extra_args: Option<String>,
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("ffmpeg", &self.ffmpeg.program())
            .field("frame_accurate", &self.frame_accurate)
            .field("extra_args", &self.extra_args)
            .finish()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Defaults: `ffmpeg` from `PATH`, fast seeking, no extra arguments, no
    /// progress callback.
    pub fn new() -> Self {
        Self {
            ffmpeg: FfmpegTool::default(),
            frame_accurate: false,
            extra_args: None,
            progress: Arc::new(NoOpProgress),
        }
    }

    #[must_use]
    pub fn with_ffmpeg(mut self, ffmpeg: FfmpegTool) -> Self {
        self.ffmpeg = ffmpeg;
        self
    }

    /// Use the slower two-stage seek for exact frame selection.
    #[must_use]
    pub fn with_frame_accurate(mut self, frame_accurate: bool) -> Self {
        self.frame_accurate = frame_accurate;
        self
    }

    /// Whitespace-separated arguments appended to every frame extraction.
    #[must_use]
    pub fn with_extra_args(mut self, args: impl Into<String>) -> Self {
        let args = args.into();
        self.extra_args = (!args.trim().is_empty()).then_some(args);
        self
    }

    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    pub fn ffmpeg(&self) -> &FfmpegTool {
        &self.ffmpeg
    }
}
