//! Input video files and the screenshots taken from them.
//!
//! An [`InputFile`] owns the ordered list of [`Screenshot`]s extracted from
//! it. Each screenshot only remembers the *name* of the file it came from, so
//! the list can be handed around (and mutated by the upload step) without
//! any shared ownership.
//!
//! # Example
//!
//! ```no_run
//! use framepost::{ExtractOptions, InputFile};
//!
//! let mut input = InputFile::new("episode.mkv");
//! let results = input.make_screenshots(3, "shots".as_ref(), &ExtractOptions::new())?;
//! for screenshot in results.iter().flatten() {
//!     println!("{} at {}", screenshot.path().display(), screenshot.timecode());
//! }
//! # Ok::<(), framepost::FramepostError>(())
//! ```

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::configuration::ExtractOptions;
use crate::error::FramepostError;
use crate::ffmpeg::{FfmpegTool, SCREENSHOT_CODEC};
use crate::host::UploadedFile;
use crate::progress::{OperationType, ProgressInfo};
use crate::timecode::Timecode;

/// Video container extensions accepted as input (compared case-insensitively).
pub const VALID_INPUT_EXTENSIONS: &[&str] = &["mkv", "avi", "m2ts", "ts", "mp4", "vob"];

/// Extension of generated screenshot files.
pub const SCREENSHOT_EXTENSION: &str = SCREENSHOT_CODEC;

/// Returns `true` if `extension` is one of [`VALID_INPUT_EXTENSIONS`].
pub fn is_valid_extension(extension: &str) -> bool {
    VALID_INPUT_EXTENSIONS
        .iter()
        .any(|valid| valid.eq_ignore_ascii_case(extension))
}

/// Timestamps (whole seconds) for `amount` screenshots spread evenly over
/// `duration_seconds`: the k-th of n is `floor(duration * k / (n + 1))`.
pub fn screenshot_timestamps(duration_seconds: u64, amount: u32) -> Vec<u64> {
    let intervals = u64::from(amount) + 1;
    (1..=u64::from(amount))
        .map(|k| duration_seconds * k / intervals)
        .collect()
}

/// `<stem>_screenshot<NN>.<extension>`, with `number` starting at 1.
pub fn screenshot_file_name(stem: &str, number: u32, extension: &str) -> String {
    format!("{stem}_screenshot{number:02}.{extension}")
}

/// A video file given on the command line or found in a directory.
#[derive(Debug, Clone)]
pub struct InputFile {
    path: PathBuf,
    absolute_path: Option<PathBuf>,
    filename: String,
    extension: String,
    duration: Option<Timecode>,
    screenshots: Vec<Screenshot>,
}

impl InputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let absolute_path = fs::canonicalize(&path).ok();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            path,
            absolute_path,
            filename,
            extension,
            duration: None,
            screenshots: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Canonical path, if the file existed when this value was created.
    pub fn absolute_path(&self) -> Option<&Path> {
        self.absolute_path.as_deref()
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// An existing regular file with an allowed extension.
    pub fn is_eligible(&self) -> bool {
        self.exists() && is_valid_extension(&self.extension)
    }

    pub fn screenshots(&self) -> &[Screenshot] {
        &self.screenshots
    }

    pub fn screenshots_mut(&mut self) -> &mut [Screenshot] {
        &mut self.screenshots
    }

    /// Duration of the video, probed on first use and cached afterwards.
    ///
    /// A failed probe is not cached, so a later call tries again.
    pub fn duration(&mut self, ffmpeg: &FfmpegTool) -> Result<Option<Timecode>, FramepostError> {
        if self.duration.is_none() {
            self.duration = ffmpeg.probe_duration(&self.path)?;
        }
        Ok(self.duration.clone())
    }

    /// Extract one frame to `output_path` and record it on success.
    pub fn make_screenshot(
        &mut self,
        output_path: PathBuf,
        timecode_seconds: u64,
        options: &ExtractOptions,
    ) -> Result<Option<Screenshot>, FramepostError> {
        let written = options.ffmpeg.extract_frame(
            &self.path,
            &output_path,
            timecode_seconds,
            options.frame_accurate,
            options.extra_args.as_deref(),
        )?;

        if !written {
            log::warn!(
                "ffmpeg did not write {} ({} at {}s)",
                output_path.display(),
                self.filename,
                timecode_seconds
            );
            return Ok(None);
        }

        let screenshot = Screenshot::new(
            output_path,
            Timecode::from_seconds(timecode_seconds),
            self.filename.clone(),
        );
        self.screenshots.push(screenshot.clone());
        Ok(Some(screenshot))
    }

    /// Take `amount` evenly spaced screenshots into `output_dir`.
    ///
    /// The result has one entry per requested screenshot; failed
    /// extractions are `None` and do not stop the batch.
    ///
    /// # Errors
    ///
    /// Returns [`FramepostError::DurationUnavailable`] if the video tool
    /// reports no duration, or [`FramepostError::Spawn`] if it cannot be run.
    pub fn make_screenshots(
        &mut self,
        amount: u32,
        output_dir: &Path,
        options: &ExtractOptions,
    ) -> Result<Vec<Option<Screenshot>>, FramepostError> {
        let duration = self
            .duration(&options.ffmpeg)?
            .ok_or_else(|| FramepostError::DurationUnavailable(self.path.clone()))?;

        log::info!(
            "Taking {} screenshot(s) of {} ({})",
            amount,
            self.filename,
            duration
        );

        let stem = self
            .path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let timestamps = screenshot_timestamps(duration.seconds(), amount);
        let total = timestamps.len() as u64;

        let mut results = Vec::with_capacity(timestamps.len());
        for (number, timestamp) in (1..).zip(timestamps) {
            let filename = screenshot_file_name(&stem, number, SCREENSHOT_EXTENSION);
            let result = self.make_screenshot(output_dir.join(&filename), timestamp, options)?;
            results.push(result);

            options.progress.on_progress(&ProgressInfo {
                operation: OperationType::FrameExtraction,
                current: u64::from(number),
                total,
                item: Some(filename),
            });
        }

        Ok(results)
    }
}

/// A screenshot image written by the video tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    path: PathBuf,
    timecode: Timecode,
    input_filename: String,
    page_url: Option<String>,
    thumbnail_url: Option<String>,
}

impl Screenshot {
    pub fn new(path: PathBuf, timecode: Timecode, input_filename: String) -> Self {
        Self {
            path,
            timecode,
            input_filename,
            page_url: None,
            thumbnail_url: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timecode(&self) -> &Timecode {
        &self.timecode
    }

    /// Filename of the video this screenshot was taken from.
    pub fn input_filename(&self) -> &str {
        &self.input_filename
    }

    pub fn page_url(&self) -> Option<&str> {
        self.page_url.as_deref()
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    /// Attach the links returned by an image host.
    pub fn set_links(&mut self, uploaded: &UploadedFile) {
        self.page_url = Some(uploaded.page_url.clone());
        self.thumbnail_url = Some(uploaded.thumbnail_url.clone());
    }
}

/// Resolve command-line arguments to eligible input files.
///
/// Files must exist and carry an allowed extension. Directories are scanned
/// one level deep (sorted by name) and ineligible entries are skipped, but a
/// directory without a single eligible file is an error.
pub fn collect_input_files<P: AsRef<Path>>(
    arguments: &[P],
) -> Result<Vec<InputFile>, FramepostError> {
    let mut inputs = Vec::new();

    for argument in arguments {
        let argument = argument.as_ref();

        if argument.is_dir() {
            let mut entries = fs::read_dir(argument)?
                .filter_map(|entry| entry.ok().map(|entry| entry.path()))
                .filter(|path| path.is_file())
                .collect::<Vec<_>>();
            entries.sort();

            let before = inputs.len();
            for path in entries {
                let input = InputFile::new(path);
                if input.is_eligible() {
                    inputs.push(input);
                } else {
                    log::debug!("Skipping {}", input.path().display());
                }
            }

            if inputs.len() == before {
                return Err(FramepostError::EmptyDirectory(argument.to_path_buf()));
            }
        } else {
            let input = InputFile::new(argument);
            if !input.is_eligible() {
                return Err(FramepostError::InvalidInput(argument.to_path_buf()));
            }
            inputs.push(input);
        }
    }

    if inputs.is_empty() {
        return Err(FramepostError::NoInputFiles);
    }

    Ok(inputs)
}

/// Ask for one input path on `writer` and read answers from `reader` until
/// one names an existing file or directory.
///
/// Surrounding spaces and quotes are stripped, so paths pasted from a file
/// manager work as-is. The answer is returned canonicalized; eligibility is
/// left to [`collect_input_files`].
///
/// # Errors
///
/// [`FramepostError::NoInputFiles`] if `reader` ends before a usable answer,
/// [`FramepostError::Io`] if either side fails.
pub fn prompt_input_path<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
) -> Result<PathBuf, FramepostError> {
    writeln!(writer, "Input video file or dir containing video files:")?;

    loop {
        writer.flush()?;
        let mut answer = String::new();
        if reader.read_line(&mut answer)? == 0 {
            return Err(FramepostError::NoInputFiles);
        }

        let answer = answer.trim_matches(|c: char| c.is_whitespace() || c == '\'' || c == '"');
        if answer.is_empty() {
            writeln!(writer, "Cannot be left empty, please try again")?;
            continue;
        }

        match fs::canonicalize(answer) {
            Ok(path) => return Ok(path),
            Err(error) => {
                log::debug!("Rejected {answer}: {error}");
                writeln!(writer, "Path does not exist, please try again")?;
            }
        }
    }
}
