//! Wrapper around the `ffmpeg` command-line tool.
//!
//! Everything here shells out through [`crate::command`]: the version banner
//! is checked with `ffmpeg -version`, durations are scraped from the stream
//! summary `ffmpeg -i <file>` prints, and single frames are written with a
//! one-frame encode.
//!
//! # Example
//!
//! ```no_run
//! use framepost::FfmpegTool;
//!
//! let ffmpeg = FfmpegTool::default();
//! if let Some(duration) = ffmpeg.probe_duration("input.mkv")? {
//!     println!("{} ({} s)", duration, duration.seconds());
//! }
//! # Ok::<(), framepost::FramepostError>(())
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::command::run_command;
use crate::error::FramepostError;
use crate::timecode::Timecode;

/// Program name used when no explicit path is configured.
pub const DEFAULT_FFMPEG_COMMAND: &str = "ffmpeg";

/// Codec used for screenshot frames.
pub const SCREENSHOT_CODEC: &str = "png";

/// Seconds decoded after input when seeking frame-accurately.
const FINE_SEEK_WINDOW: u64 = 30;

static VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(ffmpeg|avconv) version.*$").unwrap());

// The `regex` crate has no lookbehind, so the field name is matched and the
// time is taken from the capture group.
static DURATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:Timecode|Duration):\s(\d\d?:\d\d:\d\d)\.").unwrap());

/// Outcome of checking the tool's version banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    /// The banner looks like ffmpeg/avconv; holds the first output line.
    Compatible(String),
    /// The tool ran but printed something unexpected.
    Unrecognized,
    /// The tool exited with a non-zero status.
    Failed,
}

/// Handle on one `ffmpeg` executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegTool {
    program: PathBuf,
}

impl Default for FfmpegTool {
    fn default() -> Self {
        Self::new(default_ffmpeg_command())
    }
}

impl FfmpegTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Path or name of the executable being invoked.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run `ffmpeg -version` and classify the first line of its output.
    ///
    /// # Errors
    ///
    /// Returns [`FramepostError::Spawn`] if the program cannot be started.
    pub fn version(&self) -> Result<VersionCheck, FramepostError> {
        let output = run_command(&self.program, ["-version"])?;
        if !output.success() {
            return Ok(VersionCheck::Failed);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let first_line = stdout.lines().next().unwrap_or_default();
        if VERSION_REGEX.is_match(first_line) {
            Ok(VersionCheck::Compatible(first_line.to_string()))
        } else {
            Ok(VersionCheck::Unrecognized)
        }
    }

    /// Query the duration of a video file.
    ///
    /// Returns `Ok(None)` when no `Duration:`/`Timecode:` field could be found.
    /// `ffmpeg -i` without an output always exits non-zero, so the exit code
    /// is ignored.
    pub fn probe_duration<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Option<Timecode>, FramepostError> {
        let path = path.as_ref();
        let output = run_command(&self.program, [OsString::from("-i"), path.into()])?;
        let duration = parse_duration(&output.combined_text());

        match &duration {
            Some(timecode) => log::debug!("{} lasts {}", path.display(), timecode),
            None => log::debug!("No duration reported for {}", path.display()),
        }

        Ok(duration)
    }

    /// Write the frame at `timecode_seconds` of `input` to `output`.
    ///
    /// Returns `Ok(false)` when the tool did not produce the output file.
    pub fn extract_frame(
        &self,
        input: &Path,
        output: &Path,
        timecode_seconds: u64,
        frame_accurate: bool,
        extra_args: Option<&str>,
    ) -> Result<bool, FramepostError> {
        let args = frame_arguments(input, output, timecode_seconds, frame_accurate, extra_args);
        let result = run_command(&self.program, &args)?;

        if !output.is_file() {
            log::debug!(
                "ffmpeg exited with {} without writing {}: {}",
                result.code,
                output.display(),
                String::from_utf8_lossy(&result.stderr).trim_end()
            );
            return Ok(false);
        }

        Ok(true)
    }
}

/// Find the first `Timecode:`/`Duration:` `H:MM:SS.` field in tool output.
pub fn parse_duration(text: &str) -> Option<Timecode> {
    let captures = DURATION_REGEX.captures(text)?;
    Timecode::parse_hms(captures.get(1)?.as_str())
}

/// Build the argument list for a single-frame extraction.
///
/// Frame-accurate mode seeks coarsely to `timecode - 30` before the input
/// (landing on a keyframe) and then decodes forward the remaining window
/// after it. Otherwise one fast seek before the input is used.
pub fn frame_arguments(
    input: &Path,
    output: &Path,
    timecode_seconds: u64,
    frame_accurate: bool,
    extra_args: Option<&str>,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into()];

    if frame_accurate {
        if timecode_seconds > FINE_SEEK_WINDOW {
            args.push("-ss".into());
            args.push((timecode_seconds - FINE_SEEK_WINDOW).to_string().into());
        }
    } else {
        args.push("-ss".into());
        args.push(timecode_seconds.to_string().into());
    }

    args.push("-i".into());
    args.push(input.into());

    if frame_accurate {
        let fine = timecode_seconds.min(FINE_SEEK_WINDOW);
        args.push("-ss".into());
        args.push(fine.to_string().into());
    }

    for arg in ["-vframes", "1", "-vcodec", SCREENSHOT_CODEC] {
        args.push(arg.into());
    }

    if let Some(extra) = extra_args {
        args.extend(extra.split_whitespace().map(OsString::from));
    }

    args.push(output.into());
    args
}

/// Default executable: a bundled `ffmpeg/bin/ffmpeg.exe` next to the binary
/// on Windows, otherwise `ffmpeg` from `PATH`.
pub fn default_ffmpeg_command() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let bundled = std::env::current_exe().ok().and_then(|exe| {
            let candidate = exe.parent()?.join("ffmpeg").join("bin").join("ffmpeg.exe");
            candidate.is_file().then_some(candidate)
        });
        if let Some(path) = bundled {
            return path;
        }
    }

    PathBuf::from(DEFAULT_FFMPEG_COMMAND)
}
