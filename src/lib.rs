//! # framepost
//!
//! Take evenly spaced screenshots from video files with FFmpeg, upload them
//! to an image host, and hand back ready-to-paste links.
//!
//! `framepost` drives an external `ffmpeg` binary for probing and frame
//! extraction, posts the resulting PNGs to a pluggable image host, and renders
//! the returned page/thumbnail links as plain URLs, HTML, or BBcode. A static
//! HTML report collects every link of a run.
//!
//! ## Quick Start
//!
//! ### Take Screenshots
//!
//! ```no_run
//! use std::path::Path;
//!
//! use framepost::{ExtractOptions, InputFile};
//!
//! let options = ExtractOptions::new().with_frame_accurate(true);
//! let mut input = InputFile::new("episode.mkv");
//! let screenshots = input.make_screenshots(4, Path::new("shots"), &options)?;
//! println!("{} of 4 screenshots taken", screenshots.iter().flatten().count());
//! # Ok::<(), framepost::FramepostError>(())
//! ```
//!
//! ### Upload Files
//!
//! ```no_run
//! use framepost::{HostOptions, HostRegistry, LinkFormat, UploadSource};
//!
//! let registry = HostRegistry::builtin();
//! let mut host = registry.create("someimage", HostOptions::default())?;
//! for file in host.upload(&[UploadSource::from("shots/episode01.png")])? {
//!     println!("{}", LinkFormat::BbCode.render(&file.page_url, &file.thumbnail_url));
//! }
//! # Ok::<(), framepost::FramepostError>(())
//! ```
//!
//! ## Features
//!
//! - **Screenshots** at `duration * k / (n + 1)` seconds, optionally with a
//!   two-stage frame-accurate seek
//! - **Image hosts** behind the [`ImageHost`] trait, looked up by name in a
//!   [`HostRegistry`]
//! - **Link formats**: plain URL, HTML, and BBcode
//! - **HTML report** with copyable link boxes per input file
//! - **Progress callbacks** through [`ProgressCallback`]
//!
//! ## Requirements
//!
//! An `ffmpeg` (or compatible `avconv`) executable, on the `PATH` or given
//! explicitly through [`FfmpegTool::new`].

pub mod command;
pub mod configuration;
pub mod error;
pub mod ffmpeg;
pub mod host;
pub mod logging;
pub mod markup;
pub mod media;
pub mod progress;
pub mod report;
pub mod settings;
pub mod timecode;

pub use configuration::ExtractOptions;
pub use error::FramepostError;
pub use ffmpeg::{FfmpegTool, VersionCheck};
pub use host::{
    Credentials, HostCapabilities, HostEntry, HostOptions, HostRegistry, ImageHost, UploadRange,
    UploadSource, UploadedFile,
};
pub use markup::LinkFormat;
pub use media::{InputFile, Screenshot, collect_input_files, prompt_input_path};
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use report::HtmlReport;
pub use settings::{Settings, SettingsLayer};
pub use timecode::Timecode;
