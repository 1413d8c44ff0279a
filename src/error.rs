//! Error types for the `framepost` crate.
//!
//! This module defines [`FramepostError`], the unified error type returned by
//! all fallible operations in the crate. Variants carry the path, URL, or
//! program name involved so the binary can print a useful message without
//! extra logging at the call site.

use std::{io::Error as IoError, path::PathBuf};

use reqwest::StatusCode;
use thiserror::Error;

/// The unified error type for all `framepost` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramepostError {
    /// An invalid combination or value of command-line/config settings.
    #[error("{0}")]
    Config(String),

    /// A configuration file could not be read or parsed.
    #[error("Failed to read config file {}: {reason}", .path.display())]
    ConfigFile {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// A direct input argument is missing or is not an eligible video file.
    #[error("Input file argument '{}' is not a valid input file", .0.display())]
    InvalidInput(PathBuf),

    /// A directory argument contained no eligible video file.
    #[error("No eligible files found in '{}'", .0.display())]
    EmptyDirectory(PathBuf),

    /// No input files remained after resolving all arguments.
    #[error("Nothing to do; no input files specified")]
    NoInputFiles,

    /// The requested image host is not registered.
    #[error("Unknown image host '{0}' (see --hosts)")]
    UnknownHost(String),

    /// The video tool did not report a duration for an input file.
    #[error("Could not determine the duration of {}", .0.display())]
    DurationUnavailable(PathBuf),

    /// The external program could not be started at all.
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        /// Program that was being executed.
        program: String,
        /// Underlying OS error.
        #[source]
        source: IoError,
    },

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An image host answered with a non-success status.
    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus {
        /// Requested URL.
        url: String,
        /// Status returned by the host.
        status: StatusCode,
    },

    /// An image host answered, but its page could not be scraped.
    #[error("Unexpected response from image host: {0}")]
    UnexpectedResponse(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}
