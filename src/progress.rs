//! Progress reporting for screenshot extraction and uploads.
//!
//! The library never draws anything itself. Callers that want feedback
//! implement [`ProgressCallback`] and attach it through
//! [`ExtractOptions::with_progress`](crate::ExtractOptions::with_progress);
//! the `framepost` binary does this with an `indicatif` bar.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framepost::{ExtractOptions, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("[{:?}] {}/{}", info.operation, info.current, info.total);
//!     }
//! }
//!
//! let options = ExtractOptions::new().with_progress(Arc::new(PrintProgress));
//! ```

/// The kind of work being reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Writing screenshots with the video tool.
    FrameExtraction,
    /// Sending screenshots to an image host.
    Upload,
}

/// A snapshot of progress through one batch.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// Items finished so far, including failed ones.
    pub current: u64,
    /// Items in the batch.
    pub total: u64,
    /// Name of the item that was just finished.
    pub item: Option<String>,
}

/// Receives progress updates.
///
/// Callbacks observe work; they cannot stop it.
pub trait ProgressCallback: Send + Sync {
    /// Called after every finished item.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all notifications. Used when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}
