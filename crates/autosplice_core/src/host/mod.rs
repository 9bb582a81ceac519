//! Abstract interface to the host editing application.
//!
//! The engine never talks to the host's scripting API directly; it goes
//! through these traits. The real backend wraps live scripting handles,
//! the [`fake`] backend keeps everything in memory for tests. Associated
//! types thread the opaque media handle through the object graph so a
//! backend's clip items, media pool, and append entries all agree on it.
//!
//! Track indices are 1-based throughout, matching host semantics.

pub mod fake;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{ClipEntry, TrackKind};

/// Errors surfaced by host calls.
///
/// The first two variants are the *only* failure signatures treated as
/// transient by the retry policy: the host is observed to expose a brief
/// window after project/timeline switches where its object graph is not
/// yet consistent, yielding null handles and the "callable resolved to
/// nothing" defect. Everything else is treated as a genuine error so
/// host-API fixes don't silently mask regressions.
#[derive(Error, Debug)]
pub enum HostError {
    /// The host returned a null handle where an object was expected.
    #[error("host returned a null handle for {0}")]
    NullHandle(&'static str),

    /// A host callable transiently resolved to nothing mid-call.
    #[error("host callable resolved to nothing during {call}: {message}")]
    NotCallable { call: String, message: String },

    /// Any other host-side failure.
    #[error("host call {call} failed: {message}")]
    CallFailed { call: String, message: String },
}

impl HostError {
    /// Create a not-callable error.
    pub fn not_callable(call: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotCallable {
            call: call.into(),
            message: message.into(),
        }
    }

    /// Create a generic call failure.
    pub fn call_failed(call: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CallFailed {
            call: call.into(),
            message: message.into(),
        }
    }

    /// Whether this failure is the host's known transient inconsistency.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NullHandle(_) | Self::NotCallable { .. })
    }
}

/// Result type for host calls.
pub type HostResult<T> = Result<T, HostError>;

/// The media handle type reached through a timeline's clip items.
pub type MediaOf<T> = <<T as HostTimeline>::Item as HostClipItem>::Media;

/// Handle to the host application itself.
pub trait HostApp {
    type Project: HostProject;

    /// The project currently open in the host, if any.
    fn current_project(&self) -> HostResult<Option<Self::Project>>;

    /// Load a project by name.
    fn load_project(&self, name: &str) -> HostResult<Option<Self::Project>>;

    /// Import a project archive, optionally under a new name.
    ///
    /// Returns false when the host rejects the import. Backends where the
    /// two-argument form is unsupported fall back to the single-argument
    /// form internally.
    fn import_project(&self, path: &Path, name: Option<&str>) -> HostResult<bool>;

    /// Names of the projects in the host's current folder.
    fn project_names(&self) -> HostResult<Vec<String>>;

    /// Switch the host UI to the named page. Best-effort.
    fn open_page(&self, page: &str) -> HostResult<bool>;
}

/// Handle to an open project.
pub trait HostProject {
    type Timeline: HostTimeline;
    type MediaPool: HostMediaPool<
        Timeline = Self::Timeline,
        Media = MediaOf<Self::Timeline>,
    >;

    fn name(&self) -> HostResult<String>;

    /// Rename the project.
    fn set_name(&self, name: &str) -> HostResult<bool>;

    /// The timeline currently active in the project, if any.
    fn current_timeline(&self) -> HostResult<Option<Self::Timeline>>;

    /// Make the given timeline active.
    fn set_current_timeline(&self, timeline: &Self::Timeline) -> HostResult<bool>;

    /// The project's media pool.
    ///
    /// Returns `None` during the host's transient inconsistency window;
    /// callers that mutate the pool re-acquire it per attempt.
    fn media_pool(&self) -> HostResult<Option<Self::MediaPool>>;
}

/// Handle to a timeline inside a project.
pub trait HostTimeline {
    type Item: HostClipItem;

    fn name(&self) -> HostResult<String>;

    /// Number of tracks of the given kind.
    fn track_count(&self, kind: TrackKind) -> HostResult<u32>;

    /// Placed clip items on one track, in the host's native item order.
    fn items_on_track(&self, kind: TrackKind, index: u32) -> HostResult<Vec<Self::Item>>;

    /// Position the playhead at the given frame.
    fn set_playhead_frame(&self, frame: i64) -> HostResult<bool>;

    /// Reset the playhead to the timeline start.
    fn reset_playhead(&self) -> HostResult<bool>;
}

/// Handle to one placed clip on a track.
pub trait HostClipItem {
    type Media: HostMediaItem;

    fn name(&self) -> HostResult<String>;

    /// Trim-left offset into the backing media, in frames.
    fn left_offset(&self) -> HostResult<i64>;

    /// Trimmed duration, in frames.
    fn duration(&self) -> HostResult<i64>;

    /// Absolute end frame of the clip on its timeline.
    fn end_frame(&self) -> HostResult<i64>;

    /// The backing media-pool item, if the clip still resolves to one.
    fn media_reference(&self) -> HostResult<Option<Self::Media>>;
}

/// Handle to an importable media asset owned by the host's media pool.
pub trait HostMediaItem: Clone {
    fn name(&self) -> HostResult<String>;

    /// Total frame count of the asset.
    fn frame_count(&self) -> HostResult<i64>;
}

/// Handle to the project's media pool.
pub trait HostMediaPool {
    type Media: HostMediaItem;
    type Timeline: HostTimeline;

    /// Bulk-append entries to the currently active timeline.
    ///
    /// Returns the host's truthiness: false means the host accepted the
    /// call but appended nothing.
    fn append_to_timeline(&self, clips: &[ClipEntry<Self::Media>]) -> HostResult<bool>;

    /// Import an edit-decision file as a new timeline.
    fn import_timeline_from_file(&self, path: &Path) -> HostResult<Option<Self::Timeline>>;

    /// Import media files into the pool.
    fn import_media(&self, paths: &[PathBuf]) -> HostResult<Vec<Self::Media>>;
}
