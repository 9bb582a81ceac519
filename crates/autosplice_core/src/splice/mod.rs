//! The timeline-splice engine.
//!
//! Three leaf components - anchor locator, clip flattener, and the
//! retry-wrapped append - plus [`splice_into`], which sequences them
//! against a destination project per the documented fallback policy.

pub mod anchor;
pub mod append;
pub mod flatten;

pub use anchor::{locate_anchor, AnchorMatcher, SubstringMatcher};
pub use append::{append_with_retry, RetryPolicy};
pub use flatten::flatten_timeline;

use thiserror::Error;
use tracing::{info, warn};

use crate::host::{HostProject, HostTimeline};
use crate::models::{SpliceReport, TrackKind};

/// Parameters of one splice run.
#[derive(Debug, Clone)]
pub struct SpliceConfig {
    /// Marker substring identifying the anchor clip.
    pub anchor_marker: String,
    /// 1-based video track to scan for the anchor.
    pub anchor_track: u32,
    /// Retry budget for the append.
    pub retry: RetryPolicy,
}

impl Default for SpliceConfig {
    fn default() -> Self {
        Self {
            anchor_marker: "01_EBI_CHAN_OP".to_string(),
            anchor_track: 1,
            retry: RetryPolicy::default(),
        }
    }
}

/// Failures that abort a splice run.
#[derive(Error, Debug)]
pub enum SpliceError {
    /// The project has no active timeline to splice into.
    #[error("no destination timeline is active in the project")]
    NoDestinationTimeline,

    /// The source timeline flattened to nothing.
    #[error("source timeline produced no clip entries ({skipped} items skipped)")]
    NothingToSplice { skipped: usize },

    /// The append exhausted its retry budget or hit a fatal host error.
    #[error("append failed after {attempts} attempts")]
    AppendFailed { attempts: u32 },
}

/// Splice `source`'s flattened clips into the project's active timeline.
///
/// Sequence and per-step failure policy:
///
/// 1. Resolve the destination (the active timeline); fail if absent.
/// 2. Locate the anchor on the configured video track (clamped to the
///    destination's track count); the frame-0 fallback is non-fatal.
/// 3. Flatten the source; an empty append list fails the run.
/// 4. Best-effort: position the playhead at the insertion offset.
/// 5. Append under the retry policy, re-acquiring the media pool per
///    attempt.
/// 6. Best-effort: reset the playhead to the timeline start, regardless
///    of the append outcome.
///
/// The insertion offset is advisory: it positions the playhead only; the
/// host's append primitive places clips per its own semantics.
pub fn splice_into<P: HostProject>(
    project: &P,
    source: &P::Timeline,
    config: &SpliceConfig,
) -> Result<SpliceReport, SpliceError> {
    let dest = match project.current_timeline() {
        Ok(Some(dest)) => dest,
        Ok(None) => return Err(SpliceError::NoDestinationTimeline),
        Err(e) => {
            warn!("destination timeline lookup failed: {}", e);
            return Err(SpliceError::NoDestinationTimeline);
        }
    };

    let track = clamp_anchor_track(&dest, config.anchor_track);
    let matcher = SubstringMatcher::new(&config.anchor_marker);
    let scan = locate_anchor(&dest, track, &matcher);
    if scan.found {
        info!(
            "anchor '{}' found on V{}, insertion offset {}",
            scan.clip_name.as_deref().unwrap_or(""),
            track,
            scan.insertion_offset
        );
    } else {
        info!("anchor not found on V{}, splicing at timeline start", track);
    }

    let list = flatten_timeline(source);
    if list.is_empty() {
        return Err(SpliceError::NothingToSplice {
            skipped: list.skipped(),
        });
    }
    info!(
        "flattened source timeline: {} entries, {} skipped",
        list.len(),
        list.skipped()
    );

    match dest.set_playhead_frame(scan.insertion_offset) {
        Ok(true) => {}
        Ok(false) => warn!("playhead move to {} was rejected", scan.insertion_offset),
        Err(e) => warn!("playhead move to {} failed: {}", scan.insertion_offset, e),
    }

    let appended = append_with_retry(
        || project.media_pool().ok().flatten(),
        &list,
        &config.retry,
    );

    // The playhead goes back to the timeline start whether or not the
    // append succeeded.
    match dest.reset_playhead() {
        Ok(true) => {}
        Ok(false) => warn!("playhead reset was rejected"),
        Err(e) => warn!("playhead reset failed: {}", e),
    }

    if !appended {
        return Err(SpliceError::AppendFailed {
            attempts: config.retry.max_attempts,
        });
    }

    Ok(SpliceReport {
        insertion_offset: scan.insertion_offset,
        anchor_found: scan.found,
        appended: list.len(),
        skipped: list.skipped(),
    })
}

/// Clamp the configured anchor track to the destination's track count.
///
/// A track query failure keeps the configured index; the anchor scan will
/// then degrade to its own fallback.
fn clamp_anchor_track<T: HostTimeline>(dest: &T, configured: u32) -> u32 {
    match dest.track_count(TrackKind::Video) {
        Ok(count) if count > 0 && configured > count => {
            warn!(
                "anchor track V{} does not exist, using last track V{}",
                configured, count
            );
            count
        }
        Ok(_) => configured,
        Err(e) => {
            warn!("video track count query failed: {}", e);
            configured
        }
    }
}
