//! Anchor locator - finds the insertion offset on the destination timeline.
//!
//! Scans a single video track for a clip whose name matches the anchor
//! marker and returns that clip's end frame. Everything here is
//! best-effort: no match, an empty track, or a host-side enumeration
//! failure all degrade to the frame-0 fallback, logged and never raised.

use tracing::{debug, warn};

use crate::host::{HostClipItem, HostTimeline};
use crate::models::{AnchorScan, TrackKind};

/// Predicate deciding whether a clip name marks the anchor.
///
/// Kept behind a trait so marker schemes (tags, metadata) can replace the
/// name heuristic without touching the orchestration logic.
pub trait AnchorMatcher {
    fn is_anchor(&self, clip_name: &str) -> bool;
}

/// Case-sensitive substring containment, no regex. First match wins.
#[derive(Debug, Clone)]
pub struct SubstringMatcher {
    marker: String,
}

impl SubstringMatcher {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl AnchorMatcher for SubstringMatcher {
    fn is_anchor(&self, clip_name: &str) -> bool {
        clip_name.contains(&self.marker)
    }
}

/// Scan one video track of `timeline` for the anchor clip.
///
/// Returns the end frame of the first clip the matcher accepts. Clips
/// whose name or end frame cannot be read are skipped with a debug log;
/// a failed track query degrades to the not-found fallback.
pub fn locate_anchor<T: HostTimeline>(
    timeline: &T,
    track: u32,
    matcher: &dyn AnchorMatcher,
) -> AnchorScan {
    let items = match timeline.items_on_track(TrackKind::Video, track) {
        Ok(items) => items,
        Err(e) => {
            warn!("anchor scan: track V{} query failed: {}", track, e);
            return AnchorScan::not_found();
        }
    };

    if items.is_empty() {
        debug!("anchor scan: track V{} has no items", track);
        return AnchorScan::not_found();
    }

    for (i, item) in items.iter().enumerate() {
        let name = match item.name() {
            Ok(name) => name,
            Err(e) => {
                debug!("anchor scan: clip {} name read failed: {}", i + 1, e);
                continue;
            }
        };
        debug!("anchor scan: track V{} clip {}: {}", track, i + 1, name);

        if matcher.is_anchor(&name) {
            match item.end_frame() {
                Ok(end) => {
                    debug!("anchor found: '{}' ends at frame {}", name, end);
                    return AnchorScan {
                        insertion_offset: end,
                        found: true,
                        clip_name: Some(name),
                    };
                }
                Err(e) => {
                    debug!("anchor scan: end frame read failed for '{}': {}", name, e);
                }
            }
        }
    }

    warn!("anchor scan: no clip on track V{} matched the marker", track);
    AnchorScan::not_found()
}
