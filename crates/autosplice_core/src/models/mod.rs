//! Data model for the splice engine.
//!
//! All entities here are ephemeral and scoped to one run; the host's
//! project file is the only persisted state.

mod clip;
mod enums;

pub use clip::{AppendList, ClipEntry};
pub use enums::TrackKind;

/// Result of scanning a destination track for the anchor clip.
///
/// Produced by the anchor locator. When no anchor is found (or track
/// enumeration fails host-side) the offset falls back to frame 0 and
/// `found` is false - a logged, non-fatal condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorScan {
    /// Frame offset the playhead is positioned at before appending.
    pub insertion_offset: i64,
    /// Whether a clip matching the anchor marker was found.
    pub found: bool,
    /// Name of the matched clip, for the run summary.
    pub clip_name: Option<String>,
}

impl AnchorScan {
    /// The fallback scan: frame 0, nothing found.
    pub fn not_found() -> Self {
        Self {
            insertion_offset: 0,
            found: false,
            clip_name: None,
        }
    }
}

/// Summary of one splice run, reported to the invoker.
///
/// The insertion offset is advisory: it records where the playhead was
/// positioned before the append, not a guaranteed splice point - the
/// host's append primitive places clips per its own semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceReport {
    /// Playhead position used before the append.
    pub insertion_offset: i64,
    /// Whether the anchor clip was located on the destination track.
    pub anchor_found: bool,
    /// Number of clip entries handed to the append primitive.
    pub appended: usize,
    /// Number of source items excluded during flattening.
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_scan_falls_back_to_zero() {
        let scan = AnchorScan::not_found();
        assert_eq!(scan.insertion_offset, 0);
        assert!(!scan.found);
        assert!(scan.clip_name.is_none());
    }
}
