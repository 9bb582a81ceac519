//! Clip entries and the ordered append list.

/// One placed instance of a media-pool item, ready to append.
///
/// Frames are derived from the clip's trim: `start_frame` is the trim-left
/// offset and `end_frame` is `left_offset + duration`, not an absolute
/// timeline position. Zero-duration items are legal (`end == start`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipEntry<M> {
    /// Handle to the backing media-pool item; referenced, never copied.
    pub media: M,
    /// Trim-left offset into the media, in frames.
    pub start_frame: i64,
    /// `start_frame + duration`, in frames.
    pub end_frame: i64,
}

impl<M> ClipEntry<M> {
    /// Build an entry from a clip item's trim-left offset and duration.
    pub fn from_trim(media: M, left_offset: i64, duration: i64) -> Self {
        Self {
            media,
            start_frame: left_offset,
            end_frame: left_offset + duration,
        }
    }

    /// Frame length of this entry.
    pub fn duration(&self) -> i64 {
        self.end_frame - self.start_frame
    }
}

/// Ordered sequence of clip entries produced by the flattener.
///
/// Order is discovery order: video tracks ascending, then audio tracks
/// ascending, within a track by the host's native item order. Repeated
/// media references are kept as-is; the order only matters for relative
/// placement when the host appends sequentially.
#[derive(Debug, Clone)]
pub struct AppendList<M> {
    entries: Vec<ClipEntry<M>>,
    skipped: usize,
}

impl<M> AppendList<M> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            skipped: 0,
        }
    }

    /// Append an entry, preserving discovery order.
    pub fn push(&mut self, entry: ClipEntry<M>) {
        self.entries.push(entry);
    }

    /// Record a source item that could not contribute an entry.
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Entries in discovery order.
    pub fn entries(&self) -> &[ClipEntry<M>] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of items excluded during flattening.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<M> Default for AppendList<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_end_is_offset_plus_duration() {
        let entry = ClipEntry::from_trim("media", 24, 100);
        assert_eq!(entry.start_frame, 24);
        assert_eq!(entry.end_frame, 124);
        assert_eq!(entry.duration(), 100);
    }

    #[test]
    fn zero_duration_entry_is_kept_as_is() {
        let entry = ClipEntry::from_trim("media", 10, 0);
        assert_eq!(entry.start_frame, entry.end_frame);
    }

    #[test]
    fn list_tracks_entries_and_skips() {
        let mut list = AppendList::new();
        assert!(list.is_empty());

        list.push(ClipEntry::from_trim("a", 0, 50));
        list.record_skipped();
        list.push(ClipEntry::from_trim("b", 0, 25));

        assert_eq!(list.len(), 2);
        assert_eq!(list.skipped(), 1);
        assert_eq!(list.entries()[0].media, "a");
        assert_eq!(list.entries()[1].media, "b");
    }
}
