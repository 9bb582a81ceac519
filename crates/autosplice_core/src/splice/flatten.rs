//! Clip flattener - turns a source timeline into an ordered append list.
//!
//! Walks every video track (1..=K) then every audio track (1..=M) in
//! ascending order, reading each item's trim-left offset and duration and
//! resolving its backing media-pool item. Items that cannot contribute an
//! entry (absent media, failed property reads) are logged, counted, and
//! excluded - never an abort. Output order is stable for a given timeline
//! state and repeated media references are kept.

use tracing::{debug, warn};

use crate::host::{HostClipItem, HostTimeline, MediaOf};
use crate::models::{AppendList, ClipEntry, TrackKind};

/// Flatten `timeline` into an append list.
pub fn flatten_timeline<T: HostTimeline>(timeline: &T) -> AppendList<MediaOf<T>> {
    let mut list = AppendList::new();

    for kind in [TrackKind::Video, TrackKind::Audio] {
        let count = match timeline.track_count(kind) {
            Ok(count) => count,
            Err(e) => {
                warn!("flatten: {} track count query failed: {}", kind, e);
                continue;
            }
        };

        for index in 1..=count {
            let items = match timeline.items_on_track(kind, index) {
                Ok(items) => items,
                Err(e) => {
                    warn!("flatten: items on {}{} query failed: {}", kind, index, e);
                    continue;
                }
            };

            for item in &items {
                flatten_item(item, kind, index, &mut list);
            }
        }
    }

    debug!(
        "flatten: {} entries collected, {} items skipped",
        list.len(),
        list.skipped()
    );
    list
}

/// Extract one entry from a placed item, or record a skip.
fn flatten_item<I: HostClipItem>(
    item: &I,
    kind: TrackKind,
    track: u32,
    list: &mut AppendList<I::Media>,
) {
    let name = item.name().unwrap_or_else(|_| String::from("<unnamed>"));

    let (offset, duration) = match (item.left_offset(), item.duration()) {
        (Ok(offset), Ok(duration)) => (offset, duration),
        (Err(e), _) | (_, Err(e)) => {
            warn!(
                "flatten: skipping '{}' on {}{}: trim read failed: {}",
                name, kind, track, e
            );
            list.record_skipped();
            return;
        }
    };

    let media = match item.media_reference() {
        Ok(Some(media)) => media,
        Ok(None) => {
            warn!(
                "flatten: skipping '{}' on {}{}: no media-pool item",
                name, kind, track
            );
            list.record_skipped();
            return;
        }
        Err(e) => {
            warn!(
                "flatten: skipping '{}' on {}{}: media lookup failed: {}",
                name, kind, track, e
            );
            list.record_skipped();
            return;
        }
    };

    debug!(
        "flatten: '{}' on {}{} -> [{}, {})",
        name,
        kind,
        track,
        offset,
        offset + duration
    );
    list.push(ClipEntry::from_trim(media, offset, duration));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::{FakeClip, FakeMedia, FakeTimeline};
    use crate::host::HostMediaItem;

    #[test]
    fn visits_video_tracks_then_audio_tracks_in_order() {
        let timeline = FakeTimeline::new("edit");
        let v1 = FakeMedia::new("v1.mov", 100);
        let v2 = FakeMedia::new("v2.mov", 100);
        let a1 = FakeMedia::new("a1.wav", 100);

        timeline.push_video_track(vec![
            FakeClip::new("v1-a", 0, 10).with_media(v1.clone()),
            FakeClip::new("v1-b", 10, 20).with_media(v1.clone()),
        ]);
        timeline.push_video_track(vec![FakeClip::new("v2-a", 0, 30).with_media(v2)]);
        timeline.push_audio_track(vec![FakeClip::new("a1-a", 5, 15).with_media(a1)]);

        let list = flatten_timeline(&timeline);
        let names: Vec<String> = list
            .entries()
            .iter()
            .map(|e| e.media.name().unwrap())
            .collect();
        assert_eq!(list.len(), 4);
        assert_eq!(names, vec!["v1.mov", "v1.mov", "v2.mov", "a1.wav"]);
        assert_eq!(list.skipped(), 0);
    }

    #[test]
    fn entry_frames_come_from_trim_not_timeline_position() {
        let timeline = FakeTimeline::new("edit");
        let media = FakeMedia::new("clip.mov", 500);
        // Placed late on the timeline but trimmed to [24, 124).
        timeline.push_video_track(vec![FakeClip::new("c", 24, 100)
            .with_media(media)
            .with_end(9000)]);

        let list = flatten_timeline(&timeline);
        assert_eq!(list.entries()[0].start_frame, 24);
        assert_eq!(list.entries()[0].end_frame, 124);
    }

    #[test]
    fn items_without_media_are_skipped_and_counted() {
        let timeline = FakeTimeline::new("edit");
        let media = FakeMedia::new("good.mov", 100);
        timeline.push_video_track(vec![
            FakeClip::new("good", 0, 50).with_media(media),
            FakeClip::new("orphan", 0, 50),
        ]);

        let list = flatten_timeline(&timeline);
        assert_eq!(list.len(), 1);
        assert_eq!(list.skipped(), 1);
    }

    #[test]
    fn failed_trim_reads_are_skipped_and_counted() {
        let timeline = FakeTimeline::new("edit");
        let media = FakeMedia::new("m.mov", 100);
        timeline.push_video_track(vec![FakeClip::new("broken", 0, 50)
            .with_media(media)
            .with_failing_reads()]);

        let list = flatten_timeline(&timeline);
        assert!(list.is_empty());
        assert_eq!(list.skipped(), 1);
    }

    #[test]
    fn zero_duration_items_are_included() {
        let timeline = FakeTimeline::new("edit");
        let media = FakeMedia::new("still.png", 1);
        timeline.push_video_track(vec![FakeClip::new("still", 10, 0).with_media(media)]);

        let list = flatten_timeline(&timeline);
        assert_eq!(list.len(), 1);
        assert_eq!(list.entries()[0].start_frame, list.entries()[0].end_frame);
    }

    #[test]
    fn repeated_media_references_are_not_deduplicated() {
        let timeline = FakeTimeline::new("edit");
        let media = FakeMedia::new("same.mov", 100);
        timeline.push_video_track(vec![
            FakeClip::new("a", 0, 10).with_media(media.clone()),
            FakeClip::new("b", 10, 10).with_media(media.clone()),
            FakeClip::new("c", 20, 10).with_media(media),
        ]);

        let list = flatten_timeline(&timeline);
        assert_eq!(list.len(), 3);
    }
}
