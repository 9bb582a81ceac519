//! In-memory fake host backend.
//!
//! Implements the full host trait surface over shared in-memory state so
//! the engine and pipeline can be exercised without a running host
//! application. Handles clone cheaply and point at the same state, which
//! mirrors how the real scripting handles behave.
//!
//! Failure knobs (`fail_tracks`, append behavior scripts, pool-absence
//! counters) script the host's observed misbehavior for tests.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{
    HostApp, HostClipItem, HostError, HostMediaItem, HostMediaPool, HostProject, HostResult,
    HostTimeline,
};
use crate::models::{ClipEntry, TrackKind};

/// Scripted outcome for one `append_to_timeline` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendBehavior {
    /// Append succeeds, entries land on the current timeline.
    Succeed,
    /// The host accepts the call but returns a falsy result.
    ReturnFalse,
    /// The host raises its transient "callable resolved to nothing" defect.
    ErrNotCallable,
    /// The host raises an unrelated, fatal failure.
    ErrFatal,
}

#[derive(Debug)]
struct MediaState {
    name: String,
    frames: i64,
}

/// Fake media-pool item.
#[derive(Debug, Clone)]
pub struct FakeMedia(Arc<MediaState>);

impl FakeMedia {
    pub fn new(name: impl Into<String>, frames: i64) -> Self {
        Self(Arc::new(MediaState {
            name: name.into(),
            frames,
        }))
    }
}

impl PartialEq for FakeMedia {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for FakeMedia {}

impl HostMediaItem for FakeMedia {
    fn name(&self) -> HostResult<String> {
        Ok(self.0.name.clone())
    }

    fn frame_count(&self) -> HostResult<i64> {
        Ok(self.0.frames)
    }
}

#[derive(Debug)]
struct ClipState {
    name: String,
    left_offset: i64,
    duration: i64,
    end: i64,
    media: Option<FakeMedia>,
    fail_reads: bool,
}

/// Fake placed clip item.
#[derive(Debug, Clone)]
pub struct FakeClip(Arc<ClipState>);

impl FakeClip {
    /// Clip with the given trim; timeline end defaults to `offset + duration`.
    pub fn new(name: impl Into<String>, left_offset: i64, duration: i64) -> Self {
        Self(Arc::new(ClipState {
            name: name.into(),
            left_offset,
            duration,
            end: left_offset + duration,
            media: None,
            fail_reads: false,
        }))
    }

    /// Attach a backing media item.
    pub fn with_media(self, media: FakeMedia) -> Self {
        self.update(|s| s.media = Some(media))
    }

    /// Override the timeline-absolute end frame (anchor scans read this).
    pub fn with_end(self, end: i64) -> Self {
        self.update(|s| s.end = end)
    }

    /// Make offset/duration reads fail host-side.
    pub fn with_failing_reads(self) -> Self {
        self.update(|s| s.fail_reads = true)
    }

    fn update(self, f: impl FnOnce(&mut ClipState)) -> Self {
        let mut state = ClipState {
            name: self.0.name.clone(),
            left_offset: self.0.left_offset,
            duration: self.0.duration,
            end: self.0.end,
            media: self.0.media.clone(),
            fail_reads: self.0.fail_reads,
        };
        f(&mut state);
        Self(Arc::new(state))
    }
}

impl HostClipItem for FakeClip {
    type Media = FakeMedia;

    fn name(&self) -> HostResult<String> {
        Ok(self.0.name.clone())
    }

    fn left_offset(&self) -> HostResult<i64> {
        if self.0.fail_reads {
            return Err(HostError::call_failed("GetLeftOffset", "property read failed"));
        }
        Ok(self.0.left_offset)
    }

    fn duration(&self) -> HostResult<i64> {
        if self.0.fail_reads {
            return Err(HostError::call_failed("GetDuration", "property read failed"));
        }
        Ok(self.0.duration)
    }

    fn end_frame(&self) -> HostResult<i64> {
        Ok(self.0.end)
    }

    fn media_reference(&self) -> HostResult<Option<FakeMedia>> {
        Ok(self.0.media.clone())
    }
}

#[derive(Debug, Default)]
struct TimelineState {
    name: String,
    video: Vec<Vec<FakeClip>>,
    audio: Vec<Vec<FakeClip>>,
    playhead_sets: Vec<i64>,
    playhead_resets: u32,
    fail_tracks: bool,
    fail_playhead: bool,
    appended: Vec<ClipEntry<FakeMedia>>,
}

/// Fake timeline.
#[derive(Debug, Clone)]
pub struct FakeTimeline(Arc<Mutex<TimelineState>>);

impl FakeTimeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(Mutex::new(TimelineState {
            name: name.into(),
            ..Default::default()
        })))
    }

    /// Add a video track holding the given clips, returning its 1-based index.
    pub fn push_video_track(&self, clips: Vec<FakeClip>) -> u32 {
        let mut state = self.0.lock();
        state.video.push(clips);
        state.video.len() as u32
    }

    /// Add an audio track holding the given clips, returning its 1-based index.
    pub fn push_audio_track(&self, clips: Vec<FakeClip>) -> u32 {
        let mut state = self.0.lock();
        state.audio.push(clips);
        state.audio.len() as u32
    }

    /// Make track enumeration fail host-side.
    pub fn set_fail_tracks(&self, fail: bool) {
        self.0.lock().fail_tracks = fail;
    }

    /// Make playhead positioning fail host-side.
    pub fn set_fail_playhead(&self, fail: bool) {
        self.0.lock().fail_playhead = fail;
    }

    /// Every frame the playhead was explicitly set to, in call order.
    pub fn playhead_history(&self) -> Vec<i64> {
        self.0.lock().playhead_sets.clone()
    }

    /// Number of playhead resets to timeline start.
    pub fn playhead_resets(&self) -> u32 {
        self.0.lock().playhead_resets
    }

    /// Entries appended to this timeline while it was current.
    pub fn appended_entries(&self) -> Vec<ClipEntry<FakeMedia>> {
        self.0.lock().appended.clone()
    }

    /// Record an append and place the clips on video track 1, the way
    /// the host materializes appended entries.
    fn record_append(&self, clips: &[ClipEntry<FakeMedia>]) {
        let mut state = self.0.lock();
        state.appended.extend_from_slice(clips);
        if state.video.is_empty() {
            state.video.push(Vec::new());
        }
        for entry in clips {
            let clip = FakeClip::new(
                entry.media.0.name.clone(),
                entry.start_frame,
                entry.end_frame - entry.start_frame,
            )
            .with_media(entry.media.clone());
            state.video[0].push(clip);
        }
    }
}

impl HostTimeline for FakeTimeline {
    type Item = FakeClip;

    fn name(&self) -> HostResult<String> {
        Ok(self.0.lock().name.clone())
    }

    fn track_count(&self, kind: TrackKind) -> HostResult<u32> {
        let state = self.0.lock();
        if state.fail_tracks {
            return Err(HostError::call_failed("GetTrackCount", "track query failed"));
        }
        Ok(match kind {
            TrackKind::Video => state.video.len() as u32,
            TrackKind::Audio => state.audio.len() as u32,
        })
    }

    fn items_on_track(&self, kind: TrackKind, index: u32) -> HostResult<Vec<FakeClip>> {
        let state = self.0.lock();
        if state.fail_tracks {
            return Err(HostError::call_failed("GetItemsInTrack", "track query failed"));
        }
        let tracks = match kind {
            TrackKind::Video => &state.video,
            TrackKind::Audio => &state.audio,
        };
        Ok(tracks
            .get(index.saturating_sub(1) as usize)
            .cloned()
            .unwrap_or_default())
    }

    fn set_playhead_frame(&self, frame: i64) -> HostResult<bool> {
        let mut state = self.0.lock();
        if state.fail_playhead {
            return Err(HostError::call_failed("SetCurrentFrame", "playhead move rejected"));
        }
        state.playhead_sets.push(frame);
        Ok(true)
    }

    fn reset_playhead(&self) -> HostResult<bool> {
        let mut state = self.0.lock();
        if state.fail_playhead {
            return Err(HostError::call_failed("SetCurrentTimecode", "playhead move rejected"));
        }
        state.playhead_resets += 1;
        Ok(true)
    }
}

#[derive(Default)]
struct PoolState {
    append_script: VecDeque<AppendBehavior>,
    append_calls: u32,
    staged_timeline: Option<FakeTimeline>,
    staged_media: HashMap<PathBuf, FakeMedia>,
    current_timeline: Option<FakeTimeline>,
}

/// Fake media pool.
#[derive(Clone, Default)]
pub struct FakeMediaPool(Arc<Mutex<PoolState>>);

impl FakeMediaPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for upcoming append calls; defaults to `Succeed`
    /// once the queue is drained.
    pub fn script_appends(&self, behaviors: impl IntoIterator<Item = AppendBehavior>) {
        self.0.lock().append_script.extend(behaviors);
    }

    /// Timeline returned by the next `import_timeline_from_file` call.
    pub fn stage_timeline_import(&self, timeline: FakeTimeline) {
        self.0.lock().staged_timeline = Some(timeline);
    }

    /// Media returned when the given path is imported.
    pub fn stage_media(&self, path: impl Into<PathBuf>, media: FakeMedia) {
        self.0.lock().staged_media.insert(path.into(), media);
    }

    /// Number of append calls the pool has seen.
    pub fn append_calls(&self) -> u32 {
        self.0.lock().append_calls
    }

    fn set_current_timeline(&self, timeline: FakeTimeline) {
        self.0.lock().current_timeline = Some(timeline);
    }
}

impl HostMediaPool for FakeMediaPool {
    type Media = FakeMedia;
    type Timeline = FakeTimeline;

    fn append_to_timeline(&self, clips: &[ClipEntry<FakeMedia>]) -> HostResult<bool> {
        let (behavior, target) = {
            let mut state = self.0.lock();
            state.append_calls += 1;
            let behavior = state
                .append_script
                .pop_front()
                .unwrap_or(AppendBehavior::Succeed);
            (behavior, state.current_timeline.clone())
        };

        match behavior {
            AppendBehavior::Succeed => {
                if let Some(timeline) = target {
                    timeline.record_append(clips);
                }
                Ok(true)
            }
            AppendBehavior::ReturnFalse => Ok(false),
            AppendBehavior::ErrNotCallable => Err(HostError::not_callable(
                "AppendToTimeline",
                "'NoneType' object is not callable",
            )),
            AppendBehavior::ErrFatal => Err(HostError::call_failed(
                "AppendToTimeline",
                "clip list malformed",
            )),
        }
    }

    fn import_timeline_from_file(&self, _path: &Path) -> HostResult<Option<FakeTimeline>> {
        Ok(self.0.lock().staged_timeline.clone())
    }

    fn import_media(&self, paths: &[PathBuf]) -> HostResult<Vec<FakeMedia>> {
        let state = self.0.lock();
        Ok(paths
            .iter()
            .filter_map(|p| state.staged_media.get(p).cloned())
            .collect())
    }
}

struct ProjectState {
    name: String,
    current: Option<FakeTimeline>,
    pool: FakeMediaPool,
    pool_absent_attempts: u32,
}

/// Fake project.
#[derive(Clone)]
pub struct FakeProject(Arc<Mutex<ProjectState>>);

impl FakeProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(Mutex::new(ProjectState {
            name: name.into(),
            current: None,
            pool: FakeMediaPool::new(),
            pool_absent_attempts: 0,
        })))
    }

    /// The project's pool handle, for staging imports and scripting appends.
    pub fn pool(&self) -> FakeMediaPool {
        self.0.lock().pool.clone()
    }

    /// Make the next `n` `media_pool` calls return no handle.
    pub fn set_pool_absent_for(&self, attempts: u32) {
        self.0.lock().pool_absent_attempts = attempts;
    }

    /// Install a timeline as current without going through the trait.
    pub fn stage_current_timeline(&self, timeline: FakeTimeline) {
        let mut state = self.0.lock();
        state.pool.set_current_timeline(timeline.clone());
        state.current = Some(timeline);
    }
}

impl HostProject for FakeProject {
    type Timeline = FakeTimeline;
    type MediaPool = FakeMediaPool;

    fn name(&self) -> HostResult<String> {
        Ok(self.0.lock().name.clone())
    }

    fn set_name(&self, name: &str) -> HostResult<bool> {
        self.0.lock().name = name.to_string();
        Ok(true)
    }

    fn current_timeline(&self) -> HostResult<Option<FakeTimeline>> {
        Ok(self.0.lock().current.clone())
    }

    fn set_current_timeline(&self, timeline: &FakeTimeline) -> HostResult<bool> {
        let mut state = self.0.lock();
        state.pool.set_current_timeline(timeline.clone());
        state.current = Some(timeline.clone());
        Ok(true)
    }

    fn media_pool(&self) -> HostResult<Option<FakeMediaPool>> {
        let mut state = self.0.lock();
        if state.pool_absent_attempts > 0 {
            state.pool_absent_attempts -= 1;
            return Ok(None);
        }
        Ok(Some(state.pool.clone()))
    }
}

#[derive(Default)]
struct AppState {
    current: Option<FakeProject>,
    by_name: HashMap<String, FakeProject>,
    imported: Vec<(PathBuf, Option<String>)>,
    import_result: Option<FakeProject>,
    pages: Vec<String>,
    import_ok: bool,
}

/// Fake host application.
#[derive(Clone)]
pub struct FakeApp(Arc<Mutex<AppState>>);

impl FakeApp {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(AppState {
            import_ok: true,
            ..Default::default()
        })))
    }

    /// Install the currently open project.
    pub fn set_current_project(&self, project: FakeProject) {
        self.0.lock().current = Some(project);
    }

    /// Register a project retrievable by `load_project`.
    pub fn stage_project(&self, name: impl Into<String>, project: FakeProject) {
        self.0.lock().by_name.insert(name.into(), project);
    }

    /// Make `import_project` report failure.
    pub fn set_import_ok(&self, ok: bool) {
        self.0.lock().import_ok = ok;
    }

    /// Project registered by the next successful `import_project` call,
    /// under the requested name (or the archive's file stem).
    pub fn stage_import_result(&self, project: FakeProject) {
        self.0.lock().import_result = Some(project);
    }

    /// Project archives imported so far.
    pub fn imported(&self) -> Vec<(PathBuf, Option<String>)> {
        self.0.lock().imported.clone()
    }

    /// Pages the host was asked to open.
    pub fn opened_pages(&self) -> Vec<String> {
        self.0.lock().pages.clone()
    }
}

impl Default for FakeApp {
    fn default() -> Self {
        Self::new()
    }
}

impl HostApp for FakeApp {
    type Project = FakeProject;

    fn current_project(&self) -> HostResult<Option<FakeProject>> {
        Ok(self.0.lock().current.clone())
    }

    fn load_project(&self, name: &str) -> HostResult<Option<FakeProject>> {
        Ok(self.0.lock().by_name.get(name).cloned())
    }

    fn import_project(&self, path: &Path, name: Option<&str>) -> HostResult<bool> {
        let mut state = self.0.lock();
        state
            .imported
            .push((path.to_path_buf(), name.map(str::to_string)));
        if !state.import_ok {
            return Ok(false);
        }
        if let Some(project) = state.import_result.take() {
            let register_as = name
                .map(str::to_string)
                .or_else(|| {
                    path.file_stem()
                        .map(|s| s.to_string_lossy().to_string())
                })
                .unwrap_or_default();
            state.by_name.insert(register_as, project);
        }
        Ok(true)
    }

    fn project_names(&self) -> HostResult<Vec<String>> {
        Ok(self.0.lock().by_name.keys().cloned().collect())
    }

    fn open_page(&self, page: &str) -> HostResult<bool> {
        self.0.lock().pages.push(page.to_string());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeline_records_appends_through_pool() {
        let project = FakeProject::new("test");
        let timeline = FakeTimeline::new("main");
        project.set_current_timeline(&timeline).unwrap();

        let pool = project.media_pool().unwrap().unwrap();
        let media = FakeMedia::new("clip.mov", 50);
        let ok = pool
            .append_to_timeline(&[ClipEntry::from_trim(media, 0, 50)])
            .unwrap();

        assert!(ok);
        assert_eq!(timeline.appended_entries().len(), 1);
        assert_eq!(pool.append_calls(), 1);
    }

    #[test]
    fn pool_absence_counter_drains() {
        let project = FakeProject::new("test");
        project.set_pool_absent_for(2);

        assert!(project.media_pool().unwrap().is_none());
        assert!(project.media_pool().unwrap().is_none());
        assert!(project.media_pool().unwrap().is_some());
    }

    #[test]
    fn scripted_append_behaviors_play_in_order() {
        let pool = FakeMediaPool::new();
        pool.script_appends([AppendBehavior::ReturnFalse, AppendBehavior::ErrNotCallable]);

        let media = FakeMedia::new("a", 10);
        let entry = ClipEntry::from_trim(media, 0, 10);

        assert_eq!(pool.append_to_timeline(&[entry.clone()]).unwrap(), false);
        let err = pool.append_to_timeline(&[entry.clone()]).unwrap_err();
        assert!(err.is_transient());
        // Script drained: back to success.
        assert!(pool.append_to_timeline(&[entry]).unwrap());
    }
}
