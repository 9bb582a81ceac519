//! Host trait implementations over Resolve scripting handles.

use std::path::{Path, PathBuf};

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use autosplice_core::host::{
    HostApp, HostClipItem, HostError, HostMediaItem, HostMediaPool, HostProject, HostResult,
    HostTimeline,
};
use autosplice_core::models::{ClipEntry, TrackKind};

/// Map a Python failure to the engine's host error taxonomy.
///
/// Resolve's known transient defect surfaces as a `TypeError` with this
/// exact message when a scripting attribute momentarily resolves to
/// `None` mid-call; it must stay distinguishable from genuine errors.
fn map_pyerr(call: &'static str, err: PyErr) -> HostError {
    let message = err.to_string();
    if message.contains("'NoneType' object is not callable") {
        HostError::not_callable(call, message)
    } else {
        HostError::call_failed(call, message)
    }
}

/// Extract a frame value that the API may report as int or float.
fn frames_from(value: &Bound<'_, PyAny>, call: &'static str) -> HostResult<i64> {
    if let Ok(v) = value.extract::<i64>() {
        return Ok(v);
    }
    value
        .extract::<f64>()
        .map(|v| v as i64)
        .map_err(|e| map_pyerr(call, e))
}

/// Handle to the Resolve application and its project manager.
pub struct ResolveApp {
    resolve: Py<PyAny>,
    manager: Py<PyAny>,
}

impl ResolveApp {
    /// Wrap a live `scriptapp("Resolve")` handle.
    pub(crate) fn new(py: Python<'_>, resolve: Py<PyAny>) -> HostResult<Self> {
        let manager = resolve
            .bind(py)
            .call_method0("GetProjectManager")
            .map_err(|e| map_pyerr("GetProjectManager", e))?;
        if manager.is_none() {
            return Err(HostError::NullHandle("project manager"));
        }
        Ok(Self {
            resolve,
            manager: manager.unbind(),
        })
    }
}

impl HostApp for ResolveApp {
    type Project = ResolveProject;

    fn current_project(&self) -> HostResult<Option<ResolveProject>> {
        Python::with_gil(|py| {
            let project = self
                .manager
                .bind(py)
                .call_method0("GetCurrentProject")
                .map_err(|e| map_pyerr("GetCurrentProject", e))?;
            if project.is_none() {
                return Ok(None);
            }
            Ok(Some(ResolveProject(project.unbind())))
        })
    }

    fn load_project(&self, name: &str) -> HostResult<Option<ResolveProject>> {
        Python::with_gil(|py| {
            let project = self
                .manager
                .bind(py)
                .call_method1("LoadProject", (name,))
                .map_err(|e| map_pyerr("LoadProject", e))?;
            if project.is_none() {
                return Ok(None);
            }
            Ok(Some(ResolveProject(project.unbind())))
        })
    }

    fn import_project(&self, path: &Path, name: Option<&str>) -> HostResult<bool> {
        Python::with_gil(|py| {
            let manager = self.manager.bind(py);
            let path_str = path.to_string_lossy();
            let result = match name {
                // Two-argument form imports directly under the new name;
                // older builds reject the second argument, fall through
                // to the single-argument form there.
                Some(name) => match manager
                    .call_method1("ImportProject", (path_str.as_ref(), name))
                {
                    Ok(result) => result,
                    Err(_) => manager
                        .call_method1("ImportProject", (path_str.as_ref(),))
                        .map_err(|e| map_pyerr("ImportProject", e))?,
                },
                None => manager
                    .call_method1("ImportProject", (path_str.as_ref(),))
                    .map_err(|e| map_pyerr("ImportProject", e))?,
            };
            result.is_truthy().map_err(|e| map_pyerr("ImportProject", e))
        })
    }

    fn project_names(&self) -> HostResult<Vec<String>> {
        Python::with_gil(|py| {
            let names = self
                .manager
                .bind(py)
                .call_method0("GetProjectListInCurrentFolder")
                .map_err(|e| map_pyerr("GetProjectListInCurrentFolder", e))?;
            if names.is_none() {
                return Ok(Vec::new());
            }
            names
                .extract::<Vec<String>>()
                .map_err(|e| map_pyerr("GetProjectListInCurrentFolder", e))
        })
    }

    fn open_page(&self, page: &str) -> HostResult<bool> {
        Python::with_gil(|py| {
            self.resolve
                .bind(py)
                .call_method1("OpenPage", (page,))
                .and_then(|r| r.is_truthy())
                .map_err(|e| map_pyerr("OpenPage", e))
        })
    }
}

/// Handle to an open Resolve project.
pub struct ResolveProject(Py<PyAny>);

impl HostProject for ResolveProject {
    type Timeline = ResolveTimeline;
    type MediaPool = ResolveMediaPool;

    fn name(&self) -> HostResult<String> {
        Python::with_gil(|py| {
            self.0
                .bind(py)
                .call_method0("GetName")
                .and_then(|v| v.extract())
                .map_err(|e| map_pyerr("GetName", e))
        })
    }

    fn set_name(&self, name: &str) -> HostResult<bool> {
        Python::with_gil(|py| {
            self.0
                .bind(py)
                .call_method1("SetName", (name,))
                .and_then(|r| r.is_truthy())
                .map_err(|e| map_pyerr("SetName", e))
        })
    }

    fn current_timeline(&self) -> HostResult<Option<ResolveTimeline>> {
        Python::with_gil(|py| {
            let timeline = self
                .0
                .bind(py)
                .call_method0("GetCurrentTimeline")
                .map_err(|e| map_pyerr("GetCurrentTimeline", e))?;
            if timeline.is_none() {
                return Ok(None);
            }
            Ok(Some(ResolveTimeline(timeline.unbind())))
        })
    }

    fn set_current_timeline(&self, timeline: &ResolveTimeline) -> HostResult<bool> {
        Python::with_gil(|py| {
            self.0
                .bind(py)
                .call_method1("SetCurrentTimeline", (timeline.0.bind(py),))
                .and_then(|r| r.is_truthy())
                .map_err(|e| map_pyerr("SetCurrentTimeline", e))
        })
    }

    fn media_pool(&self) -> HostResult<Option<ResolveMediaPool>> {
        Python::with_gil(|py| {
            let pool = self
                .0
                .bind(py)
                .call_method0("GetMediaPool")
                .map_err(|e| map_pyerr("GetMediaPool", e))?;
            if pool.is_none() {
                return Ok(None);
            }
            Ok(Some(ResolveMediaPool(pool.unbind())))
        })
    }
}

/// Handle to a Resolve timeline.
pub struct ResolveTimeline(Py<PyAny>);

impl HostTimeline for ResolveTimeline {
    type Item = ResolveClipItem;

    fn name(&self) -> HostResult<String> {
        Python::with_gil(|py| {
            self.0
                .bind(py)
                .call_method0("GetName")
                .and_then(|v| v.extract())
                .map_err(|e| map_pyerr("GetName", e))
        })
    }

    fn track_count(&self, kind: TrackKind) -> HostResult<u32> {
        Python::with_gil(|py| {
            self.0
                .bind(py)
                .call_method1("GetTrackCount", (kind.as_str(),))
                .and_then(|v| v.extract())
                .map_err(|e| map_pyerr("GetTrackCount", e))
        })
    }

    fn items_on_track(&self, kind: TrackKind, index: u32) -> HostResult<Vec<ResolveClipItem>> {
        Python::with_gil(|py| {
            let items = self
                .0
                .bind(py)
                .call_method1("GetItemsInTrack", (kind.as_str(), index))
                .map_err(|e| map_pyerr("GetItemsInTrack", e))?;
            if items.is_none() {
                return Ok(Vec::new());
            }

            // The API hands back `{index: item}`; index order is the
            // item order on the track.
            let dict = items
                .downcast::<PyDict>()
                .map_err(|e| HostError::call_failed("GetItemsInTrack", e.to_string()))?;
            let mut keyed: Vec<(i64, ResolveClipItem)> = Vec::with_capacity(dict.len());
            for (key, value) in dict.iter() {
                if value.is_none() {
                    continue;
                }
                let position = key
                    .extract::<i64>()
                    .map_err(|e| map_pyerr("GetItemsInTrack", e))?;
                keyed.push((position, ResolveClipItem(value.unbind())));
            }
            keyed.sort_by_key(|(position, _)| *position);
            Ok(keyed.into_iter().map(|(_, item)| item).collect())
        })
    }

    fn set_playhead_frame(&self, frame: i64) -> HostResult<bool> {
        Python::with_gil(|py| {
            let timeline = self.0.bind(py);
            // Not all builds expose SetCurrentFrame; those accept a frame
            // number through SetCurrentTimecode instead.
            match timeline.call_method1("SetCurrentFrame", (frame,)) {
                Ok(result) => result.is_truthy().map_err(|e| map_pyerr("SetCurrentFrame", e)),
                Err(_) => timeline
                    .call_method1("SetCurrentTimecode", (frame.to_string(),))
                    .and_then(|r| r.is_truthy())
                    .map_err(|e| map_pyerr("SetCurrentTimecode", e)),
            }
        })
    }

    fn reset_playhead(&self) -> HostResult<bool> {
        Python::with_gil(|py| {
            self.0
                .bind(py)
                .call_method1("SetCurrentTimecode", ("00:00:00:00",))
                .and_then(|r| r.is_truthy())
                .map_err(|e| map_pyerr("SetCurrentTimecode", e))
        })
    }
}

/// Handle to one placed clip on a Resolve track.
pub struct ResolveClipItem(Py<PyAny>);

impl HostClipItem for ResolveClipItem {
    type Media = ResolveMedia;

    fn name(&self) -> HostResult<String> {
        Python::with_gil(|py| {
            self.0
                .bind(py)
                .call_method0("GetName")
                .and_then(|v| v.extract())
                .map_err(|e| map_pyerr("GetName", e))
        })
    }

    fn left_offset(&self) -> HostResult<i64> {
        Python::with_gil(|py| {
            let value = self
                .0
                .bind(py)
                .call_method0("GetLeftOffset")
                .map_err(|e| map_pyerr("GetLeftOffset", e))?;
            frames_from(&value, "GetLeftOffset")
        })
    }

    fn duration(&self) -> HostResult<i64> {
        Python::with_gil(|py| {
            let value = self
                .0
                .bind(py)
                .call_method0("GetDuration")
                .map_err(|e| map_pyerr("GetDuration", e))?;
            frames_from(&value, "GetDuration")
        })
    }

    fn end_frame(&self) -> HostResult<i64> {
        Python::with_gil(|py| {
            let value = self
                .0
                .bind(py)
                .call_method0("GetEnd")
                .map_err(|e| map_pyerr("GetEnd", e))?;
            frames_from(&value, "GetEnd")
        })
    }

    fn media_reference(&self) -> HostResult<Option<ResolveMedia>> {
        Python::with_gil(|py| {
            let media = self
                .0
                .bind(py)
                .call_method0("GetMediaPoolItem")
                .map_err(|e| map_pyerr("GetMediaPoolItem", e))?;
            if media.is_none() {
                return Ok(None);
            }
            Ok(Some(ResolveMedia(media.unbind())))
        })
    }
}

/// Handle to a Resolve media-pool item.
#[derive(Clone)]
pub struct ResolveMedia(Py<PyAny>);

impl HostMediaItem for ResolveMedia {
    fn name(&self) -> HostResult<String> {
        Python::with_gil(|py| {
            self.0
                .bind(py)
                .call_method0("GetName")
                .and_then(|v| v.extract())
                .map_err(|e| map_pyerr("GetName", e))
        })
    }

    fn frame_count(&self) -> HostResult<i64> {
        Python::with_gil(|py| {
            let value = self
                .0
                .bind(py)
                .call_method1("GetClipProperty", ("Frames",))
                .map_err(|e| map_pyerr("GetClipProperty", e))?;
            // The property comes back as a string like "1234".
            if let Ok(text) = value.extract::<String>() {
                return text.trim().parse::<i64>().map_err(|e| {
                    HostError::call_failed("GetClipProperty", format!("Frames = {text:?}: {e}"))
                });
            }
            frames_from(&value, "GetClipProperty")
        })
    }
}

/// Handle to a project's media pool.
pub struct ResolveMediaPool(Py<PyAny>);

impl HostMediaPool for ResolveMediaPool {
    type Media = ResolveMedia;
    type Timeline = ResolveTimeline;

    fn append_to_timeline(&self, clips: &[ClipEntry<ResolveMedia>]) -> HostResult<bool> {
        Python::with_gil(|py| {
            let payload = PyList::empty(py);
            for entry in clips {
                let item = PyDict::new(py);
                item.set_item("mediaPoolItem", entry.media.0.bind(py))
                    .map_err(|e| map_pyerr("AppendToTimeline", e))?;
                item.set_item("startFrame", entry.start_frame)
                    .map_err(|e| map_pyerr("AppendToTimeline", e))?;
                item.set_item("endFrame", entry.end_frame)
                    .map_err(|e| map_pyerr("AppendToTimeline", e))?;
                payload
                    .append(item)
                    .map_err(|e| map_pyerr("AppendToTimeline", e))?;
            }

            self.0
                .bind(py)
                .call_method1("AppendToTimeline", (payload,))
                .and_then(|r| r.is_truthy())
                .map_err(|e| map_pyerr("AppendToTimeline", e))
        })
    }

    fn import_timeline_from_file(&self, path: &Path) -> HostResult<Option<ResolveTimeline>> {
        Python::with_gil(|py| {
            let timeline = self
                .0
                .bind(py)
                .call_method1(
                    "ImportTimelineFromFile",
                    (path.to_string_lossy().as_ref(),),
                )
                .map_err(|e| map_pyerr("ImportTimelineFromFile", e))?;
            if timeline.is_none() {
                return Ok(None);
            }
            Ok(Some(ResolveTimeline(timeline.unbind())))
        })
    }

    fn import_media(&self, paths: &[PathBuf]) -> HostResult<Vec<ResolveMedia>> {
        Python::with_gil(|py| {
            let args: Vec<String> = paths
                .iter()
                .map(|p| p.to_string_lossy().to_string())
                .collect();
            let imported = self
                .0
                .bind(py)
                .call_method1("ImportMedia", (args,))
                .map_err(|e| map_pyerr("ImportMedia", e))?;
            if imported.is_none() {
                return Ok(Vec::new());
            }

            let list = imported
                .downcast::<PyList>()
                .map_err(|e| HostError::call_failed("ImportMedia", e.to_string()))?;
            let mut media = Vec::with_capacity(list.len());
            for item in list.iter() {
                if !item.is_none() {
                    media.push(ResolveMedia(item.unbind()));
                }
            }
            Ok(media)
        })
    }
}
