//! Core types for the run pipeline.

use std::path::PathBuf;

use crate::config::Settings;
use crate::host::{HostApp, HostProject};
use crate::models::SpliceReport;

/// Read-only context passed to pipeline steps.
///
/// Holds the host handle and run configuration that steps can read but
/// not modify. Mutable state goes in [`RunState`].
pub struct Context<'a, H: HostApp> {
    /// Connected host application.
    pub host: &'a H,
    /// Application settings.
    pub settings: &'a Settings,
    /// Run name, also used for template-derived project names.
    pub run_name: String,
}

impl<'a, H: HostApp> Context<'a, H> {
    pub fn new(host: &'a H, settings: &'a Settings, run_name: impl Into<String>) -> Self {
        Self {
            host,
            settings,
            run_name: run_name.into(),
        }
    }
}

/// Mutable run state that accumulates results from pipeline steps.
///
/// Steps add data as they complete; later steps read what earlier ones
/// produced. Host handles live here for the duration of one run only.
pub struct RunState<P: HostProject> {
    /// The project being edited.
    pub project: Option<P>,
    /// The persistent destination timeline.
    pub main_timeline: Option<P::Timeline>,
    /// Screen recording the silence-cut step processed.
    pub recording: Option<PathBuf>,
    /// Edit-decision file discovered for import.
    pub edit_file: Option<PathBuf>,
    /// Timeline imported from the edit file (the splice source).
    pub edit_timeline: Option<P::Timeline>,
    /// Ending clip appended to the edit timeline, if any.
    pub ending: Option<EndingOutput>,
    /// Splice-engine report.
    pub splice: Option<SpliceReport>,
}

impl<P: HostProject> RunState<P> {
    pub fn new() -> Self {
        Self {
            project: None,
            main_timeline: None,
            recording: None,
            edit_file: None,
            edit_timeline: None,
            ending: None,
            splice: None,
        }
    }

    /// Whether the project and destination timeline were resolved.
    pub fn has_project(&self) -> bool {
        self.project.is_some() && self.main_timeline.is_some()
    }

    /// Whether an edit timeline is ready to splice.
    pub fn has_edit_timeline(&self) -> bool {
        self.edit_timeline.is_some()
    }
}

impl<P: HostProject> Default for RunState<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Output of the append-ending step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndingOutput {
    /// Name of the imported ending clip.
    pub clip_name: String,
    /// Its frame count, used as the append end frame.
    pub frames: i64,
}

/// Outcome of one step execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step completed its work.
    Success,
    /// The step decided to skip (not an error); carries the reason.
    Skipped(String),
}
