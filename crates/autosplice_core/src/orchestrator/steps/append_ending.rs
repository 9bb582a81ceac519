//! Append-ending step - tacks a stock ending clip onto the edit timeline.
//!
//! Imports the first existing ending-clip candidate into the media pool
//! and appends its full length to the freshly imported edit timeline.
//! The ending is cosmetic, so every failure here degrades to a skip
//! rather than aborting the run.

use tracing::{info, warn};

use crate::discovery::first_existing_file;
use crate::host::{HostApp, HostMediaItem, HostMediaPool, HostProject};
use crate::models::ClipEntry;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, EndingOutput, RunState, StepOutcome};

pub struct AppendEndingStep;

impl AppendEndingStep {
    pub fn new() -> Self {
        Self
    }

    fn try_append<H: HostApp>(
        &self,
        ctx: &Context<'_, H>,
        state: &RunState<H::Project>,
    ) -> StepResult<Option<EndingOutput>> {
        let Some(clip_path) = first_existing_file(&ctx.settings.paths.ending_clips) else {
            return Ok(None);
        };

        let project = state
            .project
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("no project prepared"))?;
        let edit = state
            .edit_timeline
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("no edit timeline imported"))?;

        let pool = project
            .media_pool()?
            .ok_or_else(|| StepError::other("media pool unavailable"))?;

        let media = pool
            .import_media(&[clip_path.clone()])?
            .into_iter()
            .next()
            .ok_or_else(|| {
                StepError::other(format!("could not import {}", clip_path.display()))
            })?;

        let clip_name = media.name()?;
        let frames = media.frame_count()?;
        if frames <= 0 {
            return Err(StepError::other(format!(
                "{clip_name} reports no frames"
            )));
        }

        // Appends land on the active timeline, so point the host at the
        // edit timeline first.
        project.set_current_timeline(edit)?;
        if !pool.append_to_timeline(&[ClipEntry::from_trim(media, 0, frames)])? {
            return Err(StepError::other("host refused to append the ending clip"));
        }

        info!(clip = %clip_name, frames, "appended ending clip");
        Ok(Some(EndingOutput { clip_name, frames }))
    }
}

impl Default for AppendEndingStep {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HostApp> PipelineStep<H> for AppendEndingStep {
    fn name(&self) -> &str {
        "AppendEnding"
    }

    fn validate_input(
        &self,
        _ctx: &Context<'_, H>,
        state: &RunState<H::Project>,
    ) -> StepResult<()> {
        if !state.has_project() {
            return Err(StepError::invalid_input("no project prepared"));
        }
        Ok(())
    }

    fn execute(
        &self,
        ctx: &Context<'_, H>,
        state: &mut RunState<H::Project>,
    ) -> StepResult<StepOutcome> {
        if !state.has_edit_timeline() {
            return Ok(StepOutcome::Skipped("no edit timeline to extend".into()));
        }

        match self.try_append(ctx, state) {
            Ok(Some(ending)) => {
                state.ending = Some(ending);
                Ok(StepOutcome::Success)
            }
            Ok(None) => Ok(StepOutcome::Skipped(
                "no configured ending clip exists".into(),
            )),
            Err(e) => {
                warn!("ending clip not appended: {}", e);
                Ok(StepOutcome::Skipped(e.to_string()))
            }
        }
    }

    fn validate_output(
        &self,
        _ctx: &Context<'_, H>,
        state: &RunState<H::Project>,
    ) -> StepResult<()> {
        if state.ending.is_none() {
            return Err(StepError::invalid_output("ending clip was not recorded"));
        }
        Ok(())
    }

    fn is_optional(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::host::fake::{AppendBehavior, FakeApp, FakeMedia, FakeProject, FakeTimeline};
    use std::fs::File;

    fn state_with_edit(project: &FakeProject) -> RunState<FakeProject> {
        let mut state = RunState::new();
        let main = FakeTimeline::new("main");
        project.stage_current_timeline(main.clone());
        state.project = Some(project.clone());
        state.main_timeline = Some(main);
        state.edit_timeline = Some(FakeTimeline::new("cut"));
        state
    }

    fn ctx_with<'a>(host: &'a FakeApp, settings: &'a Settings) -> Context<'a, FakeApp> {
        Context::new(host, settings, "test_run")
    }

    #[test]
    fn appends_full_clip_to_edit_timeline() {
        let dir = tempfile::tempdir().unwrap();
        let ending = dir.path().join("outro.mov");
        File::create(&ending).unwrap();

        let host = FakeApp::new();
        let project = FakeProject::new("test");
        project
            .pool()
            .stage_media(ending.clone(), FakeMedia::new("outro.mov", 120));
        let mut state = state_with_edit(&project);

        let mut settings = Settings::default();
        settings.paths.ending_clips = vec![ending];
        let ctx = ctx_with(&host, &settings);

        let step = AppendEndingStep::new();
        let outcome = step.execute(&ctx, &mut state).unwrap();
        assert_eq!(outcome, StepOutcome::Success);
        assert_eq!(
            state.ending,
            Some(EndingOutput {
                clip_name: "outro.mov".to_string(),
                frames: 120,
            })
        );

        let edit = state.edit_timeline.as_ref().unwrap();
        let appended = edit.appended_entries();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].start_frame, 0);
        assert_eq!(appended[0].end_frame, 120);
        step.validate_output(&ctx, &state).unwrap();
    }

    #[test]
    fn skips_when_no_candidate_exists() {
        let host = FakeApp::new();
        let project = FakeProject::new("test");
        let mut state = state_with_edit(&project);

        let mut settings = Settings::default();
        settings.paths.ending_clips = vec!["/nonexistent/outro.mov".into()];
        let ctx = ctx_with(&host, &settings);

        let step = AppendEndingStep::new();
        let outcome = step.execute(&ctx, &mut state).unwrap();
        assert!(matches!(outcome, StepOutcome::Skipped(_)));
        assert!(state.ending.is_none());
    }

    #[test]
    fn host_failure_degrades_to_skip() {
        let dir = tempfile::tempdir().unwrap();
        let ending = dir.path().join("outro.mov");
        File::create(&ending).unwrap();

        let host = FakeApp::new();
        let project = FakeProject::new("test");
        project
            .pool()
            .stage_media(ending.clone(), FakeMedia::new("outro.mov", 120));
        project.pool().script_appends([AppendBehavior::ErrFatal]);
        let mut state = state_with_edit(&project);

        let mut settings = Settings::default();
        settings.paths.ending_clips = vec![ending];
        let ctx = ctx_with(&host, &settings);

        let step = AppendEndingStep::new();
        let outcome = step.execute(&ctx, &mut state).unwrap();
        assert!(matches!(outcome, StepOutcome::Skipped(_)));
        assert!(state.ending.is_none());
    }

    #[test]
    fn skips_without_an_edit_timeline() {
        let host = FakeApp::new();
        let project = FakeProject::new("test");
        let mut state = state_with_edit(&project);
        state.edit_timeline = None;

        let settings = Settings::default();
        let ctx = ctx_with(&host, &settings);

        let step = AppendEndingStep::new();
        let outcome = step.execute(&ctx, &mut state).unwrap();
        assert!(matches!(outcome, StepOutcome::Skipped(_)));
    }
}
