//! Import-edit step - imports the newest exported edit as a timeline.
//!
//! Searches the configured export directories for the most recently
//! modified edit-decision file and asks the media pool to import it as
//! a new timeline. The imported timeline becomes the splice source.

use tracing::info;

use crate::discovery::{first_existing_dir, latest_edit_file};
use crate::host::{HostApp, HostError, HostMediaPool, HostProject};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

pub struct ImportEditStep;

impl ImportEditStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImportEditStep {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HostApp> PipelineStep<H> for ImportEditStep {
    fn name(&self) -> &str {
        "ImportEdit"
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
        let dir = first_existing_dir(ctx.settings.edit_export_dirs()).ok_or_else(|| {
            StepError::precondition_failed("no configured edit export directory exists")
        })?;

        let edit_file = latest_edit_file(&dir)
            .map_err(|e| StepError::io(format!("scanning {}", dir.display()), e))?
            .ok_or_else(|| StepError::file_not_found(format!("{}/*.fcpxml", dir.display())))?;

        let project = state
            .project
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("no project prepared"))?;
        let pool = project
            .media_pool()?
            .ok_or(HostError::NullHandle("media pool"))?;

        info!(file = %edit_file.display(), "importing edit timeline");
        let timeline = pool.import_timeline_from_file(&edit_file)?.ok_or_else(|| {
            StepError::other(format!(
                "host did not produce a timeline from {}",
                edit_file.display()
            ))
        })?;

        state.edit_file = Some(edit_file);
        state.edit_timeline = Some(timeline);
        Ok(StepOutcome::Success)
    }

    fn validate_output(
        &self,
        _ctx: &Context<'_, H>,
        state: &RunState<H::Project>,
    ) -> StepResult<()> {
        if !state.has_edit_timeline() {
            return Err(StepError::invalid_output("no edit timeline was imported"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::host::fake::{FakeApp, FakeProject, FakeTimeline};
    use std::fs::File;

    fn prepared_state(project: FakeProject) -> RunState<FakeProject> {
        let mut state = RunState::new();
        let main = FakeTimeline::new("main");
        project.stage_current_timeline(main.clone());
        state.project = Some(project);
        state.main_timeline = Some(main);
        state
    }

    fn ctx_with<'a>(host: &'a FakeApp, settings: &'a Settings) -> Context<'a, FakeApp> {
        Context::new(host, settings, "test_run")
    }

    #[test]
    fn requires_a_prepared_project() {
        let host = FakeApp::new();
        let settings = Settings::default();
        let ctx = ctx_with(&host, &settings);
        let state = RunState::new();

        let step = ImportEditStep::new();
        assert!(step.validate_input(&ctx, &state).is_err());
    }

    #[test]
    fn imports_latest_edit_file() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("cut.fcpxml")).unwrap();

        let host = FakeApp::new();
        let project = FakeProject::new("test");
        project
            .pool()
            .stage_timeline_import(FakeTimeline::new("cut"));
        let mut state = prepared_state(project);

        let mut settings = Settings::default();
        settings.paths.edit_export_dirs = vec![dir.path().to_path_buf()];
        let ctx = ctx_with(&host, &settings);

        let step = ImportEditStep::new();
        step.validate_input(&ctx, &state).unwrap();
        let outcome = step.execute(&ctx, &mut state).unwrap();
        assert_eq!(outcome, StepOutcome::Success);
        assert_eq!(state.edit_file, Some(dir.path().join("cut.fcpxml")));
        step.validate_output(&ctx, &state).unwrap();
    }

    #[test]
    fn fails_when_no_edit_file_present() {
        let dir = tempfile::tempdir().unwrap();

        let host = FakeApp::new();
        let mut state = prepared_state(FakeProject::new("test"));

        let mut settings = Settings::default();
        settings.paths.edit_export_dirs = vec![dir.path().to_path_buf()];
        let ctx = ctx_with(&host, &settings);

        let step = ImportEditStep::new();
        let err = step.execute(&ctx, &mut state).unwrap_err();
        assert!(matches!(err, StepError::FileNotFound { .. }));
    }

    #[test]
    fn falls_back_to_recordings_dirs_for_exports() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("cut.xml")).unwrap();

        let host = FakeApp::new();
        let project = FakeProject::new("test");
        project
            .pool()
            .stage_timeline_import(FakeTimeline::new("cut"));
        let mut state = prepared_state(project);

        let mut settings = Settings::default();
        settings.paths.recordings_dirs = vec![dir.path().to_path_buf()];
        let ctx = ctx_with(&host, &settings);

        let step = ImportEditStep::new();
        let outcome = step.execute(&ctx, &mut state).unwrap();
        assert_eq!(outcome, StepOutcome::Success);
    }
}
