//! Splice step - drives the splice engine against the run's timelines.
//!
//! Makes the destination timeline active, runs the engine to flatten
//! the edit timeline into it, and finishes by switching the host UI to
//! the edit page so the result is in front of the operator.

use tracing::{info, warn};

use crate::host::{HostApp, HostProject};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};
use crate::splice::splice_into;

pub struct SpliceStep;

impl SpliceStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SpliceStep {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HostApp> PipelineStep<H> for SpliceStep {
    fn name(&self) -> &str {
        "Splice"
    }

    fn validate_input(
        &self,
        _ctx: &Context<'_, H>,
        state: &RunState<H::Project>,
    ) -> StepResult<()> {
        if !state.has_project() {
            return Err(StepError::invalid_input("no project prepared"));
        }
        if !state.has_edit_timeline() {
            return Err(StepError::invalid_input("no edit timeline imported"));
        }
        Ok(())
    }

    fn execute(
        &self,
        ctx: &Context<'_, H>,
        state: &mut RunState<H::Project>,
    ) -> StepResult<StepOutcome> {
        let project = state
            .project
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("no project prepared"))?;
        let main = state
            .main_timeline
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("no destination timeline"))?;
        let edit = state
            .edit_timeline
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("no edit timeline imported"))?;

        // The engine splices into whatever timeline is active.
        if !project.set_current_timeline(main)? {
            return Err(StepError::other(
                "could not activate the destination timeline",
            ));
        }

        let config = ctx.settings.splice.to_splice_config();
        let report = splice_into(project, edit, &config)?;
        info!(
            appended = report.appended,
            skipped = report.skipped,
            offset = report.insertion_offset,
            anchor_found = report.anchor_found,
            "splice complete"
        );
        state.splice = Some(report);

        // Leave the operator looking at the result.
        match ctx.host.open_page("edit") {
            Ok(true) => {}
            Ok(false) => warn!("host declined to open the edit page"),
            Err(e) => warn!("could not open the edit page: {}", e),
        }

        Ok(StepOutcome::Success)
    }

    fn validate_output(
        &self,
        _ctx: &Context<'_, H>,
        state: &RunState<H::Project>,
    ) -> StepResult<()> {
        match &state.splice {
            Some(report) if report.appended > 0 => Ok(()),
            Some(_) => Err(StepError::invalid_output("splice appended no entries")),
            None => Err(StepError::invalid_output("no splice report recorded")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::host::fake::{AppendBehavior, FakeApp, FakeClip, FakeProject, FakeTimeline};
    use crate::host::fake::FakeMedia;

    fn fixture() -> (FakeApp, FakeProject, RunState<FakeProject>) {
        let host = FakeApp::new();
        let project = FakeProject::new("test");

        let main = FakeTimeline::new("main");
        main.push_video_track(vec![FakeClip::new("01_EBI_CHAN_OP", 0, 100).with_end(100)]);

        let edit = FakeTimeline::new("cut");
        edit.push_video_track(vec![
            FakeClip::new("video.mov", 0, 50).with_media(FakeMedia::new("video.mov", 50))
        ]);

        project.stage_current_timeline(main.clone());
        host.set_current_project(project.clone());

        let mut state = RunState::new();
        state.project = Some(project.clone());
        state.main_timeline = Some(main);
        state.edit_timeline = Some(edit);
        (host, project, state)
    }

    fn ctx_with<'a>(host: &'a FakeApp, settings: &'a Settings) -> Context<'a, FakeApp> {
        Context::new(host, settings, "test_run")
    }

    #[test]
    fn splices_and_opens_edit_page() {
        let (host, _project, mut state) = fixture();
        let settings = Settings::default();
        let ctx = ctx_with(&host, &settings);

        let step = SpliceStep::new();
        step.validate_input(&ctx, &state).unwrap();
        let outcome = step.execute(&ctx, &mut state).unwrap();
        assert_eq!(outcome, StepOutcome::Success);
        step.validate_output(&ctx, &state).unwrap();

        let report = state.splice.as_ref().unwrap();
        assert_eq!(report.insertion_offset, 100);
        assert!(report.anchor_found);
        assert_eq!(report.appended, 1);

        let main = state.main_timeline.as_ref().unwrap();
        assert_eq!(main.appended_entries().len(), 1);
        assert_eq!(host.opened_pages(), vec!["edit"]);
    }

    #[test]
    fn requires_both_timelines() {
        let (host, _project, mut state) = fixture();
        let settings = Settings::default();
        let ctx = ctx_with(&host, &settings);

        let step = SpliceStep::new();
        state.edit_timeline = None;
        assert!(step.validate_input(&ctx, &state).is_err());
    }

    #[test]
    fn engine_failure_propagates() {
        let (host, project, mut state) = fixture();
        project.pool().script_appends([AppendBehavior::ErrFatal]);
        let settings = Settings::default();
        let ctx = ctx_with(&host, &settings);

        let step = SpliceStep::new();
        let err = step.execute(&ctx, &mut state).unwrap_err();
        assert!(matches!(err, StepError::Splice(_)));
        assert!(state.splice.is_none());
    }

    #[test]
    fn retargets_destination_before_splicing() {
        let (host, project, mut state) = fixture();
        // Leave a different timeline active; the step must switch back.
        let other = FakeTimeline::new("scratch");
        project.set_current_timeline(&other).unwrap();

        let settings = Settings::default();
        let ctx = ctx_with(&host, &settings);

        let step = SpliceStep::new();
        step.execute(&ctx, &mut state).unwrap();
        let main = state.main_timeline.as_ref().unwrap();
        assert_eq!(main.appended_entries().len(), 1);
        assert!(other.appended_entries().is_empty());
    }
}
