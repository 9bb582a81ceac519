//! Prepare-project step - resolves the project and destination timeline.
//!
//! When a template project archive is configured, imports it under a
//! unique per-run name so every run starts from a clean project. Without
//! a template the currently open project is used as-is. Either way the
//! step resolves the persistent destination timeline and stores both
//! handles for later steps.

use tracing::{info, warn};

use crate::host::{HostApp, HostProject, HostTimeline};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

pub struct PrepareProjectStep;

impl PrepareProjectStep {
    pub fn new() -> Self {
        Self
    }

    /// Pick a project name not already present in the host's folder.
    fn unique_name<H: HostApp>(&self, ctx: &Context<'_, H>) -> StepResult<String> {
        let existing = ctx.host.project_names()?;
        let base = ctx.run_name.clone();
        if !existing.iter().any(|n| n == &base) {
            return Ok(base);
        }
        for i in 2..100 {
            let candidate = format!("{base}_{i}");
            if !existing.iter().any(|n| n == &candidate) {
                return Ok(candidate);
            }
        }
        Err(StepError::other("could not derive a unique project name"))
    }

    /// Import the configured template and load the resulting project.
    fn import_template<H: HostApp>(&self, ctx: &Context<'_, H>) -> StepResult<Option<H::Project>> {
        let Some(template) = ctx.settings.paths.template_project.as_deref() else {
            return Ok(None);
        };
        if !template.is_file() {
            warn!(path = %template.display(), "template project not found, using current project");
            return Ok(None);
        }

        let name = self.unique_name(ctx)?;
        info!(template = %template.display(), project = %name, "importing template project");
        if !ctx.host.import_project(template, Some(&name))? {
            return Err(StepError::other(format!(
                "host rejected template import from {}",
                template.display()
            )));
        }

        if let Some(project) = ctx.host.load_project(&name)? {
            return Ok(Some(project));
        }

        // Some hosts ignore the rename argument on import and register the
        // project under the archive's file stem instead.
        let stem = template
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        if let Some(project) = ctx.host.load_project(&stem)? {
            if !project.set_name(&name)? {
                warn!(project = %stem, "could not rename imported project");
            }
            return Ok(Some(project));
        }

        Err(StepError::other(format!(
            "imported template but could not load project '{name}'"
        )))
    }
}

impl Default for PrepareProjectStep {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HostApp> PipelineStep<H> for PrepareProjectStep {
    fn name(&self) -> &str {
        "PrepareProject"
    }

    fn validate_input(
        &self,
        _ctx: &Context<'_, H>,
        _state: &RunState<H::Project>,
    ) -> StepResult<()> {
        Ok(())
    }

    fn execute(
        &self,
        ctx: &Context<'_, H>,
        state: &mut RunState<H::Project>,
    ) -> StepResult<StepOutcome> {
        let project = match self.import_template(ctx)? {
            Some(project) => project,
            None => ctx
                .host
                .current_project()?
                .ok_or_else(|| StepError::precondition_failed("no project open in the host"))?,
        };

        let timeline = project.current_timeline()?.ok_or_else(|| {
            StepError::precondition_failed("project has no current timeline")
        })?;

        let timeline_name = timeline.name()?;
        let wanted = &ctx.settings.splice.main_timeline;
        if !timeline_name.eq_ignore_ascii_case(wanted) {
            warn!(
                timeline = %timeline_name,
                expected = %wanted,
                "current timeline does not match the configured destination name"
            );
        }
        info!(project = %project.name()?, timeline = %timeline_name, "project ready");

        state.project = Some(project);
        state.main_timeline = Some(timeline);
        Ok(StepOutcome::Success)
    }

    fn validate_output(
        &self,
        _ctx: &Context<'_, H>,
        state: &RunState<H::Project>,
    ) -> StepResult<()> {
        if !state.has_project() {
            return Err(StepError::invalid_output(
                "project or destination timeline missing after preparation",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::host::fake::{FakeApp, FakeProject, FakeTimeline};

    fn ctx_with<'a>(host: &'a FakeApp, settings: &'a Settings) -> Context<'a, FakeApp> {
        Context::new(host, settings, "run_20260831_120000")
    }

    #[test]
    fn uses_current_project_without_template() {
        let host = FakeApp::new();
        let project = FakeProject::new("existing");
        project.stage_current_timeline(FakeTimeline::new("main"));
        host.set_current_project(project);

        let settings = Settings::default();
        let ctx = ctx_with(&host, &settings);
        let mut state = RunState::new();

        let step = PrepareProjectStep::new();
        step.validate_input(&ctx, &state).unwrap();
        let outcome = step.execute(&ctx, &mut state).unwrap();
        assert_eq!(outcome, StepOutcome::Success);
        step.validate_output(&ctx, &state).unwrap();
        assert!(state.has_project());
        assert!(host.imported().is_empty());
    }

    #[test]
    fn fails_without_project_or_timeline() {
        let host = FakeApp::new();
        let settings = Settings::default();
        let ctx = ctx_with(&host, &settings);
        let mut state = RunState::new();

        let step = PrepareProjectStep::new();
        assert!(step.execute(&ctx, &mut state).is_err());

        // Project present but no timeline is still an error.
        host.set_current_project(FakeProject::new("bare"));
        assert!(step.execute(&ctx, &mut state).is_err());
    }

    #[test]
    fn imports_template_under_run_name() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("weekly.drp");
        std::fs::write(&template, b"archive").unwrap();

        let host = FakeApp::new();
        let staged = FakeProject::new("run_20260831_120000");
        staged.stage_current_timeline(FakeTimeline::new("main"));
        host.stage_import_result(staged);

        let mut settings = Settings::default();
        settings.paths.template_project = Some(template.clone());
        let ctx = ctx_with(&host, &settings);
        let mut state = RunState::new();

        let step = PrepareProjectStep::new();
        let outcome = step.execute(&ctx, &mut state).unwrap();
        assert_eq!(outcome, StepOutcome::Success);
        assert_eq!(
            host.imported(),
            vec![(template, Some("run_20260831_120000".to_string()))]
        );
    }

    #[test]
    fn renames_when_host_registers_under_archive_stem() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("weekly.drp");
        std::fs::write(&template, b"archive").unwrap();

        // The host ignores the rename argument and files the project
        // under the archive stem instead.
        let host = FakeApp::new();
        let staged = FakeProject::new("weekly");
        staged.stage_current_timeline(FakeTimeline::new("main"));
        host.stage_project("weekly", staged);

        let mut settings = Settings::default();
        settings.paths.template_project = Some(template);
        let ctx = ctx_with(&host, &settings);
        let mut state = RunState::new();

        let step = PrepareProjectStep::new();
        step.execute(&ctx, &mut state).unwrap();
        let project = state.project.as_ref().unwrap();
        assert_eq!(project.name().unwrap(), "run_20260831_120000");
    }

    #[test]
    fn missing_template_falls_back_to_current_project() {
        let host = FakeApp::new();
        let project = FakeProject::new("fallback");
        project.stage_current_timeline(FakeTimeline::new("main"));
        host.set_current_project(project);

        let mut settings = Settings::default();
        settings.paths.template_project = Some("/nonexistent/weekly.drp".into());
        let ctx = ctx_with(&host, &settings);
        let mut state = RunState::new();

        let step = PrepareProjectStep::new();
        let outcome = step.execute(&ctx, &mut state).unwrap();
        assert_eq!(outcome, StepOutcome::Success);
        assert!(host.imported().is_empty());
    }
}
