//! Silence-cut step - runs the external silence-removal tool.
//!
//! Finds the newest screen recording in the first configured recordings
//! directory that exists and runs auto-editor over it, producing an
//! edit-decision export next to the input. The step is optional: a
//! disabled tool or missing inputs skip rather than fail, only a tool
//! crash aborts the run.

use tracing::info;

use crate::discovery::{first_existing_dir, latest_recording};
use crate::host::HostApp;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};
use crate::runner::CommandRunner;

pub struct SilenceCutStep {
    runner: CommandRunner,
}

impl SilenceCutStep {
    pub fn new() -> Self {
        Self {
            runner: CommandRunner::new(),
        }
    }
}

impl Default for SilenceCutStep {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HostApp> PipelineStep<H> for SilenceCutStep {
    fn name(&self) -> &str {
        "SilenceCut"
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
        let cfg = &ctx.settings.auto_editor;
        if !cfg.enabled {
            return Ok(StepOutcome::Skipped("disabled in configuration".into()));
        }

        let Some(dir) = first_existing_dir(&ctx.settings.paths.recordings_dirs) else {
            return Ok(StepOutcome::Skipped(
                "no configured recordings directory exists".into(),
            ));
        };

        let recording = latest_recording(&dir)
            .map_err(|e| StepError::io(format!("scanning {}", dir.display()), e))?;
        let Some(recording) = recording else {
            return Ok(StepOutcome::Skipped(format!(
                "no recordings found in {}",
                dir.display()
            )));
        };

        info!(recording = %recording.display(), "running silence removal");
        let file = recording.to_string_lossy().to_string();
        let args = [
            file.as_str(),
            "--margin",
            cfg.margin.as_str(),
            "--edit",
            cfg.edit.as_str(),
            "--export",
            cfg.export.as_str(),
        ];
        let output = self
            .runner
            .run(&cfg.executable, &args, Some(&dir))
            .map_err(|e| StepError::io(format!("launching {}", cfg.executable), e))?;

        if !output.success {
            return Err(StepError::command_failed(
                cfg.executable.clone(),
                output.exit_code.unwrap_or(-1),
                output.stderr.lines().last().unwrap_or("no output").to_string(),
            ));
        }

        state.recording = Some(recording);
        Ok(StepOutcome::Success)
    }

    fn validate_output(
        &self,
        _ctx: &Context<'_, H>,
        state: &RunState<H::Project>,
    ) -> StepResult<()> {
        if state.recording.is_none() {
            return Err(StepError::invalid_output("no recording was processed"));
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
    use crate::host::fake::FakeApp;
    use std::fs::File;

    fn ctx_with<'a>(host: &'a FakeApp, settings: &'a Settings) -> Context<'a, FakeApp> {
        Context::new(host, settings, "test_run")
    }

    #[test]
    fn skips_when_disabled() {
        let host = FakeApp::new();
        let mut settings = Settings::default();
        settings.auto_editor.enabled = false;
        let ctx = ctx_with(&host, &settings);
        let mut state = RunState::new();

        let step = SilenceCutStep::new();
        let outcome = step.execute(&ctx, &mut state).unwrap();
        assert!(matches!(outcome, StepOutcome::Skipped(_)));
    }

    #[test]
    fn skips_when_no_recordings_directory_exists() {
        let host = FakeApp::new();
        let mut settings = Settings::default();
        settings.paths.recordings_dirs = vec!["/nonexistent/recordings".into()];
        let ctx = ctx_with(&host, &settings);
        let mut state = RunState::new();

        let step = SilenceCutStep::new();
        let outcome = step.execute(&ctx, &mut state).unwrap();
        assert!(matches!(outcome, StepOutcome::Skipped(_)));
    }

    #[test]
    fn skips_when_directory_has_no_recordings() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();

        let host = FakeApp::new();
        let mut settings = Settings::default();
        settings.paths.recordings_dirs = vec![dir.path().to_path_buf()];
        let ctx = ctx_with(&host, &settings);
        let mut state = RunState::new();

        let step = SilenceCutStep::new();
        let outcome = step.execute(&ctx, &mut state).unwrap();
        assert!(matches!(outcome, StepOutcome::Skipped(_)));
    }

    #[test]
    fn fails_when_tool_exits_nonzero() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("session.mkv")).unwrap();

        let host = FakeApp::new();
        let mut settings = Settings::default();
        settings.paths.recordings_dirs = vec![dir.path().to_path_buf()];
        settings.auto_editor.executable = "false".to_string();
        let ctx = ctx_with(&host, &settings);
        let mut state = RunState::new();

        let step = SilenceCutStep::new();
        let err = step.execute(&ctx, &mut state).unwrap_err();
        assert!(matches!(err, StepError::CommandFailed { .. }));
    }

    #[test]
    fn processes_latest_recording() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("session.mkv")).unwrap();

        let host = FakeApp::new();
        let mut settings = Settings::default();
        settings.paths.recordings_dirs = vec![dir.path().to_path_buf()];
        settings.auto_editor.executable = "true".to_string();
        let ctx = ctx_with(&host, &settings);
        let mut state = RunState::new();

        let step = SilenceCutStep::new();
        let outcome = step.execute(&ctx, &mut state).unwrap();
        assert_eq!(outcome, StepOutcome::Success);
        assert_eq!(state.recording, Some(dir.path().join("session.mkv")));
        step.validate_output(&ctx, &state).unwrap();
    }
}
