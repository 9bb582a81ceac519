//! Pipeline runner that executes steps in sequence.

use tracing::{debug, error, info, warn};

use crate::host::HostApp;

use super::errors::{PipelineError, PipelineResult};
use super::step::PipelineStep;
use super::types::{Context, RunState, StepOutcome};

/// Pipeline that runs a sequence of steps.
///
/// The pipeline executes steps in order, running validation before
/// and after each step. A skipped step is recorded but does not stop
/// the run; a step error aborts immediately.
pub struct Pipeline<H: HostApp> {
    /// Steps to execute in order.
    steps: Vec<Box<dyn PipelineStep<H>>>,
}

impl<H: HostApp> Pipeline<H> {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step to the pipeline.
    pub fn add_step<S: PipelineStep<H> + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: PipelineStep<H> + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    /// Run the pipeline with the given context and state.
    ///
    /// Executes each step in order:
    /// 1. Run `validate_input`
    /// 2. Run `execute`
    /// 3. Run `validate_output` (if execute returned Success)
    ///
    /// Returns a run report on success, or a `PipelineError` on failure.
    pub fn run(
        &self,
        ctx: &Context<'_, H>,
        state: &mut RunState<H::Project>,
    ) -> PipelineResult<RunReport> {
        let mut report = RunReport {
            steps_completed: Vec::new(),
            steps_skipped: Vec::new(),
        };

        let total = self.steps.len();

        for (i, step) in self.steps.iter().enumerate() {
            let step_name = step.name();
            info!(run = %ctx.run_name, step = step_name, "[{}/{}] starting", i + 1, total);

            debug!(step = step_name, "validating input");
            if let Err(e) = step.validate_input(ctx, state) {
                error!(step = step_name, "input validation failed: {}", e);
                return Err(PipelineError::step_failed(&ctx.run_name, step_name, e));
            }

            debug!(step = step_name, "executing");
            let outcome = step.execute(ctx, state).map_err(|e| {
                error!(step = step_name, "execution failed: {}", e);
                PipelineError::step_failed(&ctx.run_name, step_name, e)
            })?;

            match outcome {
                StepOutcome::Success => {
                    debug!(step = step_name, "validating output");
                    if let Err(e) = step.validate_output(ctx, state) {
                        error!(step = step_name, "output validation failed: {}", e);
                        return Err(PipelineError::step_failed(&ctx.run_name, step_name, e));
                    }

                    info!(step = step_name, "completed");
                    report.steps_completed.push(step_name.to_string());
                }
                StepOutcome::Skipped(reason) => {
                    if step.is_optional() {
                        info!(step = step_name, "skipped: {}", reason);
                    } else {
                        warn!(step = step_name, "skipped: {}", reason);
                    }
                    report.steps_skipped.push(step_name.to_string());
                }
            }
        }

        info!(run = %ctx.run_name, "pipeline finished");
        Ok(report)
    }

    /// Get the number of steps in the pipeline.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Get step names in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl<H: HostApp> Default for Pipeline<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Steps that completed successfully.
    pub steps_completed: Vec<String>,
    /// Steps that were skipped.
    pub steps_skipped: Vec<String>,
}

impl RunReport {
    /// Check if all steps completed (none skipped).
    pub fn all_completed(&self) -> bool {
        self.steps_skipped.is_empty()
    }

    /// Total number of steps that ran.
    pub fn total_steps(&self) -> usize {
        self.steps_completed.len() + self.steps_skipped.len()
    }
}
