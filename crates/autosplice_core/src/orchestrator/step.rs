//! Pipeline step trait definition.

use crate::host::HostApp;

use super::errors::StepResult;
use super::types::{Context, RunState, StepOutcome};

/// Trait for pipeline steps.
///
/// The pipeline runner calls these methods in order:
///
/// 1. `validate_input` - check preconditions before execution
/// 2. `execute` - perform the step's work
/// 3. `validate_output` - verify the step produced valid output
///
/// Steps are generic over the host backend so the same pipeline runs
/// against the scripting bridge and the in-memory fake.
pub trait PipelineStep<H: HostApp> {
    /// Step name, for logging and error context.
    fn name(&self) -> &str;

    /// Validate inputs before execution.
    fn validate_input(&self, ctx: &Context<'_, H>, state: &RunState<H::Project>)
        -> StepResult<()>;

    /// Execute the step's main work, recording results in `state`.
    ///
    /// Returns `StepOutcome::Skipped` when the step determined it should
    /// not run (not an error).
    fn execute(
        &self,
        ctx: &Context<'_, H>,
        state: &mut RunState<H::Project>,
    ) -> StepResult<StepOutcome>;

    /// Validate outputs after a successful execution.
    fn validate_output(
        &self,
        ctx: &Context<'_, H>,
        state: &RunState<H::Project>,
    ) -> StepResult<()>;

    /// Whether this step may be skipped based on configuration or
    /// missing optional inputs. Default is required.
    fn is_optional(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeApp;

    struct NoopStep;

    impl PipelineStep<FakeApp> for NoopStep {
        fn name(&self) -> &str {
            "Noop"
        }

        fn validate_input(
            &self,
            _ctx: &Context<'_, FakeApp>,
            _state: &RunState<crate::host::fake::FakeProject>,
        ) -> StepResult<()> {
            Ok(())
        }

        fn execute(
            &self,
            _ctx: &Context<'_, FakeApp>,
            _state: &mut RunState<crate::host::fake::FakeProject>,
        ) -> StepResult<StepOutcome> {
            Ok(StepOutcome::Success)
        }

        fn validate_output(
            &self,
            _ctx: &Context<'_, FakeApp>,
            _state: &RunState<crate::host::fake::FakeProject>,
        ) -> StepResult<()> {
            Ok(())
        }
    }

    #[test]
    fn step_trait_object_works() {
        let step: Box<dyn PipelineStep<FakeApp>> = Box::new(NoopStep);
        assert_eq!(step.name(), "Noop");
        assert!(!step.is_optional());
    }
}
