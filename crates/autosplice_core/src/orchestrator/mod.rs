//! Run orchestrator coordinating the edit-automation pipeline.
//!
//! This module provides the infrastructure for one automation run: a
//! sequence of steps that validate, execute, and record their results
//! against a connected host.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: PrepareProject
//!     ├── Step: SilenceCut      (optional)
//!     ├── Step: ImportEdit
//!     ├── Step: AppendEnding    (optional)
//!     └── Step: Splice
//! ```
//!
//! # Example
//!
//! ```ignore
//! use autosplice_core::orchestrator::{standard_pipeline, Context, RunState};
//!
//! let pipeline = standard_pipeline();
//! let ctx = Context::new(&host, &settings, "run_20260831_120000");
//! let mut state = RunState::new();
//!
//! let report = pipeline.run(&ctx, &mut state)?;
//! println!("Completed: {:?}", report.steps_completed);
//! ```

mod errors;
mod pipeline;
mod step;
pub mod steps;
mod types;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{Pipeline, RunReport};
pub use step::PipelineStep;
pub use steps::{
    AppendEndingStep, ImportEditStep, PrepareProjectStep, SilenceCutStep, SpliceStep,
};
pub use types::{Context, EndingOutput, RunState, StepOutcome};

use crate::host::HostApp;

/// Create the standard pipeline with all steps in run order.
///
/// 1. PrepareProject - resolve the project and destination timeline
/// 2. SilenceCut - run the silence-removal tool over the newest recording
/// 3. ImportEdit - import the newest exported edit as a timeline
/// 4. AppendEnding - append the stock ending clip to the edit timeline
/// 5. Splice - flatten the edit into the destination timeline
pub fn standard_pipeline<H: HostApp>() -> Pipeline<H> {
    Pipeline::new()
        .with_step(PrepareProjectStep::new())
        .with_step(SilenceCutStep::new())
        .with_step(ImportEditStep::new())
        .with_step(AppendEndingStep::new())
        .with_step(SpliceStep::new())
}
