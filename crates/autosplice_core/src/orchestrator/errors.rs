//! Error types for the run pipeline.
//!
//! Errors carry context that chains through layers:
//! Run → Step → Operation → Detail

use std::io;

use thiserror::Error;

use crate::host::HostError;
use crate::splice::SpliceError;

/// Top-level pipeline error with run context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A step failed during execution.
    #[error("run '{run_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        run_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// Input validation failed before the pipeline started.
    #[error("run '{run_name}' failed validation: {message}")]
    ValidationFailed { run_name: String, message: String },
}

impl PipelineError {
    /// Create a step failed error.
    pub fn step_failed(
        run_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            run_name: run_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// Create a validation failed error.
    pub fn validation_failed(run_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            run_name: run_name.into(),
            message: message.into(),
        }
    }
}

/// Error from a pipeline step with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("output validation failed: {0}")]
    InvalidOutput(String),

    /// A precondition for the run was not met.
    #[error("precondition not met: {0}")]
    PreconditionFailed(String),

    /// An external command failed.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// A required file was not found.
    #[error("required file not found: {path}")]
    FileNotFound { path: String },

    /// A host call failed.
    #[error(transparent)]
    Host(#[from] HostError),

    /// The splice engine aborted the run.
    #[error(transparent)]
    Splice(#[from] SpliceError),

    /// Generic step error with message.
    #[error("{0}")]
    Other(String),
}

impl StepError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create a precondition failed error.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }

    /// Create a command failed error.
    pub fn command_failed(
        tool: impl Into<String>,
        exit_code: i32,
        message: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
