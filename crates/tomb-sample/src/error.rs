//! Error types for the pipeline.

use thiserror::Error;
use tomb::{Failure, TaskError};

/// Errors that can stop a pipeline run.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    /// A worker refused an item.
    #[error("item {0} rejected")]
    Rejected(u64),

    /// The square of an item doesn't fit in a `u64`.
    #[error("square of item {0} overflows")]
    Overflow(u64),

    /// The running sum no longer fits in a `u64`.
    #[error("result sum overflows")]
    SumOverflow,

    /// A stage lost its downstream channel while the pipeline was still running.
    #[error("{0} channel closed")]
    ChannelClosed(&'static str),

    /// A failure that didn't originate in a stage (e.g. a panicking task).
    #[error("pipeline failed: {0}")]
    Failed(String),
}

impl From<PipelineError> for TaskError {
    fn from(error: PipelineError) -> Self {
        TaskError::Failed(Failure::new(error))
    }
}

impl From<Failure> for PipelineError {
    fn from(failure: Failure) -> Self {
        match failure.downcast_ref::<PipelineError>() {
            Some(error) => error.clone(),
            None => PipelineError::Failed(failure.to_string()),
        }
    }
}
