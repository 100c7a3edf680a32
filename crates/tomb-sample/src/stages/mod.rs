//! # Pipeline Stages
//!
//! Every stage is a tracked task of the pipeline's tomb. Stages follow the same contract:
//!
//! - Return `Ok(())` when their input is exhausted
//! - Return `Err(TaskError::Dying)` as soon as the tomb starts dying
//! - Return a [`PipelineError`](crate::error::PipelineError) for a genuine failure
//!
//! The tomb takes care of the rest: the first failure stops every stage, and the last stage
//! to finish closes the run.

pub mod producer;
pub mod sink;
pub mod worker;

pub use producer::Producer;
pub use sink::{Sink, Totals};
pub use worker::Worker;

use async_trait::async_trait;
use tomb::{TaskResult, Tomb};

/// A unit of work run under a [`Tomb`].
#[async_trait]
pub trait Stage: Send + 'static {
    /// Short name used in log events.
    fn name(&self) -> &'static str;

    /// Runs the stage to completion. `tomb` is the tomb tracking this stage.
    async fn run(self: Box<Self>, tomb: Tomb) -> TaskResult;
}
