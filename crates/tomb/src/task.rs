//! # Task Reaping
//!
//! Every tracked task carries a [`Reaper`]. When the task returns, the reaper hands its
//! outcome to the tomb. If the task never returns (it panicked, or its future was dropped
//! because the runtime shut down or the task was aborted) the reaper's `Drop` reports a
//! failure instead, so the live count still reaches zero and the tomb can die.

use crate::error::{Failure, TaskError, TaskResult};
use crate::tomb::Tomb;
use tracing::warn;

pub(crate) const ABANDONED: &str = "tomb: task panicked or was cancelled";

pub(crate) struct Reaper {
    tomb: Tomb,
    armed: bool,
}

impl Reaper {
    pub(crate) fn new(tomb: Tomb) -> Self {
        Self { tomb, armed: true }
    }

    /// Reports the task's outcome. If `reap` panics (acknowledging a stop that was never
    /// requested) the reaper stays armed and `Drop` records the task as abandoned.
    pub(crate) fn finish(mut self, result: TaskResult) {
        self.tomb.reap(result);
        self.armed = false;
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        if self.armed {
            warn!(tomb = %self.tomb.name(), "Task ended without reporting an outcome");
            self.tomb
                .reap(Err(TaskError::Failed(Failure::msg(ABANDONED))));
        }
    }
}
