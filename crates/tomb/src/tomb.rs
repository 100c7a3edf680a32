//! # Tomb Lifecycle State Machine
//!
//! This module defines [`Tomb`], the shared tracker for a group of concurrent tasks.
//!
//! ## Phases
//!
//! ```text
//!  Running ──kill / failure / last exit──► Dying ──last task reaped / done()──► Dead
//!     │                                      │                                   │
//!     └ err() == Err(StillAlive)             └ dying() fired                     └ dead() fired
//! ```
//!
//! Transitions are monotonic and each one is taken at most once. `dying` always fires before
//! `dead`, including when the last task exits cleanly without anyone calling `kill`.
//!
//! ## Reason Reduction
//!
//! Every stop request and every task outcome is folded into a single recorded reason:
//!
//! | Incoming | Recorded `StillAlive` | Recorded `Clean` | Recorded `Failed` |
//! |----------|-----------------------|------------------|-------------------|
//! | `None` (clean stop) | → `Clean` | unchanged | unchanged |
//! | `Failed(f)` | → `Failed(f)` | → `Failed(f)` | unchanged (first wins) |
//! | `Dying` (acknowledgement) | **panic** | unchanged | unchanged |
//!
//! Once the tomb is dead the recorded reason is frozen, so [`Tomb::wait`] returns the same
//! value every time.
//!
//! ## Concurrency
//!
//! `phase`, the live count and the reason live behind one `parking_lot::Mutex`. The lock is
//! held only for bookkeeping: never while a task is polled, never while waiting on a signal.

use crate::builder::TombBuilder;
use crate::error::{Failure, TaskError, TaskResult, TombError};
use crate::signal::Signal;
use crate::task::Reaper;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Coarse lifecycle state of a [`Tomb`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Dying,
    Dead,
}

#[derive(Debug)]
enum Reason {
    StillAlive,
    Clean,
    Failed(Failure),
}

#[derive(Debug)]
struct State {
    alive: usize,
    phase: Phase,
    reason: Reason,
}

pub(crate) struct Inner {
    pub(crate) name: String,
    pub(crate) handle: Option<Handle>,
    state: Mutex<State>,
    dying: Signal,
    dead: Signal,
}

/// Tracks the lifecycle of a group of tasks as running, dying or dead, and the reason for
/// their death.
///
/// `Tomb` is a cheap handle: cloning it shares the same tracker. Hand a clone to every task
/// that needs to observe [`Tomb::dying`] or register more work.
///
/// # Example
///
/// ```rust
/// use tomb::{TaskError, Tomb};
///
/// #[tokio::main]
/// async fn main() {
///     let tomb = Tomb::new();
///
///     let watcher = tomb.clone();
///     tomb.go(async move {
///         // Work until somebody asks us to stop.
///         watcher.dying().fired().await;
///         Err(TaskError::Dying)
///     });
///
///     tomb.kill(Some(TaskError::msg("shutdown")));
///     let reason = tomb.wait().await;
///     assert_eq!(reason.unwrap_err().to_string(), "shutdown");
/// }
/// ```
#[derive(Clone)]
pub struct Tomb {
    pub(crate) inner: Arc<Inner>,
}

impl Default for Tomb {
    fn default() -> Self {
        Self::new()
    }
}

impl Tomb {
    /// Creates a running tomb with default settings.
    pub fn new() -> Self {
        TombBuilder::default().build()
    }

    /// Returns a builder to configure the tomb's name and runtime.
    pub fn builder() -> TombBuilder {
        TombBuilder::default()
    }

    pub(crate) fn from_parts(name: String, handle: Option<Handle>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                handle,
                state: Mutex::new(State {
                    alive: 0,
                    phase: Phase::Running,
                    reason: Reason::StillAlive,
                }),
                dying: Signal::new(),
                dead: Signal::new(),
            }),
        }
    }

    /// Name used in log events.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    // --- Registration ---

    /// Runs `task` as a tracked tokio task, unless the tomb is already dead.
    ///
    /// If the task fails, or it is the last tracked task to finish, the tomb is killed with
    /// its outcome. It is the task's job to watch [`Tomb::dying`] and return once the tomb
    /// is dying.
    ///
    /// # Panics
    ///
    /// Panics if no runtime handle was configured and this is called outside a tokio runtime.
    pub fn go<F>(&self, task: F)
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        self.go_all(std::iter::once(task));
    }

    /// Runs a batch of tasks.
    ///
    /// The live count is raised by the size of the whole batch before any task starts, so an
    /// early finisher can't kill the tomb before its siblings have been registered.
    pub fn go_all<I, F>(&self, tasks: I)
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = TaskResult> + Send + 'static,
    {
        let tasks: Vec<F> = tasks.into_iter().collect();
        let handle = self.runtime();
        if !self.register(tasks.len()) {
            return;
        }
        for task in tasks {
            let reaper = Reaper::new(self.clone());
            drop(handle.spawn(async move {
                let result = task.await;
                reaper.finish(result);
            }));
        }
    }

    /// Runs a blocking closure on tokio's blocking pool as a tracked task.
    ///
    /// # Panics
    ///
    /// Panics under the same condition as [`Tomb::go`].
    pub fn go_blocking<F>(&self, task: F)
    where
        F: FnOnce() -> TaskResult + Send + 'static,
    {
        let handle = self.runtime();
        if !self.register(1) {
            return;
        }
        let reaper = Reaper::new(self.clone());
        drop(handle.spawn_blocking(move || reaper.finish(task())));
    }

    /// Resolves the runtime tasks are spawned on.
    ///
    /// Called before the live count is touched, so a missing runtime panics with the tomb
    /// left as it was.
    fn runtime(&self) -> Handle {
        match &self.inner.handle {
            Some(handle) => handle.clone(),
            None => Handle::current(),
        }
    }

    /// Adds `count` to the live count. Returns false if the tomb is already dead.
    fn register(&self, count: usize) -> bool {
        let mut state = self.inner.state.lock();
        if state.phase == Phase::Dead {
            debug!(tomb = %self.inner.name, count, "Tomb is dead, dropping tasks");
            return false;
        }
        state.alive += count;
        debug!(tomb = %self.inner.name, count, alive = state.alive, "Tasks registered");
        true
    }

    /// Folds a finished task's outcome into the tomb.
    pub(crate) fn reap(&self, result: TaskResult) {
        let mut state = self.inner.state.lock();
        if matches!(result, Err(TaskError::Dying)) && state.phase == Phase::Running {
            drop(state);
            panic!("tomb: task returned Dying while the tomb is still alive");
        }

        state.alive = state.alive.saturating_sub(1);
        debug!(tomb = %self.inner.name, alive = state.alive, ok = result.is_ok(), "Task reaped");
        if state.phase == Phase::Dead {
            return;
        }

        if state.alive == 0 || result.is_err() {
            self.kill_locked(&mut state, result.err());
            if state.alive == 0 {
                self.bury_locked(&mut state);
            }
        }
    }

    // --- Cancellation ---

    /// Puts the tomb in dying mode for the given reason.
    ///
    /// - `None` is a clean stop. It never hides a genuine failure reported before or after it.
    /// - `Some(TaskError::Failed(_))` is recorded unless a genuine failure already was.
    /// - `Some(TaskError::Dying)` never changes the reason.
    ///
    /// May be called any number of times, from any thread.
    ///
    /// # Panics
    ///
    /// Panics when called with `TaskError::Dying` while the tomb is still alive: there is no
    /// stop request to acknowledge.
    pub fn kill(&self, reason: Option<TaskError>) {
        let mut state = self.inner.state.lock();
        if matches!(reason, Some(TaskError::Dying)) && state.phase == Phase::Running {
            drop(state);
            panic!("tomb: kill with Dying while still alive");
        }
        self.kill_locked(&mut state, reason);
    }

    /// Kills the tomb with a failure built from format arguments, and returns that failure.
    ///
    /// ```rust
    /// let tomb = tomb::Tomb::new();
    /// let failure = tomb.killf(format_args!("BO{}", "OM"));
    /// assert_eq!(failure.to_string(), "BOOM");
    /// assert_eq!(tomb.err().unwrap_err().to_string(), "BOOM");
    /// ```
    pub fn killf(&self, args: fmt::Arguments<'_>) -> Failure {
        let failure = Failure::msg(args);
        self.kill(Some(TaskError::Failed(failure.clone())));
        failure
    }

    /// Marks the tomb dead without waiting for tracked tasks.
    ///
    /// Equivalent to a clean `kill(None)` followed by forcing the live count to zero. Meant for
    /// the single-task form, where the caller is the only thing the tomb tracks.
    pub fn done(&self) {
        let mut state = self.inner.state.lock();
        self.kill_locked(&mut state, None);
        state.alive = 0;
        if state.phase != Phase::Dead {
            self.bury_locked(&mut state);
        }
    }

    fn kill_locked(&self, state: &mut State, reason: Option<TaskError>) {
        if state.phase == Phase::Dead {
            return;
        }

        match reason {
            Some(TaskError::Dying) => {}
            None => {
                if matches!(state.reason, Reason::StillAlive) {
                    state.reason = Reason::Clean;
                }
            }
            Some(TaskError::Failed(failure)) => match &state.reason {
                Reason::Failed(first) => {
                    debug!(tomb = %self.inner.name, error = %failure, first = %first, "Later failure discarded");
                }
                Reason::StillAlive | Reason::Clean => {
                    warn!(tomb = %self.inner.name, error = %failure, "Failure recorded");
                    state.reason = Reason::Failed(failure);
                }
            },
        }

        if state.phase == Phase::Running {
            state.phase = Phase::Dying;
            info!(tomb = %self.inner.name, alive = state.alive, "Dying");
            self.inner.dying.fire();
        }
    }

    fn bury_locked(&self, state: &mut State) {
        state.phase = Phase::Dead;
        match &state.reason {
            Reason::Failed(failure) => info!(tomb = %self.inner.name, error = %failure, "Dead"),
            _ => info!(tomb = %self.inner.name, "Dead"),
        }
        self.inner.dead.fire();
    }

    // --- Observation ---

    /// Signal fired once the tomb starts dying.
    pub fn dying(&self) -> Signal {
        self.inner.dying.clone()
    }

    /// Signal fired once every tracked task has finished.
    pub fn dead(&self) -> Signal {
        self.inner.dead.clone()
    }

    /// Waits until every tracked task has finished, then returns the reason for their death.
    ///
    /// `Ok(())` means no genuine failure was recorded.
    pub async fn wait(&self) -> Result<(), Failure> {
        self.inner.dead.fired().await;
        self.resolved()
    }

    /// Blocking form of [`Tomb::wait`] for threads outside the async runtime.
    pub fn wait_blocking(&self) -> Result<(), Failure> {
        self.inner.dead.wait_blocking();
        self.resolved()
    }

    fn resolved(&self) -> Result<(), Failure> {
        match &self.inner.state.lock().reason {
            Reason::Failed(failure) => Err(failure.clone()),
            Reason::StillAlive | Reason::Clean => Ok(()),
        }
    }

    /// Returns the reason for the tomb's death, or `TombError::StillAlive` while running.
    /// Never blocks.
    pub fn err(&self) -> Result<(), TombError> {
        match &self.inner.state.lock().reason {
            Reason::StillAlive => Err(TombError::StillAlive),
            Reason::Clean => Ok(()),
            Reason::Failed(failure) => Err(TombError::Failed(failure.clone())),
        }
    }

    /// Returns true until a stop is requested.
    pub fn alive(&self) -> bool {
        matches!(self.err(), Err(TombError::StillAlive))
    }

    pub fn phase(&self) -> Phase {
        self.inner.state.lock().phase
    }

    /// Number of tracked tasks that have not finished yet.
    pub fn live_tasks(&self) -> usize {
        self.inner.state.lock().alive
    }
}

impl fmt::Debug for Tomb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Tomb")
            .field("name", &self.inner.name)
            .field("phase", &state.phase)
            .field("alive", &state.alive)
            .field("reason", &state.reason)
            .finish()
    }
}
