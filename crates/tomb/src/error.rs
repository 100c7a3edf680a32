//! # Tomb Errors
//!
//! This module defines the reason vocabulary shared by the tomb and the tasks it tracks.
//!
//! - [`Failure`] is a genuine failure cause. It is cheap to clone so the same cause can be
//!   handed to every caller of [`Tomb::wait`](crate::Tomb::wait).
//! - [`TaskError`] is what a tracked task (or a caller of [`Tomb::kill`](crate::Tomb::kill))
//!   reports. Besides a real failure it carries the [`TaskError::Dying`] acknowledgement,
//!   meaning "I am exiting because I was told to".
//! - [`TombError`] is what [`Tomb::err`](crate::Tomb::err) reports. Besides a real failure it
//!   carries the [`TombError::StillAlive`] marker.
//!
//! Keeping the two sentinels in separate enums means a caller can never kill a tomb with
//! "still alive", and the tomb can never report "dying" as a reason.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Result type returned by every tracked task.
///
/// `Ok(())` is a clean exit.
pub type TaskResult = Result<(), TaskError>;

/// A genuine failure cause recorded by a tomb.
///
/// Wraps any `std::error::Error` behind an `Arc`, so cloning never clones the error itself.
#[derive(Clone)]
pub struct Failure(Arc<dyn Error + Send + Sync + 'static>);

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Message(String);

impl Failure {
    /// Wraps an existing error.
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self(Arc::new(error))
    }

    /// Builds a failure from anything printable.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::new(Message(message.to_string()))
    }

    /// Returns true if both failures wrap the very same error value.
    pub fn ptr_eq(&self, other: &Failure) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Attempts to downcast the wrapped error to a concrete type.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl Error for Failure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Failure::msg(message)
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Failure::msg(message)
    }
}

/// Errors a tracked task may finish with.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TaskError {
    /// The task is exiting because the tomb is already dying.
    ///
    /// Never recorded as the tomb's reason. Reporting it while the tomb is still alive is a
    /// programming error and panics.
    #[error("tomb: dying")]
    Dying,
    /// A genuine failure. The first one recorded wins.
    #[error(transparent)]
    Failed(#[from] Failure),
}

impl TaskError {
    /// Shorthand for `TaskError::Failed(Failure::msg(message))`.
    pub fn msg(message: impl fmt::Display) -> Self {
        TaskError::Failed(Failure::msg(message))
    }
}

/// Reason reported by [`Tomb::err`](crate::Tomb::err).
#[derive(Debug, Clone, thiserror::Error)]
pub enum TombError {
    /// No stop has been requested yet.
    #[error("tomb: still alive")]
    StillAlive,
    #[error(transparent)]
    Failed(#[from] Failure),
}

impl TombError {
    pub fn is_still_alive(&self) -> bool {
        matches!(self, TombError::StillAlive)
    }
}
