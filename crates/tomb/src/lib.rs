//! # Tomb
//!
//! This crate tracks the lifecycle of a group of cooperating tokio tasks as **running**,
//! **dying** or **dead**, and records the reason for their death.
//!
//! ## Why a Tomb?
//!
//! Shutting down a set of tasks cleanly needs three things:
//!
//! 1. **One stop signal** every task can watch ([`Tomb::dying`])
//! 2. **One join point** that only opens once every task is actually gone ([`Tomb::wait`])
//! 3. **One authoritative reason**, even when several tasks fail at the same time
//!
//! A [`Tomb`] provides all three. It does not schedule, prioritise or retry anything; it
//! publishes intent and aggregates outcomes.
//!
//! ## Core Abstractions
//!
//! - [`Tomb`] - The shared tracker. Cheap to clone; every clone is the same tomb.
//! - [`Signal`] - A fire-once broadcast event, awaitable or blockable, for `dying` and `dead`.
//! - [`TaskError`] - What a task fails with: a genuine [`Failure`] or the [`TaskError::Dying`]
//!   acknowledgement.
//! - [`TombError`] - What [`Tomb::err`] reports: a genuine failure or
//!   [`TombError::StillAlive`].
//!
//! ## Lifecycle
//!
//! ```rust
//! use std::time::Duration;
//! use tomb::{Signal, TaskError, TaskResult, Tomb};
//!
//! async fn ticker(dying: Signal) -> TaskResult {
//!     loop {
//!         tokio::select! {
//!             _ = dying.fired() => return Err(TaskError::Dying),
//!             _ = tokio::time::sleep(Duration::from_millis(10)) => {}
//!         }
//!     }
//! }
//!
//! async fn writer() -> TaskResult {
//!     Err(TaskError::msg("disk full"))
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let tomb = Tomb::builder().name("workers").build();
//!
//!     // Two tasks that run until told to stop, and one that fails outright.
//!     tomb.go_all([ticker(tomb.dying()), ticker(tomb.dying())]);
//!     tomb.go(writer());
//!
//!     // The first genuine failure wins; the acknowledgements don't hide it.
//!     let reason = tomb.wait().await;
//!     assert_eq!(reason.unwrap_err().to_string(), "disk full");
//!     assert!(!tomb.alive());
//! }
//! ```
//!
//! ## Reasons
//!
//! - `kill(None)` is a clean stop. It resolves to `Ok(())` unless a genuine failure is
//!   recorded before or after it.
//! - `kill(Some(TaskError::Failed(_)))` records the failure if none was recorded yet.
//! - `kill(Some(TaskError::Dying))` only acknowledges a stop. Calling it while the tomb is
//!   still alive panics, as does a task returning it while the tomb is still alive.
//!
//! ## Concurrency Model
//!
//! - All methods are safe to call concurrently from any task or thread
//! - State updates happen under a single lock that is never held across an `.await`
//! - Tasks registered after the tomb is dead are dropped without running
//! - The tomb never forces a task to stop; tasks are expected to watch [`Tomb::dying`]
//!
//! Timeouts are left to the caller, e.g. `tokio::time::timeout(d, tomb.wait())`.

pub mod builder;
pub mod error;
pub mod signal;
mod task;
pub mod tomb;
pub mod tracing;

// Re-export core types for convenience
pub use builder::TombBuilder;
pub use error::{Failure, TaskError, TaskResult, TombError};
pub use signal::Signal;
pub use tomb::{Phase, Tomb};
