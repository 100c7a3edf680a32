//! # Pipeline Lifecycle & Orchestration
//!
//! This module starts, supervises and stops a pipeline run.
//!
//! ## The Supervision Pattern
//!
//! Every stage is a tracked task of one [`Tomb`](tomb::Tomb):
//!
//! ```text
//! PipelineSystem::start ──go_all──► Producer, Worker × N, Sink
//!                                        │
//!          first failure / kill(None) ───┼──► dying() fires ──► every stage returns
//!                                        │
//!          last stage finished ──────────┴──► dead() fires ──► join() returns
//! ```
//!
//! ## Graceful Shutdown
//!
//! 1. **Kill** - [`PipelineSystem::shutdown`] calls `kill(None)`, a clean stop
//! 2. **Stages notice** - each stage selects on `dying()` and returns `Err(TaskError::Dying)`
//! 3. **Await completion** - the tomb dies once the last stage is reaped
//!
//! A run that ends by itself (the producer runs out of items) needs no kill: the channels
//! close stage by stage and the sink, last out, kills the tomb cleanly.
//!
//! ## Failures
//!
//! A worker that rejects an item returns [`PipelineError::Rejected`](crate::error::PipelineError).
//! The tomb records it, fires `dying`, and every other stage stops. [`PipelineSystem::join`]
//! reports the rejection even though the other stages only acknowledged the stop.

pub mod pipeline_system;

pub use pipeline_system::*;
