//! # Tomb Sample App Library
//!
//! A small number-crunching pipeline supervised by a single [`tomb::Tomb`]:
//!
//! ```text
//! Producer ──items──► Worker × N ──squares──► Sink
//! ```
//!
//! - **[config]**: [`PipelineConfig`](config::PipelineConfig), the knobs of a run.
//! - **[stages]**: The [`Stage`](stages::Stage) trait and the three stage types.
//! - **[lifecycle]**: [`PipelineSystem`](lifecycle::PipelineSystem), which wires and supervises the stages.
//!
//! This library exposes the modules for integration testing.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod stages;
