//! # Observability & Tracing
//!
//! The tomb logs through the `tracing` crate. Every event carries a `tomb` field holding the
//! tomb's name, so several tombs in one process can be told apart.
//!
//! ## What Gets Traced
//!
//! - **Registration**: `debug` when tasks are registered or dropped because the tomb is dead
//! - **Reaping**: `debug` for every finished task with the remaining live count
//! - **Failures**: `warn` when a genuine failure is recorded or a task is abandoned
//! - **Transitions**: `info` when the tomb starts dying and when it is dead
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run      # Transitions only
//! RUST_LOG=tomb=debug cargo run # Every registration and reap
//! ```
//!
//! Example output with `RUST_LOG=info`:
//!
//! ```text
//! WARN Failure recorded tomb="pipeline" error=item 7 rejected
//! INFO Dying tomb="pipeline" alive=3
//! INFO Dead tomb="pipeline" error=item 7 rejected
//! ```

/// Initializes a compact `tracing` subscriber filtered by `RUST_LOG`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
