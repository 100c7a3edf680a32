//! # Tomb Sample
//!
//! Runs a pipeline until it finishes or Ctrl-C is pressed.
//!
//! ```bash
//! RUST_LOG=info cargo run -p tomb-sample
//! RUST_LOG=debug cargo run -p tomb-sample   # Every stage and reap
//! ```

use std::time::Duration;
use tomb::tracing::setup_tracing;
use tomb_sample::config::PipelineConfig;
use tomb_sample::lifecycle::PipelineSystem;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = PipelineConfig {
        item_delay: Duration::from_millis(20),
        ..Default::default()
    };
    info!(items = config.items, workers = config.workers, "Starting application");

    let system = PipelineSystem::start(config);
    let dead = system.tomb().dead();

    let result = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            system.shutdown().await
        }
        _ = dead.fired() => system.join().await,
    };

    match result {
        Ok(report) => {
            info!(count = report.count, sum = report.sum, "Application completed successfully");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Application failed");
            Err(e.to_string())
        }
    }
}
