//! Configuration for a pipeline run.

use std::time::Duration;

/// Settings for one [`PipelineSystem`](crate::lifecycle::PipelineSystem) run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Name of the tomb supervising the run, used in log events.
    pub name: String,
    /// Number of items the producer emits (`1..=items`).
    pub items: u64,
    /// Number of worker stages.
    pub workers: usize,
    /// Capacity of the item and result channels.
    pub capacity: usize,
    /// Pause between two produced items.
    pub item_delay: Duration,
    /// Item a worker refuses, failing the whole pipeline.
    pub reject: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: "pipeline".to_string(),
            items: 100,
            workers: 4,
            capacity: 16,
            item_delay: Duration::ZERO,
            reject: None,
        }
    }
}
