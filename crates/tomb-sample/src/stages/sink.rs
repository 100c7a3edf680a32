//! Collects results.

use super::Stage;
use crate::error::PipelineError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tomb::{TaskError, TaskResult, Tomb};
use tracing::{info, warn};

/// Running totals kept by the sink, readable while the pipeline runs.
#[derive(Debug, Default)]
pub struct Totals {
    count: AtomicU64,
    sum: AtomicU64,
}

impl Totals {
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::SeqCst)
    }

    /// Adds one result. Leaves the totals unchanged and returns false if the sum would overflow.
    fn add(&self, value: u64) -> bool {
        let added = self
            .sum
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |sum| sum.checked_add(value))
            .is_ok();
        if added {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
        added
    }
}

/// Adds up every result until all workers are gone.
pub struct Sink {
    results: mpsc::Receiver<u64>,
    totals: Arc<Totals>,
}

impl Sink {
    pub fn new(results: mpsc::Receiver<u64>, totals: Arc<Totals>) -> Self {
        Self { results, totals }
    }
}

#[async_trait]
impl Stage for Sink {
    fn name(&self) -> &'static str {
        "sink"
    }

    async fn run(self: Box<Self>, tomb: Tomb) -> TaskResult {
        let Sink {
            mut results,
            totals,
        } = *self;
        let dying = tomb.dying();
        loop {
            tokio::select! {
                _ = dying.fired() => return Err(TaskError::Dying),
                result = results.recv() => match result {
                    Some(value) => {
                        if !totals.add(value) {
                            warn!(value, sum = totals.sum(), "Result sum overflows");
                            return Err(PipelineError::SumOverflow.into());
                        }
                    }
                    None => break,
                },
            }
        }
        info!(count = totals.count(), sum = totals.sum(), "Sink drained");
        Ok(())
    }
}
