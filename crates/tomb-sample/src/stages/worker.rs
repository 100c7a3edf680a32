//! Squares items.

use super::Stage;
use crate::error::PipelineError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tomb::{TaskError, TaskResult, Tomb};
use tracing::{debug, warn};

/// Shared receiving end of the item channel; workers take turns pulling from it.
pub type SharedItems = Arc<Mutex<mpsc::Receiver<u64>>>;

/// Pulls items, squares them and forwards the result.
pub struct Worker {
    id: usize,
    reject: Option<u64>,
    items: SharedItems,
    results: mpsc::Sender<u64>,
}

impl Worker {
    pub fn new(
        id: usize,
        reject: Option<u64>,
        items: SharedItems,
        results: mpsc::Sender<u64>,
    ) -> Self {
        Self {
            id,
            reject,
            items,
            results,
        }
    }
}

#[async_trait]
impl Stage for Worker {
    fn name(&self) -> &'static str {
        "worker"
    }

    async fn run(self: Box<Self>, tomb: Tomb) -> TaskResult {
        let dying = tomb.dying();
        loop {
            let next = async { self.items.lock().await.recv().await };
            let item = tokio::select! {
                _ = dying.fired() => return Err(TaskError::Dying),
                item = next => item,
            };

            let Some(item) = item else {
                debug!(worker = self.id, "Input exhausted");
                return Ok(());
            };

            if self.reject == Some(item) {
                warn!(worker = self.id, item, "Rejecting item");
                return Err(PipelineError::Rejected(item).into());
            }

            let Some(square) = item.checked_mul(item) else {
                warn!(worker = self.id, item, "Square overflows");
                return Err(PipelineError::Overflow(item).into());
            };

            if self.results.send(square).await.is_err() {
                if !tomb.alive() {
                    return Err(TaskError::Dying);
                }
                return Err(PipelineError::ChannelClosed("result").into());
            }
        }
    }
}
