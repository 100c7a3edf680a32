//! Emits numbered items.

use super::Stage;
use crate::error::PipelineError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tomb::{TaskError, TaskResult, Tomb};
use tracing::{debug, info};

/// Sends `1..=count` downstream, then closes its channel.
pub struct Producer {
    count: u64,
    delay: Duration,
    items: mpsc::Sender<u64>,
}

impl Producer {
    pub fn new(count: u64, delay: Duration, items: mpsc::Sender<u64>) -> Self {
        Self {
            count,
            delay,
            items,
        }
    }
}

#[async_trait]
impl Stage for Producer {
    fn name(&self) -> &'static str {
        "producer"
    }

    async fn run(self: Box<Self>, tomb: Tomb) -> TaskResult {
        let dying = tomb.dying();
        for item in 1..=self.count {
            if !self.delay.is_zero() {
                tokio::select! {
                    _ = dying.fired() => return Err(TaskError::Dying),
                    _ = tokio::time::sleep(self.delay) => {}
                }
            }
            tokio::select! {
                _ = dying.fired() => return Err(TaskError::Dying),
                sent = self.items.send(item) => {
                    if sent.is_err() {
                        if !tomb.alive() {
                            return Err(TaskError::Dying);
                        }
                        return Err(PipelineError::ChannelClosed("item").into());
                    }
                    debug!(item, "Produced");
                }
            }
        }
        info!(count = self.count, "Producer done");
        Ok(())
    }
}
