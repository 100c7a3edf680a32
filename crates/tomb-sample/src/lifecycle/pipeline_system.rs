use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::stages::{Producer, Sink, Stage, Totals, Worker};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tomb::Tomb;
use tracing::{debug, error, info};

/// Outcome of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineReport {
    /// Number of results the sink received.
    pub count: u64,
    /// Sum of those results.
    pub sum: u64,
}

/// The runtime orchestrator for a pipeline.
///
/// `PipelineSystem` is responsible for:
/// - **Wiring**: Creating the item and result channels and handing their ends to the stages
/// - **Supervision**: Registering every stage with one [`Tomb`], in a single batch
/// - **Shutdown**: Stopping the stages and reporting the single reason the run ended
///
/// # Example
///
/// ```rust
/// use tomb_sample::config::PipelineConfig;
/// use tomb_sample::lifecycle::PipelineSystem;
///
/// #[tokio::main]
/// async fn main() {
///     let config = PipelineConfig { items: 10, ..Default::default() };
///     let system = PipelineSystem::start(config);
///
///     let report = system.join().await.unwrap();
///     assert_eq!(report.count, 10);
///     assert_eq!(report.sum, 385);
/// }
/// ```
pub struct PipelineSystem {
    tomb: Tomb,
    totals: Arc<Totals>,
}

impl PipelineSystem {
    /// Wires the stages described by `config` and starts them.
    ///
    /// The producer, the workers and the sink are registered together, so none of them can
    /// finish before the others are tracked.
    pub fn start(config: PipelineConfig) -> Self {
        let tomb = Tomb::builder().name(config.name.clone()).build();
        let capacity = config.capacity.max(1);

        let (item_tx, item_rx) = mpsc::channel(capacity);
        let (result_tx, result_rx) = mpsc::channel(capacity);
        let items = Arc::new(Mutex::new(item_rx));
        let totals = Arc::new(Totals::default());

        let mut stages: Vec<Box<dyn Stage>> = Vec::with_capacity(config.workers + 2);
        stages.push(Box::new(Producer::new(config.items, config.item_delay, item_tx)));
        for id in 0..config.workers {
            stages.push(Box::new(Worker::new(
                id,
                config.reject,
                items.clone(),
                result_tx.clone(),
            )));
        }
        // The sink ends once every worker has dropped its sender.
        drop(result_tx);
        stages.push(Box::new(Sink::new(result_rx, totals.clone())));

        info!(pipeline = %config.name, stages = stages.len(), items = config.items, "Starting pipeline");
        let runs = stages.into_iter().map(|stage| {
            let tomb = tomb.clone();
            async move {
                let name = stage.name();
                let result = stage.run(tomb).await;
                debug!(stage = name, ok = result.is_ok(), "Stage finished");
                result
            }
        });
        tomb.go_all(runs);

        Self { tomb, totals }
    }

    /// The tomb supervising this run.
    pub fn tomb(&self) -> &Tomb {
        &self.tomb
    }

    /// Totals collected so far.
    pub fn report(&self) -> PipelineReport {
        PipelineReport {
            count: self.totals.count(),
            sum: self.totals.sum(),
        }
    }

    /// Waits for every stage to finish on its own.
    ///
    /// # Returns
    ///
    /// - `Ok(report)` if no stage failed
    /// - `Err(PipelineError)` with the first failure otherwise
    pub async fn join(self) -> Result<PipelineReport, PipelineError> {
        match self.tomb.wait().await {
            Ok(()) => {
                let report = self.report();
                info!(count = report.count, sum = report.sum, "Pipeline finished");
                Ok(report)
            }
            Err(failure) => {
                error!(error = %failure, "Pipeline failed");
                Err(failure.into())
            }
        }
    }

    /// Stops every stage and waits for them.
    ///
    /// A clean stop: returns the partial report unless a stage had already failed.
    pub async fn shutdown(self) -> Result<PipelineReport, PipelineError> {
        info!("Shutting down pipeline...");
        self.tomb.kill(None);
        self.join().await
    }
}
