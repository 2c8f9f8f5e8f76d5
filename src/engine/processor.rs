// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::stats::{StatsCollector, StatsReport};
use super::worker::{run_reporter, run_worker, Sink, WorkerContext};
use crate::aggregation::{AggregationEngine, FinalizedAggregate};
use crate::buffer::IngestionBuffer;
use crate::config::consts::{
    DEFAULT_BATCH_SIZE, DEFAULT_BATCH_TIMEOUT_MS, DEFAULT_REPORT_INTERVAL_SECS,
};
use crate::errors::StreamError;
use crate::event::StreamEvent;
use crate::observability::messages::engine::{ProcessorStarted, ProcessorStopped, WorkerFailed};
use crate::observability::messages::StructuredLog;
use crate::stages::PipelineRegistry;

/// Tuning knobs for the worker loop and the stats reporter.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorOptions {
    pub batch_size: usize,
    pub batch_timeout: Duration,
    pub report_interval: Duration,
}

impl ProcessorOptions {
    /// Reject settings that would make workers spin or the reporter panic.
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.batch_size == 0 {
            return Err(StreamError::InvalidBatchSize);
        }
        if self.batch_timeout.is_zero() {
            return Err(StreamError::InvalidBatchTimeout);
        }
        if self.report_interval.is_zero() {
            return Err(StreamError::InvalidReportInterval);
        }
        Ok(())
    }
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_timeout: Duration::from_millis(DEFAULT_BATCH_TIMEOUT_MS),
            report_interval: Duration::from_secs(DEFAULT_REPORT_INTERVAL_SECS),
        }
    }
}

struct RunState {
    token: CancellationToken,
    workers: Vec<JoinHandle<()>>,
    reporter: JoinHandle<()>,
    started_at: Instant,
}

/// Multi-worker consumer of an `IngestionBuffer`.
///
/// Workers are tokio tasks sharing one buffer. Each pulls a batch, runs every
/// payload through decode, its pipeline, the aggregation engine and the
/// sinks, then merges its batch counters into the shared stats. Nothing that
/// happens to a single payload stops a worker.
///
/// Sinks and the aggregation engine must be attached before `start`.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use the_sluice::buffer::IngestionBuffer;
/// use the_sluice::engine::{ProcessorOptions, StreamProcessor};
/// use the_sluice::event::{EventType, StreamEvent};
/// use the_sluice::stages::PipelineRegistry;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let buffer = Arc::new(IngestionBuffer::new(100));
/// let mut processor =
///     StreamProcessor::new(buffer.clone(), PipelineRegistry::new(), ProcessorOptions::default());
/// let mut output = processor.add_sink("out", 10);
///
/// processor.start(2).await?;
/// let event = StreamEvent::new("probe", EventType::SensorData).with_field("value", 1.0);
/// buffer.add(event.to_bytes()?, Duration::from_millis(10)).await;
///
/// let received = output.recv().await.unwrap();
/// assert_eq!(received.id(), event.id());
/// processor.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct StreamProcessor {
    buffer: Arc<IngestionBuffer>,
    pipelines: PipelineRegistry,
    options: ProcessorOptions,
    sinks: Vec<Sink>,
    aggregator: Option<Arc<Mutex<AggregationEngine>>>,
    stats: Arc<StatsCollector>,
    run_state: Mutex<Option<RunState>>,
}

impl StreamProcessor {
    pub fn new(
        buffer: Arc<IngestionBuffer>,
        pipelines: PipelineRegistry,
        options: ProcessorOptions,
    ) -> Self {
        Self {
            buffer,
            pipelines,
            options,
            sinks: Vec::new(),
            aggregator: None,
            stats: Arc::new(StatsCollector::new()),
            run_state: Mutex::new(None),
        }
    }

    pub fn with_aggregator(mut self, engine: AggregationEngine) -> Self {
        self.aggregator = Some(Arc::new(Mutex::new(engine)));
        self
    }

    /// Create a bounded sink and return its receiving end.
    pub fn add_sink(&mut self, name: impl Into<String>, capacity: usize) -> mpsc::Receiver<StreamEvent> {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        self.register_sink(name, sender);
        receiver
    }

    /// Attach an existing channel as a sink.
    pub fn register_sink(&mut self, name: impl Into<String>, sender: mpsc::Sender<StreamEvent>) {
        self.sinks.push(Sink {
            name: name.into(),
            sender,
        });
    }

    pub fn buffer(&self) -> &Arc<IngestionBuffer> {
        &self.buffer
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub async fn is_running(&self) -> bool {
        self.run_state.lock().await.is_some()
    }

    /// Spawn `worker_count` workers plus the stats reporter.
    pub async fn start(&self, worker_count: usize) -> Result<(), StreamError> {
        if worker_count == 0 {
            return Err(StreamError::InvalidWorkerCount);
        }
        self.options.validate()?;

        let mut run_state = self.run_state.lock().await;
        if run_state.is_some() {
            return Err(StreamError::AlreadyRunning);
        }

        let ctx = Arc::new(WorkerContext {
            buffer: Arc::clone(&self.buffer),
            pipelines: self.pipelines.clone(),
            sinks: self.sinks.clone(),
            aggregator: self.aggregator.clone(),
            stats: Arc::clone(&self.stats),
            batch_size: self.options.batch_size,
            batch_timeout: self.options.batch_timeout,
        });
        let token = CancellationToken::new();

        let started = ProcessorStarted {
            worker_count,
            batch_size: self.options.batch_size,
            sink_count: self.sinks.len(),
        };
        // Worker and reporter logs nest under one span per run.
        let span = started.span("stream_processor");

        let workers = (0..worker_count)
            .map(|worker_id| {
                tokio::spawn(
                    run_worker(worker_id, Arc::clone(&ctx), token.clone()).instrument(span.clone()),
                )
            })
            .collect();
        let reporter = tokio::spawn(
            run_reporter(Arc::clone(&ctx), self.options.report_interval, token.clone())
                .instrument(span),
        );

        started.log();

        *run_state = Some(RunState {
            token,
            workers,
            reporter,
            started_at: Instant::now(),
        });
        Ok(())
    }

    /// Signal every worker to finish its current batch, wait for all of them
    /// and the reporter, then finalize the open aggregation window.
    ///
    /// Stopping a processor that is not running is a no-op.
    pub async fn stop(&self) -> Result<(), StreamError> {
        let Some(state) = self.run_state.lock().await.take() else {
            return Ok(());
        };

        state.token.cancel();
        let worker_count = state.workers.len();
        let mut first_failure = None;

        for (worker_id, handle) in state.workers.into_iter().enumerate() {
            if let Err(error) = handle.await {
                WorkerFailed {
                    worker_id,
                    error: &error,
                }
                .log();
                first_failure.get_or_insert_with(|| error.to_string());
            }
        }
        if let Err(error) = state.reporter.await {
            first_failure.get_or_insert_with(|| error.to_string());
        }

        if let Some(aggregator) = &self.aggregator {
            aggregator.lock().await.flush();
        }

        ProcessorStopped {
            worker_count,
            total_events: self.stats.snapshot().await.total_events,
            uptime: state.started_at.elapsed(),
        }
        .log();

        match first_failure {
            Some(reason) => Err(StreamError::WorkerPanicked(reason)),
            None => Ok(()),
        }
    }

    /// Current stream counters merged with buffer stats.
    pub async fn snapshot(&self) -> StatsReport {
        StatsReport::new(self.stats.snapshot().await, self.buffer.stats().await)
    }

    /// Move finalized windows out of the aggregation engine, oldest first.
    pub async fn drain_finalized(&self) -> Vec<FinalizedAggregate> {
        match &self.aggregator {
            Some(aggregator) => aggregator.lock().await.drain_finalized(),
            None => Vec::new(),
        }
    }

    /// Finalize the open window now, without stopping.
    pub async fn flush_window(&self) -> bool {
        match &self.aggregator {
            Some(aggregator) => aggregator.lock().await.flush(),
            None => false,
        }
    }

    pub async fn late_events(&self) -> u64 {
        match &self.aggregator {
            Some(aggregator) => aggregator.lock().await.late_events(),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> StreamProcessor {
        StreamProcessor::new(
            Arc::new(IngestionBuffer::new(8)),
            PipelineRegistry::new(),
            ProcessorOptions {
                batch_timeout: Duration::from_millis(5),
                ..ProcessorOptions::default()
            },
        )
    }

    #[tokio::test]
    async fn zero_workers_is_rejected() {
        let result = processor().start(0).await;
        assert!(matches!(result, Err(StreamError::InvalidWorkerCount)));
    }

    #[tokio::test]
    async fn degenerate_options_are_rejected() {
        let cases = [
            (
                ProcessorOptions {
                    batch_size: 0,
                    ..ProcessorOptions::default()
                },
                "batch size",
            ),
            (
                ProcessorOptions {
                    batch_timeout: Duration::ZERO,
                    ..ProcessorOptions::default()
                },
                "batch timeout",
            ),
            (
                ProcessorOptions {
                    report_interval: Duration::ZERO,
                    ..ProcessorOptions::default()
                },
                "report interval",
            ),
        ];

        for (options, label) in cases {
            let processor =
                StreamProcessor::new(Arc::new(IngestionBuffer::new(8)), PipelineRegistry::new(), options);
            let result = processor.start(1).await;
            match label {
                "batch size" => assert!(matches!(result, Err(StreamError::InvalidBatchSize))),
                "batch timeout" => assert!(matches!(result, Err(StreamError::InvalidBatchTimeout))),
                _ => assert!(matches!(result, Err(StreamError::InvalidReportInterval))),
            }
            assert!(!processor.is_running().await, "{} should not start", label);
        }
    }

    #[test]
    fn run_span_carries_processor_fields() {
        tracing::subscriber::with_default(tracing_subscriber::registry(), || {
            let span = ProcessorStarted {
                worker_count: 2,
                batch_size: 10,
                sink_count: 0,
            }
            .span("stream_processor");

            let metadata = span.metadata().unwrap();
            assert_eq!(metadata.name(), "processor");
            assert!(metadata.fields().field("worker_count").is_some());
            assert!(metadata.fields().field("batch_size").is_some());
        });
    }

    #[test]
    fn default_options_are_valid() {
        assert!(ProcessorOptions::default().validate().is_ok());
    }

    #[tokio::test]
    async fn double_start_is_rejected() {
        let processor = processor();
        processor.start(1).await.unwrap();
        assert!(matches!(
            processor.start(1).await,
            Err(StreamError::AlreadyRunning)
        ));
        processor.stop().await.unwrap();
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_restart_works() {
        let processor = processor();
        processor.stop().await.unwrap();

        processor.start(2).await.unwrap();
        assert!(processor.is_running().await);
        processor.stop().await.unwrap();
        processor.stop().await.unwrap();
        assert!(!processor.is_running().await);

        processor.start(1).await.unwrap();
        processor.stop().await.unwrap();
    }

    #[tokio::test]
    async fn zero_capacity_sink_is_clamped() {
        let mut processor = processor();
        let _receiver = processor.add_sink("tiny", 0);
        assert_eq!(processor.sink_count(), 1);
    }

    #[tokio::test]
    async fn without_aggregator_nothing_is_finalized() {
        let processor = processor();
        assert!(processor.drain_finalized().await.is_empty());
        assert!(!processor.flush_window().await);
        assert_eq!(processor.late_events().await, 0);
    }
}
