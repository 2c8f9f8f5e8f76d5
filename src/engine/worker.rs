// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker and reporter task bodies.
//!
//! Every failure inside a batch is local to one payload: it is counted and
//! logged, and the worker moves on to the next payload.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::stats::{BatchCounters, StatsCollector, StatsReport};
use crate::aggregation::AggregationEngine;
use crate::buffer::IngestionBuffer;
use crate::errors::AggregationError;
use crate::event::{unix_now, StreamEvent};
use crate::observability::messages::engine::{PayloadDecodeFailed, SinkBackpressure, StatsReported};
use crate::observability::messages::StructuredLog;
use crate::stages::{PipelineOutcome, PipelineRegistry};

/// A named, bounded downstream queue.
#[derive(Debug, Clone)]
pub(crate) struct Sink {
    pub(crate) name: String,
    pub(crate) sender: mpsc::Sender<StreamEvent>,
}

/// Everything a worker needs, shared across all workers of one run.
pub(crate) struct WorkerContext {
    pub(crate) buffer: Arc<IngestionBuffer>,
    pub(crate) pipelines: PipelineRegistry,
    pub(crate) sinks: Vec<Sink>,
    pub(crate) aggregator: Option<Arc<Mutex<AggregationEngine>>>,
    pub(crate) stats: Arc<StatsCollector>,
    pub(crate) batch_size: usize,
    pub(crate) batch_timeout: Duration,
}

impl WorkerContext {
    pub(crate) async fn report(&self) -> StatsReport {
        StatsReport::new(self.stats.snapshot().await, self.buffer.stats().await)
    }

    /// Decode, run pipelines, fold into the open window and fan out to sinks.
    pub(crate) async fn process_batch(&self, worker_id: usize, batch: Vec<Vec<u8>>) -> BatchCounters {
        let started = Instant::now();
        let mut counters = BatchCounters::default();
        let mut passed = Vec::with_capacity(batch.len());

        for payload in batch {
            counters.events += 1;
            counters.bytes += payload.len() as u64;

            let event = match StreamEvent::from_bytes(&payload) {
                Ok(event) => event,
                Err(error) => {
                    counters.errors += 1;
                    PayloadDecodeFailed {
                        worker_id,
                        payload_size: payload.len(),
                        error: &error,
                    }
                    .log();
                    continue;
                }
            };

            match self.pipelines.run(event).await {
                PipelineOutcome::Passed(event) => passed.push(event),
                PipelineOutcome::Dropped { .. } => counters.filtered += 1,
                PipelineOutcome::Failed { .. } => counters.errors += 1,
            }
        }

        counters.passed = passed.len() as u64;
        self.aggregate(&passed, &mut counters).await;
        self.fan_out(passed, &mut counters);

        counters.latency = started.elapsed();
        counters
    }

    async fn aggregate(&self, events: &[StreamEvent], counters: &mut BatchCounters) {
        let Some(aggregator) = &self.aggregator else {
            return;
        };
        if events.is_empty() {
            return;
        }

        let mut engine = aggregator.lock().await;
        for event in events {
            match engine.add_event(event) {
                Ok(()) => {}
                Err(AggregationError::LateEvent { .. }) => {
                    counters.errors += 1;
                    counters.late_events += 1;
                }
                Err(_) => counters.errors += 1,
            }
        }
    }

    /// Non-blocking: a full or closed sink drops the event for that sink only.
    fn fan_out(&self, events: Vec<StreamEvent>, counters: &mut BatchCounters) {
        for event in events {
            for sink in &self.sinks {
                if let Err(error) = sink.sender.try_send(event.clone()) {
                    counters.backpressure_drops += 1;
                    SinkBackpressure {
                        sink: &sink.name,
                        event_id: event.id(),
                        closed: matches!(error, mpsc::error::TrySendError::Closed(_)),
                    }
                    .log();
                }
            }
        }
    }
}

/// Pull batches until cancelled. Cancellation is observed between batches;
/// a batch already pulled is always processed to the end.
pub(crate) async fn run_worker(worker_id: usize, ctx: Arc<WorkerContext>, token: CancellationToken) {
    loop {
        let batch = tokio::select! {
            _ = token.cancelled() => break,
            batch = ctx.buffer.get_batch(ctx.batch_size, ctx.batch_timeout) => batch,
        };
        if batch.is_empty() {
            continue;
        }

        let counters = ctx.process_batch(worker_id, batch).await;
        ctx.stats.merge(&counters).await;
    }
}

/// Periodically log the merged stats and close windows that ended by wall clock.
pub(crate) async fn run_reporter(ctx: Arc<WorkerContext>, interval: Duration, token: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                let report = ctx.report().await;
                StatsReported { report: &report }.log();

                if let Some(aggregator) = &ctx.aggregator {
                    aggregator.lock().await.close_expired(unix_now());
                }
            }
        }
    }
}
