// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::buffer::BufferStats;
use crate::event::{unix_now, Metric};

/// Throughput is recomputed once per interval of this length.
const THROUGHPUT_INTERVAL: Duration = Duration::from_secs(1);

/// Process-wide stream counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StreamStats {
    /// Payloads pulled from the buffer, decodable or not.
    pub total_events: u64,
    /// Events per second over the last measurement interval.
    pub throughput: f64,
    pub bytes_processed: u64,
    pub last_batch_latency: Duration,
    pub errors: u64,
    pub backpressure_drops: u64,
    pub filtered: u64,
    pub late_events: u64,
    /// Events that made it through their pipeline.
    pub passed: u64,
    pub batches: u64,
}

/// Counters of one batch, accumulated locally by a worker and merged once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchCounters {
    pub events: u64,
    pub bytes: u64,
    pub errors: u64,
    pub backpressure_drops: u64,
    pub filtered: u64,
    pub late_events: u64,
    pub passed: u64,
    pub latency: Duration,
}

struct CollectorState {
    totals: StreamStats,
    interval_started: Instant,
    interval_events: u64,
}

/// Shared `StreamStats` behind a single lock.
pub(crate) struct StatsCollector {
    state: Mutex<CollectorState>,
}

impl StatsCollector {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(CollectorState {
                totals: StreamStats::default(),
                interval_started: Instant::now(),
                interval_events: 0,
            }),
        }
    }

    pub(crate) async fn merge(&self, batch: &BatchCounters) {
        let mut state = self.state.lock().await;
        let totals = &mut state.totals;
        totals.total_events += batch.events;
        totals.bytes_processed += batch.bytes;
        totals.errors += batch.errors;
        totals.backpressure_drops += batch.backpressure_drops;
        totals.filtered += batch.filtered;
        totals.late_events += batch.late_events;
        totals.passed += batch.passed;
        totals.last_batch_latency = batch.latency;
        totals.batches += 1;

        state.interval_events += batch.events;
        let elapsed = state.interval_started.elapsed();
        if elapsed >= THROUGHPUT_INTERVAL {
            state.totals.throughput = state.interval_events as f64 / elapsed.as_secs_f64();
            state.interval_started = Instant::now();
            state.interval_events = 0;
        }
    }

    pub(crate) async fn snapshot(&self) -> StreamStats {
        let state = self.state.lock().await;
        let mut stats = state.totals.clone();
        let elapsed = state.interval_started.elapsed();
        if elapsed >= THROUGHPUT_INTERVAL {
            // No merge closed the interval; whatever arrived since is the rate.
            stats.throughput = state.interval_events as f64 / elapsed.as_secs_f64();
        } else if stats.throughput == 0.0 && state.interval_events > 0 && !elapsed.is_zero() {
            // Before the first full interval, report the partial rate.
            stats.throughput = state.interval_events as f64 / elapsed.as_secs_f64();
        }
        stats
    }
}

/// Stream counters merged with the buffer's view, as reported periodically
/// and returned by `StreamProcessor::snapshot`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub stream: StreamStats,
    pub buffer: BufferStats,
    pub timestamp: f64,
}

impl StatsReport {
    pub fn new(stream: StreamStats, buffer: BufferStats) -> Self {
        Self {
            stream,
            buffer,
            timestamp: unix_now(),
        }
    }

    /// Flatten the report into point metrics for an external exporter.
    pub fn to_metrics(&self) -> Vec<Metric> {
        let stream = &self.stream;
        let buffer = &self.buffer;
        let stream_values = [
            ("stream_total_events", stream.total_events as f64),
            ("stream_throughput", stream.throughput),
            ("stream_bytes_processed", stream.bytes_processed as f64),
            (
                "stream_last_batch_latency_ms",
                stream.last_batch_latency.as_secs_f64() * 1000.0,
            ),
            ("stream_errors", stream.errors as f64),
            ("stream_backpressure_drops", stream.backpressure_drops as f64),
            ("stream_filtered", stream.filtered as f64),
            ("stream_late_events", stream.late_events as f64),
            ("stream_passed", stream.passed as f64),
        ];
        let buffer_values = [
            ("buffer_size", buffer.current_size as f64),
            ("buffer_capacity", buffer.capacity as f64),
            ("buffer_utilization", buffer.utilization),
            ("buffer_total_dropped", buffer.total_dropped as f64),
            ("buffer_drop_rate", buffer.drop_rate),
            ("buffer_high_water_mark", buffer.high_water_mark as f64),
            ("buffer_resize_count", buffer.resize_count as f64),
        ];

        stream_values
            .into_iter()
            .map(|entry| ("stream", entry))
            .chain(buffer_values.into_iter().map(|entry| ("buffer", entry)))
            .map(|(component, (name, value))| {
                Metric::new(name, value)
                    .with_tag("component", component)
                    .with_timestamp(self.timestamp)
            })
            .collect()
    }
}
