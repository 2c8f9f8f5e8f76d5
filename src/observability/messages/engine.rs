// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for stream processor lifecycle and execution events.
//!
//! This module contains message types for logging events related to:
//! * Processor start and stop
//! * Per-item decode failures inside a worker batch
//! * Sink backpressure
//! * Periodic statistics reports

use crate::engine::StatsReport;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Stream processor launched its workers.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_sluice::observability::messages::engine::ProcessorStarted;
///
/// let msg = ProcessorStarted {
///     worker_count: 4,
///     batch_size: 100,
///     sink_count: 1,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ProcessorStarted {
    pub worker_count: usize,
    pub batch_size: usize,
    pub sink_count: usize,
}

impl Display for ProcessorStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stream processor started: {} workers, batch_size={}, {} sinks",
            self.worker_count, self.batch_size, self.sink_count
        )
    }
}

impl StructuredLog for ProcessorStarted {
    fn log(&self) {
        tracing::info!(
            worker_count = self.worker_count,
            batch_size = self.batch_size,
            sink_count = self.sink_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "processor",
            span_name = name,
            worker_count = self.worker_count,
            batch_size = self.batch_size,
        )
    }
}

/// Stream processor stopped and all workers joined.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ProcessorStopped {
    pub worker_count: usize,
    pub total_events: u64,
    pub uptime: std::time::Duration,
}

impl Display for ProcessorStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stream processor stopped: {} workers processed {} events in {:?}",
            self.worker_count, self.total_events, self.uptime
        )
    }
}

impl StructuredLog for ProcessorStopped {
    fn log(&self) {
        tracing::info!(
            worker_count = self.worker_count,
            total_events = self.total_events,
            uptime_ms = self.uptime.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "processor_stopped",
            span_name = name,
            worker_count = self.worker_count,
            total_events = self.total_events,
        )
    }
}

/// A worker task ended with a panic or was aborted.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct WorkerFailed<'a> {
    pub worker_id: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for WorkerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker {} failed: {}", self.worker_id, self.error)
    }
}

impl StructuredLog for WorkerFailed<'_> {
    fn log(&self) {
        tracing::error!(
            worker_id = self.worker_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "worker_failed",
            span_name = name,
            worker_id = self.worker_id,
        )
    }
}

/// A payload in a batch could not be decoded and was skipped.
///
/// # Log Level
/// `warn!` - Malformed input, recovered locally
///
/// # Example
/// ```
/// use the_sluice::observability::messages::engine::PayloadDecodeFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad json");
/// let msg = PayloadDecodeFailed {
///     worker_id: 2,
///     payload_size: 17,
///     error: &error,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct PayloadDecodeFailed<'a> {
    pub worker_id: usize,
    pub payload_size: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for PayloadDecodeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} skipped malformed payload ({} bytes): {}",
            self.worker_id, self.payload_size, self.error
        )
    }
}

impl StructuredLog for PayloadDecodeFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            worker_id = self.worker_id,
            payload_size = self.payload_size,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "payload_decode_failed",
            span_name = name,
            worker_id = self.worker_id,
            payload_size = self.payload_size,
        )
    }
}

/// A sink was full or closed; the event was dropped for that sink only.
///
/// # Log Level
/// `debug!` - Counted as backpressure
pub struct SinkBackpressure<'a> {
    pub sink: &'a str,
    pub event_id: &'a str,
    pub closed: bool,
}

impl Display for SinkBackpressure<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let state = if self.closed { "closed" } else { "full" };
        write!(
            f,
            "Sink '{}' is {}: dropped event '{}'",
            self.sink, state, self.event_id
        )
    }
}

impl StructuredLog for SinkBackpressure<'_> {
    fn log(&self) {
        tracing::debug!(
            sink = self.sink,
            event_id = self.event_id,
            closed = self.closed,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "sink_backpressure",
            span_name = name,
            sink = self.sink,
        )
    }
}

/// Periodic statistics report: processor counters merged with buffer stats.
///
/// # Log Level
/// `info!` - Operational heartbeat
pub struct StatsReported<'a> {
    pub report: &'a StatsReport,
}

impl Display for StatsReported<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let stream = &self.report.stream;
        let buffer = &self.report.buffer;
        write!(
            f,
            "Stream stats: events={} throughput={:.1}/s errors={} backpressure={} filtered={} | \
             buffer {}/{} ({:.1}%) dropped={} drop_rate={:.3}",
            stream.total_events,
            stream.throughput,
            stream.errors,
            stream.backpressure_drops,
            stream.filtered,
            buffer.current_size,
            buffer.capacity,
            buffer.utilization * 100.0,
            buffer.total_dropped,
            buffer.drop_rate
        )
    }
}

impl StructuredLog for StatsReported<'_> {
    fn log(&self) {
        let stream = &self.report.stream;
        let buffer = &self.report.buffer;
        tracing::info!(
            total_events = stream.total_events,
            throughput = stream.throughput,
            bytes_processed = stream.bytes_processed,
            last_batch_latency_ms = stream.last_batch_latency.as_secs_f64() * 1000.0,
            errors = stream.errors,
            backpressure_drops = stream.backpressure_drops,
            late_events = stream.late_events,
            buffer_size = buffer.current_size,
            buffer_capacity = buffer.capacity,
            buffer_dropped = buffer.total_dropped,
            high_water_mark = buffer.high_water_mark,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "stats_report",
            span_name = name,
            total_events = self.report.stream.total_events,
            buffer_size = self.report.buffer.current_size,
        )
    }
}
