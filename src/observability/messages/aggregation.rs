// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for windowed aggregation.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A window closed and its statistics were computed.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_sluice::observability::messages::aggregation::WindowFinalized;
///
/// let msg = WindowFinalized {
///     window_start: 60.0,
///     window_end: 120.0,
///     event_count: 250,
///     field_count: 3,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct WindowFinalized {
    pub window_start: f64,
    pub window_end: f64,
    pub event_count: u64,
    pub field_count: usize,
}

impl Display for WindowFinalized {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Window [{}, {}) finalized: {} events, {} numeric fields",
            self.window_start, self.window_end, self.event_count, self.field_count
        )
    }
}

impl StructuredLog for WindowFinalized {
    fn log(&self) {
        tracing::info!(
            window_start = self.window_start,
            window_end = self.window_end,
            event_count = self.event_count,
            field_count = self.field_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "window_finalized",
            span_name = name,
            window_start = self.window_start,
            window_end = self.window_end,
        )
    }
}

/// An event arrived after its window was finalized and was dropped.
///
/// # Log Level
/// `debug!` - Known, accepted inaccuracy; counted as an error
pub struct LateEventDropped<'a> {
    pub event_id: &'a str,
    pub timestamp: f64,
    pub window_start: f64,
}

impl Display for LateEventDropped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dropped late event '{}' at {}: windows before {} are closed",
            self.event_id, self.timestamp, self.window_start
        )
    }
}

impl StructuredLog for LateEventDropped<'_> {
    fn log(&self) {
        tracing::debug!(
            event_id = self.event_id,
            timestamp = self.timestamp,
            window_start = self.window_start,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "late_event",
            span_name = name,
            event_id = self.event_id,
        )
    }
}

/// An event stamped too far in the future was rejected before it could
/// close the open window.
///
/// # Log Level
/// `warn!` - Usually a producer with a skewed clock
pub struct FutureEventRejected<'a> {
    pub event_id: &'a str,
    pub timestamp: f64,
    pub limit: f64,
}

impl Display for FutureEventRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rejected event '{}' at {}: beyond the accepted limit {}",
            self.event_id, self.timestamp, self.limit
        )
    }
}

impl StructuredLog for FutureEventRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            event_id = self.event_id,
            timestamp = self.timestamp,
            limit = self.limit,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("future_event", span_name = name, event_id = self.event_id)
    }
}

/// Finalized history exceeded its bound; oldest windows were discarded.
///
/// # Log Level
/// `warn!` - The reporting collaborator is not draining fast enough
pub struct HistoryTrimmed {
    pub discarded: usize,
    pub max_history: usize,
}

impl Display for HistoryTrimmed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Discarded {} undrained finalized window(s), history bound is {}",
            self.discarded, self.max_history
        )
    }
}

impl StructuredLog for HistoryTrimmed {
    fn log(&self) {
        tracing::warn!(
            discarded = self.discarded,
            max_history = self.max_history,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("history_trimmed", span_name = name, discarded = self.discarded)
    }
}
