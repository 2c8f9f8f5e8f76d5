// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for ingestion buffer events.
//!
//! This module contains message types for logging events related to:
//! * Items rejected because the buffer stayed full
//! * Adaptive capacity growth
//! * Growth skipped at the configured ceiling

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Adaptive buffer grew its capacity.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_sluice::observability::messages::buffer::BufferResized;
///
/// let msg = BufferResized {
///     old_capacity: 100,
///     new_capacity: 150,
///     utilization: 0.91,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct BufferResized {
    pub old_capacity: usize,
    pub new_capacity: usize,
    pub utilization: f64,
}

impl Display for BufferResized {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ingestion buffer resized from {} to {} (utilization {:.1}%)",
            self.old_capacity,
            self.new_capacity,
            self.utilization * 100.0
        )
    }
}

impl StructuredLog for BufferResized {
    fn log(&self) {
        tracing::info!(
            old_capacity = self.old_capacity,
            new_capacity = self.new_capacity,
            utilization = self.utilization,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "buffer_resized",
            span_name = name,
            old_capacity = self.old_capacity,
            new_capacity = self.new_capacity,
        )
    }
}

/// Adaptive growth wanted but the buffer is already at its ceiling.
///
/// # Log Level
/// `debug!` - Degradation signal, surfaced to operators through drop rate
pub struct ResizeSkippedAtCeiling {
    pub capacity: usize,
    pub max_capacity: usize,
    pub utilization: f64,
}

impl Display for ResizeSkippedAtCeiling {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ingestion buffer at {:.1}% but capacity {} already at ceiling {}",
            self.utilization * 100.0,
            self.capacity,
            self.max_capacity
        )
    }
}

impl StructuredLog for ResizeSkippedAtCeiling {
    fn log(&self) {
        tracing::debug!(
            capacity = self.capacity,
            max_capacity = self.max_capacity,
            utilization = self.utilization,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "resize_skipped",
            span_name = name,
            capacity = self.capacity,
            max_capacity = self.max_capacity,
        )
    }
}

/// Items were rejected because no space became available in time.
///
/// # Log Level
/// `debug!` - Expected under load; the drop counter is the real signal
///
/// # Example
/// ```
/// use the_sluice::observability::messages::buffer::ItemsDropped;
///
/// let msg = ItemsDropped {
///     dropped: 5,
///     capacity: 10,
///     total_dropped: 5,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct ItemsDropped {
    pub dropped: usize,
    pub capacity: usize,
    pub total_dropped: u64,
}

impl Display for ItemsDropped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ingestion buffer full (capacity {}): dropped {} item(s), {} dropped in total",
            self.capacity, self.dropped, self.total_dropped
        )
    }
}

impl StructuredLog for ItemsDropped {
    fn log(&self) {
        tracing::debug!(
            dropped = self.dropped,
            capacity = self.capacity,
            total_dropped = self.total_dropped,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "items_dropped",
            span_name = name,
            dropped = self.dropped,
            capacity = self.capacity,
        )
    }
}
