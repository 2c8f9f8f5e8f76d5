// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors produced while folding events into time windows.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
    /// The event timestamp lies outside the window it was offered to.
    #[error("Event timestamp {timestamp} is outside window [{window_start}, {window_end})")]
    OutOfWindow {
        timestamp: f64,
        window_start: f64,
        window_end: f64,
    },

    /// The event belongs to a window that has already been finalized.
    #[error("Late event '{event_id}' at {timestamp}: windows before {window_start} are closed")]
    LateEvent {
        event_id: String,
        timestamp: f64,
        window_start: f64,
    },

    /// The event claims a time more than one window past the wall clock.
    #[error("Event '{event_id}' at {timestamp} is ahead of the accepted limit {limit}")]
    FutureEvent {
        event_id: String,
        timestamp: f64,
        limit: f64,
    },

    #[error("Window size must be a positive duration")]
    InvalidWindowSize,
}
