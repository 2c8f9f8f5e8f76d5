// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by the event codec and the stream processor lifecycle.
//!
//! Buffer overload and sink overload are deliberately absent: they are
//! reported through counters, never as errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    /// A payload could not be decoded into a `StreamEvent`.
    #[error("Failed to decode event payload: {0}")]
    Decode(#[source] serde_json::Error),

    /// An event could not be encoded into its wire form.
    #[error("Failed to encode event '{event_id}': {source}")]
    Encode {
        event_id: String,
        #[source]
        source: serde_json::Error,
    },

    /// `start` was called on a processor whose workers are already running.
    #[error("Stream processor is already running")]
    AlreadyRunning,

    /// A processor cannot run without workers.
    #[error("Worker count must be greater than zero")]
    InvalidWorkerCount,

    /// Workers would pull empty batches in a tight loop.
    #[error("Batch size must be greater than zero")]
    InvalidBatchSize,

    /// Workers would poll an empty buffer without ever waiting.
    #[error("Batch timeout must be a positive duration")]
    InvalidBatchTimeout,

    /// The stats reporter needs a positive tick period.
    #[error("Report interval must be a positive duration")]
    InvalidReportInterval,

    /// A worker task ended abnormally.
    #[error("Worker task failed: {0}")]
    WorkerPanicked(String),
}
