// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! `StructuredLog` to emit the same event with typed fields at the level the
//! message belongs to.
//!
//! # Organization
//!
//! * `buffer` - Ingestion buffer drops and adaptive resizing
//! * `stage` - Pipeline stage failures and enrichment degradation
//! * `engine` - Stream processor lifecycle, workers and stats reports
//! * `aggregation` - Window finalization and late events
//! * `config` - Configuration loading and validation
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_sluice::observability::messages::StructuredLog;
//! use the_sluice::observability::messages::engine::ProcessorStarted;
//!
//! let msg = ProcessorStarted {
//!     worker_count: 4,
//!     batch_size: 100,
//!     sink_count: 2,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod aggregation;
pub mod buffer;
pub mod config;
pub mod engine;
pub mod stage;

/// A message that knows its own level and structured fields.
pub trait StructuredLog: std::fmt::Display {
    /// Emit the message as a tracing event.
    fn log(&self);

    /// Open a span carrying the message fields.
    fn span(&self, name: &str) -> Span;
}
