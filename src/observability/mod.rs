// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging throughout the engine. Message types follow a struct-based pattern
//! with `Display` trait implementation to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Keep structured fields and human-readable text in one place
//! * Provide consistent, structured logging output
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::buffer` - Ingestion buffer drops and adaptive resizing
//! * `messages::stage` - Pipeline stage failures and enrichment degradation
//! * `messages::engine` - Stream processor lifecycle, workers and stats reports
//! * `messages::aggregation` - Window finalization and late events
//! * `messages::config` - Configuration loading and validation
//!
//! # Usage
//!
//! ```rust
//! use the_sluice::observability::messages::StructuredLog;
//! use the_sluice::observability::messages::buffer::BufferResized;
//!
//! let msg = BufferResized {
//!     old_capacity: 100,
//!     new_capacity: 150,
//!     utilization: 0.91,
//! };
//!
//! msg.log();
//! ```

pub mod messages;
