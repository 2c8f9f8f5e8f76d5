// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default ingestion buffer capacity (items)
pub const DEFAULT_BUFFER_CAPACITY: usize = 1_000;

/// Utilization above which an adaptive buffer grows
pub const DEFAULT_RESIZE_THRESHOLD: f64 = 0.9;
/// Hard ceiling for adaptive growth (items)
pub const DEFAULT_MAX_CAPACITY: usize = 10_000;
/// Capacity multiplier applied on each resize
pub const DEFAULT_GROWTH_FACTOR: f64 = 1.5;
/// Minimum time between two resizes
pub const DEFAULT_RESIZE_COOLDOWN_SECS: u64 = 60;

/// Default number of stream processor workers
pub const DEFAULT_WORKER_COUNT: usize = 4;
/// Maximum items a worker pulls per batch
pub const DEFAULT_BATCH_SIZE: usize = 100;
/// How long a worker waits for the first item of a batch
pub const DEFAULT_BATCH_TIMEOUT_MS: u64 = 100;
/// Period of the stats reporter
pub const DEFAULT_REPORT_INTERVAL_SECS: u64 = 5;
/// Bounded capacity of sink channels created from configuration
pub const DEFAULT_SINK_CAPACITY: usize = 1_000;
/// Timeout used by producers when offering one item to the buffer
pub const DEFAULT_ADD_TIMEOUT_MS: u64 = 10;

/// Default aggregation window length
pub const DEFAULT_WINDOW_SECS: u64 = 60;
/// Finalized windows retained until drained
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Metadata key written by the timestamp enricher
pub const PROCESSED_AT_KEY: &str = "processed_at";
