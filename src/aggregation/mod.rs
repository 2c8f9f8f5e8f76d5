// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Windowed aggregation of numeric event fields.
//!
//! * `WindowedAggregate` - an open window collecting raw values
//! * `FinalizedAggregate` - read-only statistics of a closed window
//! * `AggregationEngine` - routes events to tumbling windows and keeps the
//!   finalized ones until they are drained

mod engine;
mod stats;
mod window;

pub use engine::AggregationEngine;
pub use stats::{percentile, population_std_dev, FieldStats, FieldSummary};
pub use window::{window_bounds, FinalizedAggregate, WindowedAggregate};
