// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod processor;
pub mod stats;
mod worker;

#[cfg(test)]
pub mod integration_tests;

pub use processor::{ProcessorOptions, StreamProcessor};
pub use stats::{BatchCounters, StatsReport, StreamStats};
