// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod aggregation;  // tumbling windows + summaries
pub mod buffer;       // bounded ingestion buffers
pub mod config;       // config + runtime wiring
pub mod engine;       // stream processor, workers, stats
pub mod errors;       // error handling
pub mod event;        // event model + metrics
pub mod observability;
pub mod stages;       // enrichers, filters, pipelines
pub mod traits;       // stage + cache abstractions
pub mod utils;
