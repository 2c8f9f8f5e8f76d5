// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod aggregation;
mod config;
mod stage;
mod stream;

pub use aggregation::AggregationError;
pub use config::ConfigError;
pub use stage::{CacheError, StageError};
pub use stream::StreamError;
