// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation.
//!
//! Every check runs, and all problems are returned together so a broken file
//! can be fixed in one pass. Checks fall into three groups:
//!
//! 1. **Sizing**: buffer, processor and aggregation settings are in range
//! 2. **Adaptive growth**: threshold, growth factor and ceiling are coherent
//! 3. **Pipelines**: one pipeline per event type, and every stage can be built
//!    from its options
//!
//! # Example
//! ```rust
//! use the_sluice::config::{validate_config, Config};
//!
//! let mut config = Config::default();
//! config.buffer.capacity = 0;
//! config.processor.batch_size = 0;
//!
//! let problems = validate_config(&config).unwrap_err();
//! assert_eq!(problems.len(), 2);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::ConfigError;
use crate::stages::{InMemoryReferenceCache, StageFactory};
use crate::traits::ReferenceCache;

/// Validate a configuration, returning every problem found.
pub fn validate_config(cfg: &Config) -> Result<(), Vec<ConfigError>> {
    let mut problems = Vec::new();

    validate_sizing(cfg, &mut problems);
    validate_adaptive(cfg, &mut problems);
    validate_pipelines(cfg, &mut problems);

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

fn validate_sizing(cfg: &Config, problems: &mut Vec<ConfigError>) {
    let positive = [
        ("buffer.capacity", cfg.buffer.capacity as u64),
        ("processor.workers", cfg.processor.workers as u64),
        ("processor.batch_size", cfg.processor.batch_size as u64),
        ("processor.batch_timeout_ms", cfg.processor.batch_timeout_ms),
        ("processor.report_interval_secs", cfg.processor.report_interval_secs),
        ("processor.sink_capacity", cfg.processor.sink_capacity as u64),
        ("aggregation.window_secs", cfg.aggregation.window_secs),
        ("aggregation.max_history", cfg.aggregation.max_history as u64),
    ];

    for (field, value) in positive {
        if value == 0 {
            problems.push(ConfigError::invalid(field, "must be greater than zero"));
        }
    }
}

fn validate_adaptive(cfg: &Config, problems: &mut Vec<ConfigError>) {
    let Some(adaptive) = &cfg.buffer.adaptive else {
        return;
    };

    let threshold = adaptive.get_threshold();
    if !(threshold > 0.0 && threshold <= 1.0) {
        problems.push(ConfigError::invalid(
            "buffer.adaptive.threshold",
            format!("{} is not in (0, 1]", threshold),
        ));
    }

    let growth_factor = adaptive.get_growth_factor();
    if !(growth_factor.is_finite() && growth_factor > 1.0) {
        problems.push(ConfigError::invalid(
            "buffer.adaptive.growth_factor",
            format!("{} must be greater than 1", growth_factor),
        ));
    }

    let max_capacity = adaptive.get_max_capacity();
    if max_capacity < cfg.buffer.capacity {
        problems.push(ConfigError::invalid(
            "buffer.adaptive.max_capacity",
            format!(
                "{} is below the initial capacity {}",
                max_capacity, cfg.buffer.capacity
            ),
        ));
    }
}

fn validate_pipelines(cfg: &Config, problems: &mut Vec<ConfigError>) {
    let probe_cache: Arc<dyn ReferenceCache> = Arc::new(InMemoryReferenceCache::new());
    let mut seen = HashSet::new();

    for pipeline in &cfg.pipelines {
        if !seen.insert(pipeline.event_type) {
            problems.push(ConfigError::invalid(
                "pipelines",
                format!("more than one pipeline for '{}'", pipeline.event_type),
            ));
        }

        for stage in &pipeline.stages {
            if let Err(problem) =
                StageFactory::create_stage(pipeline.event_type, stage, Some(&probe_cache))
            {
                problems.push(problem);
            }
        }
    }
}
