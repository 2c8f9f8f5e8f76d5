// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use crate::aggregation::AggregationEngine;
use crate::buffer::IngestionBuffer;
use crate::config::Config;
use crate::engine::StreamProcessor;
use crate::errors::ConfigError;
use crate::stages::{InMemoryReferenceCache, PipelineRegistry, StageFactory};
use crate::traits::ReferenceCache;

/// Everything needed to run the engine, assembled from one configuration.
///
/// The processor is returned stopped and without sinks, so callers can
/// attach their own before `start`.
pub struct Runtime {
    pub buffer: Arc<IngestionBuffer>,
    pub processor: StreamProcessor,
    pub worker_count: usize,
    pub sink_capacity: usize,
}

/// Runtime builder - wires buffer, pipelines, aggregation and processor from configuration.
///
/// # Examples
///
/// ```
/// use the_sluice::config::{Config, RuntimeBuilder};
///
/// # #[tokio::main]
/// # async fn main() {
/// let config = Config::default();
/// let runtime = RuntimeBuilder::from_config(&config, None).unwrap();
///
/// assert_eq!(runtime.worker_count, 4);
/// assert_eq!(runtime.buffer.capacity().await, 1000);
/// assert!(!runtime.processor.is_running().await);
/// # }
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the complete runtime.
    ///
    /// `cache` backs `reference_enricher` stages. When none is supplied, an
    /// in-memory cache seeded from `reference_data` is used.
    pub fn from_config(
        cfg: &Config,
        cache: Option<Arc<dyn ReferenceCache>>,
    ) -> Result<Runtime, ConfigError> {
        let cache = cache.unwrap_or_else(|| {
            Arc::new(InMemoryReferenceCache::from(cfg.reference_data.clone()))
        });

        let pipelines = Self::pipelines(cfg, &cache)?;
        let buffer = Arc::new(Self::buffer(cfg));
        let aggregator = AggregationEngine::new(
            Duration::from_secs(cfg.aggregation.window_secs),
            cfg.aggregation.max_history,
        )
        .map_err(|e| ConfigError::invalid("aggregation.window_secs", e.to_string()))?;

        let processor = StreamProcessor::new(Arc::clone(&buffer), pipelines, cfg.processor.options())
            .with_aggregator(aggregator);

        Ok(Runtime {
            buffer,
            processor,
            worker_count: cfg.processor.workers,
            sink_capacity: cfg.processor.sink_capacity,
        })
    }

    /// Ingestion buffer, adaptive when the config carries an `adaptive` section.
    pub fn buffer(cfg: &Config) -> IngestionBuffer {
        match &cfg.buffer.adaptive {
            Some(adaptive) => IngestionBuffer::adaptive(cfg.buffer.capacity, adaptive.resize_policy()),
            None => IngestionBuffer::new(cfg.buffer.capacity),
        }
    }

    /// Resolve every configured stage, in order, per event type.
    pub fn pipelines(
        cfg: &Config,
        cache: &Arc<dyn ReferenceCache>,
    ) -> Result<PipelineRegistry, ConfigError> {
        let mut registry = PipelineRegistry::new();
        for pipeline in &cfg.pipelines {
            for stage in &pipeline.stages {
                let stage = StageFactory::create_stage(pipeline.event_type, stage, Some(cache))?;
                registry.register(pipeline.event_type, stage);
            }
        }
        Ok(registry)
    }
}
