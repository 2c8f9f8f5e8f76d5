// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::buffer::ResizePolicy;
use crate::config::consts::{
    DEFAULT_BATCH_SIZE, DEFAULT_BATCH_TIMEOUT_MS, DEFAULT_BUFFER_CAPACITY, DEFAULT_GROWTH_FACTOR,
    DEFAULT_MAX_CAPACITY, DEFAULT_MAX_HISTORY, DEFAULT_REPORT_INTERVAL_SECS,
    DEFAULT_RESIZE_COOLDOWN_SECS, DEFAULT_RESIZE_THRESHOLD, DEFAULT_SINK_CAPACITY,
    DEFAULT_WINDOW_SECS, DEFAULT_WORKER_COUNT,
};
use crate::config::validate_config;
use crate::engine::ProcessorOptions;
use crate::errors::ConfigError;
use crate::event::EventType;
use crate::observability::messages::config::{ConfigLoaded, ConfigProblem};
use crate::observability::messages::StructuredLog;
use crate::traits::ReferenceEntry;

/// Main configuration structure for the streaming engine.
///
/// Every section is optional and falls back to the defaults in
/// `config::consts`.
///
/// # Example
/// ```yaml
/// buffer:
///   capacity: 1000
///   adaptive:
///     threshold: 0.9
///     max_capacity: 10000
/// processor:
///   workers: 4
///   batch_size: 100
/// aggregation:
///   window_secs: 60
/// pipelines:
///   - event_type: sensor_data
///     stages:
///       - kind: timestamp_enricher
///       - kind: threshold_filter
///         field: value
///         min: 10
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub buffer: BufferConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub pipelines: Vec<PipelineConfig>,
    /// Seed entries for the in-memory reference cache, keyed by lookup key.
    #[serde(default)]
    pub reference_data: HashMap<String, ReferenceEntry>,
}

/// Ingestion buffer sizing. Presence of `adaptive` selects the adaptive variant.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BufferConfig {
    #[serde(default = "default_buffer_capacity")]
    pub capacity: usize,
    #[serde(default)]
    pub adaptive: Option<AdaptiveConfig>,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BUFFER_CAPACITY,
            adaptive: None,
        }
    }
}

/// Growth settings for the adaptive buffer.
///
/// # Example
/// ```yaml
/// adaptive:
///   threshold: 0.9       # grow when more than 90% full
///   max_capacity: 10000  # hard ceiling
///   growth_factor: 1.5
///   cooldown_secs: 60    # minimum time between resizes
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AdaptiveConfig {
    pub threshold: Option<f64>,
    pub max_capacity: Option<usize>,
    pub growth_factor: Option<f64>,
    pub cooldown_secs: Option<u64>,
}

impl AdaptiveConfig {
    pub fn get_threshold(&self) -> f64 {
        self.threshold.unwrap_or(DEFAULT_RESIZE_THRESHOLD)
    }

    pub fn get_max_capacity(&self) -> usize {
        self.max_capacity.unwrap_or(DEFAULT_MAX_CAPACITY)
    }

    pub fn get_growth_factor(&self) -> f64 {
        self.growth_factor.unwrap_or(DEFAULT_GROWTH_FACTOR)
    }

    pub fn get_cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs.unwrap_or(DEFAULT_RESIZE_COOLDOWN_SECS))
    }

    pub fn resize_policy(&self) -> ResizePolicy {
        ResizePolicy {
            threshold: self.get_threshold(),
            max_capacity: self.get_max_capacity(),
            growth_factor: self.get_growth_factor(),
            cooldown: self.get_cooldown(),
        }
    }
}

/// Stream processor settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProcessorConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_timeout_ms")]
    pub batch_timeout_ms: u64,
    #[serde(default = "default_report_interval_secs")]
    pub report_interval_secs: u64,
    #[serde(default = "default_sink_capacity")]
    pub sink_capacity: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKER_COUNT,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_timeout_ms: DEFAULT_BATCH_TIMEOUT_MS,
            report_interval_secs: DEFAULT_REPORT_INTERVAL_SECS,
            sink_capacity: DEFAULT_SINK_CAPACITY,
        }
    }
}

impl ProcessorConfig {
    pub fn options(&self) -> ProcessorOptions {
        ProcessorOptions {
            batch_size: self.batch_size,
            batch_timeout: Duration::from_millis(self.batch_timeout_ms),
            report_interval: Duration::from_secs(self.report_interval_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AggregationConfig {
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_WINDOW_SECS,
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

/// Ordered stages applied to one event type.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PipelineConfig {
    pub event_type: EventType,
    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

/// Configuration for a single pipeline stage.
///
/// Which options are required depends on `kind`:
/// * `threshold_filter` - `field`, `min`
/// * `max_age_filter` - `max_age_secs`
/// * `reference_enricher` - `key_field`, optional `prefix`
/// * `timestamp_enricher` - none
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct StageConfig {
    pub kind: String,
    pub field: Option<String>,
    pub min: Option<f64>,
    pub max_age_secs: Option<f64>,
    pub key_field: Option<String>,
    pub prefix: Option<String>,
}

fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

fn default_workers() -> usize {
    DEFAULT_WORKER_COUNT
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_batch_timeout_ms() -> u64 {
    DEFAULT_BATCH_TIMEOUT_MS
}

fn default_report_interval_secs() -> u64 {
    DEFAULT_REPORT_INTERVAL_SECS
}

fn default_sink_capacity() -> usize {
    DEFAULT_SINK_CAPACITY
}

fn default_window_secs() -> u64 {
    DEFAULT_WINDOW_SECS
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

/// Load a config from a YAML (`.yaml`, `.yml`) or TOML (`.toml`) file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match extension.as_str() {
        "yaml" | "yml" => Ok(serde_yaml::from_str(&content)?),
        "toml" => Ok(toml::from_str(&content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

/// Load a config and validate it, reporting every problem at once.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let cfg = load_config(path)?;

    if let Err(problems) = validate_config(&cfg) {
        for problem in &problems {
            let text = problem.to_string();
            ConfigProblem { problem: &text }.log();
        }
        return Err(ConfigError::Validation(problems));
    }

    let display_path = path.display().to_string();
    ConfigLoaded {
        path: &display_path,
        pipeline_count: cfg.pipelines.len(),
        adaptive: cfg.buffer.adaptive.is_some(),
    }
    .log();

    Ok(cfg)
}
