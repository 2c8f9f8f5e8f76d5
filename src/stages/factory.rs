// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use super::{MaxAgeFilter, ReferenceDataEnricher, ThresholdFilter, TimestampEnricher};
use crate::config::StageConfig;
use crate::errors::ConfigError;
use crate::event::EventType;
use crate::traits::{ReferenceCache, Stage};

const DEFAULT_REFERENCE_PREFIX: &str = "ref";

/// Factory for creating pipeline stages from configuration
pub struct StageFactory;

impl StageFactory {
    /// Create a stage instance from configuration
    ///
    /// The `kind` field selects the stage:
    /// - "timestamp_enricher" -> TimestampEnricher
    /// - "reference_enricher" -> ReferenceDataEnricher (requires `key_field` and a cache)
    /// - "threshold_filter" -> ThresholdFilter (requires `field` and `min`)
    /// - "max_age_filter" -> MaxAgeFilter (requires `max_age_secs`)
    pub fn create_stage(
        event_type: EventType,
        config: &StageConfig,
        cache: Option<&Arc<dyn ReferenceCache>>,
    ) -> Result<Arc<dyn Stage>, ConfigError> {
        match config.kind.as_str() {
            "timestamp_enricher" => Ok(Arc::new(TimestampEnricher::new())),

            "reference_enricher" => {
                let key_field = required(config, config.key_field.as_ref(), "key_field")?;
                let cache = cache.ok_or_else(|| ConfigError::StageOption {
                    kind: config.kind.clone(),
                    reason: "no reference cache is available".to_string(),
                })?;
                let prefix = config
                    .prefix
                    .clone()
                    .unwrap_or_else(|| DEFAULT_REFERENCE_PREFIX.to_string());
                Ok(Arc::new(ReferenceDataEnricher::new(
                    key_field.clone(),
                    prefix,
                    Arc::clone(cache),
                )))
            }

            "threshold_filter" => {
                let field = required(config, config.field.as_ref(), "field")?;
                let min = *required(config, config.min.as_ref(), "min")?;
                if !min.is_finite() {
                    return Err(option_error(config, "'min' must be a finite number"));
                }
                Ok(Arc::new(ThresholdFilter::new(field.clone(), min)))
            }

            "max_age_filter" => {
                let secs = *required(config, config.max_age_secs.as_ref(), "max_age_secs")?;
                if !secs.is_finite() || secs < 0.0 {
                    return Err(option_error(
                        config,
                        "'max_age_secs' must be a non-negative number",
                    ));
                }
                Ok(Arc::new(MaxAgeFilter::new(Duration::from_secs_f64(secs))))
            }

            _ => Err(ConfigError::UnknownStage {
                kind: config.kind.clone(),
                event_type: event_type.to_string(),
            }),
        }
    }

    /// List all available stage kinds
    pub fn list_available_kinds() -> Vec<&'static str> {
        vec![
            "timestamp_enricher",
            "reference_enricher",
            "threshold_filter",
            "max_age_filter",
        ]
    }

    pub fn is_kind_available(kind: &str) -> bool {
        Self::list_available_kinds().contains(&kind)
    }
}

fn required<'a, T>(
    config: &StageConfig,
    value: Option<&'a T>,
    option: &str,
) -> Result<&'a T, ConfigError> {
    value.ok_or_else(|| option_error(config, &format!("missing required option '{}'", option)))
}

fn option_error(config: &StageConfig, reason: &str) -> ConfigError {
    ConfigError::StageOption {
        kind: config.kind.clone(),
        reason: reason.to_string(),
    }
}
