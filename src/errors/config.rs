// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, validating or materialising configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// The file extension does not map to a supported format.
    #[error("Unsupported config format '{0}' (expected .yaml, .yml or .toml)")]
    UnsupportedFormat(String),

    /// A single setting holds a value outside its allowed range.
    #[error("Invalid setting '{field}': {reason}")]
    Invalid { field: String, reason: String },

    /// A pipeline references a stage kind that does not exist.
    #[error("Unknown stage kind '{kind}' in pipeline for '{event_type}'")]
    UnknownStage { kind: String, event_type: String },

    /// A stage is missing an option it needs, or an option has the wrong shape.
    #[error("Stage '{kind}' is misconfigured: {reason}")]
    StageOption { kind: String, reason: String },

    /// Aggregated validation failures, reported together.
    #[error("Configuration validation failed:\n{}", format_problems(.0))]
    Validation(Vec<ConfigError>),
}

fn format_problems(problems: &[ConfigError]) -> String {
    problems
        .iter()
        .map(|p| format!("  - {}", p))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
