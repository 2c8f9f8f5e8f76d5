// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration loading and validation.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Configuration loaded and validated.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ConfigLoaded<'a> {
    pub path: &'a str,
    pub pipeline_count: usize,
    pub adaptive: bool,
}

impl Display for ConfigLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded configuration '{}': {} pipelines, adaptive buffer {}",
            self.path,
            self.pipeline_count,
            if self.adaptive { "enabled" } else { "disabled" }
        )
    }
}

impl StructuredLog for ConfigLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            pipeline_count = self.pipeline_count,
            adaptive = self.adaptive,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("config_loaded", span_name = name, path = self.path)
    }
}

/// A configuration problem found during validation.
///
/// # Log Level
/// `error!` - The configuration will be rejected
///
/// # Example
/// ```
/// use the_sluice::observability::messages::config::ConfigProblem;
///
/// let msg = ConfigProblem {
///     problem: "Invalid setting 'buffer.capacity': must be greater than zero",
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ConfigProblem<'a> {
    pub problem: &'a str,
}

impl Display for ConfigProblem<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Configuration problem: {}", self.problem)
    }
}

impl StructuredLog for ConfigProblem<'_> {
    fn log(&self) {
        tracing::error!(problem = self.problem, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("config_problem", span_name = name, problem = self.problem)
    }
}
