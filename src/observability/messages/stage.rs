// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for pipeline stage execution.
//!
//! This module contains message types for logging events related to:
//! * Stage failures (the event is skipped, its batch continues)
//! * Best-effort enrichment that could not reach its reference data
//! * Events dropped by filters

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A stage returned an error for one event.
///
/// # Log Level
/// `warn!` - The event is lost but the worker keeps going
///
/// # Example
/// ```
/// use the_sluice::observability::messages::stage::StageFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "boom");
/// let msg = StageFailed {
///     stage: "threshold_filter",
///     event_id: "evt-1",
///     event_type: "sensor_data",
///     error: &error,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct StageFailed<'a> {
    pub stage: &'a str,
    pub event_id: &'a str,
    pub event_type: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for StageFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage '{}' failed for {} event '{}': {}",
            self.stage, self.event_type, self.event_id, self.error
        )
    }
}

impl StructuredLog for StageFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            stage = self.stage,
            event_id = self.event_id,
            event_type = self.event_type,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "stage_failed",
            span_name = name,
            stage = self.stage,
            event_id = self.event_id,
            event_type = self.event_type,
        )
    }
}

/// Reference-data lookup failed; the event passes through unenriched.
///
/// # Log Level
/// `warn!` - Degraded enrichment
pub struct EnrichmentDegraded<'a> {
    pub stage: &'a str,
    pub event_id: &'a str,
    pub key: &'a str,
    pub reason: &'a str,
}

impl Display for EnrichmentDegraded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage '{}' could not enrich event '{}' (key '{}'): {}",
            self.stage, self.event_id, self.key, self.reason
        )
    }
}

impl StructuredLog for EnrichmentDegraded<'_> {
    fn log(&self) {
        tracing::warn!(
            stage = self.stage,
            event_id = self.event_id,
            key = self.key,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "enrichment_degraded",
            span_name = name,
            stage = self.stage,
            key = self.key,
        )
    }
}

/// A filter stage dropped an event.
///
/// # Log Level
/// `trace!` - High volume, only useful when debugging a pipeline
pub struct EventFiltered<'a> {
    pub stage: &'a str,
    pub event_id: &'a str,
    pub event_type: &'a str,
}

impl Display for EventFiltered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage '{}' dropped {} event '{}'",
            self.stage, self.event_type, self.event_id
        )
    }
}

impl StructuredLog for EventFiltered<'_> {
    fn log(&self) {
        tracing::trace!(
            stage = self.stage,
            event_id = self.event_id,
            event_type = self.event_type,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "event_filtered",
            span_name = name,
            stage = self.stage,
            event_id = self.event_id,
        )
    }
}
