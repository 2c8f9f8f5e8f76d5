// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::StageError;
use crate::event::{unix_now, StreamEvent};
use crate::traits::{Stage, StageKind};

/// Keeps events whose numeric `field` is at least `min`.
///
/// Events without the field, or carrying a non-numeric value under it, are
/// dropped as well.
#[derive(Debug, Clone)]
pub struct ThresholdFilter {
    field: String,
    min: f64,
}

impl ThresholdFilter {
    pub fn new(field: impl Into<String>, min: f64) -> Self {
        Self {
            field: field.into(),
            min,
        }
    }

    pub fn accepts(&self, event: &StreamEvent) -> bool {
        event
            .numeric_field(&self.field)
            .is_some_and(|value| value >= self.min)
    }
}

#[async_trait]
impl Stage for ThresholdFilter {
    async fn apply(&self, event: StreamEvent) -> Result<Option<StreamEvent>, StageError> {
        Ok(self.accepts(&event).then_some(event))
    }

    fn name(&self) -> &'static str {
        "threshold_filter"
    }

    fn kind(&self) -> StageKind {
        StageKind::Filter
    }
}

/// Drops events older than `max_age` relative to the wall clock.
#[derive(Debug, Clone)]
pub struct MaxAgeFilter {
    max_age: Duration,
}

impl MaxAgeFilter {
    pub fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    pub fn accepts_at(&self, event: &StreamEvent, now: f64) -> bool {
        event.age(now) <= self.max_age.as_secs_f64()
    }
}

#[async_trait]
impl Stage for MaxAgeFilter {
    async fn apply(&self, event: StreamEvent) -> Result<Option<StreamEvent>, StageError> {
        Ok(self.accepts_at(&event, unix_now()).then_some(event))
    }

    fn name(&self) -> &'static str {
        "max_age_filter"
    }

    fn kind(&self) -> StageKind {
        StageKind::Filter
    }
}
