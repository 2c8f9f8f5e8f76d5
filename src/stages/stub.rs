// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::StageError;
use crate::event::StreamEvent;
use crate::traits::{Stage, StageKind};

/// A stage that hands every event on unchanged
pub struct PassthroughStage;

#[async_trait::async_trait]
impl Stage for PassthroughStage {
    async fn apply(&self, event: StreamEvent) -> Result<Option<StreamEvent>, StageError> {
        Ok(Some(event))
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn kind(&self) -> StageKind {
        StageKind::Enrich
    }
}

/// A stage that always fails for testing failure scenarios
pub struct FailingStage {
    pub reason: String,
}

impl FailingStage {
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Stage for FailingStage {
    async fn apply(&self, _event: StreamEvent) -> Result<Option<StreamEvent>, StageError> {
        Err(StageError::Failed {
            stage: self.name().to_string(),
            reason: self.reason.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "failing"
    }

    fn kind(&self) -> StageKind {
        StageKind::Enrich
    }
}

/// Appends its label to the `trail` metadata array, to observe stage order
pub struct TaggingStage {
    pub label: String,
}

impl TaggingStage {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Stage for TaggingStage {
    async fn apply(&self, mut event: StreamEvent) -> Result<Option<StreamEvent>, StageError> {
        let trail = event
            .metadata
            .entry("trail".to_string())
            .or_insert_with(|| serde_json::Value::Array(Vec::new()));
        if let serde_json::Value::Array(items) = trail {
            items.push(serde_json::Value::from(self.label.clone()));
        }
        Ok(Some(event))
    }

    fn name(&self) -> &'static str {
        "tagging"
    }

    fn kind(&self) -> StageKind {
        StageKind::Enrich
    }
}

/// Fails for events whose numeric `value` is odd, passes the rest
pub struct FailOnOddStage;

#[async_trait::async_trait]
impl Stage for FailOnOddStage {
    async fn apply(&self, event: StreamEvent) -> Result<Option<StreamEvent>, StageError> {
        match event.numeric_field("value") {
            Some(v) if (v as i64) % 2 == 1 => Err(StageError::InvalidField {
                stage: self.name().to_string(),
                field: "value".to_string(),
                reason: format!("{} is odd", v),
            }),
            _ => Ok(Some(event)),
        }
    }

    fn name(&self) -> &'static str {
        "fail_on_odd"
    }

    fn kind(&self) -> StageKind {
        StageKind::Enrich
    }
}

/// Panics on negative `value` readings, passes the rest
pub struct PanicOnNegativeStage;

#[async_trait::async_trait]
impl Stage for PanicOnNegativeStage {
    async fn apply(&self, event: StreamEvent) -> Result<Option<StreamEvent>, StageError> {
        if let Some(value) = event.numeric_field("value") {
            if value < 0.0 {
                panic!("negative reading {}", value);
            }
        }
        Ok(Some(event))
    }

    fn name(&self) -> &'static str {
        "panic_on_negative"
    }

    fn kind(&self) -> StageKind {
        StageKind::Filter
    }
}
