// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::errors::StageError;
use crate::event::{EventType, StreamEvent};
use crate::observability::messages::stage::{EventFiltered, StageFailed};
use crate::observability::messages::StructuredLog;
use crate::traits::Stage;

/// Result of running one event through its pipeline.
#[derive(Debug, PartialEq)]
pub enum PipelineOutcome {
    /// Every stage passed the event on.
    Passed(StreamEvent),
    /// A filter stage dropped the event.
    Dropped { stage: &'static str },
    /// A stage failed; the event is lost.
    Failed {
        stage: &'static str,
        error: StageError,
    },
}

/// Ordered stage chains, one per event type.
///
/// Stages are held as `Arc<dyn Stage>` so the registry can be cloned into
/// every worker without copying stage state.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use the_sluice::event::{EventType, StreamEvent};
/// use the_sluice::stages::{PipelineOutcome, PipelineRegistry, ThresholdFilter};
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut registry = PipelineRegistry::new();
/// registry.register(EventType::SensorData, Arc::new(ThresholdFilter::new("value", 10.0)));
///
/// let low = StreamEvent::new("probe", EventType::SensorData).with_field("value", 2.0);
/// assert_eq!(
///     registry.run(low).await,
///     PipelineOutcome::Dropped { stage: "threshold_filter" }
/// );
/// # }
/// ```
#[derive(Clone, Default)]
pub struct PipelineRegistry(pub HashMap<EventType, Vec<Arc<dyn Stage>>>);

impl PipelineRegistry {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Append a stage to the chain for `event_type`.
    pub fn register(&mut self, event_type: EventType, stage: Arc<dyn Stage>) {
        self.0.entry(event_type).or_default().push(stage);
    }

    /// Stages for `event_type` in registration order; empty when none.
    pub fn stages_for(&self, event_type: EventType) -> &[Arc<dyn Stage>] {
        self.0.get(&event_type).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn stage_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stage_count() == 0
    }

    /// Run `event` through its chain. Output of stage n is the input of n+1.
    ///
    /// A stage that panics is treated like one that returned an error: the
    /// event is lost, the worker running the chain is not.
    pub async fn run(&self, event: StreamEvent) -> PipelineOutcome {
        let stages = self.stages_for(event.event_type);
        if stages.is_empty() {
            return PipelineOutcome::Passed(event);
        }

        let event_id = event.id().to_string();
        let event_type = event.event_type;
        let mut current = event;

        for stage in stages {
            let applied = AssertUnwindSafe(stage.apply(current)).catch_unwind().await;
            let result = applied.unwrap_or_else(|payload| {
                Err(StageError::Failed {
                    stage: stage.name().to_string(),
                    reason: format!("panicked: {}", panic_message(payload.as_ref())),
                })
            });

            match result {
                Ok(Some(next)) => current = next,
                Ok(None) => {
                    EventFiltered {
                        stage: stage.name(),
                        event_id: &event_id,
                        event_type: event_type.as_str(),
                    }
                    .log();
                    return PipelineOutcome::Dropped {
                        stage: stage.name(),
                    };
                }
                Err(error) => {
                    StageFailed {
                        stage: stage.name(),
                        event_id: &event_id,
                        event_type: event_type.as_str(),
                        error: &error,
                    }
                    .log();
                    return PipelineOutcome::Failed {
                        stage: stage.name(),
                        error,
                    };
                }
            }
        }

        PipelineOutcome::Passed(current)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

impl std::fmt::Debug for PipelineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let chains: HashMap<&str, Vec<&str>> = self
            .0
            .iter()
            .map(|(event_type, stages)| {
                (
                    event_type.as_str(),
                    stages.iter().map(|s| s.name()).collect(),
                )
            })
            .collect();
        f.debug_struct("PipelineRegistry")
            .field("stage_count", &self.stage_count())
            .field("chains", &chains)
            .finish()
    }
}

impl From<HashMap<EventType, Vec<Arc<dyn Stage>>>> for PipelineRegistry {
    fn from(map: HashMap<EventType, Vec<Arc<dyn Stage>>>) -> Self {
        Self(map)
    }
}
