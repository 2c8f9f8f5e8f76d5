// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::StageError;
use crate::event::StreamEvent;

/// What a stage does to the events it sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// Adds context to the event and always passes it on.
    Enrich,
    /// Decides whether the event continues. Never modifies it.
    Filter,
}

/// One step of a per-event-type pipeline.
///
/// `Ok(Some(event))` hands the (possibly modified) event to the next stage,
/// `Ok(None)` drops it, and `Err` marks it as failed. A failure only affects
/// the event being processed; the worker carries on with the rest of its batch.
#[async_trait]
pub trait Stage: Send + Sync {
    async fn apply(&self, event: StreamEvent) -> Result<Option<StreamEvent>, StageError>;

    fn name(&self) -> &'static str;

    fn kind(&self) -> StageKind;
}
