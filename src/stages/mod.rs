// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline stages: per-event enrichment and filtering.
//!
//! Stages are registered per `EventType` in a `PipelineRegistry` and run in
//! registration order. Enrichers add context and always pass the event on;
//! filters are stateless and decide whether it continues.

pub mod cache;
pub mod enrichers;
pub mod factory;
pub mod filters;
pub mod registry;

#[cfg(test)]
pub mod stub;

pub use cache::InMemoryReferenceCache;
pub use enrichers::{ReferenceDataEnricher, TimestampEnricher};
pub use factory::StageFactory;
pub use filters::{MaxAgeFilter, ThresholdFilter};
pub use registry::{PipelineOutcome, PipelineRegistry};
