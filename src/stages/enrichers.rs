// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::consts::PROCESSED_AT_KEY;
use crate::errors::StageError;
use crate::event::{unix_now, FieldValue, StreamEvent};
use crate::observability::messages::{stage::EnrichmentDegraded, StructuredLog};
use crate::traits::{ReferenceCache, Stage, StageKind};
use crate::utils::merge_with_prefix;

/// Stamps each event with the wall-clock time it was processed.
#[derive(Debug, Default)]
pub struct TimestampEnricher;

impl TimestampEnricher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Stage for TimestampEnricher {
    async fn apply(&self, mut event: StreamEvent) -> Result<Option<StreamEvent>, StageError> {
        event
            .metadata
            .insert(PROCESSED_AT_KEY.to_string(), serde_json::Value::from(unix_now()));
        Ok(Some(event))
    }

    fn name(&self) -> &'static str {
        "timestamp_enricher"
    }

    fn kind(&self) -> StageKind {
        StageKind::Enrich
    }
}

/// Looks up reference data keyed by one of the event's fields and merges it
/// into metadata under `prefix`.
///
/// Enrichment is best effort. A missing key field, a cache miss or a cache
/// failure all leave the event unenriched but never drop it.
pub struct ReferenceDataEnricher {
    key_field: String,
    prefix: String,
    cache: Arc<dyn ReferenceCache>,
}

impl ReferenceDataEnricher {
    pub fn new(
        key_field: impl Into<String>,
        prefix: impl Into<String>,
        cache: Arc<dyn ReferenceCache>,
    ) -> Self {
        Self {
            key_field: key_field.into(),
            prefix: prefix.into(),
            cache,
        }
    }

    fn lookup_key(&self, event: &StreamEvent) -> Option<String> {
        match event.data.get(&self.key_field)? {
            FieldValue::Text(text) => Some(text.clone()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Flag(flag) => Some(flag.to_string()),
            FieldValue::Nested(_) => None,
        }
    }
}

#[async_trait]
impl Stage for ReferenceDataEnricher {
    async fn apply(&self, mut event: StreamEvent) -> Result<Option<StreamEvent>, StageError> {
        let Some(key) = self.lookup_key(&event) else {
            return Ok(Some(event));
        };

        match self.cache.lookup(&key).await {
            Ok(Some(entry)) => merge_with_prefix(&mut event.metadata, &self.prefix, entry),
            Ok(None) => {}
            Err(e) => {
                let reason = e.to_string();
                EnrichmentDegraded {
                    stage: self.name(),
                    event_id: event.id(),
                    key: &key,
                    reason: &reason,
                }
                .log();
            }
        }

        Ok(Some(event))
    }

    fn name(&self) -> &'static str {
        "reference_enricher"
    }

    fn kind(&self) -> StageKind {
        StageKind::Enrich
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CacheError;
    use crate::event::EventType;
    use crate::stages::InMemoryReferenceCache;
    use crate::traits::ReferenceEntry;
    use serde_json::json;
    use std::collections::HashMap;

    struct UnavailableCache;

    #[async_trait]
    impl ReferenceCache for UnavailableCache {
        async fn lookup(&self, _key: &str) -> Result<Option<ReferenceEntry>, CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
    }

    fn sensor(device: &str) -> StreamEvent {
        StreamEvent::new("probe", EventType::SensorData)
            .with_field("device", device)
            .with_field("value", 3.0)
    }

    #[tokio::test]
    async fn timestamp_enricher_adds_processed_at() {
        let before = unix_now();
        let event = TimestampEnricher::new()
            .apply(sensor("d1"))
            .await
            .unwrap()
            .unwrap();

        let processed_at = event.metadata[PROCESSED_AT_KEY].as_f64().unwrap();
        assert!(processed_at >= before);
        assert_eq!(event.numeric_field("value"), Some(3.0));
    }

    #[tokio::test]
    async fn reference_enricher_merges_entry() {
        let cache = InMemoryReferenceCache::new();
        let mut entry = HashMap::new();
        entry.insert("site".to_string(), json!("north-yard"));
        entry.insert("rack".to_string(), json!(12));
        cache.insert("d1", entry).await;

        let enricher = ReferenceDataEnricher::new("device", "device", Arc::new(cache));
        let event = enricher.apply(sensor("d1")).await.unwrap().unwrap();

        assert_eq!(event.metadata["device_site"], json!("north-yard"));
        assert_eq!(event.metadata["device_rack"], json!(12));
    }

    #[tokio::test]
    async fn reference_enricher_passes_misses_through() {
        let enricher =
            ReferenceDataEnricher::new("device", "device", Arc::new(InMemoryReferenceCache::new()));
        let event = enricher.apply(sensor("unknown")).await.unwrap().unwrap();
        assert!(event.metadata.is_empty());
    }

    #[tokio::test]
    async fn reference_enricher_survives_cache_failure() {
        let enricher = ReferenceDataEnricher::new("device", "device", Arc::new(UnavailableCache));
        let original = sensor("d1");
        let event = enricher.apply(original.clone()).await.unwrap().unwrap();
        assert_eq!(event, original);
    }

    #[tokio::test]
    async fn reference_enricher_ignores_events_without_key() {
        let enricher = ReferenceDataEnricher::new("device", "device", Arc::new(UnavailableCache));
        let event = StreamEvent::new("probe", EventType::SensorData).with_field("value", 1.0);
        let result = enricher.apply(event).await.unwrap();
        assert!(result.is_some());
    }
}
