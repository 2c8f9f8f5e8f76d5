// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod integration_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::{load_and_validate_config, RuntimeBuilder};
    use crate::event::{EventType, StreamEvent};
    use crate::stages::{InMemoryReferenceCache, PipelineOutcome};
    use crate::traits::ReferenceCache;

    /// Test that the shipped YAML demo loads and validates
    #[test]
    fn test_sensor_demo_yaml_loading() {
        let config = load_and_validate_config("configs/sensor-demo.yaml").unwrap();

        assert_eq!(config.buffer.capacity, 1000);
        let adaptive = config.buffer.adaptive.as_ref().unwrap();
        assert_eq!(adaptive.get_max_capacity(), 10_000);
        assert_eq!(config.processor.workers, 4);
        assert_eq!(config.aggregation.window_secs, 60);

        assert_eq!(config.pipelines.len(), 2);
        assert_eq!(config.pipelines[0].event_type, EventType::SensorData);
        let kinds: Vec<&str> = config.pipelines[0]
            .stages
            .iter()
            .map(|s| s.kind.as_str())
            .collect();
        assert_eq!(
            kinds,
            vec!["timestamp_enricher", "reference_enricher", "threshold_filter"]
        );
        assert_eq!(config.reference_data.len(), 3);
    }

    /// Test that the TOML demo describes the same sensor pipeline
    #[test]
    fn test_sensor_demo_toml_loading() {
        let config = load_and_validate_config("configs/sensor-demo.toml").unwrap();

        assert!(config.buffer.adaptive.is_none());
        assert_eq!(config.processor.workers, 2);
        assert_eq!(config.pipelines.len(), 1);
        assert_eq!(config.pipelines[0].stages.len(), 3);
        assert_eq!(
            config.reference_data["sensor-1"]["location"],
            serde_json::json!("north-hall")
        );
    }

    /// Test building the runtime from YAML and running an event through it
    #[tokio::test]
    async fn test_build_runtime_from_yaml() {
        let config = load_and_validate_config("configs/sensor-demo.yaml").unwrap();
        let runtime = RuntimeBuilder::from_config(&config, None).unwrap();

        assert_eq!(runtime.worker_count, 4);
        assert_eq!(runtime.sink_capacity, 10_000);
        assert!(runtime.buffer.is_adaptive());
        assert_eq!(runtime.processor.options().batch_size, 100);
        assert_eq!(
            runtime.processor.options().batch_timeout,
            Duration::from_millis(100)
        );

        let pipelines = RuntimeBuilder::pipelines(
            &config,
            &(Arc::new(InMemoryReferenceCache::from(config.reference_data.clone()))
                as Arc<dyn ReferenceCache>),
        )
        .unwrap();
        assert_eq!(pipelines.stages_for(EventType::SensorData).len(), 3);
        assert_eq!(pipelines.stages_for(EventType::ErrorLog).len(), 1);
        assert!(pipelines.stages_for(EventType::UserAction).is_empty());

        let warm = StreamEvent::new("sensor-2", EventType::SensorData)
            .with_field("device_id", "sensor-2")
            .with_field("temperature", 21.5);
        match pipelines.run(warm).await {
            PipelineOutcome::Passed(event) => {
                assert_eq!(event.metadata["device_location"], "south-hall");
                assert_eq!(event.metadata["device_floor"], 2);
                assert!(event.metadata.contains_key("processed_at"));
            }
            other => panic!("expected event to pass, got {:?}", other),
        }

        let cold = StreamEvent::new("sensor-1", EventType::SensorData)
            .with_field("device_id", "sensor-1")
            .with_field("temperature", 4.0);
        assert_eq!(
            pipelines.run(cold).await,
            PipelineOutcome::Dropped {
                stage: "threshold_filter"
            }
        );
    }

    /// Test that a supplied cache replaces the configured reference data
    #[tokio::test]
    async fn test_runtime_uses_supplied_cache() {
        let config = load_and_validate_config("configs/sensor-demo.yaml").unwrap();
        let cache = InMemoryReferenceCache::new();
        cache
            .insert(
                "sensor-9".to_string(),
                [("location".to_string(), serde_json::json!("basement"))]
                    .into_iter()
                    .collect(),
            )
            .await;
        let cache: Arc<dyn ReferenceCache> = Arc::new(cache);

        let runtime = RuntimeBuilder::from_config(&config, Some(cache.clone())).unwrap();
        assert!(!runtime.processor.is_running().await);

        let pipelines = RuntimeBuilder::pipelines(&config, &cache).unwrap();
        let event = StreamEvent::new("sensor-9", EventType::SensorData)
            .with_field("device_id", "sensor-9")
            .with_field("temperature", 30.0);
        match pipelines.run(event).await {
            PipelineOutcome::Passed(event) => {
                assert_eq!(event.metadata["device_location"], "basement");
            }
            other => panic!("expected event to pass, got {:?}", other),
        }
    }
}
