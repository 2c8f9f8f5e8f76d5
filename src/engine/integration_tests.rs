// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::aggregation::AggregationEngine;
use crate::buffer::IngestionBuffer;
use crate::engine::{ProcessorOptions, StreamProcessor};
use crate::event::{EventType, StreamEvent};
use crate::stages::stub::{PanicOnNegativeStage, PassthroughStage};
use crate::stages::{PipelineRegistry, ThresholdFilter, TimestampEnricher};

/// End-to-end tests for the stream processor using real stages
#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ProcessorOptions {
        ProcessorOptions {
            batch_size: 25,
            batch_timeout: Duration::from_millis(10),
            report_interval: Duration::from_millis(50),
        }
    }

    async fn wait_for_drain(processor: &StreamProcessor, expected: u64) {
        for _ in 0..500 {
            if processor.snapshot().await.stream.total_events >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("processor did not drain {} events in time", expected);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_four_workers_consume_everything_exactly_once() {
        let buffer = Arc::new(IngestionBuffer::new(1_000));
        let mut pipelines = PipelineRegistry::new();
        pipelines.register(EventType::SensorData, Arc::new(PassthroughStage));

        let mut processor = StreamProcessor::new(buffer.clone(), pipelines, options());
        let mut sink = processor.add_sink("all", 2_000);

        let mut expected_ids = HashSet::new();
        let mut payloads = Vec::new();
        for i in 0..1_000 {
            let event = StreamEvent::new("probe", EventType::SensorData).with_field("value", i as f64);
            expected_ids.insert(event.id().to_string());
            payloads.push(event.to_bytes().unwrap());
        }
        assert_eq!(buffer.add_batch(payloads).await, 1_000);

        processor.start(4).await.unwrap();
        wait_for_drain(&processor, 1_000).await;
        processor.stop().await.unwrap();

        let mut seen = Vec::new();
        while let Ok(event) = sink.try_recv() {
            seen.push(event.id().to_string());
        }
        let unique: HashSet<_> = seen.iter().cloned().collect();

        assert_eq!(seen.len(), 1_000);
        assert_eq!(unique, expected_ids);

        let report = processor.snapshot().await;
        assert_eq!(report.stream.total_events, 1_000);
        assert_eq!(report.stream.passed, 1_000);
        assert_eq!(report.stream.errors, 0);
        assert_eq!(report.buffer.total_consumed, 1_000);
        assert_eq!(report.buffer.current_size, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_filtering_enrichment_and_aggregation() {
        let buffer = Arc::new(IngestionBuffer::new(500));
        let mut pipelines = PipelineRegistry::new();
        pipelines.register(EventType::SensorData, Arc::new(TimestampEnricher::new()));
        pipelines.register(EventType::SensorData, Arc::new(ThresholdFilter::new("value", 10.0)));

        let engine = AggregationEngine::new(Duration::from_secs(3_600), 10).unwrap();
        // Keep the reporter from closing the window by wall clock mid-test.
        let options = ProcessorOptions {
            report_interval: Duration::from_secs(3_600),
            ..options()
        };
        let mut processor =
            StreamProcessor::new(buffer.clone(), pipelines, options).with_aggregator(engine);
        let mut sink = processor.add_sink("passed", 500);

        // values spread evenly over [0, 20), all inside one aligned hour
        let base = 7_200.0;
        for i in 0..100 {
            let event = StreamEvent::new("probe", EventType::SensorData)
                .with_timestamp(base + i as f64)
                .with_field("value", i as f64 * 0.2);
            assert!(buffer.add(event.to_bytes().unwrap(), Duration::ZERO).await);
        }
        // user actions have no pipeline and pass untouched
        for _ in 0..5 {
            let event = StreamEvent::new("ui", EventType::UserAction).with_timestamp(base + 1.0);
            assert!(buffer.add(event.to_bytes().unwrap(), Duration::ZERO).await);
        }

        processor.start(2).await.unwrap();
        wait_for_drain(&processor, 105).await;
        processor.stop().await.unwrap();

        let report = processor.snapshot().await;
        assert_eq!(report.stream.filtered + report.stream.passed, 105);
        assert!((45..=55).contains(&report.stream.filtered));

        let mut sensor_events = 0;
        while let Ok(event) = sink.try_recv() {
            if event.event_type == EventType::SensorData {
                sensor_events += 1;
                assert!(event.metadata.contains_key("processed_at"));
                assert!(event.numeric_field("value").unwrap() >= 10.0);
            } else {
                assert!(event.metadata.is_empty());
            }
        }
        assert_eq!(sensor_events as u64 + 5, report.stream.passed);

        // stop() flushes the open window
        let windows = processor.drain_finalized().await;
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].window_start(), 7_200.0);
        assert_eq!(windows[0].event_count(), report.stream.passed);
        let summary = windows[0].field("value").unwrap();
        assert!(summary.min >= 10.0);
        assert!(summary.max < 20.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_malformed_payloads_are_counted_not_fatal() {
        let buffer = Arc::new(IngestionBuffer::new(100));
        let processor = StreamProcessor::new(buffer.clone(), PipelineRegistry::new(), options());

        for i in 0..10 {
            let payload = if i % 2 == 0 {
                b"{\"broken\": ".to_vec()
            } else {
                StreamEvent::new("probe", EventType::ErrorLog).to_bytes().unwrap()
            };
            buffer.add(payload, Duration::ZERO).await;
        }

        processor.start(2).await.unwrap();
        wait_for_drain(&processor, 10).await;
        processor.stop().await.unwrap();

        let report = processor.snapshot().await;
        assert_eq!(report.stream.errors, 5);
        assert_eq!(report.stream.passed, 5);
        assert!(report.stream.bytes_processed > 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slow_sink_reports_backpressure() {
        let buffer = Arc::new(IngestionBuffer::new(100));
        let mut processor =
            StreamProcessor::new(buffer.clone(), PipelineRegistry::new(), options());
        let _unread = processor.add_sink("slow", 3);

        let payloads = (0..20)
            .map(|_| {
                StreamEvent::new("host", EventType::SystemMetric)
                    .to_bytes()
                    .unwrap()
            })
            .collect();
        buffer.add_batch(payloads).await;

        processor.start(1).await.unwrap();
        wait_for_drain(&processor, 20).await;
        processor.stop().await.unwrap();

        let report = processor.snapshot().await;
        assert_eq!(report.stream.passed, 20);
        assert_eq!(report.stream.backpressure_drops, 17);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_stage_does_not_stop_the_worker() {
        let buffer = Arc::new(IngestionBuffer::new(100));
        let mut pipelines = PipelineRegistry::new();
        pipelines.register(EventType::SensorData, Arc::new(PanicOnNegativeStage));
        let mut processor = StreamProcessor::new(buffer.clone(), pipelines, options());
        let mut sink = processor.add_sink("out", 10);

        for value in [-1.0, 1.0, 2.0, 3.0] {
            let event = StreamEvent::new("probe", EventType::SensorData).with_field("value", value);
            assert!(buffer.add(event.to_bytes().unwrap(), Duration::ZERO).await);
        }

        processor.start(1).await.unwrap();
        wait_for_drain(&processor, 4).await;
        assert!(processor.is_running().await);

        // The worker is still alive and picks up later payloads too.
        let late = StreamEvent::new("probe", EventType::SensorData).with_field("value", 4.0);
        assert!(buffer.add(late.to_bytes().unwrap(), Duration::ZERO).await);
        wait_for_drain(&processor, 5).await;

        assert!(processor.stop().await.is_ok());

        let report = processor.snapshot().await;
        assert_eq!(report.stream.errors, 1);
        assert_eq!(report.stream.passed, 4);
        assert_eq!(report.buffer.current_size, 0);

        let mut values = Vec::new();
        while let Ok(event) = sink.try_recv() {
            values.push(event.numeric_field("value").unwrap());
        }
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stop_waits_for_workers() {
        let buffer = Arc::new(IngestionBuffer::new(10));
        let processor = StreamProcessor::new(buffer, PipelineRegistry::new(), options());

        processor.start(3).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let stopped = tokio::time::timeout(Duration::from_secs(2), processor.stop()).await;
        assert!(matches!(stopped, Ok(Ok(()))));
        assert!(!processor.is_running().await);
    }
}
