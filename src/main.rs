// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use the_sluice::aggregation::FinalizedAggregate;
use the_sluice::config::consts::DEFAULT_ADD_TIMEOUT_MS;
use the_sluice::config::{load_and_validate_config, RuntimeBuilder};
use the_sluice::event::{unix_now, EventType, StreamEvent};
use tracing_subscriber::EnvFilter;

const DEFAULT_EVENT_COUNT: usize = 5_000;
const DEVICES: [&str; 3] = ["sensor-1", "sensor-2", "sensor-3"];

/// Build the i-th synthetic event. Mostly sensor readings, with a sprinkle of
/// user actions and error logs so every pipeline gets traffic.
fn synthetic_event(i: usize, now: f64) -> StreamEvent {
    match i % 20 {
        0 => StreamEvent::new("web", EventType::UserAction)
            .with_timestamp(now)
            .with_field("action", "click"),
        1 => StreamEvent::new("gateway", EventType::ErrorLog)
            .with_timestamp(now)
            .with_field("message", "upstream timeout"),
        _ => {
            let device = DEVICES[i % DEVICES.len()];
            StreamEvent::new(device, EventType::SensorData)
                .with_timestamp(now)
                .with_field("device_id", device)
                .with_field("temperature", 10.0 + (i % 25) as f64 * 0.8)
                .with_field("humidity", 40.0 + (i % 7) as f64 * 2.5)
        }
    }
}

fn print_window(window: &FinalizedAggregate) {
    println!(
        "🪟 Window [{:.0}, {:.0}) - {} events",
        window.window_start(),
        window.window_end(),
        window.event_count()
    );
    for (name, summary) in window.fields() {
        println!(
            "   {:<12} count={:<6} avg={:>8.2} std={:>7.2} min={:>7.2} p50={:>7.2} p95={:>7.2} p99={:>7.2} max={:>7.2}",
            name,
            summary.count,
            summary.avg,
            summary.std_dev,
            summary.min,
            summary.p50,
            summary.p95,
            summary.p99,
            summary.max
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <config.(yaml|toml)> [event_count]", args[0]);
        eprintln!("Example: {} configs/sensor-demo.yaml 10000", args[0]);
        std::process::exit(1);
    }

    let config_path = &args[1];
    let event_count = match args.get(2) {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("event_count must be a positive integer, got '{}'", raw))?,
        None => DEFAULT_EVENT_COUNT,
    };

    let config = load_and_validate_config(config_path)
        .with_context(|| format!("failed to load {}", config_path))?;
    let mut runtime = RuntimeBuilder::from_config(&config, None)?;

    println!("🌊 Sluice streaming demo");
    println!("═══════════════════════");
    println!("Config: {}", config_path);
    println!("Events: {}", event_count);
    println!("Workers: {}", runtime.worker_count);
    println!();

    let mut sink = runtime.processor.add_sink("console", runtime.sink_capacity);
    let drain = tokio::spawn(async move {
        let mut received = 0u64;
        while sink.recv().await.is_some() {
            received += 1;
        }
        received
    });

    runtime.processor.start(runtime.worker_count).await?;

    let started = Instant::now();
    let add_timeout = Duration::from_millis(DEFAULT_ADD_TIMEOUT_MS);
    let mut accepted = 0u64;
    for i in 0..event_count {
        let payload = synthetic_event(i, unix_now()).to_bytes()?;
        if runtime.buffer.add(payload, add_timeout).await {
            accepted += 1;
        }
    }
    println!("📥 Accepted {} of {} events in {:?}", accepted, event_count, started.elapsed());

    let deadline = Instant::now() + Duration::from_secs(30);
    while runtime.processor.snapshot().await.stream.total_events < accepted {
        if Instant::now() > deadline {
            bail!("processor did not drain the buffer within 30s");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    runtime.processor.stop().await?;
    let windows = runtime.processor.drain_finalized().await;
    let report = runtime.processor.snapshot().await;

    // Dropping the processor closes the sink so the drain task finishes.
    drop(runtime);
    let delivered = drain.await?;

    println!("⏱️  Processed in {:?}", started.elapsed());
    println!();
    for window in &windows {
        print_window(window);
    }

    println!();
    println!("📊 Final stats");
    println!("{}", serde_json::to_string_pretty(&report)?);
    println!();
    println!("📤 Delivered to sink: {}", delivered);
    println!("\n🎉 Done!");

    Ok(())
}
