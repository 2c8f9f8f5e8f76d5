// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Event model: the typed, serializable unit flowing through the engine.
//!
//! * `StreamEvent` - one ingested record, tagged with a closed `EventType`
//! * `FieldValue` - a field payload, with numbers kept distinct from everything else
//! * `Metric` - a point measurement outside of windowed aggregation

mod metric;
mod stream_event;

pub use metric::Metric;
pub use stream_event::{EventType, FieldValue, StreamEvent};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in seconds since the Unix epoch.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
