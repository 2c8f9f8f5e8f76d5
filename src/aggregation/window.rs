// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::collections::BTreeMap;

use super::stats::{FieldStats, FieldSummary};
use crate::errors::AggregationError;
use crate::event::StreamEvent;

/// Start and end of the fixed window of `size` seconds containing `timestamp`.
///
/// Windows are aligned to multiples of `size` since the epoch.
pub fn window_bounds(timestamp: f64, size: f64) -> (f64, f64) {
    let start = (timestamp / size).floor() * size;
    (start, start + size)
}

/// An open window accepting events whose timestamp lies in
/// `[window_start, window_end)`.
///
/// Finalizing consumes the window, so a closed window can neither accept more
/// events nor be finalized twice.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedAggregate {
    window_start: f64,
    window_end: f64,
    event_count: u64,
    fields: BTreeMap<String, FieldStats>,
}

impl WindowedAggregate {
    pub fn new(window_start: f64, window_end: f64) -> Self {
        Self {
            window_start,
            window_end,
            event_count: 0,
            fields: BTreeMap::new(),
        }
    }

    pub fn window_start(&self) -> f64 {
        self.window_start
    }

    pub fn window_end(&self) -> f64 {
        self.window_end
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn field(&self, name: &str) -> Option<&FieldStats> {
        self.fields.get(name)
    }

    pub fn contains(&self, timestamp: f64) -> bool {
        timestamp >= self.window_start && timestamp < self.window_end
    }

    /// Fold one event in. Only `Number` fields are aggregated.
    pub fn add_event(&mut self, event: &StreamEvent) -> Result<(), AggregationError> {
        if !self.contains(event.timestamp) {
            return Err(AggregationError::OutOfWindow {
                timestamp: event.timestamp,
                window_start: self.window_start,
                window_end: self.window_end,
            });
        }

        self.event_count += 1;
        for (name, value) in event.numeric_fields() {
            self.fields
                .entry(name.to_string())
                .or_default()
                .record(value);
        }
        Ok(())
    }

    pub fn finalize(self) -> FinalizedAggregate {
        let fields = self
            .fields
            .into_iter()
            .map(|(name, stats)| (name, stats.summarize()))
            .collect();

        FinalizedAggregate {
            window_start: self.window_start,
            window_end: self.window_end,
            event_count: self.event_count,
            fields,
        }
    }
}

/// Read-only statistics of a closed window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalizedAggregate {
    window_start: f64,
    window_end: f64,
    event_count: u64,
    fields: BTreeMap<String, FieldSummary>,
}

impl FinalizedAggregate {
    pub fn window_start(&self) -> f64 {
        self.window_start
    }

    pub fn window_end(&self) -> f64 {
        self.window_end
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn field(&self, name: &str) -> Option<&FieldSummary> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSummary)> {
        self.fields.iter().map(|(name, summary)| (name.as_str(), summary))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}
