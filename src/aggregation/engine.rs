// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::VecDeque;
use std::time::Duration;

use super::window::{window_bounds, FinalizedAggregate, WindowedAggregate};
use crate::errors::AggregationError;
use crate::event::{unix_now, StreamEvent};
use crate::observability::messages::aggregation::{
    FutureEventRejected, HistoryTrimmed, LateEventDropped, WindowFinalized,
};
use crate::observability::messages::StructuredLog;

/// Tumbling-window aggregation over event timestamps.
///
/// At most one window is open at a time. Windows are fixed size,
/// non-overlapping and aligned to multiples of the window size since the
/// epoch. An event newer than the open window closes it and opens the window
/// that contains the event; an event older than the open window, or older
/// than the end of the last finalized window, is late and dropped. Windows
/// with no events are never materialised.
///
/// Because a newer event closes the open window, one event stamped far ahead
/// would turn every on-time event after it into a late one. Events more than
/// one window size past the wall clock are therefore rejected with
/// `AggregationError::FutureEvent` and leave the open window alone.
///
/// Finalized windows queue up until `drain_finalized` moves them out. The
/// queue is bounded by `max_history`; beyond that the oldest are discarded.
///
/// The engine is not internally synchronized. The stream processor keeps it
/// behind its own mutex.
#[derive(Debug)]
pub struct AggregationEngine {
    window_size: f64,
    max_history: usize,
    open: Option<WindowedAggregate>,
    finalized: VecDeque<FinalizedAggregate>,
    /// End of the most recently finalized window.
    closed_until: Option<f64>,
    late_events: u64,
    discarded_windows: u64,
}

impl AggregationEngine {
    pub fn new(window_size: Duration, max_history: usize) -> Result<Self, AggregationError> {
        let window_size = window_size.as_secs_f64();
        if window_size <= 0.0 {
            return Err(AggregationError::InvalidWindowSize);
        }

        Ok(Self {
            window_size,
            max_history,
            open: None,
            finalized: VecDeque::new(),
            closed_until: None,
            late_events: 0,
            discarded_windows: 0,
        })
    }

    pub fn window_size(&self) -> Duration {
        Duration::from_secs_f64(self.window_size)
    }

    /// Route an event to the window containing its timestamp.
    pub fn add_event(&mut self, event: &StreamEvent) -> Result<(), AggregationError> {
        self.add_event_at(event, unix_now())
    }

    /// `add_event` against an explicit wall-clock `now`.
    pub fn add_event_at(&mut self, event: &StreamEvent, now: f64) -> Result<(), AggregationError> {
        let timestamp = event.timestamp;
        if !timestamp.is_finite() {
            let (window_start, window_end) = self.open_window_bounds().unwrap_or((0.0, 0.0));
            return Err(AggregationError::OutOfWindow {
                timestamp,
                window_start,
                window_end,
            });
        }

        let limit = now + self.window_size;
        if timestamp > limit {
            FutureEventRejected {
                event_id: event.id(),
                timestamp,
                limit,
            }
            .log();
            return Err(AggregationError::FutureEvent {
                event_id: event.id().to_string(),
                timestamp,
                limit,
            });
        }

        match self.open_window_bounds() {
            Some((_, window_end)) if timestamp >= window_end => {
                self.finalize_open();
                self.open_window_for(timestamp);
            }
            Some((window_start, _)) if timestamp < window_start => {
                return Err(self.reject_late(event, window_start));
            }
            Some(_) => {}
            None => match self.closed_until {
                Some(closed_until) if timestamp < closed_until => {
                    return Err(self.reject_late(event, closed_until));
                }
                _ => self.open_window_for(timestamp),
            },
        }

        match self.open.as_mut() {
            Some(window) => window.add_event(event),
            None => Err(AggregationError::OutOfWindow {
                timestamp,
                window_start: 0.0,
                window_end: 0.0,
            }),
        }
    }

    /// Finalize the open window once wall-clock `now` has reached its end.
    pub fn close_expired(&mut self, now: f64) -> bool {
        let expired = self
            .open
            .as_ref()
            .is_some_and(|window| now >= window.window_end());
        if expired {
            self.finalize_open();
        }
        expired
    }

    /// Finalize whatever window is open.
    pub fn flush(&mut self) -> bool {
        let had_open = self.open.is_some();
        self.finalize_open();
        had_open
    }

    /// Move every finalized window out, oldest first.
    pub fn drain_finalized(&mut self) -> Vec<FinalizedAggregate> {
        self.finalized.drain(..).collect()
    }

    pub fn pending_finalized(&self) -> usize {
        self.finalized.len()
    }

    pub fn late_events(&self) -> u64 {
        self.late_events
    }

    /// Finalized windows discarded because nobody drained them in time.
    pub fn discarded_windows(&self) -> u64 {
        self.discarded_windows
    }

    pub fn open_window_bounds(&self) -> Option<(f64, f64)> {
        self.open
            .as_ref()
            .map(|window| (window.window_start(), window.window_end()))
    }

    fn reject_late(&mut self, event: &StreamEvent, window_start: f64) -> AggregationError {
        self.late_events += 1;
        LateEventDropped {
            event_id: event.id(),
            timestamp: event.timestamp,
            window_start,
        }
        .log();
        AggregationError::LateEvent {
            event_id: event.id().to_string(),
            timestamp: event.timestamp,
            window_start,
        }
    }

    fn open_window_for(&mut self, timestamp: f64) {
        let (start, end) = window_bounds(timestamp, self.window_size);
        self.open = Some(WindowedAggregate::new(start, end));
    }

    fn finalize_open(&mut self) {
        let Some(window) = self.open.take() else {
            return;
        };

        let finalized = window.finalize();
        self.closed_until = Some(finalized.window_end());
        WindowFinalized {
            window_start: finalized.window_start(),
            window_end: finalized.window_end(),
            event_count: finalized.event_count(),
            field_count: finalized.field_count(),
        }
        .log();

        self.finalized.push_back(finalized);
        let overflow = self.finalized.len().saturating_sub(self.max_history);
        if overflow > 0 {
            self.finalized.drain(..overflow);
            self.discarded_windows += overflow as u64;
            HistoryTrimmed {
                discarded: overflow,
                max_history: self.max_history,
            }
            .log();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;

    fn at(timestamp: f64, value: f64) -> StreamEvent {
        StreamEvent::new("probe", EventType::SensorData)
            .with_timestamp(timestamp)
            .with_field("value", value)
    }

    fn engine(window_secs: u64) -> AggregationEngine {
        AggregationEngine::new(Duration::from_secs(window_secs), 10).unwrap()
    }

    #[test]
    fn zero_window_is_rejected() {
        assert_eq!(
            AggregationEngine::new(Duration::ZERO, 10).err(),
            Some(AggregationError::InvalidWindowSize)
        );
    }

    #[test]
    fn first_event_opens_aligned_window() {
        let mut engine = engine(60);
        engine.add_event(&at(125.0, 1.0)).unwrap();
        assert_eq!(engine.open_window_bounds(), Some((120.0, 180.0)));
    }

    #[test]
    fn newer_event_rolls_the_window() {
        let mut engine = engine(60);
        engine.add_event(&at(125.0, 1.0)).unwrap();
        engine.add_event(&at(130.0, 3.0)).unwrap();
        engine.add_event(&at(300.0, 5.0)).unwrap();

        assert_eq!(engine.open_window_bounds(), Some((300.0, 360.0)));
        let finalized = engine.drain_finalized();
        assert_eq!(finalized.len(), 1);
        assert_eq!(finalized[0].window_start(), 120.0);
        assert_eq!(finalized[0].event_count(), 2);
        assert_eq!(finalized[0].field("value").unwrap().avg, 2.0);
        assert!(engine.drain_finalized().is_empty());
    }

    #[test]
    fn late_events_are_dropped_and_counted() {
        let mut engine = engine(60);
        engine.add_event(&at(125.0, 1.0)).unwrap();
        engine.add_event(&at(200.0, 1.0)).unwrap();

        let result = engine.add_event(&at(150.0, 1.0));
        assert!(matches!(result, Err(AggregationError::LateEvent { .. })));
        assert_eq!(engine.late_events(), 1);

        engine.flush();
        let finalized = engine.drain_finalized();
        assert_eq!(finalized[0].event_count(), 1);
        assert_eq!(finalized[1].event_count(), 1);
    }

    #[test]
    fn windows_do_not_overlap() {
        let mut engine = engine(10);
        for ts in [1.0, 9.9, 10.0, 19.99, 20.0, 45.0] {
            engine.add_event(&at(ts, 1.0)).unwrap();
        }
        engine.flush();

        let finalized = engine.drain_finalized();
        let bounds: Vec<_> = finalized
            .iter()
            .map(|w| (w.window_start(), w.window_end()))
            .collect();
        assert_eq!(
            bounds,
            vec![(0.0, 10.0), (10.0, 20.0), (20.0, 30.0), (40.0, 50.0)]
        );
        for pair in finalized.windows(2) {
            assert!(pair[0].window_end() <= pair[1].window_start());
        }
    }

    #[test]
    fn close_expired_uses_wall_clock() {
        let mut engine = engine(60);
        engine.add_event(&at(125.0, 1.0)).unwrap();

        assert!(!engine.close_expired(179.0));
        assert!(engine.close_expired(180.0));
        assert_eq!(engine.open_window_bounds(), None);
        assert_eq!(engine.pending_finalized(), 1);
        assert!(!engine.close_expired(500.0));
    }

    #[test]
    fn events_for_a_closed_window_are_late() {
        let mut engine = engine(60);
        engine.add_event(&at(125.0, 1.0)).unwrap();
        assert!(engine.close_expired(200.0));

        let result = engine.add_event(&at(130.0, 1.0));
        assert!(matches!(
            result,
            Err(AggregationError::LateEvent { window_start, .. }) if window_start == 180.0
        ));
        assert_eq!(engine.late_events(), 1);

        engine.add_event(&at(185.0, 1.0)).unwrap();
        assert_eq!(engine.open_window_bounds(), Some((180.0, 240.0)));
    }

    #[test]
    fn far_future_event_does_not_close_the_window() {
        let mut engine = engine(60);
        let now = 1_000.0;
        engine.add_event_at(&at(990.0, 1.0), now).unwrap();

        let skewed = engine.add_event_at(&at(now + 3_600.0, 1.0), now);
        assert!(matches!(
            skewed,
            Err(AggregationError::FutureEvent { limit, .. }) if limit == now + 60.0
        ));
        assert_eq!(engine.open_window_bounds(), Some((960.0, 1_020.0)));

        // On-time traffic keeps landing in the open window.
        engine.add_event_at(&at(1_001.0, 2.0), now).unwrap();
        assert_eq!(engine.late_events(), 0);
        engine.flush();
        assert_eq!(engine.drain_finalized()[0].event_count(), 2);
    }

    #[test]
    fn events_within_one_window_of_now_are_accepted() {
        let mut engine = engine(60);
        let now = 1_000.0;
        engine.add_event_at(&at(now + 60.0, 1.0), now).unwrap();
        assert_eq!(engine.open_window_bounds(), Some((1_020.0, 1_080.0)));
    }

    #[test]
    fn history_is_bounded() {
        let mut engine = AggregationEngine::new(Duration::from_secs(1), 3).unwrap();
        for ts in 0..6 {
            engine.add_event(&at(ts as f64, 1.0)).unwrap();
        }
        engine.flush();

        assert_eq!(engine.discarded_windows(), 3);
        let finalized = engine.drain_finalized();
        let starts: Vec<_> = finalized.iter().map(|w| w.window_start()).collect();
        assert_eq!(starts, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn uniform_values_produce_expected_summary() {
        let mut engine = engine(3_600);
        for i in 0..1_000 {
            engine
                .add_event(&at(i as f64, (i % 100 + 1) as f64))
                .unwrap();
        }
        assert!(engine.flush());

        let finalized = engine.drain_finalized();
        let summary = finalized[0].field("value").unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 100.0);
        assert!((summary.avg - 50.5).abs() < 1e-9);
        assert!((summary.p50 - 50.0).abs() <= 1.0);
    }

    #[test]
    fn non_finite_timestamps_are_rejected() {
        let mut engine = engine(60);
        let result = engine.add_event(&at(f64::NAN, 1.0));
        assert!(matches!(result, Err(AggregationError::OutOfWindow { .. })));
        assert_eq!(engine.open_window_bounds(), None);
    }
}
