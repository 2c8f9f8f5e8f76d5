// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bounded FIFO shared by producers and stream processor workers.
//!
//! # Waiting
//!
//! `add` and `get_batch` are the only operations that wait, and both take an
//! explicit timeout. Expiry is a normal outcome: `add` answers `false` and
//! `get_batch` answers an empty batch.
//!
//! Wakeups use two `Notify` handles. A waiter registers interest (`enable`)
//! before it inspects the store, so a notification sent between the check and
//! the wait is never lost.
//!
//! # Accounting
//!
//! `total_added` counts every item offered, accepted or not. Once the buffer
//! is drained with no producers left, `total_added == total_consumed +
//! total_dropped` and `drop_rate == total_dropped / total_added`.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use the_sluice::buffer::IngestionBuffer;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let buffer = IngestionBuffer::new(2);
//! assert!(buffer.add(b"a".to_vec(), Duration::ZERO).await);
//! assert!(buffer.add(b"b".to_vec(), Duration::ZERO).await);
//! assert!(!buffer.add(b"c".to_vec(), Duration::ZERO).await);
//!
//! let batch = buffer.get_batch(10, Duration::from_millis(10)).await;
//! assert_eq!(batch, vec![b"a".to_vec(), b"b".to_vec()]);
//! assert_eq!(buffer.stats().await.total_dropped, 1);
//! # }
//! ```

use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use crate::buffer::ResizePolicy;
use crate::observability::messages::buffer::{BufferResized, ItemsDropped, ResizeSkippedAtCeiling};
use crate::observability::messages::StructuredLog;

/// Consistent point-in-time view of the buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BufferStats {
    pub current_size: usize,
    pub capacity: usize,
    pub utilization: f64,
    pub total_added: u64,
    pub total_consumed: u64,
    pub total_dropped: u64,
    pub high_water_mark: usize,
    pub drop_rate: f64,
    pub resize_count: u64,
}

struct BufferState<T> {
    items: VecDeque<T>,
    capacity: usize,
    total_added: u64,
    total_consumed: u64,
    total_dropped: u64,
    high_water_mark: usize,
    resize_count: u64,
    last_resize: Option<Instant>,
}

impl<T> BufferState<T> {
    fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            return 1.0;
        }
        self.items.len() as f64 / self.capacity as f64
    }

    fn free_slots(&self) -> usize {
        self.capacity.saturating_sub(self.items.len())
    }

    fn push(&mut self, item: T) {
        self.items.push_back(item);
        self.total_added += 1;
        self.high_water_mark = self.high_water_mark.max(self.items.len());
    }

    fn record_drops(&mut self, count: usize) {
        self.total_added += count as u64;
        self.total_dropped += count as u64;
    }
}

/// Bounded, concurrency-safe holding area between producers and workers.
///
/// The internal lock is never handed out; callers only see `add`,
/// `add_batch`, `get_batch` and `stats`.
pub struct IngestionBuffer<T = Vec<u8>> {
    state: Mutex<BufferState<T>>,
    item_available: Notify,
    space_available: Notify,
    resize_policy: Option<ResizePolicy>,
}

impl<T: Send> IngestionBuffer<T> {
    /// Fixed-capacity buffer.
    pub fn new(capacity: usize) -> Self {
        Self::build(capacity, None)
    }

    /// Buffer that grows under sustained pressure according to `policy`.
    pub fn adaptive(capacity: usize, policy: ResizePolicy) -> Self {
        Self::build(capacity, Some(policy))
    }

    fn build(capacity: usize, resize_policy: Option<ResizePolicy>) -> Self {
        Self {
            state: Mutex::new(BufferState {
                items: VecDeque::with_capacity(capacity),
                capacity,
                total_added: 0,
                total_consumed: 0,
                total_dropped: 0,
                high_water_mark: 0,
                resize_count: 0,
                last_resize: None,
            }),
            item_available: Notify::new(),
            space_available: Notify::new(),
            resize_policy,
        }
    }

    pub fn is_adaptive(&self) -> bool {
        self.resize_policy.is_some()
    }

    /// Offer one item, waiting up to `timeout` for space.
    ///
    /// Returns `false` and counts a drop when no space frees up in time.
    pub async fn add(&self, item: T, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let space = self.space_available.notified();
            tokio::pin!(space);
            space.as_mut().enable();

            {
                let mut state = self.state.lock().await;
                if state.free_slots() > 0 {
                    state.push(item);
                    self.maybe_grow(&mut state);
                    drop(state);
                    self.item_available.notify_waiters();
                    return true;
                }
            }

            if tokio::time::timeout_at(deadline, space).await.is_err() {
                let mut state = self.state.lock().await;
                state.record_drops(1);
                ItemsDropped {
                    dropped: 1,
                    capacity: state.capacity,
                    total_dropped: state.total_dropped,
                }
                .log();
                return false;
            }
        }
    }

    /// Accept as many items as currently fit without waiting.
    ///
    /// Items are taken in order; the overflow is counted as dropped.
    pub async fn add_batch(&self, items: Vec<T>) -> usize {
        let offered = items.len();
        let mut state = self.state.lock().await;
        let accepted = offered.min(state.free_slots());

        for item in items.into_iter().take(accepted) {
            state.push(item);
        }
        if accepted > 0 {
            self.maybe_grow(&mut state);
        }

        let dropped = offered - accepted;
        if dropped > 0 {
            state.record_drops(dropped);
            ItemsDropped {
                dropped,
                capacity: state.capacity,
                total_dropped: state.total_dropped,
            }
            .log();
        }
        drop(state);

        if accepted > 0 {
            self.item_available.notify_waiters();
        }
        accepted
    }

    /// Take up to `max_items` in insertion order, waiting up to `timeout` for
    /// the first one. An empty batch means the wait expired.
    pub async fn get_batch(&self, max_items: usize, timeout: Duration) -> Vec<T> {
        if max_items == 0 {
            return Vec::new();
        }

        let deadline = Instant::now() + timeout;
        loop {
            let available = self.item_available.notified();
            tokio::pin!(available);
            available.as_mut().enable();

            {
                let mut state = self.state.lock().await;
                if !state.items.is_empty() {
                    let take = max_items.min(state.items.len());
                    let batch: Vec<T> = state.items.drain(..take).collect();
                    state.total_consumed += batch.len() as u64;
                    drop(state);
                    self.space_available.notify_waiters();
                    return batch;
                }
            }

            if tokio::time::timeout_at(deadline, available).await.is_err() {
                return Vec::new();
            }
        }
    }

    pub async fn stats(&self) -> BufferStats {
        let state = self.state.lock().await;
        let drop_rate = if state.total_added == 0 {
            0.0
        } else {
            state.total_dropped as f64 / state.total_added as f64
        };

        BufferStats {
            current_size: state.items.len(),
            capacity: state.capacity,
            utilization: state.utilization(),
            total_added: state.total_added,
            total_consumed: state.total_consumed,
            total_dropped: state.total_dropped,
            high_water_mark: state.high_water_mark,
            drop_rate,
            resize_count: state.resize_count,
        }
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.items.is_empty()
    }

    pub async fn capacity(&self) -> usize {
        self.state.lock().await.capacity
    }

    /// Runs with the store lock held, so the capacity swap is atomic with
    /// respect to every other buffer operation.
    fn maybe_grow(&self, state: &mut BufferState<T>) {
        let Some(policy) = &self.resize_policy else {
            return;
        };

        let utilization = state.utilization();
        if utilization <= policy.threshold {
            return;
        }

        if state.capacity >= policy.max_capacity {
            ResizeSkippedAtCeiling {
                capacity: state.capacity,
                max_capacity: policy.max_capacity,
                utilization,
            }
            .log();
            return;
        }

        if let Some(last) = state.last_resize {
            if last.elapsed() < policy.cooldown {
                return;
            }
        }

        let old_capacity = state.capacity;
        let new_capacity = policy.next_capacity(old_capacity);
        let len = state.items.len();
        state.items.reserve(new_capacity.saturating_sub(len));
        state.capacity = new_capacity;
        state.resize_count += 1;
        state.last_resize = Some(Instant::now());

        BufferResized {
            old_capacity,
            new_capacity,
            utilization,
        }
        .log();

        // Producers parked on a full buffer can proceed now.
        self.space_available.notify_waiters();
    }
}
