// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use crate::config::consts::{
    DEFAULT_GROWTH_FACTOR, DEFAULT_MAX_CAPACITY, DEFAULT_RESIZE_COOLDOWN_SECS,
    DEFAULT_RESIZE_THRESHOLD,
};

/// Growth rules for the adaptive buffer.
///
/// Growth happens after an accepted add when utilization is strictly above
/// `threshold`, at least `cooldown` has passed since the previous resize, and
/// capacity is still below `max_capacity`. Capacity never shrinks.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizePolicy {
    pub threshold: f64,
    pub max_capacity: usize,
    pub growth_factor: f64,
    pub cooldown: Duration,
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_RESIZE_THRESHOLD,
            max_capacity: DEFAULT_MAX_CAPACITY,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            cooldown: Duration::from_secs(DEFAULT_RESIZE_COOLDOWN_SECS),
        }
    }
}

impl ResizePolicy {
    /// Capacity after one growth step, capped at `max_capacity`.
    ///
    /// Always at least one slot larger than `current` unless the cap is reached.
    pub fn next_capacity(&self, current: usize) -> usize {
        let grown = (current as f64 * self.growth_factor).ceil() as usize;
        grown.max(current + 1).min(self.max_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_by_factor() {
        let policy = ResizePolicy {
            max_capacity: 1000,
            ..ResizePolicy::default()
        };
        assert_eq!(policy.next_capacity(100), 150);
        assert_eq!(policy.next_capacity(150), 225);
    }

    #[test]
    fn growth_is_capped() {
        let policy = ResizePolicy {
            max_capacity: 120,
            ..ResizePolicy::default()
        };
        assert_eq!(policy.next_capacity(100), 120);
        assert_eq!(policy.next_capacity(120), 120);
    }

    #[test]
    fn tiny_buffers_still_grow() {
        let policy = ResizePolicy {
            growth_factor: 1.1,
            max_capacity: 10,
            ..ResizePolicy::default()
        };
        assert_eq!(policy.next_capacity(1), 2);
    }
}
