// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;

/// Percentile of an ascending-sorted slice by linear interpolation.
///
/// The rank is `p / 100 * (n - 1)`; values between two ranks are interpolated.
/// Returns `None` for an empty slice. `p` is clamped to `[0, 100]`.
///
/// ```
/// use the_sluice::aggregation::percentile;
///
/// let values: Vec<f64> = (1..=100).map(f64::from).collect();
/// assert_eq!(percentile(&values, 50.0), Some(50.5));
/// assert_eq!(percentile(&values, 0.0), Some(1.0));
/// assert_eq!(percentile(&values, 100.0), Some(100.0));
/// ```
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = p.clamp(0.0, 100.0) / 100.0 * last as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        return Some(sorted[lower]);
    }
    let weight = rank - lower as f64;
    Some(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
}

/// Population standard deviation around `mean`.
pub fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Running statistics for one numeric field of an open window.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldStats {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
    values: Vec<f64>,
}

impl FieldStats {
    pub fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            values: Vec::new(),
        }
    }

    pub fn record(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.values.push(value);
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consume the raw values and compute the final summary. Values are sorted
    /// once and dropped afterwards.
    pub fn summarize(self) -> FieldSummary {
        let mut values = self.values;
        values.sort_by(f64::total_cmp);

        let avg = if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        };

        FieldSummary {
            count: self.count,
            sum: self.sum,
            min: self.min,
            max: self.max,
            avg,
            std_dev: population_std_dev(&values, avg),
            p50: percentile(&values, 50.0).unwrap_or(0.0),
            p95: percentile(&values, 95.0).unwrap_or(0.0),
            p99: percentile(&values, 99.0).unwrap_or(0.0),
        }
    }
}

impl Default for FieldStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Final statistics for one numeric field of a closed window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub std_dev: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_of_empty_is_none() {
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn percentile_of_single_value() {
        assert_eq!(percentile(&[7.0], 99.0), Some(7.0));
    }

    #[test]
    fn percentile_interpolates() {
        let values = [10.0, 20.0, 30.0, 40.0];
        // rank = 0.5 * 3 = 1.5
        assert_eq!(percentile(&values, 50.0), Some(25.0));
        // rank = 0.95 * 3 = 2.85
        let p95 = percentile(&values, 95.0).unwrap();
        assert!((p95 - 38.5).abs() < 1e-9);
    }

    #[test]
    fn std_dev_is_population() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std_dev(&values, 5.0) - 2.0).abs() < 1e-12);
        assert_eq!(population_std_dev(&[], 0.0), 0.0);
    }

    #[test]
    fn summary_of_uniform_1_to_100() {
        let mut stats = FieldStats::new();
        for i in (1..=100).rev() {
            stats.record(i as f64);
        }
        let summary = stats.summarize();

        assert_eq!(summary.count, 100);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 100.0);
        assert!((summary.avg - 50.5).abs() < 1e-9);
        assert!((summary.p50 - 50.5).abs() < 1e-9);
        assert!((summary.p95 - 95.05).abs() < 1e-9);
        assert!((summary.p99 - 99.01).abs() < 1e-9);
        // sqrt((100^2 - 1) / 12)
        assert!((summary.std_dev - 28.866_070_047_722_118).abs() < 1e-9);
        assert!(summary.min <= summary.p50 && summary.p50 <= summary.p95);
        assert!(summary.p95 <= summary.p99 && summary.p99 <= summary.max);
    }
}
