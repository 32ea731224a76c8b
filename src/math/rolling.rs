//! Fixed-size rolling window with O(1) mean and standard deviation.
//!
//! Maintains a running sum and sum of squares alongside the sample
//! deque so that every push updates the statistics in constant time.
//! Long-lived running sums accumulate floating-point drift, so the
//! sums are recomputed from the stored samples at a fixed cadence.

use std::collections::VecDeque;

/// Number of pushes between full recomputations of the running sums.
const REFRESH_INTERVAL: u64 = 1024;

/// A bounded window of `f64` samples with incremental statistics.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    samples: VecDeque<f64>,
    capacity: usize,
    sum: f64,
    sum_sq: f64,
    pushes: u64,
}

impl RollingWindow {
    /// Create a window holding at most `capacity` samples.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be positive");
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
            sum: 0.0,
            sum_sq: 0.0,
            pushes: 0,
        }
    }

    /// Push a sample, evicting the oldest once the window is full.
    pub fn push(&mut self, value: f64) {
        self.samples.push_back(value);
        self.sum += value;
        self.sum_sq += value * value;

        if self.samples.len() > self.capacity {
            if let Some(old) = self.samples.pop_front() {
                self.sum -= old;
                self.sum_sq -= old * old;
            }
        }

        self.pushes += 1;
        if self.pushes % REFRESH_INTERVAL == 0 {
            self.refresh();
        }
    }

    /// Recompute the running sums from the stored samples.
    pub fn refresh(&mut self) {
        self.sum = self.samples.iter().sum();
        self.sum_sq = self.samples.iter().map(|v| v * v).sum();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once the window holds `capacity` samples.
    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.sum / self.samples.len() as f64
    }

    /// Population standard deviation. Rounding can push the incremental
    /// variance slightly negative, so it is clamped at zero.
    pub fn std_dev(&self) -> f64 {
        if self.samples.len() < 2 {
            return 0.0;
        }
        let n = self.samples.len() as f64;
        let mean = self.sum / n;
        let variance = (self.sum_sq / n) - (mean * mean);
        variance.max(0.0).sqrt()
    }

    /// Z-score of `value` against the window. Zero when the window is
    /// degenerate (fewer than two samples or zero deviation).
    pub fn z_score(&self, value: f64) -> f64 {
        let std = self.std_dev();
        if std < 1e-10 {
            return 0.0;
        }
        (value - self.mean()) / std
    }

    pub fn back(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.samples.iter()
    }

    /// Samples as a contiguous vector, oldest first.
    pub fn as_vec(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        let mut w = RollingWindow::new(4);
        for v in [2.0, 4.0, 4.0, 4.0] {
            w.push(v);
        }
        assert!((w.mean() - 3.5).abs() < 1e-12);
        // population variance = ((2-3.5)^2 + 3*(4-3.5)^2) / 4 = 0.75
        assert!((w.std_dev() - 0.75f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_eviction_keeps_capacity() {
        let mut w = RollingWindow::new(3);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            w.push(v);
        }
        assert_eq!(w.len(), 3);
        assert_eq!(w.as_vec(), vec![3.0, 4.0, 5.0]);
        assert!((w.mean() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_z_score_flat_window_is_zero() {
        let mut w = RollingWindow::new(5);
        for _ in 0..5 {
            w.push(100.0);
        }
        assert_eq!(w.z_score(110.0), 0.0);
    }

    #[test]
    fn test_z_score_matches_direct_computation() {
        let mut w = RollingWindow::new(20);
        for _ in 0..19 {
            w.push(100.0);
        }
        w.push(110.0);
        // mean = 100.5, population variance = 4.75
        let expected = 9.5 / 4.75f64.sqrt();
        assert!((w.z_score(110.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_refresh_removes_drift() {
        let mut w = RollingWindow::new(8);
        for i in 0..10_000 {
            w.push(1e9 + (i % 7) as f64 * 0.1);
        }
        let incremental = w.std_dev();
        w.refresh();
        let exact = w.std_dev();
        assert!((incremental - exact).abs() < 1e-3);
    }

    #[test]
    #[should_panic]
    fn test_zero_capacity_panics() {
        RollingWindow::new(0);
    }
}
