//! Facility metrics for observability
//!
//! Counters for records accepted or suppressed at the logger level and for
//! what handlers did with them.

use super::handler::HandleOutcome;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for facility observability
///
/// # Example
///
/// ```
/// use rust_logging_facility::core::FacilityMetrics;
///
/// let metrics = FacilityMetrics::new();
///
/// metrics.record_emitted();
/// metrics.record_suppressed();
///
/// assert_eq!(metrics.emitted(), 1);
/// assert_eq!(metrics.suppressed(), 1);
/// ```
#[derive(Debug)]
pub struct FacilityMetrics {
    /// Records that passed their logger's effective level
    emitted: AtomicU64,

    /// Records dropped by the logger level check
    suppressed: AtomicU64,

    /// Successful handler writes
    writes: AtomicU64,

    /// Handler minimum-level rejections
    rejections: AtomicU64,

    /// Render or write failures reported to the error callback
    write_failures: AtomicU64,

    /// Records that found no handler and went to the last-resort handler
    last_resort: AtomicU64,
}

impl FacilityMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            emitted: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            rejections: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            last_resort: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn suppressed(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejections(&self) -> u64 {
        self.rejections.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn last_resort_uses(&self) -> u64 {
        self.last_resort.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_emitted(&self) -> u64 {
        self.emitted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_suppressed(&self) -> u64 {
        self.suppressed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_last_resort(&self) -> u64 {
        self.last_resort.fetch_add(1, Ordering::Relaxed)
    }

    /// Count one handler outcome
    #[inline]
    pub fn record_outcome(&self, outcome: HandleOutcome) {
        let counter = match outcome {
            HandleOutcome::Written => &self.writes,
            HandleOutcome::Rejected => &self.rejections,
            HandleOutcome::Failed => &self.write_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Share of emitted records whose writes failed, as a percentage
    ///
    /// Returns 0.0 if nothing has been written or attempted.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.write_failures() as f64;
        let total = self.writes() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.emitted.store(0, Ordering::Relaxed);
        self.suppressed.store(0, Ordering::Relaxed);
        self.writes.store(0, Ordering::Relaxed);
        self.rejections.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
        self.last_resort.store(0, Ordering::Relaxed);
    }
}

impl Default for FacilityMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for FacilityMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            emitted: AtomicU64::new(self.emitted()),
            suppressed: AtomicU64::new(self.suppressed()),
            writes: AtomicU64::new(self.writes()),
            rejections: AtomicU64::new(self.rejections()),
            write_failures: AtomicU64::new(self.write_failures()),
            last_resort: AtomicU64::new(self.last_resort_uses()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = FacilityMetrics::new();
        assert_eq!(metrics.emitted(), 0);
        assert_eq!(metrics.suppressed(), 0);
        assert_eq!(metrics.writes(), 0);
        assert_eq!(metrics.rejections(), 0);
        assert_eq!(metrics.write_failures(), 0);
        assert_eq!(metrics.last_resort_uses(), 0);
    }

    #[test]
    fn test_record_returns_previous_value() {
        let metrics = FacilityMetrics::new();
        assert_eq!(metrics.record_emitted(), 0);
        assert_eq!(metrics.record_emitted(), 1);
        assert_eq!(metrics.emitted(), 2);
    }

    #[test]
    fn test_outcomes_counted_separately() {
        let metrics = FacilityMetrics::new();
        metrics.record_outcome(HandleOutcome::Written);
        metrics.record_outcome(HandleOutcome::Written);
        metrics.record_outcome(HandleOutcome::Rejected);
        metrics.record_outcome(HandleOutcome::Failed);

        assert_eq!(metrics.writes(), 2);
        assert_eq!(metrics.rejections(), 1);
        assert_eq!(metrics.write_failures(), 1);
    }

    #[test]
    fn test_failure_rate() {
        let metrics = FacilityMetrics::new();
        assert_eq!(metrics.failure_rate(), 0.0);

        for _ in 0..3 {
            metrics.record_outcome(HandleOutcome::Written);
        }
        metrics.record_outcome(HandleOutcome::Failed);
        assert!((metrics.failure_rate() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = FacilityMetrics::new();
        metrics.record_emitted();
        metrics.record_last_resort();
        metrics.record_outcome(HandleOutcome::Written);

        metrics.reset();

        assert_eq!(metrics.emitted(), 0);
        assert_eq!(metrics.last_resort_uses(), 0);
        assert_eq!(metrics.writes(), 0);
    }

    #[test]
    fn test_metrics_clone_is_snapshot() {
        let metrics = FacilityMetrics::new();
        metrics.record_suppressed();

        let snapshot = metrics.clone();
        metrics.record_suppressed();

        assert_eq!(metrics.suppressed(), 2);
        assert_eq!(snapshot.suppressed(), 1);
    }
}
