// Autosave metrics
//
// Lightweight counters for how often saves are scheduled, coalesced and run

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Per-proxy autosave counters
///
/// Uses atomic operations so the timer task and the owning proxy can both
/// record events without locks.
#[derive(Debug)]
pub struct AutosaveMetrics {
    /// Tracked writes that scheduled a save
    pub saves_scheduled: AtomicU64,

    /// Pending saves replaced by a later tracked write before firing
    pub saves_superseded: AtomicU64,

    /// Saves run by the timer after the quiet period
    pub automatic_saves: AtomicU64,

    /// Saves run synchronously by a forced flush
    pub forced_flushes: AtomicU64,

    /// Pending saves dropped without running
    pub saves_cancelled: AtomicU64,

    /// Save functions that returned an error
    pub save_failures: AtomicU64,

    /// Writes that did not pass the property filter
    pub untracked_writes: AtomicU64,

    /// Proxy creation time
    start_time: Instant,
}

impl AutosaveMetrics {
    pub fn new() -> Self {
        Self {
            saves_scheduled: AtomicU64::new(0),
            saves_superseded: AtomicU64::new(0),
            automatic_saves: AtomicU64::new(0),
            forced_flushes: AtomicU64::new(0),
            saves_cancelled: AtomicU64::new(0),
            save_failures: AtomicU64::new(0),
            untracked_writes: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_scheduled(&self, superseded: bool) {
        self.saves_scheduled.fetch_add(1, Ordering::Relaxed);
        if superseded {
            self.saves_superseded.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_automatic_save(&self) {
        self.automatic_saves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_forced_flush(&self) {
        self.forced_flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancelled(&self) {
        self.saves_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_save_failure(&self) {
        self.save_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_untracked_write(&self) {
        self.untracked_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Total number of saves that actually ran (successful or not)
    pub fn saves_run(&self) -> u64 {
        self.automatic_saves.load(Ordering::Relaxed) + self.forced_flushes.load(Ordering::Relaxed)
    }

    /// Fraction of scheduled saves that were coalesced into a later one
    pub fn coalescing_ratio(&self) -> f64 {
        let scheduled = self.saves_scheduled.load(Ordering::Relaxed);
        if scheduled > 0 {
            self.saves_superseded.load(Ordering::Relaxed) as f64 / scheduled as f64
        } else {
            0.0
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!(
            "Autosave: {} scheduled ({} superseded, {:.0}% coalesced), uptime {:.2}s",
            self.saves_scheduled.load(Ordering::Relaxed),
            self.saves_superseded.load(Ordering::Relaxed),
            self.coalescing_ratio() * 100.0,
            self.uptime().as_secs_f64()
        );
        tracing::info!(
            "Autosave: {} automatic, {} flushed, {} cancelled, {} failed, {} untracked writes",
            self.automatic_saves.load(Ordering::Relaxed),
            self.forced_flushes.load(Ordering::Relaxed),
            self.saves_cancelled.load(Ordering::Relaxed),
            self.save_failures.load(Ordering::Relaxed),
            self.untracked_writes.load(Ordering::Relaxed)
        );
    }
}

impl Default for AutosaveMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = AutosaveMetrics::new();
        assert_eq!(metrics.saves_scheduled.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.saves_run(), 0);
    }

    #[test]
    fn test_record_scheduled() {
        let metrics = AutosaveMetrics::new();

        metrics.record_scheduled(false);
        metrics.record_scheduled(true);
        metrics.record_scheduled(true);

        assert_eq!(metrics.saves_scheduled.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.saves_superseded.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_saves_run_counts_both_paths() {
        let metrics = AutosaveMetrics::new();

        metrics.record_automatic_save();
        metrics.record_forced_flush();
        metrics.record_cancelled();

        assert_eq!(metrics.saves_run(), 2);
        assert_eq!(metrics.saves_cancelled.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_coalescing_ratio() {
        let metrics = AutosaveMetrics::new();
        assert_eq!(metrics.coalescing_ratio(), 0.0);

        metrics.record_scheduled(false);
        metrics.record_scheduled(true);
        metrics.record_scheduled(true);
        metrics.record_scheduled(true);

        assert_eq!(metrics.coalescing_ratio(), 0.75);
    }
}
