//! Logger metrics for observability
//!
//! Counters for monitoring emission: how many records went out, how many
//! destination writes happened and failed, how often a record was turned
//! into text, and how many calls were dropped by level before any work.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// One instance is shared by a logger and every child derived from it.
///
/// # Example
///
/// ```
/// use rust_bunyan::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_emitted();
/// metrics.record_write();
///
/// assert_eq!(metrics.records_emitted(), 1);
/// assert_eq!(metrics.writes(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records that passed the level check and were built
    records_emitted: AtomicU64,

    /// Successful destination writes
    writes: AtomicU64,

    /// Destination writes that returned an error or panicked
    write_failures: AtomicU64,

    /// Records serialized to a JSON line
    stringify_count: AtomicU64,

    /// Serializer invocations that failed
    serializer_failures: AtomicU64,

    /// Calls short-circuited because the level was disabled
    filtered: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            records_emitted: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            stringify_count: AtomicU64::new(0),
            serializer_failures: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn records_emitted(&self) -> u64 {
        self.records_emitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn stringify_count(&self) -> u64 {
        self.stringify_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn serializer_failures(&self) -> u64 {
        self.serializer_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_emitted(&self) -> u64 {
        self.records_emitted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write(&self) -> u64 {
        self.writes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_stringify(&self) -> u64 {
        self.stringify_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_serializer_failures(&self, count: u64) -> u64 {
        self.serializer_failures.fetch_add(count, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of writes that failed, as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been written.
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
        self.records_emitted.store(0, Ordering::Relaxed);
        self.writes.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
        self.stringify_count.store(0, Ordering::Relaxed);
        self.serializer_failures.store(0, Ordering::Relaxed);
        self.filtered.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            records_emitted: AtomicU64::new(self.records_emitted()),
            writes: AtomicU64::new(self.writes()),
            write_failures: AtomicU64::new(self.write_failures()),
            stringify_count: AtomicU64::new(self.stringify_count()),
            serializer_failures: AtomicU64::new(self.serializer_failures()),
            filtered: AtomicU64::new(self.filtered()),
        }
    }
}
