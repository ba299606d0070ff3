//! Per-sink counters

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Counters for a single sink, shared between its handle and worker
#[derive(Debug, Default)]
pub struct SinkMetrics {
    queue_len: AtomicUsize,
    write_count: AtomicU64,
    failure_count: AtomicU64,
    dropped_count: AtomicU64,
    /// Sum of successful write durations, microseconds
    write_micros: AtomicU64,
    /// Frame id of the last successful write, `u64::MAX` before any
    last_written: AtomicU64,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self {
            last_written: AtomicU64::new(u64::MAX),
            ..Self::default()
        }
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    /// Record a successful write of `frame_id` that took `elapsed`
    pub fn record_write(&self, frame_id: u64, elapsed: Duration) {
        self.write_count.fetch_add(1, Ordering::Relaxed);
        self.write_micros
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        self.last_written.store(frame_id, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    pub fn inc_dropped_count(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn last_written(&self) -> Option<u64> {
        match self.last_written.load(Ordering::Relaxed) {
            u64::MAX => None,
            id => Some(id),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let write_count = self.write_count();
        let avg_write_ms = if write_count == 0 {
            0.0
        } else {
            self.write_micros.load(Ordering::Relaxed) as f64 / write_count as f64 / 1000.0
        };
        MetricsSnapshot {
            queue_len: self.queue_len(),
            write_count,
            failure_count: self.failure_count(),
            dropped_count: self.dropped_count(),
            avg_write_ms,
            last_written: self.last_written(),
        }
    }
}

/// Point-in-time copy of [`SinkMetrics`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub write_count: u64,
    pub failure_count: u64,
    pub dropped_count: u64,
    pub avg_write_ms: f64,
    pub last_written: Option<u64>,
}

impl MetricsSnapshot {
    /// Frames offered to the sink, whatever happened to them
    pub fn offered(&self) -> u64 {
        self.write_count + self.failure_count + self.dropped_count + self.queue_len as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_before_writes() {
        let snap = SinkMetrics::new().snapshot();
        assert_eq!(snap.write_count, 0);
        assert_eq!(snap.avg_write_ms, 0.0);
        assert_eq!(snap.last_written, None);
    }

    #[test]
    fn test_average_write_time() {
        let metrics = SinkMetrics::new();
        metrics.record_write(3, Duration::from_millis(2));
        metrics.record_write(4, Duration::from_millis(4));
        metrics.inc_dropped_count();

        let snap = metrics.snapshot();
        assert_eq!(snap.write_count, 2);
        assert!((snap.avg_write_ms - 3.0).abs() < 1e-9);
        assert_eq!(snap.last_written, Some(4));
        assert_eq!(snap.offered(), 3);
    }
}
