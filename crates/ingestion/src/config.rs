//! Backpressure configuration and metrics

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use contracts::IngestionConfig;
pub use contracts::DropPolicy;

/// Backpressure configuration for the color queue
#[derive(Debug, Clone)]
pub struct BackpressureConfig {
    /// Channel capacity
    pub channel_capacity: usize,

    /// Drop policy when full
    pub drop_policy: DropPolicy,
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 4,
            drop_policy: DropPolicy::DropOldest,
        }
    }
}

impl BackpressureConfig {
    /// Create new backpressure configuration
    pub fn new(channel_capacity: usize, drop_policy: DropPolicy) -> Self {
        Self {
            channel_capacity,
            drop_policy,
        }
    }
}

impl From<&IngestionConfig> for BackpressureConfig {
    fn from(config: &IngestionConfig) -> Self {
        Self::new(config.color_queue_capacity, config.drop_policy)
    }
}

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Raw depth messages seen
    pub depth_received: AtomicU64,

    /// Depth messages decoded and published to the store
    pub depth_accepted: AtomicU64,

    /// Depth messages rejected for their encoding
    pub unsupported_encodings: AtomicU64,

    /// Depth messages rejected as malformed
    pub decode_errors: AtomicU64,

    /// Color frames seen
    pub color_received: AtomicU64,

    /// Color frames discarded by the drop policy
    pub color_dropped: AtomicU64,

    /// Current color queue length
    pub color_queue_len: AtomicUsize,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_depth_received(&self) {
        self.depth_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_depth_accepted(&self) {
        self.depth_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unsupported_encoding(&self) {
        self.unsupported_encodings.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_color_received(&self) {
        self.color_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_color_dropped(&self) {
        self.color_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Update queue length
    pub fn update_color_queue_len(&self, len: usize) {
        self.color_queue_len.store(len, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            depth_received: self.depth_received.load(Ordering::Relaxed),
            depth_accepted: self.depth_accepted.load(Ordering::Relaxed),
            unsupported_encodings: self.unsupported_encodings.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            color_received: self.color_received.load(Ordering::Relaxed),
            color_dropped: self.color_dropped.load(Ordering::Relaxed),
            color_queue_len: self.color_queue_len.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub depth_received: u64,
    pub depth_accepted: u64,
    pub unsupported_encodings: u64,
    pub decode_errors: u64,
    pub color_received: u64,
    pub color_dropped: u64,
    pub color_queue_len: usize,
}

impl MetricsSnapshot {
    /// Depth messages rejected for any reason
    pub fn depth_rejected(&self) -> u64 {
        self.unsupported_encodings + self.decode_errors
    }
}
