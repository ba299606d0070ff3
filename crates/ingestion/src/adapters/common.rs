//! Adapter common utility functions

use async_channel::{Receiver, Sender, TrySendError};
use contracts::{ColorFrame, DropPolicy};
use tracing::{trace, warn};

use crate::config::IngestionMetrics;

/// Eviction attempts before a DropOldest send gives up and drops the incoming frame
const MAX_EVICTIONS: usize = 4;

/// Producer side of the bounded color queue.
///
/// Keeps a receiver handle so the oldest pending frame can be evicted.
#[derive(Clone)]
pub struct ColorQueue {
    tx: Sender<ColorFrame>,
    evict: Receiver<ColorFrame>,
}

impl ColorQueue {
    /// Create a queue, returning the producer side and the consumer receiver
    pub fn bounded(capacity: usize) -> (Self, Receiver<ColorFrame>) {
        let (tx, rx) = async_channel::bounded(capacity.max(1));
        (
            Self {
                tx,
                evict: rx.clone(),
            },
            rx,
        )
    }

    /// Frames currently pending
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    /// Close the queue; the consumer drains what is left and then sees the end
    pub fn close(&self) -> bool {
        self.tx.close()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Send color frame, handling backpressure policy
#[inline]
pub fn send_color_frame(
    queue: &ColorQueue,
    frame: ColorFrame,
    metrics: &IngestionMetrics,
    stream: &str,
    drop_policy: DropPolicy,
) {
    let mut pending = frame;
    for _ in 0..=MAX_EVICTIONS {
        match queue.tx.try_send(pending) {
            Ok(()) => {
                metrics.update_color_queue_len(queue.len());
                trace!(stream = %stream, "color frame queued");
                return;
            }
            Err(TrySendError::Full(rejected)) => match drop_policy {
                DropPolicy::DropNewest => {
                    metrics.record_color_dropped();
                    trace!(stream = %stream, frame_id = ?rejected.frame_id, "color frame dropped (newest)");
                    return;
                }
                DropPolicy::DropOldest => {
                    if let Ok(evicted) = queue.evict.try_recv() {
                        metrics.record_color_dropped();
                        trace!(stream = %stream, frame_id = ?evicted.frame_id, "color frame dropped (oldest)");
                    }
                    pending = rejected;
                }
            },
            Err(TrySendError::Closed(_)) => {
                warn!(stream = %stream, "color queue closed");
                return;
            }
        }
    }
    metrics.record_color_dropped();
    trace!(stream = %stream, frame_id = ?pending.frame_id, "color frame dropped after eviction retries");
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::PixelLayout;

    fn frame(id: u64) -> ColorFrame {
        ColorFrame {
            width: 1,
            height: 1,
            layout: PixelLayout::Bgr8,
            data: Bytes::from_static(&[0, 0, 0]),
            timestamp: id as f64,
            frame_id: Some(id),
        }
    }

    #[test]
    fn test_drop_oldest_keeps_latest_frames() {
        let (queue, rx) = ColorQueue::bounded(2);
        let metrics = IngestionMetrics::new();

        for id in 1..=4 {
            send_color_frame(&queue, frame(id), &metrics, "color", DropPolicy::DropOldest);
        }

        let ids: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|f| f.frame_id.unwrap())
            .collect();
        assert_eq!(ids, vec![3, 4]);
        assert_eq!(metrics.snapshot().color_dropped, 2);
    }

    #[test]
    fn test_drop_newest_keeps_first_frames() {
        let (queue, rx) = ColorQueue::bounded(2);
        let metrics = IngestionMetrics::new();

        for id in 1..=4 {
            send_color_frame(&queue, frame(id), &metrics, "color", DropPolicy::DropNewest);
        }

        let ids: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|f| f.frame_id.unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(metrics.snapshot().color_dropped, 2);
    }

    #[test]
    fn test_closed_queue() {
        let (queue, rx) = ColorQueue::bounded(2);
        let metrics = IngestionMetrics::new();
        assert!(queue.close());
        send_color_frame(&queue, frame(1), &metrics, "color", DropPolicy::DropOldest);
        assert!(rx.try_recv().is_err());
        assert_eq!(metrics.snapshot().color_dropped, 0);
    }
}
