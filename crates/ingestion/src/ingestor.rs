//! Depth ingestor
//!
//! Decodes raw depth messages and publishes them into the shared store.
//! Failures are logged and counted here; the previous frame stays current.

use std::sync::Arc;

use contracts::RawDepthMessage;
use tracing::{debug, error, warn};

use crate::config::IngestionMetrics;
use crate::decode::decode_depth;
use crate::error::Result;
use crate::store::DepthFrameStore;

/// Depth ingestor
pub struct DepthIngestor {
    store: Arc<DepthFrameStore>,
    metrics: Arc<IngestionMetrics>,
}

impl DepthIngestor {
    pub fn new(store: Arc<DepthFrameStore>, metrics: Arc<IngestionMetrics>) -> Self {
        Self { store, metrics }
    }

    /// Decode one message and, on success, make it the current depth frame.
    ///
    /// The error is returned for the caller's information only; it has
    /// already been logged and must not stop the stream.
    pub fn ingest(&self, msg: &RawDepthMessage) -> Result<()> {
        self.metrics.record_depth_received();

        let frame = match decode_depth(msg) {
            Ok(frame) => frame,
            Err(err) => {
                if err.is_unsupported_encoding() {
                    self.metrics.record_unsupported_encoding();
                    warn!(
                        encoding = %msg.encoding,
                        frame_id = ?msg.frame_id,
                        "unsupported depth encoding, keeping previous frame"
                    );
                } else {
                    self.metrics.record_decode_error();
                    error!(
                        encoding = %msg.encoding,
                        width = msg.width,
                        height = msg.height,
                        step = msg.step,
                        bytes = msg.data.len(),
                        frame_id = ?msg.frame_id,
                        error = %err,
                        "failed to decode depth frame"
                    );
                }
                metrics::counter!("depth_frames_total", "outcome" => err.kind()).increment(1);
                return Err(err);
            }
        };

        let frame = self.store.replace(frame);
        self.metrics.record_depth_accepted();
        metrics::counter!("depth_frames_total", "outcome" => "accepted").increment(1);

        match frame.depth_range() {
            Some((min, max)) => debug!(
                encoding = %frame.encoding,
                width = frame.width,
                height = frame.height,
                min_m = min,
                max_m = max,
                coverage = frame.coverage(),
                version = self.store.version(),
                "depth frame published"
            ),
            None => debug!(
                encoding = %frame.encoding,
                width = frame.width,
                height = frame.height,
                version = self.store.version(),
                "depth frame published with no valid samples"
            ),
        }

        Ok(())
    }

    /// Shared store this ingestor writes to
    pub fn store(&self) -> &Arc<DepthFrameStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use bytes::Bytes;

    fn mono16(values: &[u16], width: u32, height: u32) -> RawDepthMessage {
        RawDepthMessage {
            encoding: "16UC1".into(),
            width,
            height,
            step: width * 2,
            is_bigendian: false,
            data: Bytes::from(
                values
                    .iter()
                    .flat_map(|v| v.to_le_bytes())
                    .collect::<Vec<u8>>(),
            ),
            timestamp: 0.5,
            frame_id: Some(1),
        }
    }

    fn ingestor() -> (DepthIngestor, Arc<DepthFrameStore>, Arc<IngestionMetrics>) {
        let store = Arc::new(DepthFrameStore::new());
        let metrics = Arc::new(IngestionMetrics::new());
        (
            DepthIngestor::new(store.clone(), metrics.clone()),
            store,
            metrics,
        )
    }

    #[test]
    fn test_first_ingest_populates_store() {
        let (ingestor, store, metrics) = ingestor();
        assert!(store.current_frame().is_none());

        ingestor.ingest(&mono16(&[1000, 2000], 2, 1)).unwrap();

        let frame = store.current_frame().unwrap();
        assert_eq!((frame.width, frame.height), (2, 1));
        assert!((frame.sample(1, 0).unwrap() - 2.0).abs() < 1e-6);
        assert_eq!(metrics.snapshot().depth_accepted, 1);
    }

    #[test]
    fn test_unsupported_encoding_keeps_previous_frame() {
        let (ingestor, store, metrics) = ingestor();
        ingestor.ingest(&mono16(&[1500], 1, 1)).unwrap();
        let before = store.current_frame().unwrap();

        let mut bad = mono16(&[9999], 1, 1);
        bad.encoding = "bgr8".into();
        let err = ingestor.ingest(&bad).unwrap_err();

        assert!(err.is_unsupported_encoding());
        let after = store.current_frame().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(store.version(), 1);

        let snap = metrics.snapshot();
        assert_eq!(snap.depth_received, 2);
        assert_eq!(snap.unsupported_encodings, 1);
    }

    #[test]
    fn test_malformed_payload_keeps_previous_frame() {
        let (ingestor, store, metrics) = ingestor();
        ingestor.ingest(&mono16(&[1500], 1, 1)).unwrap();

        let mut bad = mono16(&[1, 2, 3], 2, 2);
        bad.step = 4;
        let err = ingestor.ingest(&bad).unwrap_err();

        assert!(matches!(err, DecodeError::SizeMismatch { .. }));
        assert_eq!(store.current_frame().unwrap().width, 1);
        assert_eq!(metrics.snapshot().decode_errors, 1);
    }

    #[test]
    fn test_error_before_first_frame_leaves_store_empty() {
        let (ingestor, store, _) = ingestor();
        let mut bad = mono16(&[1], 1, 1);
        bad.encoding = "8UC1".into();
        assert!(ingestor.ingest(&bad).is_err());
        assert!(store.current_frame().is_none());
    }
}
