//! Ingestion Pipeline main entry

use std::sync::Arc;

use async_channel::Receiver;
use contracts::{ColorFrame, FrameSource, RawDepthMessage};
use tracing::{debug, info, instrument};

use crate::adapter::StreamAdapter;
use crate::adapters::common::ColorQueue;
use crate::adapters::{ColorStreamAdapter, DepthStreamAdapter};
use crate::config::{BackpressureConfig, IngestionMetrics};
use crate::ingestor::DepthIngestor;
use crate::store::DepthFrameStore;

/// Ingestion Pipeline
///
/// Owns the depth store, the depth ingestor and the color queue, and manages
/// the stream adapters feeding them.
pub struct IngestionPipeline {
    /// Registered adapters
    adapters: Vec<Box<dyn StreamAdapter>>,

    /// Latest depth frame
    store: Arc<DepthFrameStore>,

    /// Shared by every depth adapter
    ingestor: Arc<DepthIngestor>,

    /// Shared metrics
    metrics: Arc<IngestionMetrics>,

    /// Color producer side (shared by all color adapters)
    color_queue: ColorQueue,

    /// Color receiver
    color_rx: Option<Receiver<ColorFrame>>,

    /// Color backpressure configuration
    config: BackpressureConfig,
}

impl IngestionPipeline {
    /// Create with default backpressure configuration
    pub fn new() -> Self {
        Self::with_config(BackpressureConfig::default())
    }

    /// Create with custom backpressure configuration
    pub fn with_config(config: BackpressureConfig) -> Self {
        let (color_queue, color_rx) = ColorQueue::bounded(config.channel_capacity);
        let store = Arc::new(DepthFrameStore::new());
        let metrics = Arc::new(IngestionMetrics::new());
        let ingestor = Arc::new(DepthIngestor::new(store.clone(), metrics.clone()));

        Self {
            adapters: Vec::new(),
            store,
            ingestor,
            metrics,
            color_queue,
            color_rx: Some(color_rx),
            config,
        }
    }

    /// Register the depth stream
    #[instrument(
        name = "ingestion_register_depth_source",
        skip(self, source),
        fields(stream = %source.stream_name())
    )]
    pub fn register_depth_source(&mut self, source: Box<dyn FrameSource<RawDepthMessage>>) {
        let adapter = DepthStreamAdapter::new(source, self.ingestor.clone());
        debug!("registered depth source");
        self.adapters.push(Box::new(adapter));
    }

    /// Register the color stream
    #[instrument(
        name = "ingestion_register_color_source",
        skip(self, source),
        fields(stream = %source.stream_name())
    )]
    pub fn register_color_source(&mut self, source: Box<dyn FrameSource<ColorFrame>>) {
        let adapter = ColorStreamAdapter::new(
            source,
            self.color_queue.clone(),
            self.metrics.clone(),
            self.config.clone(),
        );
        debug!("registered color source");
        self.adapters.push(Box::new(adapter));
    }

    /// Start all registered streams
    #[instrument(name = "ingestion_start_all", skip(self))]
    pub fn start_all(&self) {
        info!(count = self.adapters.len(), "starting all stream adapters");
        for adapter in &self.adapters {
            if !adapter.is_listening() {
                debug!(stream = %adapter.stream_name(), "starting adapter");
                adapter.start();
            }
        }
    }

    /// Stop all streams
    #[instrument(name = "ingestion_stop_all", skip(self))]
    pub fn stop_all(&self) {
        info!(count = self.adapters.len(), "stopping all stream adapters");
        for adapter in &self.adapters {
            if adapter.is_listening() {
                debug!(stream = %adapter.stream_name(), "stopping adapter");
                adapter.stop();
            }
        }
    }

    /// Close the color queue so the consumer ends after draining
    pub fn close_color_queue(&self) {
        if self.color_queue.close() {
            debug!("color queue closed");
        }
    }

    /// Get color frame receiver
    ///
    /// Note: Can only be called once, subsequent calls return None
    pub fn take_color_receiver(&mut self) -> Option<Receiver<ColorFrame>> {
        self.color_rx.take()
    }

    /// Shared depth store
    pub fn store(&self) -> Arc<DepthFrameStore> {
        self.store.clone()
    }

    /// Depth ingestor, for feeding messages without a registered source
    pub fn ingestor(&self) -> Arc<DepthIngestor> {
        self.ingestor.clone()
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// Get registered stream count
    pub fn stream_count(&self) -> usize {
        self.adapters.len()
    }

    /// Check if the named stream is listening
    pub fn is_stream_listening(&self, stream: &str) -> bool {
        self.adapters
            .iter()
            .find(|a| a.stream_name() == stream)
            .map(|a| a.is_listening())
            .unwrap_or(false)
    }
}

impl Default for IngestionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IngestionPipeline {
    fn drop(&mut self) {
        self.stop_all();
        self.color_queue.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockColorSource, MockDepthSource, MockStreamConfig};
    use std::time::{Duration, Instant};

    #[test]
    fn test_pipeline_creation() {
        let pipeline = IngestionPipeline::new();
        assert_eq!(pipeline.stream_count(), 0);
        assert!(pipeline.store().current_frame().is_none());
    }

    #[test]
    fn test_take_color_receiver_once() {
        let mut pipeline = IngestionPipeline::new();
        assert!(pipeline.take_color_receiver().is_some());
        assert!(pipeline.take_color_receiver().is_none());
    }

    #[test]
    fn test_streams_flow_into_store_and_queue() {
        let mut pipeline = IngestionPipeline::with_config(BackpressureConfig::new(
            2,
            contracts::DropPolicy::DropOldest,
        ));
        pipeline.register_depth_source(Box::new(MockDepthSource::mono16(
            "/depth", 200.0, 32, 18,
        )));
        pipeline.register_color_source(Box::new(MockColorSource::bgr8("/color", 200.0, 8, 4)));
        let rx = pipeline.take_color_receiver().unwrap();

        pipeline.start_all();
        assert!(pipeline.is_stream_listening("/depth"));
        assert!(pipeline.is_stream_listening("/color"));

        let deadline = Instant::now() + Duration::from_secs(2);
        while pipeline.store().current_frame().is_none() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        let color = rx.recv_blocking().unwrap();
        pipeline.stop_all();

        assert_eq!(pipeline.store().current_frame().unwrap().width, 32);
        assert_eq!(color.width, 8);
        assert!(pipeline.metrics().snapshot().depth_accepted >= 1);
        assert!(!pipeline.is_stream_listening("/depth"));
    }

    #[test]
    fn test_unsupported_depth_stream_leaves_store_empty() {
        let mut pipeline = IngestionPipeline::new();
        pipeline.register_depth_source(Box::new(MockDepthSource::new(
            MockStreamConfig {
                stream: "/depth".into(),
                frequency_hz: 500.0,
                width: 8,
                height: 8,
                max_frames: Some(3),
            },
            "8UC3",
        )));
        pipeline.start_all();

        let metrics = pipeline.metrics();
        let deadline = Instant::now() + Duration::from_secs(2);
        while metrics.snapshot().unsupported_encodings < 3 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(metrics.snapshot().unsupported_encodings, 3);
        assert!(pipeline.store().current_frame().is_none());
    }

    #[test]
    fn test_close_color_queue_ends_consumer() {
        let mut pipeline = IngestionPipeline::new();
        let rx = pipeline.take_color_receiver().unwrap();
        pipeline.close_color_queue();
        assert!(rx.recv_blocking().is_err());
    }
}
