//! Color stream adapter

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use contracts::{ColorCallback, ColorFrame, FrameSource};
use tracing::{debug, trace};

use crate::adapter::StreamAdapter;
use crate::adapters::common::{send_color_frame, ColorQueue};
use crate::config::{BackpressureConfig, IngestionMetrics};

/// Pushes color frames into the bounded color queue
pub struct ColorStreamAdapter {
    source: Box<dyn FrameSource<ColorFrame>>,
    queue: ColorQueue,
    metrics: Arc<IngestionMetrics>,
    config: BackpressureConfig,
    listening: Arc<AtomicBool>,
}

impl ColorStreamAdapter {
    pub fn new(
        source: Box<dyn FrameSource<ColorFrame>>,
        queue: ColorQueue,
        metrics: Arc<IngestionMetrics>,
        config: BackpressureConfig,
    ) -> Self {
        Self {
            source,
            queue,
            metrics,
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl StreamAdapter for ColorStreamAdapter {
    fn stream_name(&self) -> &str {
        self.source.stream_name()
    }

    fn start(&self) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let stream = self.source.stream_name().to_string();
        let queue = self.queue.clone();
        let metrics = self.metrics.clone();
        let drop_policy = self.config.drop_policy;
        let listening = self.listening.clone();

        debug!(stream = %stream, ?drop_policy, "starting color adapter");

        let callback: ColorCallback = Arc::new(move |frame| {
            if !listening.load(Ordering::Relaxed) {
                return;
            }
            metrics.record_color_received();
            trace!(stream = %stream, frame_id = ?frame.frame_id, "color frame received");
            send_color_frame(&queue, frame, &metrics, &stream, drop_policy);
        });

        self.source.listen(callback);
    }

    fn stop(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            debug!(stream = %self.source.stream_name(), "stopping color adapter");
            self.source.stop();
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
