//! Depth stream adapter

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use contracts::{DepthCallback, FrameSource, RawDepthMessage};
use tracing::{debug, trace};

use crate::adapter::StreamAdapter;
use crate::ingestor::DepthIngestor;

/// Routes every depth message straight into the ingestor.
///
/// Decoding runs in the source's own callback context; nothing is queued.
pub struct DepthStreamAdapter {
    source: Box<dyn FrameSource<RawDepthMessage>>,
    ingestor: Arc<DepthIngestor>,
    listening: Arc<AtomicBool>,
}

impl DepthStreamAdapter {
    pub fn new(source: Box<dyn FrameSource<RawDepthMessage>>, ingestor: Arc<DepthIngestor>) -> Self {
        Self {
            source,
            ingestor,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl StreamAdapter for DepthStreamAdapter {
    fn stream_name(&self) -> &str {
        self.source.stream_name()
    }

    fn start(&self) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let stream = self.source.stream_name().to_string();
        let ingestor = self.ingestor.clone();
        let listening = self.listening.clone();

        debug!(stream = %stream, "starting depth adapter");

        let callback: DepthCallback = Arc::new(move |msg| {
            if !listening.load(Ordering::Relaxed) {
                return;
            }
            trace!(stream = %stream, frame_id = ?msg.frame_id, "depth message received");
            // Errors are logged and counted by the ingestor
            let _ = ingestor.ingest(&msg);
        });

        self.source.listen(callback);
    }

    fn stop(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            debug!(stream = %self.source.stream_name(), "stopping depth adapter");
            self.source.stop();
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
