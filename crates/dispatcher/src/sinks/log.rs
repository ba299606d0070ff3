//! LogSink - logs each annotated frame via tracing

use contracts::{AnnotatedFrame, ContractError, DataSink, ProjectionResult};
use tracing::{debug, info, instrument};

/// Sink that logs frame summaries and every correlation
pub struct LogSink {
    name: String,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_frame(&self, frame: &AnnotatedFrame) {
        info!(
            sink = %self.name,
            frame_id = frame.frame_id,
            source_frame_id = ?frame.color.frame_id,
            timestamp = frame.color.timestamp,
            target = %frame.target_label,
            detections = frame.correlations.len(),
            located = frame.located_count(),
            depth_frame_id = ?frame.depth.as_ref().and_then(|d| d.frame_id),
            "Annotated frame"
        );

        for (index, c) in frame.correlations.iter().enumerate() {
            match c.projection {
                ProjectionResult::Located {
                    depth_pixel_x,
                    depth_pixel_y,
                    distance_meters,
                } => debug!(
                    sink = %self.name,
                    frame_id = frame.frame_id,
                    index,
                    confidence = c.detection.confidence,
                    rgb_x = c.center.0,
                    rgb_y = c.center.1,
                    depth_x = depth_pixel_x,
                    depth_y = depth_pixel_y,
                    distance_m = distance_meters,
                    "Correlation located"
                ),
                ProjectionResult::NoDepth => debug!(
                    sink = %self.name,
                    frame_id = frame.frame_id,
                    index,
                    confidence = c.detection.confidence,
                    rgb_x = c.center.0,
                    rgb_y = c.center.1,
                    "Correlation without depth"
                ),
            }
        }
    }
}

impl DataSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, frame),
        fields(sink = %self.name, frame_id = frame.frame_id)
    )]
    async fn write(&mut self, frame: &AnnotatedFrame) -> Result<(), ContractError> {
        self.log_frame(frame);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
