//! Detection correlator

use std::sync::Arc;

use contracts::{AnnotatedFrame, ColorFrame, DetectionModel, TargetClass};
use ingestion::DepthFrameStore;
use projection::ProjectionEngine;
use tracing::{debug, info, instrument, warn};

use crate::correlations::Correlations;
use crate::error::Result;

/// Runs the detector on color frames and attaches depth to target detections.
///
/// Holds no per-frame state; every call reads the store afresh.
pub struct DetectionCorrelator {
    model: Arc<dyn DetectionModel>,
    engine: ProjectionEngine,
    store: Arc<DepthFrameStore>,
    target: TargetClass,
}

impl DetectionCorrelator {
    pub fn new(
        model: Arc<dyn DetectionModel>,
        engine: ProjectionEngine,
        store: Arc<DepthFrameStore>,
        target: TargetClass,
    ) -> Self {
        Self {
            model,
            engine,
            store,
            target,
        }
    }

    pub fn target(&self) -> &TargetClass {
        &self.target
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Detect, filter to the target class, and return the lazy correlation
    /// sequence for this frame.
    ///
    /// # Errors
    /// Invalid color buffer or detection model failure. Nothing is produced
    /// for the frame in either case.
    pub fn process(&self, frame: &ColorFrame) -> Result<Correlations> {
        frame.validate()?;

        let detections = self.model.detect(frame)?;

        // One snapshot for the whole frame
        let depth = self.store.current_frame();

        debug!(
            frame_id = ?frame.frame_id,
            detections = detections.len(),
            depth_frame = ?depth.as_ref().and_then(|d| d.frame_id),
            "frame detections received"
        );

        Ok(Correlations::new(
            detections,
            self.target.clone(),
            self.engine,
            depth,
        ))
    }

    /// Process a frame end to end into an [`AnnotatedFrame`].
    ///
    /// Failures are logged here and returned; the caller moves on to the next
    /// frame. Metrics are left to the caller.
    #[instrument(
        name = "correlator_annotate",
        skip(self, frame),
        fields(source_frame_id = ?frame.frame_id)
    )]
    pub fn annotate(&self, frame_id: u64, frame: ColorFrame) -> Result<AnnotatedFrame> {
        let correlations = match self.process(&frame) {
            Ok(c) => c,
            Err(err) => {
                warn!(error = %err, reason = err.kind(), "color frame abandoned");
                return Err(err);
            }
        };

        let depth = correlations.depth().cloned();
        let correlations: Vec<_> = correlations.collect();

        for c in &correlations {
            match c.projection.depth_pixel().zip(c.projection.distance()) {
                Some(((dx, dy), distance)) => {
                    info!(
                        target_label = %self.target.display_name(),
                        rgb_x = c.center.0,
                        rgb_y = c.center.1,
                        depth_x = dx,
                        depth_y = dy,
                        distance_m = distance,
                        "target detected at RGB({}, {}) -> Depth({}, {}), distance {:.2}m",
                        c.center.0,
                        c.center.1,
                        dx,
                        dy,
                        distance
                    );
                }
                None => {
                    debug!(
                        rgb_x = c.center.0,
                        rgb_y = c.center.1,
                        "target detected without depth"
                    );
                }
            }
        }

        Ok(AnnotatedFrame {
            frame_id,
            color: frame,
            correlations,
            depth,
            target_label: self.target.display_name(),
        })
    }
}
