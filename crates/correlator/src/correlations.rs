//! Lazy per-frame correlation sequence

use std::iter::FusedIterator;
use std::sync::Arc;

use contracts::{Correlation, DepthFrame, DetectionBox, TargetClass};
use projection::ProjectionEngine;

/// Target-class detections of one color frame, each paired with its projection.
///
/// Projections are computed on demand against a single depth snapshot taken
/// when the frame was processed. Consuming the iterator is the only way to
/// read it; it cannot be restarted.
pub struct Correlations {
    detections: std::vec::IntoIter<DetectionBox>,
    target: TargetClass,
    engine: ProjectionEngine,
    depth: Option<Arc<DepthFrame>>,
}

impl Correlations {
    pub(crate) fn new(
        detections: Vec<DetectionBox>,
        target: TargetClass,
        engine: ProjectionEngine,
        depth: Option<Arc<DepthFrame>>,
    ) -> Self {
        Self {
            detections: detections.into_iter(),
            target,
            engine,
            depth,
        }
    }

    /// Depth snapshot the projections use
    pub fn depth(&self) -> Option<&Arc<DepthFrame>> {
        self.depth.as_ref()
    }
}

impl Iterator for Correlations {
    type Item = Correlation;

    fn next(&mut self) -> Option<Self::Item> {
        let target = &self.target;
        let detection = self.detections.find(|d| target.matches(d))?;
        let center = detection.center();
        let projection = self
            .engine
            .project(center.0, center.1, self.depth.as_deref());
        Some(Correlation {
            detection,
            center,
            projection,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.detections.size_hint().1)
    }
}

impl FusedIterator for Correlations {}
