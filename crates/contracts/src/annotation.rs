//! AnnotatedFrame - Correlator output
//!
//! Per-frame correlation results handed to the publish stage.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{ColorFrame, DepthFrame, DetectionBox};

/// Outcome of projecting one color pixel into the depth camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectionResult {
    /// Depth was available at the looked-up pixel
    Located {
        depth_pixel_x: i64,
        depth_pixel_y: i64,
        distance_meters: f32,
    },
    /// No usable depth for this pixel; not an error
    NoDepth,
}

impl ProjectionResult {
    /// Distance in meters, if known
    pub fn distance(&self) -> Option<f32> {
        match self {
            Self::Located {
                distance_meters, ..
            } => Some(*distance_meters),
            Self::NoDepth => None,
        }
    }

    /// Pixel in the depth image, if known
    pub fn depth_pixel(&self) -> Option<(i64, i64)> {
        match self {
            Self::Located {
                depth_pixel_x,
                depth_pixel_y,
                ..
            } => Some((*depth_pixel_x, *depth_pixel_y)),
            Self::NoDepth => None,
        }
    }

    pub fn is_located(&self) -> bool {
        matches!(self, Self::Located { .. })
    }
}

/// A retained detection paired with its projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub detection: DetectionBox,
    /// Center pixel in color-image coordinates
    pub center: (i64, i64),
    pub projection: ProjectionResult,
}

/// Color frame plus everything needed to draw and publish its overlays.
#[derive(Debug, Clone)]
pub struct AnnotatedFrame {
    /// Sequence number assigned by the correlator (monotonically increasing)
    pub frame_id: u64,

    /// Source color frame
    pub color: ColorFrame,

    /// Target-class detections, in detector order
    pub correlations: Vec<Correlation>,

    /// Depth snapshot the projections were computed against
    pub depth: Option<Arc<DepthFrame>>,

    /// Display name of the target class
    pub target_label: String,
}

impl AnnotatedFrame {
    /// Number of correlations that carry a distance
    pub fn located_count(&self) -> usize {
        self.correlations
            .iter()
            .filter(|c| c.projection.is_located())
            .count()
    }

    /// Compact, pixel-free view for metadata and network publication
    pub fn summary(&self) -> AnnotationSummary {
        AnnotationSummary {
            frame_id: self.frame_id,
            timestamp: self.color.timestamp,
            source_frame_id: self.color.frame_id,
            width: self.color.width,
            height: self.color.height,
            target_label: self.target_label.clone(),
            depth_frame_id: self.depth.as_ref().and_then(|d| d.frame_id),
            depth_captured_at: self.depth.as_ref().map(|d| d.captured_at),
            correlations: self.correlations.clone(),
        }
    }
}

/// Serializable summary of an [`AnnotatedFrame`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSummary {
    pub frame_id: u64,
    pub timestamp: f64,
    pub source_frame_id: Option<u64>,
    pub width: u32,
    pub height: u32,
    pub target_label: String,
    pub depth_frame_id: Option<u64>,
    pub depth_captured_at: Option<f64>,
    pub correlations: Vec<Correlation>,
}
