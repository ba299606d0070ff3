//! Detection model contract
//!
//! The object detector is external; the pipeline only sees this trait and
//! the boxes it returns.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{ColorFrame, ModelError};

/// One detected object, in color-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionBox {
    pub class_id: i64,
    pub confidence: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl DetectionBox {
    /// Integer center pixel of the box.
    ///
    /// Corners are truncated to integers first, then the sums are halved with
    /// floor division. Sums saturate at the `i64` range.
    pub fn center(&self) -> (i64, i64) {
        let (x1, y1, x2, y2) = self.corners();
        (
            x1.saturating_add(x2).div_euclid(2),
            y1.saturating_add(y2).div_euclid(2),
        )
    }

    /// Corners truncated toward zero.
    ///
    /// Out-of-range values saturate and NaN maps to 0.
    pub fn corners(&self) -> (i64, i64, i64, i64) {
        (
            self.x1 as i64,
            self.y1 as i64,
            self.x2 as i64,
            self.y2 as i64,
        )
    }
}

/// The single object class the pipeline annotates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TargetClass {
    /// Class id in the detector's taxonomy
    #[validate(range(min = 0))]
    pub class_id: i64,

    /// Human-readable name, used in logs and overlays
    #[serde(default)]
    pub label: Option<String>,
}

impl TargetClass {
    pub fn new(class_id: i64, label: Option<&str>) -> Self {
        Self {
            class_id,
            label: label.map(str::to_string),
        }
    }

    /// Whether a detection belongs to this class
    pub fn matches(&self, detection: &DetectionBox) -> bool {
        detection.class_id == self.class_id
    }

    /// Label, or `class <id>` when none is configured
    pub fn display_name(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("class {}", self.class_id))
    }
}

impl Default for TargetClass {
    /// COCO "cup"
    fn default() -> Self {
        Self::new(41, Some("cup"))
    }
}

/// External object detector.
///
/// Called synchronously once per color frame. Implementations hold no
/// per-frame state the pipeline depends on.
pub trait DetectionModel: Send + Sync {
    /// Model name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Detect objects in a color frame
    ///
    /// # Errors
    /// Any failure abandons the whole frame.
    fn detect(&self, frame: &ColorFrame) -> Result<Vec<DetectionBox>, ModelError>;
}
