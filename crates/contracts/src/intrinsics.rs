//! Camera intrinsics
//!
//! Static pinhole calibration for the color and depth sensors.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Pinhole intrinsics of a single camera, in pixels.
///
/// Configured once at startup and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct CameraIntrinsics {
    /// Focal length, x direction
    #[validate(range(exclusive_min = 0.0, max = 1.0e6))]
    pub fx: f64,

    /// Focal length, y direction
    #[validate(range(exclusive_min = 0.0, max = 1.0e6))]
    pub fy: f64,

    /// Principal point x
    #[validate(range(min = 0.0, max = 1.0e6))]
    pub cx: f64,

    /// Principal point y
    #[validate(range(min = 0.0, max = 1.0e6))]
    pub cy: f64,
}

impl CameraIntrinsics {
    pub const fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self { fx, fy, cx, cy }
    }

    /// Whether every parameter is a finite number.
    pub fn is_finite(&self) -> bool {
        [self.fx, self.fy, self.cx, self.cy]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Intrinsics of both sensors of the rig.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct IntrinsicsTable {
    /// Color (RGB) camera
    #[serde(default = "default_color")]
    #[validate(nested)]
    pub color: CameraIntrinsics,

    /// Depth camera
    #[serde(default = "default_depth")]
    #[validate(nested)]
    pub depth: CameraIntrinsics,
}

/// Color camera calibration of the Kinova wrist camera.
pub const KINOVA_COLOR: CameraIntrinsics = CameraIntrinsics::new(1297.67, 1298.63, 620.91, 238.28);

/// Depth camera calibration of the Kinova wrist camera.
pub const KINOVA_DEPTH: CameraIntrinsics = CameraIntrinsics::new(360.01, 360.01, 243.87, 137.92);

fn default_color() -> CameraIntrinsics {
    KINOVA_COLOR
}

fn default_depth() -> CameraIntrinsics {
    KINOVA_DEPTH
}

impl IntrinsicsTable {
    /// Calibration shipped with the Kinova wrist camera pair.
    pub fn kinova_reference() -> Self {
        Self {
            color: KINOVA_COLOR,
            depth: KINOVA_DEPTH,
        }
    }
}

impl Default for IntrinsicsTable {
    fn default() -> Self {
        Self::kinova_reference()
    }
}
