//! Projection engine

use contracts::{DepthFrame, DepthLookup, IntrinsicsTable, ProjectionResult};
use nalgebra::Point2;

use crate::pinhole::{round_pixel, PinholeCamera};

/// Maps color-image pixels to depth-image pixels and metric distance.
///
/// Stateless apart from its calibration; safe to share between threads.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionEngine {
    color: PinholeCamera,
    depth: PinholeCamera,
    lookup: DepthLookup,
}

impl ProjectionEngine {
    pub fn new(intrinsics: IntrinsicsTable, lookup: DepthLookup) -> Self {
        Self {
            color: PinholeCamera::new(intrinsics.color),
            depth: PinholeCamera::new(intrinsics.depth),
            lookup,
        }
    }

    pub fn lookup(&self) -> DepthLookup {
        self.lookup
    }

    pub fn intrinsics(&self) -> IntrinsicsTable {
        IntrinsicsTable {
            color: *self.color.intrinsics(),
            depth: *self.depth.intrinsics(),
        }
    }

    /// Project color pixel `(x, y)` into the depth camera.
    ///
    /// Returns `NoDepth` when there is no frame, when the lookup pixel falls
    /// outside it, or when the sample there is not a positive distance.
    ///
    /// With [`DepthLookup::DepthPixel`] the sample is read at the depth pixel
    /// the color pixel maps to. With [`DepthLookup::ColorPixel`] it is read at
    /// `(x, y)` itself, which only lines up when both images share geometry.
    pub fn project(&self, x: i64, y: i64, depth: Option<&DepthFrame>) -> ProjectionResult {
        let Some(frame) = depth else {
            return ProjectionResult::NoDepth;
        };

        let lookup_pixel = match self.lookup {
            DepthLookup::ColorPixel => Some((x, y)),
            DepthLookup::DepthPixel => self.color_to_depth_pixel(x, y),
        };
        let Some((sx, sy)) = lookup_pixel else {
            return ProjectionResult::NoDepth;
        };

        let z = match frame.sample(sx, sy) {
            Some(z) if z > 0.0 => z,
            _ => return ProjectionResult::NoDepth,
        };

        self.reproject(x, y, z)
    }

    /// Depth pixel seen along the same ray as color pixel `(x, y)`.
    ///
    /// Without a baseline between the cameras this does not depend on depth.
    pub fn color_to_depth_pixel(&self, x: i64, y: i64) -> Option<(i64, i64)> {
        let point = self.color.back_project(Point2::new(x as f64, y as f64), 1.0);
        self.depth.project(&point).and_then(round_pixel)
    }

    fn reproject(&self, x: i64, y: i64, z: f32) -> ProjectionResult {
        let point = self
            .color
            .back_project(Point2::new(x as f64, y as f64), z as f64);
        match self.depth.project(&point).and_then(round_pixel) {
            Some((depth_pixel_x, depth_pixel_y)) => ProjectionResult::Located {
                depth_pixel_x,
                depth_pixel_y,
                distance_meters: z,
            },
            None => ProjectionResult::NoDepth,
        }
    }
}
