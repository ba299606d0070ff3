//! Pinhole camera model

use contracts::CameraIntrinsics;
use nalgebra::{Point2, Point3};

/// Ideal pinhole camera (no distortion)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinholeCamera {
    intrinsics: CameraIntrinsics,
}

impl PinholeCamera {
    pub fn new(intrinsics: CameraIntrinsics) -> Self {
        Self { intrinsics }
    }

    pub fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }

    /// Lift a pixel to the 3-D point at depth `z` along its ray
    pub fn back_project(&self, pixel: Point2<f64>, z: f64) -> Point3<f64> {
        let k = &self.intrinsics;
        Point3::new(
            (pixel.x - k.cx) * z / k.fx,
            (pixel.y - k.cy) * z / k.fy,
            z,
        )
    }

    /// Image of a 3-D point; `None` for points at or behind the camera plane
    pub fn project(&self, point: &Point3<f64>) -> Option<Point2<f64>> {
        if point.z.is_nan() || point.z <= 0.0 {
            return None;
        }
        let k = &self.intrinsics;
        Some(Point2::new(
            point.x * k.fx / point.z + k.cx,
            point.y * k.fy / point.z + k.cy,
        ))
    }
}

/// Round to the nearest integer pixel (half away from zero)
pub(crate) fn round_pixel(pixel: Point2<f64>) -> Option<(i64, i64)> {
    let (x, y) = (pixel.x.round(), pixel.y.round());
    let limit = i64::MAX as f64;
    if x.is_finite() && y.is_finite() && x.abs() < limit && y.abs() < limit {
        Some((x as i64, y as i64))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::KINOVA_COLOR;

    #[test]
    fn test_principal_point_maps_to_optical_axis() {
        let cam = PinholeCamera::new(KINOVA_COLOR);
        let p = cam.back_project(Point2::new(KINOVA_COLOR.cx, KINOVA_COLOR.cy), 2.0);
        assert_eq!(p, Point3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_back_project_then_project() {
        let cam = PinholeCamera::new(KINOVA_COLOR);
        let pixel = Point2::new(17.0, 701.0);
        let back = cam.project(&cam.back_project(pixel, 3.3)).unwrap();
        assert!((back - pixel).norm() < 1e-9);
    }

    #[test]
    fn test_project_rejects_non_positive_depth() {
        let cam = PinholeCamera::new(KINOVA_COLOR);
        assert!(cam.project(&Point3::new(0.1, 0.1, 0.0)).is_none());
        assert!(cam.project(&Point3::new(0.1, 0.1, -1.0)).is_none());
        assert!(cam.project(&Point3::new(0.1, 0.1, f64::NAN)).is_none());
    }

    #[test]
    fn test_round_pixel() {
        assert_eq!(round_pixel(Point2::new(248.5, 171.49)), Some((249, 171)));
        assert_eq!(round_pixel(Point2::new(-0.5, 0.0)), Some((-1, 0)));
        assert_eq!(round_pixel(Point2::new(f64::INFINITY, 0.0)), None);
    }
}
