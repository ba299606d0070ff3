//! Fixtures shared by the unit tests of this crate

use std::sync::Arc;

use bytes::Bytes;
use contracts::{
    AnnotatedFrame, ColorFrame, Correlation, DepthFrame, DetectionBox, PixelLayout,
    ProjectionResult,
};

/// Target box spanning (20, 10)..(60, 40), center (40, 25)
pub(crate) fn correlation(projection: ProjectionResult) -> Correlation {
    let detection = DetectionBox {
        class_id: 41,
        confidence: 0.87,
        x1: 20.0,
        y1: 10.0,
        x2: 60.0,
        y2: 40.0,
    };
    Correlation {
        detection,
        center: detection.center(),
        projection,
    }
}

/// Black 80x60 color frame carrying `correlations`
pub(crate) fn annotated_frame(
    frame_id: u64,
    correlations: Vec<Correlation>,
    depth: Option<DepthFrame>,
) -> AnnotatedFrame {
    AnnotatedFrame {
        frame_id,
        color: ColorFrame {
            width: 80,
            height: 60,
            layout: PixelLayout::Bgr8,
            data: Bytes::from(vec![0u8; 80 * 60 * 3]),
            timestamp: frame_id as f64 * 0.1,
            frame_id: Some(frame_id + 100),
        },
        correlations,
        depth: depth.map(Arc::new),
        target_label: "cup".to_string(),
    }
}
