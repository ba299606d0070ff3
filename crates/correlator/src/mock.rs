//! Mock detection model

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::{ColorFrame, DetectionBox, DetectionModel, ModelError};

/// Class id the demo scene uses for its distractor box (COCO "person")
const DISTRACTOR_CLASS: i64 = 0;

/// Scripted detector.
///
/// Returns the script entries in turn, cycling, and can be told to fail on
/// every n-th call.
pub struct MockDetectionModel {
    name: String,
    script: Vec<Vec<DetectionBox>>,
    fail_every: Option<u64>,
    calls: AtomicU64,
}

impl MockDetectionModel {
    pub fn new(name: impl Into<String>, script: Vec<Vec<DetectionBox>>) -> Self {
        Self {
            name: name.into(),
            script,
            fail_every: None,
            calls: AtomicU64::new(0),
        }
    }

    /// Same boxes on every frame
    pub fn fixed(boxes: Vec<DetectionBox>) -> Self {
        Self::new("mock", vec![boxes])
    }

    /// A target box around the image center and a distractor in the top-left
    /// corner, drifting a few pixels from frame to frame.
    pub fn demo_scene(width: u32, height: u32, target_class: i64) -> Self {
        let (w, h) = (width as f32, height as f32);
        let script = (0..8)
            .map(|step| {
                let dx = (step as f32 - 4.0) * w * 0.005;
                vec![
                    DetectionBox {
                        class_id: DISTRACTOR_CLASS,
                        confidence: 0.71,
                        x1: w * 0.02,
                        y1: h * 0.02,
                        x2: w * 0.15,
                        y2: h * 0.4,
                    },
                    DetectionBox {
                        class_id: target_class,
                        confidence: 0.88,
                        x1: w * 0.45 + dx,
                        y1: h * 0.45,
                        x2: w * 0.55 + dx,
                        y2: h * 0.55,
                    },
                ]
            })
            .collect();
        Self::new("mock-demo", script)
    }

    /// Fail on every `n`-th call (1-based); `0` disables failures
    pub fn with_failure_every(mut self, n: u64) -> Self {
        self.fail_every = (n > 0).then_some(n);
        self
    }

    /// Calls made so far
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl DetectionModel for MockDetectionModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, frame: &ColorFrame) -> Result<Vec<DetectionBox>, ModelError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        if self.fail_every.is_some_and(|n| call % n == 0) {
            return Err(ModelError::new(
                &self.name,
                format!("scripted failure on call {call} (frame {:?})", frame.frame_id),
            ));
        }
        if self.script.is_empty() {
            return Ok(Vec::new());
        }
        let idx = ((call - 1) % self.script.len() as u64) as usize;
        Ok(self.script[idx].clone())
    }
}
