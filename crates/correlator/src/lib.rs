//! # Correlator
//!
//! Color-frame side of the fusion pipeline.
//!
//! For every color frame: run the detection model, keep detections of the
//! target class, and project each box center into the latest depth frame.
//! A model failure abandons that frame only.
//!
//! ```ignore
//! let correlator = DetectionCorrelator::new(model, engine, pipeline.store(), blueprint.target.clone());
//! while let Ok(frame) = color_rx.recv().await {
//!     match correlator.annotate(next_id, frame) {
//!         Ok(annotated) => dispatcher.dispatch(annotated).await,
//!         Err(_) => continue, // already logged
//!     }
//! }
//! ```

mod correlations;
mod correlator;
mod error;
mod mock;

pub use correlations::Correlations;
pub use correlator::DetectionCorrelator;
pub use error::{FrameError, Result};
pub use mock::MockDetectionModel;
