//! # Ingestion Pipeline
//!
//! Depth and color stream ingestion.
//!
//! Responsibilities:
//! - Decode raw depth messages (`16UC1` millimeters, `32FC1` meters) into
//!   meters-valued `DepthFrame`s
//! - Publish the latest valid depth frame into a shared `DepthFrameStore`
//! - Queue color frames for the correlator with a drop policy
//!
//! The depth path has no queue: each message is decoded in the source's own
//! context and swapped into the store. Decode failures keep the previous frame.
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{BackpressureConfig, IngestionPipeline, MockColorSource, MockDepthSource};
//!
//! let mut pipeline = IngestionPipeline::with_config(BackpressureConfig::default());
//! pipeline.register_depth_source(Box::new(MockDepthSource::mono16("/camera/depth/image_raw", 15.0, 480, 270)));
//! pipeline.register_color_source(Box::new(MockColorSource::bgr8("/camera/color/image_raw", 10.0, 1280, 720)));
//!
//! pipeline.start_all();
//! let rx = pipeline.take_color_receiver().unwrap();
//! let store = pipeline.store();
//! while let Ok(frame) = rx.recv().await {
//!     let depth = store.current_frame();
//!     // Correlate
//! }
//! ```

mod adapter;
mod adapters;
mod config;
mod decode;
mod error;
mod ingestor;
mod mock;
mod pipeline;
mod store;

// Re-exports
pub use adapter::StreamAdapter;
pub use adapters::common::ColorQueue;
pub use adapters::{ColorStreamAdapter, DepthStreamAdapter};
pub use config::{BackpressureConfig, DropPolicy, IngestionMetrics, MetricsSnapshot};
pub use decode::decode_depth;
pub use error::{DecodeError, Result};
pub use ingestor::DepthIngestor;
pub use mock::{synthetic_color, synthetic_depth, MockColorSource, MockDepthSource, MockStreamConfig};
pub use pipeline::IngestionPipeline;
pub use store::DepthFrameStore;
