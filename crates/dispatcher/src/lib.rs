//! # Dispatcher
//!
//! Annotation/publish stage.
//!
//! - Consumes `Arc<AnnotatedFrame>` from the correlator
//! - Fans out to every configured sink, each behind its own queue and worker
//! - A slow or failing sink never blocks the correlator or the other sinks

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod render;
pub mod sinks;

#[cfg(test)]
mod testing;

pub use contracts::{AnnotatedFrame, DataSink};
pub use dispatcher::{
    create_dispatcher, DispatchHook, Dispatcher, DispatcherBuilder, DispatcherConfig,
};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{FileSink, FileSinkConfig, LogSink, NetworkFormat, NetworkSink, NetworkSinkConfig};
