//! Output side of the pipeline
//!
//! Every publish target (log, disk, network) receives each annotated frame
//! through this trait, driven by its own dispatcher worker.

use crate::{AnnotatedFrame, ContractError};

/// Publish target for annotated frames.
///
/// `write` sees frames in correlator order. A failed write is counted and
/// logged by the caller; the next frame is still delivered.
#[trait_variant::make(DataSink: Send)]
pub trait LocalDataSink {
    /// Stable name used in logs and per-sink metrics
    fn name(&self) -> &str;

    /// Publish one frame
    ///
    /// # Errors
    /// `SinkWrite` naming this sink and what failed
    async fn write(&mut self, frame: &AnnotatedFrame) -> Result<(), ContractError>;

    /// Push out anything buffered; called once before `close`
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Release files or sockets; no writes follow
    async fn close(&mut self) -> Result<(), ContractError>;
}
