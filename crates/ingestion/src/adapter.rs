//! Stream adapter trait

/// Binds one `FrameSource` to its consumer.
///
/// The depth adapter feeds the ingestor, the color adapter feeds the bounded
/// color queue. Both run in whatever context the source invokes them from.
pub trait StreamAdapter: Send + Sync {
    /// Topic / endpoint of the underlying source
    fn stream_name(&self) -> &str;

    /// Start forwarding frames
    fn start(&self);

    /// Stop forwarding frames
    fn stop(&self);

    /// Check if the adapter is forwarding
    fn is_listening(&self) -> bool;
}
