//! FrameSource trait - transport abstraction
//!
//! Each stream (color, depth) is delivered by a source that pushes messages
//! into a callback. Sources may invoke the callback from their own thread,
//! so the two streams run concurrently.

use std::sync::Arc;

use crate::{ColorFrame, RawDepthMessage};

/// Frame callback type
///
/// Uses `Arc` to allow callback sharing across multiple contexts.
pub type FrameCallback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Callback receiving raw depth messages
pub type DepthCallback = FrameCallback<RawDepthMessage>;

/// Callback receiving color frames
pub type ColorCallback = FrameCallback<ColorFrame>;

/// Push-based stream of frames.
///
/// # Example
///
/// ```ignore
/// let source: Box<dyn FrameSource<RawDepthMessage>> = transport.subscribe_depth("/camera/depth/image_raw");
/// source.listen(Arc::new(|msg| {
///     println!("depth {}x{}", msg.width, msg.height);
/// }));
/// // ...
/// source.stop();
/// ```
pub trait FrameSource<T>: Send + Sync {
    /// Topic / endpoint this source is bound to
    fn stream_name(&self) -> &str;

    /// Register the frame callback
    ///
    /// Repeated calls while listening are ignored.
    fn listen(&self, callback: FrameCallback<T>);

    /// Stop delivering frames
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}
