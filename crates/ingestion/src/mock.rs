//! Mock frame sources
//!
//! Synthetic color and depth streams for running without a camera.
//! Each source emits from its own background thread, like a real transport.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use contracts::{
    ColorFrame, DepthEncoding, FrameCallback, FrameSource, PixelLayout, RawDepthMessage,
};
use tracing::{debug, trace};

/// Pixels along each edge reported as unknown depth
const UNKNOWN_BORDER: u32 = 4;

/// Mock stream configuration
#[derive(Debug, Clone)]
pub struct MockStreamConfig {
    /// Topic name reported by the source
    pub stream: String,

    /// Emission rate (Hz)
    pub frequency_hz: f64,

    /// Image width
    pub width: u32,

    /// Image height
    pub height: u32,

    /// Stop on its own after this many frames
    pub max_frames: Option<u64>,
}

impl MockStreamConfig {
    fn interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frequency_hz.max(0.001))
    }
}

/// Build a synthetic depth message.
///
/// The scene is a wall at 2 m with a box-shaped object in the middle third,
/// slowly moving between roughly 1.15 m and 1.25 m. A thin border is left
/// at zero (unknown). `encoding` is written verbatim, so unsupported tags
/// can be produced on purpose; they are filled like `16UC1`.
pub fn synthetic_depth(
    width: u32,
    height: u32,
    encoding: &str,
    frame_id: u64,
    timestamp: f64,
) -> RawDepthMessage {
    let object_m = 1.2 + 0.05 * (frame_id as f64 * 0.1).sin();
    let meters_at = |x: u32, y: u32| -> f64 {
        let border = x < UNKNOWN_BORDER
            || y < UNKNOWN_BORDER
            || x + UNKNOWN_BORDER >= width
            || y + UNKNOWN_BORDER >= height;
        if border {
            0.0
        } else if (width / 3..2 * width / 3).contains(&x) && (height / 3..2 * height / 3).contains(&y) {
            object_m
        } else {
            2.0
        }
    };

    let float = DepthEncoding::from_tag(encoding) == Some(DepthEncoding::Float32Meters);
    let sample_size = if float { 4 } else { 2 };
    let mut data = Vec::with_capacity(width as usize * height as usize * sample_size);
    for y in 0..height {
        for x in 0..width {
            let m = meters_at(x, y);
            if float {
                data.extend_from_slice(&(m as f32).to_le_bytes());
            } else {
                data.extend_from_slice(&((m * 1000.0).round() as u16).to_le_bytes());
            }
        }
    }

    RawDepthMessage {
        encoding: encoding.to_string(),
        width,
        height,
        step: width * sample_size as u32,
        is_bigendian: false,
        data: Bytes::from(data),
        timestamp,
        frame_id: Some(frame_id),
    }
}

/// Build a synthetic BGR color frame (horizontal/vertical gradient)
pub fn synthetic_color(width: u32, height: u32, frame_id: u64, timestamp: f64) -> ColorFrame {
    let mut data = Vec::with_capacity(width as usize * height as usize * 3);
    let shift = (frame_id % 256) as u8;
    for y in 0..height {
        for x in 0..width {
            let b = ((x * 255) / width.max(1)) as u8;
            let g = ((y * 255) / height.max(1)) as u8;
            data.extend_from_slice(&[b, g, shift]);
        }
    }
    ColorFrame {
        width,
        height,
        layout: PixelLayout::Bgr8,
        data: Bytes::from(data),
        timestamp,
        frame_id: Some(frame_id),
    }
}

/// Drive `make` on a background thread until stopped
fn spawn_emitter<T, F>(
    config: MockStreamConfig,
    running: Arc<AtomicBool>,
    callback: FrameCallback<T>,
    make: F,
) where
    T: Send + 'static,
    F: Fn(u64, f64) -> T + Send + 'static,
{
    thread::spawn(move || {
        let interval = config.interval();
        let start_time = Instant::now();
        let mut frame_id: u64 = 0;

        debug!(
            stream = %config.stream,
            frequency_hz = config.frequency_hz,
            width = config.width,
            height = config.height,
            "mock source started"
        );

        while running.load(Ordering::Relaxed) {
            if config.max_frames.is_some_and(|max| frame_id >= max) {
                break;
            }
            frame_id += 1;
            let timestamp = start_time.elapsed().as_secs_f64();
            callback(make(frame_id, timestamp));
            trace!(stream = %config.stream, frame_id, timestamp, "mock frame sent");
            thread::sleep(interval);
        }

        running.store(false, Ordering::SeqCst);
        debug!(stream = %config.stream, frames = frame_id, "mock source stopped");
    });
}

/// Mock depth source
pub struct MockDepthSource {
    config: MockStreamConfig,
    encoding: String,
    running: Arc<AtomicBool>,
}

impl MockDepthSource {
    pub fn new(config: MockStreamConfig, encoding: impl Into<String>) -> Self {
        Self {
            config,
            encoding: encoding.into(),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 16UC1 source with the given geometry
    pub fn mono16(stream: &str, frequency_hz: f64, width: u32, height: u32) -> Self {
        Self::new(
            MockStreamConfig {
                stream: stream.to_string(),
                frequency_hz,
                width,
                height,
                max_frames: None,
            },
            DepthEncoding::Mono16Millimeters.tag(),
        )
    }
}

impl FrameSource<RawDepthMessage> for MockDepthSource {
    fn stream_name(&self) -> &str {
        &self.config.stream
    }

    fn listen(&self, callback: FrameCallback<RawDepthMessage>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let (width, height) = (self.config.width, self.config.height);
        let encoding = self.encoding.clone();
        spawn_emitter(
            self.config.clone(),
            self.running.clone(),
            callback,
            move |frame_id, timestamp| synthetic_depth(width, height, &encoding, frame_id, timestamp),
        );
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

/// Mock color source
pub struct MockColorSource {
    config: MockStreamConfig,
    running: Arc<AtomicBool>,
}

impl MockColorSource {
    pub fn new(config: MockStreamConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn bgr8(stream: &str, frequency_hz: f64, width: u32, height: u32) -> Self {
        Self::new(MockStreamConfig {
            stream: stream.to_string(),
            frequency_hz,
            width,
            height,
            max_frames: None,
        })
    }
}

impl FrameSource<ColorFrame> for MockColorSource {
    fn stream_name(&self) -> &str {
        &self.config.stream
    }

    fn listen(&self, callback: FrameCallback<ColorFrame>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let (width, height) = (self.config.width, self.config.height);
        spawn_emitter(
            self.config.clone(),
            self.running.clone(),
            callback,
            move |frame_id, timestamp| synthetic_color(width, height, frame_id, timestamp),
        );
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}
