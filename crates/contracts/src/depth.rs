//! Depth frames
//!
//! `RawDepthMessage` is what the transport hands over; `DepthFrame` is the
//! decoded, unit-normalized result published by the depth ingestor.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Depth sample encoding on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthEncoding {
    /// 16-bit unsigned integer millimeters (`16UC1` / `mono16`)
    Mono16Millimeters,
    /// 32-bit float meters (`32FC1`)
    Float32Meters,
}

impl DepthEncoding {
    /// Parse a transport encoding tag. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "16UC1" | "mono16" => Some(Self::Mono16Millimeters),
            "32FC1" => Some(Self::Float32Meters),
            _ => None,
        }
    }

    /// Canonical transport tag
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Mono16Millimeters => "16UC1",
            Self::Float32Meters => "32FC1",
        }
    }

    /// Bytes per sample
    pub fn sample_size(&self) -> usize {
        match self {
            Self::Mono16Millimeters => 2,
            Self::Float32Meters => 4,
        }
    }

    /// Multiplier converting a raw sample into meters
    pub fn meters_per_unit(&self) -> f32 {
        match self {
            Self::Mono16Millimeters => 0.001,
            Self::Float32Meters => 1.0,
        }
    }
}

impl fmt::Display for DepthEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Raw depth image as delivered by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDepthMessage {
    /// Encoding tag, e.g. `16UC1`
    pub encoding: String,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Row length in bytes (may include padding)
    pub step: u32,

    /// Sample byte order
    pub is_bigendian: bool,

    /// Pixel payload
    pub data: Bytes,

    /// Capture time (seconds)
    pub timestamp: f64,

    /// Optional sequence number
    pub frame_id: Option<u64>,
}

/// Decoded depth image in meters.
///
/// A sample of `0.0` means "unknown". Every other sample is finite and
/// positive. Frames are immutable once built and shared behind `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthFrame {
    pub width: u32,
    pub height: u32,
    pub encoding: DepthEncoding,
    pub captured_at: f64,
    pub frame_id: Option<u64>,
    samples: Vec<f32>,
}

/// Marker stored for pixels without a valid measurement
pub const UNKNOWN_DEPTH: f32 = 0.0;

impl DepthFrame {
    /// Build a frame from row-major samples already expressed in meters.
    ///
    /// Non-finite and negative values are replaced by [`UNKNOWN_DEPTH`].
    /// Returns `None` when `samples.len() != width * height`.
    pub fn from_meters(
        width: u32,
        height: u32,
        encoding: DepthEncoding,
        captured_at: f64,
        frame_id: Option<u64>,
        mut samples: Vec<f32>,
    ) -> Option<Self> {
        if samples.len() != width as usize * height as usize {
            return None;
        }
        for sample in samples.iter_mut() {
            if !sample.is_finite() || *sample < 0.0 {
                *sample = UNKNOWN_DEPTH;
            }
        }
        Some(Self {
            width,
            height,
            encoding,
            captured_at,
            frame_id,
            samples,
        })
    }

    /// Depth at `(x, y)` in meters, `None` outside the image.
    pub fn sample(&self, x: i64, y: i64) -> Option<f32> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        self.samples
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Row-major samples in meters
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Min / max over known (non-zero) samples
    pub fn depth_range(&self) -> Option<(f32, f32)> {
        self.samples
            .iter()
            .copied()
            .filter(|d| *d > UNKNOWN_DEPTH)
            .fold(None, |acc, d| match acc {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            })
    }

    /// Fraction of pixels carrying a measurement
    pub fn coverage(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let known = self.samples.iter().filter(|d| **d > UNKNOWN_DEPTH).count();
        known as f64 / self.samples.len() as f64
    }
}
