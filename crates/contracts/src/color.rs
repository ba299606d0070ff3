//! ColorFrame - color stream input
//!
//! 8-bit, 3-channel color image as delivered by the transport.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Channel order of a color frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelLayout {
    #[default]
    Bgr8,
    Rgb8,
}

impl PixelLayout {
    /// Parse a transport encoding tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "bgr8" => Some(Self::Bgr8),
            "rgb8" => Some(Self::Rgb8),
            _ => None,
        }
    }
}

/// Color image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorFrame {
    /// Image width
    pub width: u32,

    /// Image height
    pub height: u32,

    /// Channel order
    pub layout: PixelLayout,

    /// Tightly packed pixels, 3 bytes each (zero-copy)
    pub data: Bytes,

    /// Capture time (seconds)
    pub timestamp: f64,

    /// Optional sequence number from the transport
    pub frame_id: Option<u64>,
}

impl ColorFrame {
    /// Expected payload length in bytes
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    /// Check that the payload matches the declared geometry
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.width == 0 || self.height == 0 {
            return Err(ContractError::InvalidColorFrame {
                frame_id: self.frame_id,
                message: format!("zero dimension {}x{}", self.width, self.height),
            });
        }
        if self.data.len() != self.expected_len() {
            return Err(ContractError::InvalidColorFrame {
                frame_id: self.frame_id,
                message: format!(
                    "payload is {} bytes, expected {} for {}x{}",
                    self.data.len(),
                    self.expected_len(),
                    self.width,
                    self.height
                ),
            });
        }
        Ok(())
    }

    /// Copy pixels into RGB order
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut rgb = self.data.to_vec();
        if self.layout == PixelLayout::Bgr8 {
            for px in rgb.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
        }
        rgb
    }
}
